//! Helm CLI package manager

use async_trait::async_trait;
use rollout_core::{Release, Settings};
use std::path::PathBuf;

use crate::collaborator::PackageManager;
use crate::error::Result;
use crate::process::CommandRunner;

/// Drives the `helm` executable
#[derive(Debug, Clone)]
pub struct HelmCli {
    runner: CommandRunner,
}

impl HelmCli {
    pub fn new(bin: impl Into<PathBuf>, kubeconfig: Option<PathBuf>) -> Self {
        Self {
            runner: CommandRunner::new(bin, kubeconfig),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.helm_bin, settings.kubeconfig.clone())
    }

    /// `helm list` arguments matching exactly one release name
    pub fn list_args(namespace: &str, name_filter: &str) -> Vec<String> {
        vec![
            "list".to_string(),
            "--namespace".to_string(),
            namespace.to_string(),
            "--short".to_string(),
            "--filter".to_string(),
            format!("^{}$", regex::escape(name_filter)),
        ]
    }

    /// `helm install` / `helm upgrade` arguments for a release
    pub fn apply_args(verb: &str, release: &Release) -> Vec<String> {
        let mut args = vec![
            verb.to_string(),
            release.name.clone(),
            release.chart_path.clone(),
            "--namespace".to_string(),
            release.namespace.clone(),
        ];
        if let Some(values_file) = &release.values_file {
            args.push("-f".to_string());
            args.push(values_file.clone());
        }
        args
    }

    async fn apply(&self, verb: &str, release: &Release) -> Result<()> {
        let stdout = self.runner.run(&Self::apply_args(verb, release)).await?;
        for line in stdout.lines().filter(|l| !l.trim().is_empty()) {
            tracing::debug!("helm: {}", line);
        }
        Ok(())
    }
}

#[async_trait]
impl PackageManager for HelmCli {
    async fn list(&self, namespace: &str, name_filter: &str) -> Result<Vec<String>> {
        let stdout = self
            .runner
            .run(&Self::list_args(namespace, name_filter))
            .await?;
        Ok(stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }

    async fn install(&self, release: &Release) -> Result<()> {
        self.apply("install", release).await
    }

    async fn upgrade(&self, release: &Release) -> Result<()> {
        self.apply("upgrade", release).await
    }
}
