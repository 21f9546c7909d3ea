//! Orchestrator settings
//!
//! Read from `~/.config/rollout/settings.yaml` (or an explicit path) and then
//! overridden from the command line. Everything the deployment core needs
//! from its environment is carried here instead of being read from process
//! state.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{CoreError, Result};

/// Settings for one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Root searched for values files
    pub components_dir: PathBuf,

    /// File name of values files
    pub values_file_name: String,

    /// Package manager executable
    pub helm_bin: PathBuf,

    /// Cluster control executable
    pub kubectl_bin: PathBuf,

    /// Explicit kubeconfig handed to collaborators
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kubeconfig: Option<PathBuf>,

    /// How namespaces and the current context are queried
    pub cluster_backend: ClusterBackend,

    /// Post-deploy barrier
    pub barrier: BarrierSettings,

    /// Fail when a release's chart directory is missing
    pub check_chart_paths: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            components_dir: PathBuf::from("./Components"),
            values_file_name: "values.yaml".to_string(),
            helm_bin: PathBuf::from("helm"),
            kubectl_bin: PathBuf::from("kubectl"),
            kubeconfig: None,
            cluster_backend: ClusterBackend::default(),
            barrier: BarrierSettings::default(),
            check_chart_paths: true,
        }
    }
}

/// Cluster control implementation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterBackend {
    /// Shell out to kubectl
    #[default]
    Kubectl,
    /// Talk to the API server directly
    Api,
}

/// Fixed delay applied after releases of a dependency class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BarrierSettings {
    /// Substring of the release name that triggers the delay
    pub dependency_class: String,

    /// How long to wait
    #[serde(with = "humantime_serde")]
    pub duration: Duration,
}

impl Default for BarrierSettings {
    fn default() -> Self {
        Self {
            dependency_class: "databases".to_string(),
            duration: Duration::from_secs(120),
        }
    }
}

impl Settings {
    /// Load from an explicit path, or from the default location when present
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load_from(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Load from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::io(path, e))?;
        let settings: Self =
            serde_yaml::from_str(&content).map_err(|e| CoreError::parse(path, e))?;
        settings.validate()?;
        tracing::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Default settings location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("rollout").join("settings.yaml"))
    }

    fn validate(&self) -> Result<()> {
        if self.values_file_name.trim().is_empty() {
            return Err(CoreError::Settings {
                message: "valuesFileName must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
