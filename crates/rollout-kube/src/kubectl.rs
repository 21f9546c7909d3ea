//! kubectl CLI cluster control

use async_trait::async_trait;
use rollout_core::Settings;
use std::path::PathBuf;

use crate::collaborator::ClusterControl;
use crate::error::{OrchestrationError, Result};
use crate::process::CommandRunner;

/// Drives the `kubectl` executable
#[derive(Debug, Clone)]
pub struct KubectlCli {
    runner: CommandRunner,
}

impl KubectlCli {
    pub fn new(bin: impl Into<PathBuf>, kubeconfig: Option<PathBuf>) -> Self {
        Self {
            runner: CommandRunner::new(bin, kubeconfig),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.kubectl_bin, settings.kubeconfig.clone())
    }
}

/// kubectl reports a missing object as `Error from server (NotFound)`
fn is_not_found(stderr: &str) -> bool {
    stderr.contains("(NotFound)")
}

#[async_trait]
impl ClusterControl for KubectlCli {
    async fn namespace_exists(&self, name: &str) -> Result<bool> {
        let args = vec![
            "get".to_string(),
            "namespace".to_string(),
            name.to_string(),
            "-o".to_string(),
            "name".to_string(),
        ];
        let output = self.runner.output(&args).await?;
        if output.success() {
            Ok(true)
        } else if is_not_found(&output.stderr) {
            Ok(false)
        } else {
            Err(self.runner.failure(&args, &output))
        }
    }

    async fn create_namespace(&self, name: &str) -> Result<()> {
        let args = vec![
            "create".to_string(),
            "namespace".to_string(),
            name.to_string(),
        ];
        self.runner.run(&args).await?;
        Ok(())
    }

    async fn current_context(&self) -> Result<String> {
        let args = vec!["config".to_string(), "current-context".to_string()];
        match self.runner.run(&args).await {
            Ok(stdout) => Ok(stdout.trim().to_string()),
            Err(OrchestrationError::CommandFailed { stderr, .. }) => {
                Err(OrchestrationError::Connectivity(stderr))
            }
            Err(OrchestrationError::Spawn { source, .. }) => Err(OrchestrationError::Connectivity(
                format!("{}: {}", self.runner.program().display(), source),
            )),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_detection() {
        assert!(is_not_found(
            "Error from server (NotFound): namespaces \"data\" not found"
        ));
        assert!(!is_not_found("Unable to connect to the server: dial tcp"));
    }

    #[test]
    fn test_missing_context_is_not_absence() {
        assert!(!is_not_found("error: context \"staging\" not found"));
        assert!(!is_not_found("error: the server doesn't have a resource type \"namespace\": not found"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_missing_binary_is_connectivity_error() {
        let kubectl = KubectlCli::new("/definitely/not/kubectl", None);
        let err = kubectl.current_context().await.unwrap_err();
        assert!(matches!(err, OrchestrationError::Connectivity(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_query_is_not_absence() {
        // `false` exits non-zero with empty stderr, which is not a NotFound
        let kubectl = KubectlCli::new("false", None);
        let err = kubectl.namespace_exists("data").await.unwrap_err();
        assert!(matches!(err, OrchestrationError::CommandFailed { .. }));
    }
}
