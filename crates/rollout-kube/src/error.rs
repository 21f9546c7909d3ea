//! Error types for rollout-kube

use rollout_core::CoreError;
use thiserror::Error;

/// Result type for rollout-kube operations
pub type Result<T> = std::result::Result<T, OrchestrationError>;

/// Errors that can occur while talking to collaborators or sequencing releases
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum OrchestrationError {
    /// The collaborator executable could not be started
    #[error("failed to run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The collaborator ran and reported failure
    #[error("`{command}` failed ({status}): {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    /// The cluster could not be reached during pre-flight
    #[error("cannot reach the cluster: {0}")]
    Connectivity(String),

    /// A release points at a chart directory that does not exist
    #[error("chart directory '{path}' for release '{release}' does not exist")]
    ChartNotFound { release: String, path: String },

    /// Kubernetes API error
    #[error("Kubernetes API error: {0}")]
    Api(#[from] kube::Error),

    /// Configuration, placeholder or secret error
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl OrchestrationError {
    /// Check if this is a conflict error (409)
    pub fn is_conflict(&self) -> bool {
        matches!(self, OrchestrationError::Api(kube::Error::Api(resp)) if resp.code == 409)
    }

    /// Errors raised by an external collaborator rather than by configuration
    pub fn is_collaborator_failure(&self) -> bool {
        matches!(
            self,
            OrchestrationError::Spawn { .. }
                | OrchestrationError::CommandFailed { .. }
                | OrchestrationError::Api(_)
        )
    }
}
