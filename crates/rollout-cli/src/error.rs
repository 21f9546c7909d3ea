//! CLI error types with exit code handling
//!
//! Library errors are folded into `CliError` so every failure leaves the
//! process with a stable exit code.

use miette::Diagnostic;
use rollout_core::CoreError;
use rollout_kube::OrchestrationError;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// Configuration could not be parsed or has no supported layout
    #[error("Configuration error: {message}")]
    #[diagnostic(code(rollout::cli::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Placeholders left unresolved or a credential rejected
    #[error("Validation failed: {message}")]
    #[diagnostic(code(rollout::cli::validation))]
    Validation {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// helm, kubectl or the API server reported a failure
    #[error("Deployment failed: {message}")]
    #[diagnostic(code(rollout::cli::collaborator))]
    Collaborator {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// The cluster could not be reached
    #[error("Cluster unreachable: {message}")]
    #[diagnostic(
        code(rollout::cli::connectivity),
        help("Check your kubeconfig and current context, or pass --kubeconfig")
    )]
    Connectivity { message: String },

    /// IO error (file not found, permissions, etc.)
    #[error("IO error: {message}")]
    #[diagnostic(code(rollout::cli::io))]
    Io { message: String },

    /// Invalid arguments
    #[error("{message}")]
    #[diagnostic(code(rollout::cli::usage))]
    Usage {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Internal error (runtime, unexpected failure)
    #[error("Internal error: {message}")]
    #[diagnostic(code(rollout::cli::internal))]
    Internal { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config { .. } => exit_codes::CONFIG_ERROR,
            CliError::Validation { .. } => exit_codes::VALIDATION_ERROR,
            CliError::Collaborator { .. } => exit_codes::ERROR,
            CliError::Connectivity { .. } => exit_codes::CONNECTIVITY_ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
            CliError::Usage { .. } => exit_codes::USAGE_ERROR,
            CliError::Internal { .. } => exit_codes::ERROR,
        }
    }

    /// Create a validation error with help text
    pub fn validation_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Create a usage error with help text
    pub fn usage_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    fn config(message: impl Into<String>, help: Option<&str>) -> Self {
        Self::Config {
            message: message.into(),
            help: help.map(str::to_string),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::Parse { .. } => {
                Self::config(message, Some("Configuration files must be valid YAML or JSON"))
            }
            CoreError::Schema { .. } => Self::config(
                message,
                Some("Expected a list of releases, a `releases` list with a `namespace`, or a `deployments` list"),
            ),
            CoreError::Settings { .. } | CoreError::Pattern { .. } => Self::config(message, None),
            CoreError::FileNotFound { .. } | CoreError::Io { .. } => Self::Io { message },
            CoreError::UnresolvedPlaceholders { files } => Self::validation_with_help(
                format!("{} values file(s) still contain placeholders", files.len()),
                "Run `rollout secrets <file>` or edit the files listed above",
            ),
            CoreError::WeakCredential { .. } => Self::validation_with_help(
                message,
                "Passwords need at least 8 characters, one upper-case letter and one digit",
            ),
        }
    }
}

impl From<OrchestrationError> for CliError {
    fn from(err: OrchestrationError) -> Self {
        match err {
            OrchestrationError::Core(core) => core.into(),
            OrchestrationError::Connectivity(message) => Self::Connectivity { message },
            OrchestrationError::ChartNotFound { .. } => {
                Self::config(err.to_string(), Some("Check the chart_path of the release"))
            }
            err if err.is_collaborator_failure() => Self::Collaborator {
                message: err.to_string(),
                help: Some(
                    "Releases deployed before this failure were left in place; fix the cause and re-run"
                        .to_string(),
                ),
            },
            err => Self::Internal {
                message: err.to_string(),
            },
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Internal {
            message: err.to_string(),
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_core_error_exit_codes() {
        let schema = CoreError::Schema {
            path: PathBuf::from("deploy.yaml"),
            message: "no releases".to_string(),
        };
        assert_eq!(CliError::from(schema).exit_code(), exit_codes::CONFIG_ERROR);

        let weak = CoreError::WeakCredential {
            key: "db.password".to_string(),
        };
        assert_eq!(CliError::from(weak).exit_code(), exit_codes::VALIDATION_ERROR);

        let missing = CoreError::FileNotFound {
            path: PathBuf::from("missing.yaml"),
        };
        assert_eq!(CliError::from(missing).exit_code(), exit_codes::IO_ERROR);
    }

    #[test]
    fn test_orchestration_error_exit_codes() {
        let failed = OrchestrationError::CommandFailed {
            command: "helm install web ./web".to_string(),
            status: "exit status: 1".to_string(),
            stderr: "boom".to_string(),
        };
        assert_eq!(CliError::from(failed).exit_code(), exit_codes::ERROR);

        let unreachable = OrchestrationError::Connectivity("refused".to_string());
        assert_eq!(
            CliError::from(unreachable).exit_code(),
            exit_codes::CONNECTIVITY_ERROR
        );

        let wrapped = OrchestrationError::Core(CoreError::Settings {
            message: "bad".to_string(),
        });
        assert_eq!(CliError::from(wrapped).exit_code(), exit_codes::CONFIG_ERROR);
    }
}
