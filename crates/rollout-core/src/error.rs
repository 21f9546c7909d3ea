//! Core error types

use std::path::PathBuf;
use thiserror::Error;

use crate::placeholder::UnresolvedFile;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Unsupported layout in {path}: {message}")]
    Schema { path: PathBuf, message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unresolved placeholders in {} file(s)", .files.len())]
    UnresolvedPlaceholders { files: Vec<UnresolvedFile> },

    #[error("The value for '{key}' does not meet the password complexity requirements")]
    WeakCredential { key: String },

    #[error("Invalid settings: {message}")]
    Settings { message: String },

    #[error("Invalid glob pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },
}

impl CoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound { path }
        } else {
            Self::Io { path, source }
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, source: serde_yaml::Error) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
