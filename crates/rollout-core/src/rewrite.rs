//! Literal text replacement across matching files
//!
//! Driven by a changes file:
//!
//! ```yaml
//! scan_directory: ./Components
//! files:
//!   - file_pattern: values.yaml
//!     replacements:
//!       - old_text: registry.old.example.com
//!         new_text: registry.example.com
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CoreError, Result};

/// A changes file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeSet {
    /// Directory searched recursively
    #[serde(default = "default_scan_directory")]
    pub scan_directory: PathBuf,

    /// File patterns and the replacements applied to them
    #[serde(default)]
    pub files: Vec<FileChanges>,
}

fn default_scan_directory() -> PathBuf {
    PathBuf::from(".")
}

/// Replacements for files matching one pattern
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileChanges {
    #[serde(default = "default_file_pattern")]
    pub file_pattern: String,

    #[serde(default)]
    pub replacements: Vec<Replacement>,
}

fn default_file_pattern() -> String {
    "values.yaml".to_string()
}

/// One literal replacement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Replacement {
    pub old_text: String,
    pub new_text: String,
}

/// Replacements made in one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RewrittenFile {
    pub path: PathBuf,
    pub replacements: usize,
}

impl ChangeSet {
    /// Load a changes file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::io(path, e))?;
        serde_yaml::from_str(&content).map_err(|e| CoreError::parse(path, e))
    }

    /// Apply every replacement and return the files that changed
    pub fn apply(&self) -> Result<Vec<RewrittenFile>> {
        let mut rewritten = Vec::new();
        for group in &self.files {
            for path in self.matching_files(&group.file_pattern)? {
                let replacements = rewrite_file(&path, &group.replacements)?;
                if replacements > 0 {
                    rewritten.push(RewrittenFile { path, replacements });
                }
            }
        }
        Ok(rewritten)
    }

    fn matching_files(&self, file_pattern: &str) -> Result<Vec<PathBuf>> {
        let pattern = self
            .scan_directory
            .join("**")
            .join(file_pattern)
            .to_string_lossy()
            .into_owned();
        let paths = glob::glob(&pattern).map_err(|e| CoreError::Pattern {
            pattern: pattern.clone(),
            message: e.to_string(),
        })?;

        let mut files = Vec::new();
        for entry in paths {
            match entry {
                Ok(path) if path.is_file() => files.push(path),
                Ok(_) => {}
                Err(e) => tracing::warn!("Skipping unreadable path: {}", e),
            }
        }
        Ok(files)
    }
}

/// Apply replacements to one file, writing it only when something changed
fn rewrite_file(path: &Path, replacements: &[Replacement]) -> Result<usize> {
    let mut content = std::fs::read_to_string(path).map_err(|e| CoreError::io(path, e))?;

    let mut total = 0;
    for replacement in replacements {
        if replacement.old_text.is_empty() {
            continue;
        }
        let count = content.matches(replacement.old_text.as_str()).count();
        if count > 0 {
            content = content.replace(&replacement.old_text, &replacement.new_text);
            total += count;
        }
    }

    if total > 0 {
        std::fs::write(path, &content).map_err(|e| CoreError::io(path, e))?;
        tracing::info!("Applied {} change(s) to {}", total, path.display());
    }
    Ok(total)
}
