//! Pre-flight check for unresolved `{{ key }}` placeholders
//!
//! Every values file under the components root is scanned before anything is
//! deployed. Any remaining token fails the whole run, and the report lists
//! every offending file with all of its keys so one run gives the full list
//! of things to fix.

use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{CoreError, Result};
use crate::release::NameFilter;
use crate::tokens;

/// A values file that still contains placeholders
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedFile {
    pub path: PathBuf,
    pub keys: Vec<String>,
}

/// Find values files below `root`
///
/// When a filter is given only paths containing one of the release names are
/// kept. Results are sorted so reports are stable between runs.
pub fn find_values_files(
    root: &Path,
    file_name: &str,
    filter: Option<&NameFilter>,
) -> Result<Vec<PathBuf>> {
    if !root.exists() {
        tracing::warn!("Components directory {} does not exist", root.display());
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            CoreError::io(path, e.into())
        })?;
        if !entry.file_type().is_file() || entry.file_name() != file_name {
            continue;
        }
        let path = entry.into_path();
        if let Some(filter) = filter {
            let display = path.to_string_lossy();
            if !filter.names().any(|name| display.contains(name)) {
                continue;
            }
        }
        files.push(path);
    }
    files.sort();
    Ok(files)
}

/// Scan files and report every one that still has placeholders
pub fn validate<P: AsRef<Path>>(files: &[P]) -> Result<Vec<UnresolvedFile>> {
    let mut unresolved = Vec::new();
    for file in files {
        let path = file.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::io(path, e))?;
        let keys = tokens::keys(&content);
        if !keys.is_empty() {
            tracing::debug!("{} has {} unresolved key(s)", path.display(), keys.len());
            unresolved.push(UnresolvedFile {
                path: path.to_path_buf(),
                keys,
            });
        }
    }
    Ok(unresolved)
}

/// Fail with the complete report if any file has placeholders left
pub fn ensure_resolved<P: AsRef<Path>>(files: &[P]) -> Result<()> {
    let unresolved = validate(files)?;
    if unresolved.is_empty() {
        tracing::info!("No unresolved placeholders in {} values file(s)", files.len());
        Ok(())
    } else {
        Err(CoreError::UnresolvedPlaceholders { files: unresolved })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn components() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        for (component, content) in [
            ("component-databases", "password: {{ db.password }}\nhost: {{ db.host }}\n"),
            ("component-web", "replicas: 2\n"),
            ("module-cache", "size: {{cache.size}}\n"),
        ] {
            fs::create_dir_all(root.join(component)).unwrap();
            fs::write(root.join(component).join("values.yaml"), content).unwrap();
        }
        fs::write(root.join("component-web").join("other.yaml"), "x: {{ y }}\n").unwrap();
        dir
    }

    #[test]
    fn test_find_values_files_by_name() {
        let dir = components();
        let files = find_values_files(dir.path(), "values.yaml", None).unwrap();
        assert_eq!(files.len(), 3);
        assert!(files.iter().all(|f| f.ends_with("values.yaml")));
    }

    #[test]
    fn test_find_values_files_with_filter() {
        let dir = components();
        let filter = NameFilter::from_names(["module-cache"]).unwrap();
        let files = find_values_files(dir.path(), "values.yaml", Some(&filter)).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].to_string_lossy().contains("module-cache"));
    }

    #[test]
    fn test_find_values_files_missing_root() {
        let files = find_values_files(Path::new("/no/such/components"), "values.yaml", None)
            .unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_validate_reports_every_key_in_every_file() {
        let dir = components();
        let files = find_values_files(dir.path(), "values.yaml", None).unwrap();
        let unresolved = validate(&files).unwrap();

        assert_eq!(unresolved.len(), 2);
        let total: usize = unresolved.iter().map(|u| u.keys.len()).sum();
        assert_eq!(total, 3);

        let db = unresolved
            .iter()
            .find(|u| u.path.to_string_lossy().contains("component-databases"))
            .unwrap();
        assert_eq!(db.keys, vec!["db.password", "db.host"]);
    }

    #[test]
    fn test_single_unresolved_host() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("values.yaml");
        fs::write(&file, "database:\n  host: {{ db.host }}\n").unwrap();

        let unresolved = validate(&[&file]).unwrap();
        assert_eq!(
            unresolved,
            vec![UnresolvedFile {
                path: file.clone(),
                keys: vec!["db.host".to_string()],
            }]
        );
    }

    #[test]
    fn test_ensure_resolved() {
        let dir = components();
        let clean = dir.path().join("component-web").join("values.yaml");
        assert!(ensure_resolved(&[&clean]).is_ok());

        let files = find_values_files(dir.path(), "values.yaml", None).unwrap();
        match ensure_resolved(&files) {
            Err(CoreError::UnresolvedPlaceholders { files }) => assert_eq!(files.len(), 2),
            other => panic!("expected unresolved placeholders, got {:?}", other),
        }
    }
}
