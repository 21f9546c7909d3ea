//! Deployment configuration loading
//!
//! A configuration file lists the releases to roll out, in order. Several
//! layouts are accepted so that older configuration files keep working:
//!
//! ```yaml
//! # Wrapped layout
//! deployments:
//!   - name: component-databases
//!     chart_path: ./Components/databases
//!     namespace: data
//!     values_file: ./Components/databases/values.yaml
//!
//! # Flat layout (one namespace for the whole file)
//! namespace: apps
//! releases:
//!   - name: component-web
//!     chart: ./Components/web
//! ```
//!
//! A bare top-level list of entries is accepted as well, and legacy files may
//! key entries by release name (`deployments: { name: {...} }` or list items
//! of the form `- name: {...}`). JSON documents load unchanged since they are
//! valid YAML.

use serde_yaml::{Mapping, Value};
use std::collections::HashSet;
use std::path::Path;

use crate::error::{CoreError, Result};
use crate::release::{Batch, Release};

const NAME_KEYS: &[&str] = &["name"];
const CHART_KEYS: &[&str] = &["chart_path", "chart"];
const NAMESPACE_KEYS: &[&str] = &["namespace"];
const VALUES_KEYS: &[&str] = &["values_file", "values"];

/// Loads release batches from configuration files
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load a single configuration file into a batch
    pub fn load(path: impl AsRef<Path>) -> Result<Batch> {
        let path = path.as_ref();
        tracing::debug!("Loading configuration from {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::io(path, e))?;
        Self::parse(path, &content)
    }

    /// Load several files, keeping the order in which they were given
    pub fn load_all<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<Batch>> {
        paths.iter().map(Self::load).collect()
    }

    /// Parse configuration text; `source` is only used for reporting
    pub fn parse(source: &Path, content: &str) -> Result<Batch> {
        let doc: Value =
            serde_yaml::from_str(content).map_err(|e| CoreError::parse(source, e))?;

        let (entries, default_namespace) = match &doc {
            Value::Sequence(items) => (Entries::List(items), None),
            Value::Mapping(root) => Self::entries_from_root(source, root)?,
            Value::Null => {
                return Err(CoreError::Schema {
                    path: source.to_path_buf(),
                    message: "document is empty".to_string(),
                });
            }
            _ => {
                return Err(CoreError::Schema {
                    path: source.to_path_buf(),
                    message: "expected a list of releases or a mapping".to_string(),
                });
            }
        };

        let releases = entries.collect_releases(source, default_namespace);
        tracing::info!(
            "Loaded {} release(s) from {}",
            releases.len(),
            source.display()
        );
        Ok(Batch::new(source, releases))
    }

    fn entries_from_root<'a>(
        source: &Path,
        root: &'a Mapping,
    ) -> Result<(Entries<'a>, Option<&'a str>)> {
        if let Some(deployments) = root.get("deployments") {
            let entries = match deployments {
                Value::Sequence(items) => Entries::List(items),
                Value::Mapping(map) => Entries::Keyed(map),
                Value::Null => Entries::Empty,
                _ => {
                    return Err(CoreError::Schema {
                        path: source.to_path_buf(),
                        message: "`deployments` must be a list or a mapping".to_string(),
                    });
                }
            };
            return Ok((entries, None));
        }

        if let Some(releases) = root.get("releases") {
            let Value::Sequence(items) = releases else {
                return Err(CoreError::Schema {
                    path: source.to_path_buf(),
                    message: "`releases` must be a list".to_string(),
                });
            };
            let namespace = root.get("namespace").and_then(Value::as_str);
            return Ok((Entries::List(items), namespace));
        }

        Err(CoreError::Schema {
            path: source.to_path_buf(),
            message: "expected a `deployments` or `releases` key".to_string(),
        })
    }
}

/// Raw release entries found in a document
enum Entries<'a> {
    Empty,
    List(&'a [Value]),
    Keyed(&'a Mapping),
}

impl Entries<'_> {
    fn collect_releases(&self, source: &Path, default_namespace: Option<&str>) -> Vec<Release> {
        let candidates: Vec<(usize, Option<String>, &Value)> = match self {
            Entries::Empty => Vec::new(),
            Entries::List(items) => items
                .iter()
                .enumerate()
                .map(|(idx, item)| match legacy_keyed_entry(item) {
                    Some((name, body)) => (idx, Some(name), body),
                    None => (idx, None, item),
                })
                .collect(),
            Entries::Keyed(map) => map
                .iter()
                .enumerate()
                .map(|(idx, (key, body))| (idx, scalar_string(key), body))
                .collect(),
        };

        let mut seen = HashSet::new();
        let mut releases = Vec::with_capacity(candidates.len());
        for (idx, name_hint, entry) in candidates {
            let Some(release) = release_from_entry(entry, name_hint, default_namespace) else {
                tracing::warn!(
                    "Skipping entry #{} in {}: missing name, chart path or namespace",
                    idx + 1,
                    source.display()
                );
                continue;
            };
            if !seen.insert(release.name.clone()) {
                tracing::warn!(
                    "Skipping duplicate release '{}' in {}",
                    release.name,
                    source.display()
                );
                continue;
            }
            releases.push(release);
        }
        releases
    }
}

/// Recognise `{ <name>: { chart_path: ..., ... } }` list items
fn legacy_keyed_entry(item: &Value) -> Option<(String, &Value)> {
    let Value::Mapping(map) = item else {
        return None;
    };
    if map.len() != 1 {
        return None;
    }
    let (key, body) = map.iter().next()?;
    let key = scalar_string(key)?;
    let is_field = NAME_KEYS
        .iter()
        .chain(CHART_KEYS)
        .chain(NAMESPACE_KEYS)
        .chain(VALUES_KEYS)
        .any(|k| *k == key);
    if is_field || !body.is_mapping() {
        return None;
    }
    Some((key, body))
}

fn release_from_entry(
    entry: &Value,
    name_hint: Option<String>,
    default_namespace: Option<&str>,
) -> Option<Release> {
    let Value::Mapping(map) = entry else {
        return None;
    };

    let name = field(map, NAME_KEYS).or(name_hint)?;
    let chart_path = field(map, CHART_KEYS)?;
    let namespace = field(map, NAMESPACE_KEYS).or_else(|| default_namespace.map(str::to_string))?;

    if name.is_empty() || chart_path.is_empty() || namespace.is_empty() {
        return None;
    }

    let mut release = Release::new(name, chart_path, namespace);
    release.values_file = field(map, VALUES_KEYS).filter(|v| !v.is_empty());
    Some(release)
}

fn field(map: &Mapping, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| map.get(*k))
        .and_then(scalar_string)
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn parse(content: &str) -> Result<Batch> {
        ConfigLoader::parse(Path::new("test.yaml"), content)
    }

    #[test]
    fn test_wrapped_layout() {
        let batch = parse(
            r#"
deployments:
  - name: component-databases
    chart_path: ./Components/databases
    namespace: data
    values_file: ./Components/databases/values.yaml
  - name: component-web
    chart_path: ./Components/web
    namespace: apps
"#,
        )
        .unwrap();

        assert_eq!(batch.names(), vec!["component-databases", "component-web"]);
        assert_eq!(
            batch.releases[0].values_file.as_deref(),
            Some("./Components/databases/values.yaml")
        );
        assert_eq!(batch.releases[1].values_file, None);
        assert_eq!(batch.releases[1].namespace, "apps");
    }

    #[test]
    fn test_flat_layout_uses_root_namespace() {
        let batch = parse(
            r#"{
  "namespace": "platform",
  "releases": [
    {"name": "databases-main", "chart": "./charts/db"},
    {"name": "api", "chart": "./charts/api", "namespace": "edge"}
  ]
}"#,
        )
        .unwrap();

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.releases[0].chart_path, "./charts/db");
        assert_eq!(batch.releases[0].namespace, "platform");
        assert_eq!(batch.releases[1].namespace, "edge");
    }

    #[test]
    fn test_top_level_list() {
        let batch = parse(
            r#"
- name: svc-a
  chart_path: ./a
  namespace: ns
- name: svc-b
  chart_path: ./b
  namespace: ns
"#,
        )
        .unwrap();
        assert_eq!(batch.names(), vec!["svc-a", "svc-b"]);
    }

    #[test]
    fn test_legacy_keyed_map() {
        let batch = parse(
            r#"
deployments:
  module-cache:
    chart_path: ./cache
    namespace: infra
  module-queue:
    chart_path: ./queue
    namespace: infra
"#,
        )
        .unwrap();
        assert_eq!(batch.names(), vec!["module-cache", "module-queue"]);
    }

    #[test]
    fn test_legacy_single_key_list_items() {
        let batch = parse(
            r#"
deployments:
  - module-cache:
      chart_path: ./cache
      namespace: infra
  - name: module-queue
    chart_path: ./queue
    namespace: infra
"#,
        )
        .unwrap();
        assert_eq!(batch.names(), vec!["module-cache", "module-queue"]);
    }

    #[test]
    fn test_missing_fields_are_skipped() {
        let batch = parse(
            r#"
deployments:
  - name: no-chart
    namespace: ns
  - chart_path: ./nameless
    namespace: ns
  - name: no-namespace
    chart_path: ./x
  - name: ok
    chart_path: ./ok
    namespace: ns
"#,
        )
        .unwrap();
        assert_eq!(batch.names(), vec!["ok"]);
    }

    #[test]
    fn test_duplicate_names_keep_first() {
        let batch = parse(
            r#"
deployments:
  - {name: a, chart_path: ./first, namespace: ns}
  - {name: a, chart_path: ./second, namespace: ns}
"#,
        )
        .unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.releases[0].chart_path, "./first");
    }

    #[test]
    fn test_empty_deployments_is_empty_batch() {
        let batch = parse("deployments:\n").unwrap();
        assert!(batch.is_empty());
    }

    #[test]
    fn test_parse_error() {
        let err = parse("deployments: [unclosed").unwrap_err();
        assert!(matches!(err, CoreError::Parse { .. }));
    }

    #[test]
    fn test_schema_error() {
        let err = parse("something_else:\n  - name: x\n").unwrap_err();
        assert!(matches!(err, CoreError::Schema { .. }));

        let err = parse("42").unwrap_err();
        assert!(matches!(err, CoreError::Schema { .. }));

        let err = parse("").unwrap_err();
        assert!(matches!(err, CoreError::Schema { .. }));
    }

    #[test]
    fn test_load_all_preserves_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.yaml");
        let second = dir.path().join("second.yaml");
        writeln!(
            std::fs::File::create(&first).unwrap(),
            "deployments:\n  - {{name: z, chart_path: ./z, namespace: ns}}"
        )
        .unwrap();
        writeln!(
            std::fs::File::create(&second).unwrap(),
            "deployments:\n  - {{name: a, chart_path: ./a, namespace: ns}}"
        )
        .unwrap();

        let batches = ConfigLoader::load_all(&[&first, &second]).unwrap();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].source(), first.as_path());
        assert_eq!(batches[0].names(), vec!["z"]);
        assert_eq!(batches[1].names(), vec!["a"]);
    }

    #[test]
    fn test_missing_file() {
        let err = ConfigLoader::load("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, CoreError::FileNotFound { .. }));
    }
}
