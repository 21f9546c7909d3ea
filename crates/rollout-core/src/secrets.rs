//! Secret injection into values files
//!
//! A secrets file maps dotted keys to values:
//!
//! ```yaml
//! db.password: Secret123
//! db.port: 5432
//! cache.nodes: [a, b]
//! ```
//!
//! Each `{{ key }}` token for a mapped key is replaced with the value's text.
//! Keys ending in `.password` must satisfy the password policy before any
//! substitution happens.

use indexmap::IndexMap;
use serde::Serialize;
use serde_yaml::Value;
use std::path::{Path, PathBuf};

use crate::error::{CoreError, Result};
use crate::placeholder::find_values_files;
use crate::tokens;

/// Minimum length of a credential value
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Dotted key to replacement value, in file order
#[derive(Debug, Clone, Default)]
pub struct PlaceholderMap(IndexMap<String, Value>);

impl PlaceholderMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a secrets file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::io(path, e))?;
        Self::from_yaml(path, &content)
    }

    /// Parse secrets text; `source` is only used for reporting
    pub fn from_yaml(source: &Path, content: &str) -> Result<Self> {
        let doc: Value =
            serde_yaml::from_str(content).map_err(|e| CoreError::parse(source, e))?;
        match doc {
            Value::Mapping(map) => {
                let mut entries = IndexMap::with_capacity(map.len());
                for (key, value) in map {
                    let key = match key {
                        Value::String(s) => s,
                        Value::Number(n) => n.to_string(),
                        other => {
                            return Err(CoreError::Schema {
                                path: source.to_path_buf(),
                                message: format!("unsupported key {:?}", other),
                            });
                        }
                    };
                    entries.insert(key, value);
                }
                Ok(Self(entries))
            }
            Value::Null => Ok(Self::new()),
            _ => Err(CoreError::Schema {
                path: source.to_path_buf(),
                message: "secrets file must be a mapping of keys to values".to_string(),
            }),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Whether a key names a credential (last dotted segment is `password`)
pub fn is_credential_key(key: &str) -> bool {
    key.rsplit('.').next() == Some("password")
}

/// Password policy: at least 8 characters, one upper-case letter and one digit
pub fn is_valid_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LENGTH
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
}

/// Single-line text for a replacement value
///
/// Strings are used as-is, other scalars use their plain form and sequences
/// or mappings are written as compact flow text, which is valid YAML.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Tagged(tagged) => render_value(&tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => serde_json::to_string(value)
            .unwrap_or_else(|_| {
                serde_yaml::to_string(value)
                    .unwrap_or_default()
                    .trim()
                    .replace('\n', " ")
            }),
    }
}

/// Result of injecting secrets into one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Injection {
    /// New document text
    pub content: String,

    /// Whether anything was replaced
    pub changed: bool,

    /// Number of tokens replaced per key
    pub substitutions: IndexMap<String, usize>,
}

impl Injection {
    pub fn total(&self) -> usize {
        self.substitutions.values().sum()
    }
}

/// Replace tokens for every mapped key found in `content`
///
/// Credential values are checked first, so a weak password leaves nothing
/// half-substituted.
pub fn inject(content: &str, map: &PlaceholderMap) -> Result<Injection> {
    let present: Vec<(&str, String)> = map
        .iter()
        .filter(|(key, _)| tokens::contains(content, key))
        .map(|(key, value)| (key, render_value(value)))
        .collect();

    for (key, text) in &present {
        if is_credential_key(key) && !is_valid_password(text) {
            return Err(CoreError::WeakCredential {
                key: (*key).to_string(),
            });
        }
    }

    let mut substitutions: IndexMap<String, usize> = IndexMap::new();
    let output = tokens::replace_with(content, |key| {
        let (_, text) = present.iter().find(|(k, _)| *k == key)?;
        *substitutions.entry(key.to_string()).or_default() += 1;
        Some(text.clone())
    });

    Ok(Injection {
        changed: !substitutions.is_empty(),
        content: output,
        substitutions,
    })
}

/// Outcome for one values file in a tree pass
#[derive(Debug, Clone, Serialize)]
pub struct FileInjection {
    pub path: PathBuf,
    pub substitutions: IndexMap<String, usize>,
}

impl FileInjection {
    pub fn changed(&self) -> bool {
        !self.substitutions.is_empty()
    }
}

/// Outcome of injecting secrets into every values file under a root
#[derive(Debug, Clone, Default, Serialize)]
pub struct InjectionReport {
    pub files: Vec<FileInjection>,
}

impl InjectionReport {
    pub fn changed_files(&self) -> impl Iterator<Item = &FileInjection> {
        self.files.iter().filter(|f| f.changed())
    }

    pub fn any_changes(&self) -> bool {
        self.files.iter().any(FileInjection::changed)
    }
}

/// Inject secrets into every values file named `file_name` below `root`
///
/// All files are processed in memory first; nothing is written unless every
/// file passes the password policy. Only files that changed are rewritten.
pub fn inject_tree(root: &Path, file_name: &str, map: &PlaceholderMap) -> Result<InjectionReport> {
    let files = find_values_files(root, file_name, None)?;

    let mut pending = Vec::with_capacity(files.len());
    for path in files {
        tracing::debug!("Processing {}", path.display());
        let content = std::fs::read_to_string(&path).map_err(|e| CoreError::io(&path, e))?;
        let injection = inject(&content, map)?;
        pending.push((path, injection));
    }

    let mut report = InjectionReport::default();
    for (path, injection) in pending {
        if injection.changed {
            std::fs::write(&path, &injection.content).map_err(|e| CoreError::io(&path, e))?;
            tracing::info!(
                "Updated {} ({} substitution(s))",
                path.display(),
                injection.total()
            );
        } else {
            tracing::debug!("No changes needed for {}", path.display());
        }
        report.files.push(FileInjection {
            path,
            substitutions: injection.substitutions,
        });
    }
    Ok(report)
}
