//! Release descriptors and batches

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// A single deployable unit described by configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    /// Release name, unique within a batch
    pub name: String,

    /// Path to the chart directory handed to the package manager
    pub chart_path: String,

    /// Target namespace
    pub namespace: String,

    /// Optional values file passed with `-f`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values_file: Option<String>,
}

impl Release {
    pub fn new(
        name: impl Into<String>,
        chart_path: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            chart_path: chart_path.into(),
            namespace: namespace.into(),
            values_file: None,
        }
    }

    /// Attach a values file
    #[must_use]
    pub fn with_values_file(mut self, values_file: impl Into<String>) -> Self {
        self.values_file = Some(values_file.into());
        self
    }

    /// Whether the release name falls into the given dependency class
    pub fn in_class(&self, class: &str) -> bool {
        !class.is_empty() && self.name.contains(class)
    }
}

/// Releases loaded from one configuration file, in deployment order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    /// File the releases were read from
    pub source: PathBuf,

    /// Releases in file order
    pub releases: Vec<Release>,
}

impl Batch {
    pub fn new(source: impl Into<PathBuf>, releases: Vec<Release>) -> Self {
        Self {
            source: source.into(),
            releases,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.releases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.releases.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Release> {
        self.releases.iter()
    }

    /// Names of all releases in order
    pub fn names(&self) -> Vec<&str> {
        self.releases.iter().map(|r| r.name.as_str()).collect()
    }
}

impl<'a> IntoIterator for &'a Batch {
    type Item = &'a Release;
    type IntoIter = std::slice::Iter<'a, Release>;

    fn into_iter(self) -> Self::IntoIter {
        self.releases.iter()
    }
}

/// Set of release names a run is restricted to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameFilter(BTreeSet<String>);

impl NameFilter {
    /// Build a filter; returns `None` when no names are given so callers can
    /// treat "no filter" and "empty filter" the same way
    pub fn from_names<I, S>(names: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: BTreeSet<String> = names.into_iter().map(Into::into).collect();
        if set.is_empty() { None } else { Some(Self(set)) }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}
