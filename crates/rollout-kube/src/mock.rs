//! In-memory collaborators for testing
//!
//! `MockPackageManager` and `MockCluster` keep their state in memory and
//! record every call, with its (tokio) timestamp, into a shared `CallLog` so
//! tests can assert on ordering across both collaborators without a cluster.

use async_trait::async_trait;
use rollout_core::Release;
use std::collections::HashSet;
use std::sync::{Arc, RwLock};
use tokio::time::Instant;

use crate::collaborator::{ClusterControl, PackageManager};
use crate::error::{OrchestrationError, Result};

/// A recorded collaborator call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    NamespaceExists(String),
    CreateNamespace(String),
    CurrentContext,
    List { namespace: String, name: String },
    Install(Release),
    Upgrade(Release),
}

impl Call {
    /// Release name for list/install/upgrade calls
    pub fn release_name(&self) -> Option<&str> {
        match self {
            Call::List { name, .. } => Some(name.as_str()),
            Call::Install(r) | Call::Upgrade(r) => Some(r.name.as_str()),
            _ => None,
        }
    }
}

/// Ordered, shared record of calls
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<RwLock<Vec<(Instant, Call)>>>);

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, call: Call) {
        self.0.write().unwrap().push((Instant::now(), call));
    }

    /// Calls in order
    pub fn calls(&self) -> Vec<Call> {
        self.0.read().unwrap().iter().map(|(_, c)| c.clone()).collect()
    }

    /// Calls in order with the time each was made
    pub fn timed_calls(&self) -> Vec<(Instant, Call)> {
        self.0.read().unwrap().clone()
    }

    /// Install and upgrade calls only
    pub fn applied(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Install(_) | Call::Upgrade(_)))
            .collect()
    }
}

fn injected_failure(command: String) -> OrchestrationError {
    OrchestrationError::CommandFailed {
        command,
        status: "exit status: 1".to_string(),
        stderr: "injected failure".to_string(),
    }
}

/// In-memory package manager
#[derive(Clone)]
pub struct MockPackageManager {
    /// Installed releases as (namespace, name)
    releases: Arc<RwLock<HashSet<(String, String)>>>,
    /// Release names whose install/upgrade fails
    failing: Arc<RwLock<HashSet<String>>>,
    list_fails: bool,
    log: CallLog,
}

impl MockPackageManager {
    pub fn new(log: CallLog) -> Self {
        Self {
            releases: Arc::new(RwLock::new(HashSet::new())),
            failing: Arc::new(RwLock::new(HashSet::new())),
            list_fails: false,
            log,
        }
    }

    /// Pre-populate an installed release
    pub fn with_release(self, namespace: &str, name: &str) -> Self {
        self.releases
            .write()
            .unwrap()
            .insert((namespace.to_string(), name.to_string()));
        self
    }

    /// Make install/upgrade of `name` fail
    pub fn fail_apply(self, name: &str) -> Self {
        self.failing.write().unwrap().insert(name.to_string());
        self
    }

    /// Make every list call fail
    pub fn fail_list(mut self) -> Self {
        self.list_fails = true;
        self
    }

    pub fn is_installed(&self, namespace: &str, name: &str) -> bool {
        self.releases
            .read()
            .unwrap()
            .contains(&(namespace.to_string(), name.to_string()))
    }

    fn apply(&self, verb: &str, release: &Release) -> Result<()> {
        if self.failing.read().unwrap().contains(&release.name) {
            return Err(injected_failure(format!("helm {} {}", verb, release.name)));
        }
        self.releases
            .write()
            .unwrap()
            .insert((release.namespace.clone(), release.name.clone()));
        Ok(())
    }
}

#[async_trait]
impl PackageManager for MockPackageManager {
    async fn list(&self, namespace: &str, name_filter: &str) -> Result<Vec<String>> {
        self.log.record(Call::List {
            namespace: namespace.to_string(),
            name: name_filter.to_string(),
        });
        if self.list_fails {
            return Err(injected_failure(format!("helm list -n {}", namespace)));
        }
        Ok(self
            .releases
            .read()
            .unwrap()
            .iter()
            .filter(|(ns, name)| ns == namespace && name.contains(name_filter))
            .map(|(_, name)| name.clone())
            .collect())
    }

    async fn install(&self, release: &Release) -> Result<()> {
        self.log.record(Call::Install(release.clone()));
        self.apply("install", release)
    }

    async fn upgrade(&self, release: &Release) -> Result<()> {
        self.log.record(Call::Upgrade(release.clone()));
        self.apply("upgrade", release)
    }
}

/// In-memory cluster
#[derive(Clone)]
pub struct MockCluster {
    namespaces: Arc<RwLock<HashSet<String>>>,
    /// Namespaces whose creation fails
    failing: Arc<RwLock<HashSet<String>>>,
    context: Option<String>,
    log: CallLog,
}

impl MockCluster {
    pub fn new(log: CallLog) -> Self {
        Self {
            namespaces: Arc::new(RwLock::new(HashSet::new())),
            failing: Arc::new(RwLock::new(HashSet::new())),
            context: Some("mock-context".to_string()),
            log,
        }
    }

    /// Pre-populate existing namespaces
    pub fn with_namespaces<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.namespaces
            .write()
            .unwrap()
            .extend(names.into_iter().map(Into::into));
        self
    }

    /// Make creation of `name` fail
    pub fn fail_create(self, name: &str) -> Self {
        self.failing.write().unwrap().insert(name.to_string());
        self
    }

    /// Simulate an unreachable cluster
    pub fn unreachable(mut self) -> Self {
        self.context = None;
        self
    }

    pub fn has_namespace(&self, name: &str) -> bool {
        self.namespaces.read().unwrap().contains(name)
    }
}

#[async_trait]
impl ClusterControl for MockCluster {
    async fn namespace_exists(&self, name: &str) -> Result<bool> {
        self.log.record(Call::NamespaceExists(name.to_string()));
        Ok(self.has_namespace(name))
    }

    async fn create_namespace(&self, name: &str) -> Result<()> {
        self.log.record(Call::CreateNamespace(name.to_string()));
        if self.failing.read().unwrap().contains(name) {
            return Err(injected_failure(format!("kubectl create namespace {}", name)));
        }
        self.namespaces.write().unwrap().insert(name.to_string());
        Ok(())
    }

    async fn current_context(&self) -> Result<String> {
        self.log.record(Call::CurrentContext);
        self.context
            .clone()
            .ok_or_else(|| OrchestrationError::Connectivity("mock cluster unreachable".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_install_then_list() {
        let log = CallLog::new();
        let helm = MockPackageManager::new(log.clone());
        let release = Release::new("web", "./web", "apps");

        helm.install(&release).await.unwrap();
        assert!(helm.is_installed("apps", "web"));
        assert_eq!(helm.list("apps", "web").await.unwrap(), vec!["web"]);
        assert_eq!(log.applied(), vec![Call::Install(release)]);
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let helm = MockPackageManager::new(CallLog::new()).fail_apply("web");
        let release = Release::new("web", "./web", "apps");
        assert!(helm.install(&release).await.is_err());
        assert!(!helm.is_installed("apps", "web"));
    }

    #[tokio::test]
    async fn test_unreachable_cluster() {
        let cluster = MockCluster::new(CallLog::new()).unreachable();
        assert!(matches!(
            cluster.current_context().await,
            Err(OrchestrationError::Connectivity(_))
        ));
    }
}
