//! Sequential release rollout
//!
//! Releases are deployed one at a time in batch order:
//!
//! 1. skip releases outside the name filter
//! 2. optionally check that the chart directory exists
//! 3. ensure the namespace exists
//! 4. install if the release is absent, upgrade if present
//! 5. hand the release to the wait strategy before the next one
//!
//! The first failure stops the run. Releases deployed before it stay
//! deployed; re-running after fixing the cause is the recovery path.

use rollout_core::{Batch, NameFilter, Release};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::collaborator::{ClusterControl, PackageManager};
use crate::error::{OrchestrationError, Result};
use crate::namespace::NamespaceManager;
use crate::release_state::ReleaseStateQuery;
use crate::wait::WaitStrategy;

/// What happened to one release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseAction {
    Installed,
    Upgraded,
    Skipped,
}

impl fmt::Display for ReleaseAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Installed => "installed",
            Self::Upgraded => "upgraded",
            Self::Skipped => "skipped",
        };
        write!(f, "{}", s)
    }
}

/// Outcome for one release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseOutcome {
    pub name: String,
    pub namespace: String,
    pub action: ReleaseAction,
}

/// Outcome of one batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub source: PathBuf,
    pub outcomes: Vec<ReleaseOutcome>,
}

impl RunSummary {
    pub fn count(&self, action: ReleaseAction) -> usize {
        self.outcomes.iter().filter(|o| o.action == action).count()
    }

    /// Releases that were installed or upgraded
    pub fn deployed(&self) -> usize {
        self.outcomes.len() - self.count(ReleaseAction::Skipped)
    }
}

/// Deploys batches of releases through the collaborators
pub struct DeploymentSequencer<P, C, W> {
    package_manager: P,
    namespaces: NamespaceManager<C>,
    wait: W,
    check_chart_paths: bool,
}

impl<P, C, W> DeploymentSequencer<P, C, W>
where
    P: PackageManager,
    C: ClusterControl,
    W: WaitStrategy,
{
    pub fn new(package_manager: P, cluster: C, wait: W) -> Self {
        Self {
            package_manager,
            namespaces: NamespaceManager::new(cluster),
            wait,
            check_chart_paths: false,
        }
    }

    /// Fail when a local chart directory is missing
    #[must_use]
    pub fn check_chart_paths(mut self, enabled: bool) -> Self {
        self.check_chart_paths = enabled;
        self
    }

    /// Verify the cluster is reachable and return the active context
    pub async fn preflight(&self) -> Result<String> {
        let context = self
            .namespaces
            .cluster()
            .current_context()
            .await
            .map_err(|e| match e {
                OrchestrationError::Connectivity(_) => e,
                other => OrchestrationError::Connectivity(other.to_string()),
            })?;
        tracing::info!("Connected to Kubernetes context: {}", context);
        Ok(context)
    }

    /// Deploy every batch in order, applying the filter to each one
    pub async fn run_all(
        &mut self,
        batches: &[Batch],
        filter: Option<&NameFilter>,
    ) -> Result<Vec<RunSummary>> {
        let mut summaries = Vec::with_capacity(batches.len());
        for batch in batches {
            summaries.push(self.run(batch, filter).await?);
        }
        Ok(summaries)
    }

    /// Deploy one batch
    pub async fn run(&mut self, batch: &Batch, filter: Option<&NameFilter>) -> Result<RunSummary> {
        tracing::info!(
            "Deploying {} release(s) from {}",
            batch.len(),
            batch.source().display()
        );

        let mut summary = RunSummary {
            source: batch.source().to_path_buf(),
            outcomes: Vec::with_capacity(batch.len()),
        };

        for release in batch {
            let action = match filter {
                Some(filter) if !filter.contains(&release.name) => {
                    tracing::debug!("Skipping release {}: not selected", release.name);
                    ReleaseAction::Skipped
                }
                _ => self.deploy(release).await?,
            };
            summary.outcomes.push(ReleaseOutcome {
                name: release.name.clone(),
                namespace: release.namespace.clone(),
                action,
            });
        }

        Ok(summary)
    }

    async fn deploy(&mut self, release: &Release) -> Result<ReleaseAction> {
        if self.check_chart_paths && is_missing_local_chart(&release.chart_path) {
            return Err(OrchestrationError::ChartNotFound {
                release: release.name.clone(),
                path: release.chart_path.clone(),
            });
        }

        self.namespaces.ensure_namespace(&release.namespace).await?;

        let exists = ReleaseStateQuery::new(&self.package_manager)
            .exists(&release.name, &release.namespace)
            .await?;

        let action = if exists {
            tracing::info!(
                "Upgrading release {} in namespace {}",
                release.name,
                release.namespace
            );
            self.package_manager.upgrade(release).await?;
            ReleaseAction::Upgraded
        } else {
            tracing::info!(
                "Installing release {} in namespace {}",
                release.name,
                release.namespace
            );
            self.package_manager.install(release).await?;
            ReleaseAction::Installed
        };
        tracing::info!("Deployment {} completed successfully", release.name);

        self.wait.after_deploy(release).await?;
        Ok(action)
    }
}

/// Chart references like `repo/chart` or `oci://...` are left to the
/// package manager; only paths that look local are checked
fn is_missing_local_chart(chart_path: &str) -> bool {
    let path = Path::new(chart_path);
    let looks_local = path.is_absolute() || chart_path.starts_with('.');
    looks_local && !path.is_dir()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{Call, CallLog, MockCluster, MockPackageManager};
    use crate::wait::{FixedDelay, NoWait};
    use std::time::Duration;
    use tokio::time::Instant;

    fn batch(releases: &[(&str, &str)]) -> Batch {
        Batch::new(
            "deploy.yaml",
            releases
                .iter()
                .map(|(name, ns)| Release::new(*name, format!("./charts/{}", name), *ns))
                .collect(),
        )
    }

    fn sequencer(
        log: &CallLog,
    ) -> (
        DeploymentSequencer<MockPackageManager, MockCluster, FixedDelay>,
        MockPackageManager,
        MockCluster,
    ) {
        let helm = MockPackageManager::new(log.clone());
        let cluster = MockCluster::new(log.clone());
        let seq = DeploymentSequencer::new(helm.clone(), cluster.clone(), FixedDelay::default());
        (seq, helm, cluster)
    }

    #[tokio::test]
    async fn test_absent_release_is_installed() {
        let log = CallLog::new();
        let (mut seq, helm, cluster) = sequencer(&log);
        let batch = batch(&[("svc-a", "apps")]);

        let summary = seq.run(&batch, None).await.unwrap();

        assert_eq!(summary.count(ReleaseAction::Installed), 1);
        assert_eq!(log.applied(), vec![Call::Install(batch.releases[0].clone())]);
        assert!(helm.is_installed("apps", "svc-a"));
        assert!(cluster.has_namespace("apps"));
    }

    #[tokio::test]
    async fn test_present_release_is_upgraded() {
        let log = CallLog::new();
        let helm = MockPackageManager::new(log.clone()).with_release("apps", "svc-a");
        let cluster = MockCluster::new(log.clone()).with_namespaces(["apps"]);
        let mut seq = DeploymentSequencer::new(helm, cluster, NoWait);
        let batch = batch(&[("svc-a", "apps")]);

        let summary = seq.run(&batch, None).await.unwrap();

        assert_eq!(summary.count(ReleaseAction::Upgraded), 1);
        assert_eq!(log.applied(), vec![Call::Upgrade(batch.releases[0].clone())]);
        assert!(!log.calls().contains(&Call::CreateNamespace("apps".to_string())));
    }

    #[tokio::test]
    async fn test_call_order_per_release() {
        let log = CallLog::new();
        let (mut seq, _, _) = sequencer(&log);
        let batch = Batch::new(
            "deploy.yaml",
            vec![Release::new("svc-a", "./a", "apps").with_values_file("./a/values.yaml")],
        );

        seq.run(&batch, None).await.unwrap();

        assert_eq!(
            log.calls(),
            vec![
                Call::NamespaceExists("apps".to_string()),
                Call::CreateNamespace("apps".to_string()),
                Call::List {
                    namespace: "apps".to_string(),
                    name: "svc-a".to_string()
                },
                Call::Install(batch.releases[0].clone()),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_barrier_after_dependency_class() {
        let log = CallLog::new();
        let (mut seq, _, _) = sequencer(&log);
        let batch = batch(&[("component-databases", "data"), ("component-api", "apps")]);

        let start = Instant::now();
        seq.run(&batch, None).await.unwrap();
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(120));
        assert!(elapsed < Duration::from_secs(121));

        let timed = log.timed_calls();
        let db_applied = timed
            .iter()
            .find(|(_, c)| matches!(c, Call::Install(r) if r.name == "component-databases"))
            .map(|(t, _)| *t)
            .unwrap();
        let next_query = timed
            .iter()
            .find(|(_, c)| *c == Call::NamespaceExists("apps".to_string()))
            .map(|(t, _)| *t)
            .unwrap();
        assert!(next_query - db_applied >= Duration::from_secs(120));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_barrier_without_dependency_class() {
        let log = CallLog::new();
        let (mut seq, _, _) = sequencer(&log);
        let batch = batch(&[("svc-a", "apps"), ("svc-b", "apps")]);

        let start = Instant::now();
        seq.run(&batch, None).await.unwrap();
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_filter_deploys_only_selected() {
        let log = CallLog::new();
        let (mut seq, _, _) = sequencer(&log);
        let batch = batch(&[("svc-a", "apps"), ("svc-b", "apps"), ("databases-1", "data")]);
        let filter = NameFilter::from_names(["svc-a"]).unwrap();

        let start = Instant::now();
        let summary = seq.run(&batch, Some(&filter)).await.unwrap();

        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(summary.deployed(), 1);
        assert_eq!(summary.count(ReleaseAction::Skipped), 2);
        assert_eq!(log.applied(), vec![Call::Install(batch.releases[0].clone())]);
        assert!(
            log.calls()
                .iter()
                .all(|c| c.release_name().is_none_or(|n| n == "svc-a"))
        );
    }

    #[tokio::test]
    async fn test_failure_halts_before_next_release() {
        let log = CallLog::new();
        let helm = MockPackageManager::new(log.clone()).fail_apply("svc-b");
        let cluster = MockCluster::new(log.clone());
        let mut seq = DeploymentSequencer::new(helm.clone(), cluster, NoWait);
        let batch = batch(&[("svc-a", "ns-a"), ("svc-b", "ns-b"), ("svc-c", "ns-c")]);

        let err = seq.run(&batch, None).await.unwrap_err();
        assert!(err.is_collaborator_failure());

        let calls = log.calls();
        assert!(!calls.contains(&Call::NamespaceExists("ns-c".to_string())));
        assert!(calls.iter().all(|c| c.release_name() != Some("svc-c")));
        assert!(helm.is_installed("ns-a", "svc-a"));
    }

    #[tokio::test]
    async fn test_namespace_failure_stops_run() {
        let log = CallLog::new();
        let helm = MockPackageManager::new(log.clone());
        let cluster = MockCluster::new(log.clone()).fail_create("locked");
        let mut seq = DeploymentSequencer::new(helm, cluster, NoWait);
        let batch = batch(&[("svc-a", "locked"), ("svc-b", "apps")]);

        assert!(seq.run(&batch, None).await.is_err());
        assert!(log.applied().is_empty());
    }

    #[tokio::test]
    async fn test_list_failure_is_fatal() {
        let log = CallLog::new();
        let helm = MockPackageManager::new(log.clone()).fail_list();
        let cluster = MockCluster::new(log.clone());
        let mut seq = DeploymentSequencer::new(helm, cluster, NoWait);

        assert!(seq.run(&batch(&[("svc-a", "apps")]), None).await.is_err());
        assert!(log.applied().is_empty());
    }

    #[tokio::test]
    async fn test_filter_applies_per_batch() {
        let log = CallLog::new();
        let (mut seq, _, _) = sequencer(&log);
        let first = batch(&[("svc-a", "apps"), ("svc-b", "apps")]);
        let second = batch(&[("svc-a", "apps")]);
        let filter = NameFilter::from_names(["svc-a"]).unwrap();

        let summaries = seq
            .run_all(&[first.clone(), second.clone()], Some(&filter))
            .await
            .unwrap();

        assert_eq!(summaries.len(), 2);
        assert_eq!(
            log.applied(),
            vec![
                Call::Install(first.releases[0].clone()),
                Call::Upgrade(second.releases[0].clone()),
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_chart_directory() {
        let log = CallLog::new();
        let (seq, _, _) = sequencer(&log);
        let mut seq = seq.check_chart_paths(true);

        let dir = tempfile::tempdir().unwrap();
        let chart = dir.path().join("web");
        std::fs::create_dir_all(&chart).unwrap();
        let present = Batch::new(
            "deploy.yaml",
            vec![Release::new("web", chart.to_string_lossy(), "apps")],
        );
        assert!(seq.run(&present, None).await.is_ok());

        let missing = Batch::new(
            "deploy.yaml",
            vec![Release::new("api", "./definitely/missing/chart", "apps")],
        );
        let err = seq.run(&missing, None).await.unwrap_err();
        assert!(matches!(err, OrchestrationError::ChartNotFound { .. }));
    }

    #[tokio::test]
    async fn test_remote_chart_reference_not_checked() {
        let log = CallLog::new();
        let (seq, _, _) = sequencer(&log);
        let mut seq = seq.check_chart_paths(true);
        let batch = Batch::new(
            "deploy.yaml",
            vec![Release::new("cache", "bitnami/redis", "infra")],
        );
        assert!(seq.run(&batch, None).await.is_ok());
    }

    #[tokio::test]
    async fn test_preflight() {
        let log = CallLog::new();
        let (seq, _, _) = sequencer(&log);
        assert_eq!(seq.preflight().await.unwrap(), "mock-context");

        let unreachable = DeploymentSequencer::new(
            MockPackageManager::new(CallLog::new()),
            MockCluster::new(CallLog::new()).unreachable(),
            NoWait,
        );
        assert!(matches!(
            unreachable.preflight().await,
            Err(OrchestrationError::Connectivity(_))
        ));
    }
}
