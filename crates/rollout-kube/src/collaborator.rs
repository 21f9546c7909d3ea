//! Interfaces to the external tools rollout drives
//!
//! The package manager and the cluster control tool are black boxes: the
//! sequencer only needs the handful of primitives below. Implementations must
//! be Send + Sync so they can be held across await points.

use async_trait::async_trait;
use rollout_core::Release;

use crate::error::Result;

/// Package manager primitives (helm)
#[async_trait]
pub trait PackageManager: Send + Sync {
    /// Names of releases in `namespace` matching `name_filter`
    async fn list(&self, namespace: &str, name_filter: &str) -> Result<Vec<String>>;

    /// Install a release that does not exist yet
    async fn install(&self, release: &Release) -> Result<()>;

    /// Upgrade an existing release
    async fn upgrade(&self, release: &Release) -> Result<()>;
}

/// Cluster control primitives (kubectl or the API server)
#[async_trait]
pub trait ClusterControl: Send + Sync {
    /// Whether the namespace exists
    async fn namespace_exists(&self, name: &str) -> Result<bool>;

    /// Create the namespace
    async fn create_namespace(&self, name: &str) -> Result<()>;

    /// Name of the active context; doubles as a connectivity check
    async fn current_context(&self) -> Result<String>;
}

#[async_trait]
impl<T: PackageManager + ?Sized> PackageManager for Box<T> {
    async fn list(&self, namespace: &str, name_filter: &str) -> Result<Vec<String>> {
        (**self).list(namespace, name_filter).await
    }

    async fn install(&self, release: &Release) -> Result<()> {
        (**self).install(release).await
    }

    async fn upgrade(&self, release: &Release) -> Result<()> {
        (**self).upgrade(release).await
    }
}

#[async_trait]
impl<T: ClusterControl + ?Sized> ClusterControl for Box<T> {
    async fn namespace_exists(&self, name: &str) -> Result<bool> {
        (**self).namespace_exists(name).await
    }

    async fn create_namespace(&self, name: &str) -> Result<()> {
        (**self).create_namespace(name).await
    }

    async fn current_context(&self) -> Result<String> {
        (**self).current_context().await
    }
}
