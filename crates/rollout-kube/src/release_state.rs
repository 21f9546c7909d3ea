//! Whether a release is already installed

use crate::collaborator::PackageManager;
use crate::error::Result;

/// Asks the package manager about existing releases
pub struct ReleaseStateQuery<'a, P: ?Sized> {
    package_manager: &'a P,
}

impl<'a, P: PackageManager + ?Sized> ReleaseStateQuery<'a, P> {
    pub fn new(package_manager: &'a P) -> Self {
        Self { package_manager }
    }

    /// `Ok(false)` when absent; collaborator failures are errors
    pub async fn exists(&self, name: &str, namespace: &str) -> Result<bool> {
        tracing::debug!(
            "Checking if release {} exists in namespace {}",
            name,
            namespace
        );
        let names = self.package_manager.list(namespace, name).await?;
        let exists = names.iter().any(|n| n == name);
        tracing::debug!("Release {} exists: {}", name, exists);
        Ok(exists)
    }
}
