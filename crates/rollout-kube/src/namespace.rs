//! Idempotent namespace creation

use std::collections::HashSet;

use crate::collaborator::ClusterControl;
use crate::error::Result;

/// Makes sure target namespaces exist before releases are installed
pub struct NamespaceManager<C> {
    cluster: C,
    ensured: HashSet<String>,
}

impl<C: ClusterControl> NamespaceManager<C> {
    pub fn new(cluster: C) -> Self {
        Self {
            cluster,
            ensured: HashSet::new(),
        }
    }

    pub fn cluster(&self) -> &C {
        &self.cluster
    }

    /// Create the namespace if it is missing
    ///
    /// Namespaces already ensured by this manager are not queried again.
    pub async fn ensure_namespace(&mut self, name: &str) -> Result<()> {
        if self.ensured.contains(name) {
            tracing::debug!("Namespace '{}' already ensured", name);
            return Ok(());
        }

        if self.cluster.namespace_exists(name).await? {
            tracing::info!("Namespace '{}' already exists", name);
        } else {
            tracing::info!("Namespace '{}' does not exist, creating it", name);
            self.cluster.create_namespace(name).await?;
            tracing::info!("Namespace '{}' created", name);
        }

        self.ensured.insert(name.to_string());
        Ok(())
    }
}
