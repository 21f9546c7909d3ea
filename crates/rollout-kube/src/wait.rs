//! Post-deploy synchronization
//!
//! After a release is applied the sequencer hands it to a `WaitStrategy`
//! before moving on. The default waits a fixed time after releases whose name
//! contains the dependency class (`databases`), without checking readiness.
//! An active readiness probe can implement the same trait.

use async_trait::async_trait;
use rollout_core::{BarrierSettings, Release};
use std::time::Duration;

use crate::error::Result;

/// Decides what to wait for after a release is deployed
#[async_trait]
pub trait WaitStrategy: Send + Sync {
    async fn after_deploy(&self, release: &Release) -> Result<()>;
}

#[async_trait]
impl<T: WaitStrategy + ?Sized> WaitStrategy for Box<T> {
    async fn after_deploy(&self, release: &Release) -> Result<()> {
        (**self).after_deploy(release).await
    }
}

/// Sleeps for a fixed duration after releases of one dependency class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedDelay {
    dependency_class: String,
    duration: Duration,
}

impl FixedDelay {
    pub fn new(dependency_class: impl Into<String>, duration: Duration) -> Self {
        Self {
            dependency_class: dependency_class.into(),
            duration,
        }
    }

    pub fn from_settings(settings: &BarrierSettings) -> Self {
        Self::new(&settings.dependency_class, settings.duration)
    }

    pub fn applies_to(&self, release: &Release) -> bool {
        release.in_class(&self.dependency_class) && !self.duration.is_zero()
    }
}

impl Default for FixedDelay {
    fn default() -> Self {
        Self::from_settings(&BarrierSettings::default())
    }
}

#[async_trait]
impl WaitStrategy for FixedDelay {
    async fn after_deploy(&self, release: &Release) -> Result<()> {
        if self.applies_to(release) {
            tracing::info!(
                "Waiting {:?} after deploying {}",
                self.duration,
                release.name
            );
            tokio::time::sleep(self.duration).await;
        }
        Ok(())
    }
}

/// Never waits
#[derive(Debug, Clone, Copy, Default)]
pub struct NoWait;

#[async_trait]
impl WaitStrategy for NoWait {
    async fn after_deploy(&self, _release: &Release) -> Result<()> {
        Ok(())
    }
}
