//! Rollout Kube - Cluster integration for rollout
//!
//! This crate provides:
//! - **Collaborators**: `PackageManager` and `ClusterControl` traits with
//!   helm/kubectl CLI adapters and a Kubernetes API adapter
//! - **Namespaces**: idempotent namespace creation
//! - **Release State**: exact-name existence checks
//! - **Sequencing**: fail-fast, one-at-a-time deployment of release batches
//! - **Wait Strategies**: the fixed barrier after dependency-class releases
//! - **Mocks**: in-memory collaborators with a shared call log

pub mod api;
pub mod collaborator;
pub mod error;
pub mod helm;
pub mod kubectl;
pub mod mock;
pub mod namespace;
mod process;
pub mod release_state;
pub mod sequencer;
pub mod wait;

pub use api::KubeApiCluster;
pub use collaborator::{ClusterControl, PackageManager};
pub use error::{OrchestrationError, Result};
pub use helm::HelmCli;
pub use kubectl::KubectlCli;
pub use mock::{Call, CallLog, MockCluster, MockPackageManager};
pub use namespace::NamespaceManager;
pub use release_state::ReleaseStateQuery;
pub use sequencer::{DeploymentSequencer, ReleaseAction, ReleaseOutcome, RunSummary};
pub use wait::{FixedDelay, NoWait, WaitStrategy};
