//! Rollout Core - Core types for the release orchestrator
//!
//! This crate provides the synchronous, cluster-independent parts of rollout:
//! - `Release` / `Batch`: releases loaded from configuration, in deploy order
//! - `ConfigLoader`: configuration files in their supported layouts
//! - `placeholder`: the unresolved `{{ key }}` pre-flight gate
//! - `secrets`: secret injection with the password policy
//! - `rewrite`: literal text replacement across values files
//! - `Settings`: explicit run settings

pub mod config;
pub mod error;
pub mod placeholder;
pub mod release;
pub mod rewrite;
pub mod secrets;
pub mod settings;
pub mod tokens;

pub use config::ConfigLoader;
pub use error::{CoreError, Result};
pub use placeholder::{UnresolvedFile, ensure_resolved, find_values_files, validate};
pub use release::{Batch, NameFilter, Release};
pub use rewrite::{ChangeSet, RewrittenFile};
pub use secrets::{Injection, InjectionReport, PlaceholderMap, inject, inject_tree};
pub use settings::{BarrierSettings, ClusterBackend, Settings};
