//! CLI commands

pub mod check;
pub mod deploy;
pub mod list;
pub mod rewrite;
pub mod secrets;

use rollout_core::Settings;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Settings given on the command line or through the environment
#[derive(Debug, Default)]
pub struct Overrides {
    pub components_dir: Option<PathBuf>,
    pub kubeconfig: Option<PathBuf>,
}

/// Load settings and apply command-line overrides on top
pub fn load_settings(path: Option<&Path>, overrides: Overrides) -> Result<Settings> {
    let mut settings = Settings::load(path)?;
    if let Some(dir) = overrides.components_dir {
        settings.components_dir = dir;
    }
    if let Some(kubeconfig) = overrides.kubeconfig {
        settings.kubeconfig = Some(kubeconfig);
    }
    tracing::debug!(
        "Components directory: {}",
        settings.components_dir.display()
    );
    Ok(settings)
}
