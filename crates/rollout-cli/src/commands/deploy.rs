//! Deploy command - roll out releases from configuration files

use console::style;
use rollout_core::{
    ClusterBackend, ConfigLoader, CoreError, NameFilter, Settings, ensure_resolved,
    find_values_files,
};
use rollout_kube::{
    ClusterControl, DeploymentSequencer, FixedDelay, HelmCli, KubeApiCluster, KubectlCli, NoWait,
    WaitStrategy,
};
use std::path::{Path, PathBuf};

use crate::display;
use crate::error::{CliError, Result};

/// Arguments of the deploy command
#[derive(Debug)]
pub struct DeployArgs {
    pub configs: Vec<String>,
    pub releases: Vec<String>,
    pub skip_preflight: bool,
    pub no_wait: bool,
}

/// Split a trailing release name off the configuration arguments
///
/// The last argument names a release when it is not an existing file and
/// does not carry a configuration extension.
pub fn split_release_argument(mut args: Vec<String>) -> (Vec<PathBuf>, Option<String>) {
    let trailing = match args.last() {
        Some(last) if args.len() > 1 && !looks_like_config(last) => args.pop(),
        _ => None,
    };
    (args.into_iter().map(PathBuf::from).collect(), trailing)
}

fn looks_like_config(arg: &str) -> bool {
    let path = Path::new(arg);
    path.is_file()
        || matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml" | "yml" | "json")
        )
}

/// Run the deploy command
pub async fn run(settings: &Settings, args: DeployArgs) -> Result<()> {
    let (configs, trailing) = split_release_argument(args.configs);
    if configs.is_empty() {
        return Err(CliError::usage_with_help(
            "No configuration file given",
            "Usage: rollout deploy <config>... [release]",
        ));
    }

    let filter = NameFilter::from_names(args.releases.into_iter().chain(trailing));
    if let Some(filter) = &filter {
        let names: Vec<&str> = filter.names().collect();
        println!(
            "{} Restricting deployment to: {}",
            style("→").blue(),
            names.join(", ")
        );
    }

    let batches = ConfigLoader::load_all(&configs)?;

    // Nothing is deployed while any placeholder is left
    let values_files = find_values_files(
        &settings.components_dir,
        &settings.values_file_name,
        filter.as_ref(),
    )?;
    if let Err(err) = ensure_resolved(&values_files) {
        if let CoreError::UnresolvedPlaceholders { files } = &err {
            display::unresolved_report(files);
        }
        return Err(err.into());
    }
    println!(
        "{} All placeholders resolved in {} values file(s)",
        style("✓").green(),
        values_files.len()
    );

    let cluster: Box<dyn ClusterControl> = match settings.cluster_backend {
        ClusterBackend::Kubectl => Box::new(KubectlCli::from_settings(settings)),
        ClusterBackend::Api => {
            Box::new(KubeApiCluster::connect(settings.kubeconfig.as_deref()).await?)
        }
    };
    let wait: Box<dyn WaitStrategy> = if args.no_wait {
        Box::new(NoWait)
    } else {
        Box::new(FixedDelay::from_settings(&settings.barrier))
    };

    let mut sequencer = DeploymentSequencer::new(HelmCli::from_settings(settings), cluster, wait)
        .check_chart_paths(settings.check_chart_paths);

    if !args.skip_preflight {
        let context = sequencer.preflight().await?;
        println!(
            "{} Connected to context {}",
            style("✓").green(),
            style(context).cyan()
        );
    }

    let mut deployed = 0;
    for batch in &batches {
        println!();
        println!(
            "{} Deploying {} ({} release(s))",
            style("→").blue(),
            style(batch.source().display()).bold(),
            batch.len()
        );
        let summary = sequencer.run(batch, filter.as_ref()).await?;
        display::run_summary(&summary);
        deployed += summary.deployed();
    }

    println!();
    println!(
        "{} Deployed {} release(s) from {} file(s)",
        style("✓").green().bold(),
        deployed,
        batches.len()
    );
    Ok(())
}
