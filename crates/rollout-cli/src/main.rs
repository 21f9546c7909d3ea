//! Rollout CLI - Configuration-driven Helm release orchestrator

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod display;
mod error;
mod exit_codes;

use error::Result;

#[derive(Parser)]
#[command(name = "rollout")]
#[command(author = "Rollout Contributors")]
#[command(version)]
#[command(about = "Deploy Helm releases in order from configuration files", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file (default: <config dir>/rollout/settings.yaml)
    #[arg(long, global = true, env = "ROLLOUT_SETTINGS")]
    settings: Option<PathBuf>,

    /// Root directory holding the component values files
    #[arg(long, global = true, env = "ROLLOUT_COMPONENTS_DIR")]
    components_dir: Option<PathBuf>,

    /// Kubeconfig passed to helm and kubectl
    #[arg(long, global = true, env = "KUBECONFIG")]
    kubeconfig: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Deploy the releases declared in one or more configuration files
    Deploy {
        /// Configuration files, optionally followed by a release name
        #[arg(required = true, value_name = "CONFIG")]
        configs: Vec<String>,

        /// Only deploy these releases (repeatable)
        #[arg(short, long = "release", value_name = "NAME")]
        releases: Vec<String>,

        /// Do not check cluster connectivity before deploying
        #[arg(long)]
        skip_preflight: bool,

        /// Do not wait after dependency releases
        #[arg(long)]
        no_wait: bool,
    },

    /// Inject secret values into the component values files
    Secrets {
        /// YAML or JSON file mapping placeholder keys to values
        file: PathBuf,
    },

    /// Report values files that still contain placeholders
    Check {
        /// Only check values files belonging to these releases
        #[arg(short, long = "release", value_name = "NAME")]
        releases: Vec<String>,

        /// Output the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the releases each configuration file would deploy
    List {
        /// Configuration files
        #[arg(required = true)]
        configs: Vec<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Apply literal text replacements described in a changes file
    Rewrite {
        /// Changes file
        file: PathBuf,
    },
}

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let overrides = commands::Overrides {
        components_dir: cli.components_dir,
        kubeconfig: cli.kubeconfig,
    };
    let settings = commands::load_settings(cli.settings.as_deref(), overrides)?;

    match cli.command {
        Commands::Deploy {
            configs,
            releases,
            skip_preflight,
            no_wait,
        } => {
            commands::deploy::run(
                &settings,
                commands::deploy::DeployArgs {
                    configs,
                    releases,
                    skip_preflight,
                    no_wait,
                },
            )
            .await
        }

        Commands::Secrets { file } => commands::secrets::run(&settings, &file),

        Commands::Check { releases, json } => commands::check::run(&settings, releases, json),

        Commands::List { configs, json } => commands::list::run(&configs, json),

        Commands::Rewrite { file } => commands::rewrite::run(&file),
    }
}

#[tokio::main]
async fn main() {
    // Setup miette for nice error display
    miette::set_panic_hook();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = if err.use_stderr() {
                exit_codes::USAGE_ERROR
            } else {
                exit_codes::SUCCESS
            };
            let _ = err.print();
            std::process::exit(code);
        }
    };

    init_tracing(cli.verbose, cli.quiet);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}
