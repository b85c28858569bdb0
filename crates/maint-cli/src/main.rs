mod cmd;
mod output;
mod plan;

use anyhow::Context;
use clap::{Parser, Subcommand};
use maint_core::MaintenanceConfig;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "maintctl",
    about = "Run cluster maintenance actions through the maintenance worker scheduler",
    version,
    propagate_version = true
)]
struct Cli {
    /// Maintenance config file (YAML); defaults apply when omitted
    #[arg(long, global = true, env = "MAINTCTL_CONFIG")]
    config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Log scheduler activity at info level
    #[arg(long, global = true, short = 'v')]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every action in a plan file on a worker pool
    Run {
        /// Plan file (YAML) listing actions to submit
        #[arg(long)]
        plan: PathBuf,

        /// Worker threads (default: worker_threads from config)
        #[arg(long)]
        workers: Option<usize>,

        /// Give up after this many seconds
        #[arg(long, default_value_t = 60)]
        timeout_secs: u64,
    },

    /// Execute a single action in direct mode on the calling thread
    Exec {
        /// Action type (the `type` description key)
        #[arg(long = "type")]
        action_type: String,

        /// Extra description entries as key=value
        #[arg(long = "set", value_parser = cmd::exec::parse_key_value)]
        set: Vec<(String, String)>,

        /// Action properties as a JSON document
        #[arg(long)]
        properties: Option<String>,
    },

    /// Show the effective maintenance config and any warnings
    Config,
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<MaintenanceConfig> {
    match path {
        Some(path) => MaintenanceConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => Ok(MaintenanceConfig::default()),
    }
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = load_config(cli.config.as_ref()).and_then(|config| match cli.command {
        Commands::Run {
            plan,
            workers,
            timeout_secs,
        } => cmd::run::run(config, &plan, workers, timeout_secs, cli.json),
        Commands::Exec {
            action_type,
            set,
            properties,
        } => cmd::exec::run(config, &action_type, set, properties.as_deref(), cli.json),
        Commands::Config => cmd::config::run(&config, cli.json),
    });

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
