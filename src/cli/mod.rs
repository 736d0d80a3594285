//! # Command Line Interface
//!
//! `plan`, `validate` and `apply --dry-run` over a declaration file.

pub mod output;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use crate::config::{load_declaration, Settings};
use crate::observability::{init_logging, log_settings_info};
use crate::plan::resolve_plan;
use crate::provisioning::{DryRunProvisioner, Provisioner};
use output::{print_output, OutputFormat};

#[derive(Parser, Debug)]
#[command(name = "frontdoor")]
#[command(about = "Resolve frontend network exposure into an ordered resource plan")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (json or yaml); defaults to FRONTDOOR_OUTPUT or json
    #[arg(short, long, global = true)]
    pub output: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve a declaration and print the ordered plan
    Plan {
        /// Declaration file (.yaml, .yml, .toml or .json)
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Resolve a declaration and report whether it is valid
    Validate {
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Walk the plan with the offline provisioner and print the report
    Apply {
        #[arg(short, long)]
        file: PathBuf,

        /// Required: only offline application is supported
        #[arg(long)]
        dry_run: bool,
    },
}

/// Parse arguments and run
pub fn run_cli() -> anyhow::Result<()> {
    // Missing .env is fine; anything else is worth a warning
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Error loading .env file: {}", e);
        }
    }

    let cli = Cli::parse();
    let mut settings = Settings::from_env()?;
    if cli.verbose {
        settings.log_level = "debug".to_string();
    }
    init_logging(&settings)?;
    log_settings_info(&settings);

    run(cli, &settings)
}

/// Execute an already parsed command
pub fn run(cli: Cli, settings: &Settings) -> anyhow::Result<()> {
    let format: OutputFormat =
        cli.output.as_deref().unwrap_or(settings.output_format.as_str()).parse()?;

    match cli.command {
        Commands::Plan { file } => {
            let declaration = load_declaration(&file)?;
            let plan = resolve_plan(&declaration)?;
            print_output(&plan, format)?;
        }
        Commands::Validate { file } => {
            let declaration = load_declaration(&file)?;
            let plan = resolve_plan(&declaration)?;
            info!(path = %file.display(), descriptors = plan.len(), "Declaration is valid");
            println!("{} is valid ({} descriptors)", file.display(), plan.len());
        }
        Commands::Apply { file, dry_run } => {
            if !dry_run {
                anyhow::bail!(
                    "frontdoor only hands plans to external provisioning clients; \
                     pass --dry-run to walk the plan offline"
                );
            }
            let declaration = load_declaration(&file)?;
            let plan = resolve_plan(&declaration)?;
            let report = DryRunProvisioner::new(settings.account_id.clone())
                .apply(&plan)
                .context("dry run failed")?;
            print_output(&report, format)?;
        }
    }

    Ok(())
}
