mod commands;
mod config;
mod logging;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tracing::debug;

use crate::commands::{
    CalcArgs, cmd_calc, cmd_categories, cmd_delete, cmd_history, cmd_interactive, cmd_prefs_clear,
    cmd_prefs_set, cmd_prefs_show, cmd_show, cmd_update,
};
use crate::config::Config;
use bmi_core::models::{UpdateBmiRecord, Unit};
use bmi_core::service::BmiService;

#[derive(Parser)]
#[command(
    name = "bmi",
    version,
    about = "A body mass index calculator",
    long_about = "A body mass index calculator.\n\n\
        Records live in memory for the life of the process and start from a \
        small built-in sample. Run without a command for the interactive calculator."
)]
struct Cli {
    /// Config file (default: config.toml in the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Skip the simulated storage latency
    #[arg(long, global = true)]
    no_delay: bool,
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate BMI once and record it
    Calc {
        /// Unit system: metric or imperial (default: imperial if --feet/--inches given)
        #[arg(short, long)]
        unit: Option<Unit>,
        /// Height in centimeters (metric)
        #[arg(long)]
        height: Option<String>,
        /// Weight in kilograms (metric) or pounds (imperial)
        #[arg(short, long)]
        weight: Option<String>,
        /// Height, feet part (imperial)
        #[arg(long)]
        feet: Option<String>,
        /// Height, inches part (imperial)
        #[arg(long)]
        inches: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List recent calculations, newest first
    History {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one calculation
    Show {
        /// Calculation ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change a calculation's height or weight and recompute its BMI
    Update {
        /// Calculation ID
        id: i64,
        /// New height in centimeters
        #[arg(long)]
        height: Option<f64>,
        /// New weight in kilograms
        #[arg(long)]
        weight: Option<f64>,
        /// New display unit: metric or imperial
        #[arg(long)]
        unit: Option<Unit>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a calculation
    Delete {
        /// Calculation ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the BMI category guide
    Categories {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show or change saved preferences
    Prefs {
        #[command(subcommand)]
        command: PrefsCommands,
    },
    /// Live calculator that recalculates as you type (default)
    Interactive,
}

#[derive(Subcommand)]
enum PrefsCommands {
    /// Show saved preferences
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set the default unit, saved height or theme
    Set {
        /// Default unit: metric or imperial
        #[arg(long)]
        unit: Option<Unit>,
        /// Saved height in centimeters
        #[arg(long)]
        height: Option<f64>,
        /// Theme name
        #[arg(long)]
        theme: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove saved preferences
    Clear {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if cli.no_delay {
        config = config.without_latency();
    }
    logging::init(&config.log_level, cli.verbose);
    debug!(?config, "config loaded");

    let service = Arc::new(
        BmiService::seeded(config.latency()).context("Failed to load built-in sample data")?,
    );

    match cli.command.unwrap_or(Commands::Interactive) {
        Commands::Calc {
            unit,
            height,
            weight,
            feet,
            inches,
            json,
        } => {
            let args = CalcArgs {
                unit,
                height,
                weight,
                feet,
                inches,
            };
            cmd_calc(&service, &args, json).await
        }
        Commands::History { json } => cmd_history(&service, json).await,
        Commands::Show { id, json } => cmd_show(&service, id, json).await,
        Commands::Update {
            id,
            height,
            weight,
            unit,
            json,
        } => {
            let update = UpdateBmiRecord {
                height,
                weight,
                unit,
            };
            cmd_update(&service, id, &update, json).await
        }
        Commands::Delete { id, json } => cmd_delete(&service, id, json).await,
        Commands::Categories { json } => cmd_categories(json),
        Commands::Prefs { command } => match command {
            PrefsCommands::Show { json } => cmd_prefs_show(&service, json).await,
            PrefsCommands::Set {
                unit,
                height,
                theme,
                json,
            } => cmd_prefs_set(&service, unit, height, theme, json).await,
            PrefsCommands::Clear { json } => cmd_prefs_clear(&service, json).await,
        },
        Commands::Interactive => cmd_interactive(service, config.debounce()).await,
    }
}
