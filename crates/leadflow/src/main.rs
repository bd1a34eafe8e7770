// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Leadflow - journey message scheduling and webhook dispatch.
//!
//! Binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod commands;
mod serve;
mod services;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use leadflow_core::Lead;

/// Leadflow - journey message scheduling and webhook dispatch.
#[derive(Parser, Debug)]
#[command(name = "leadflow", version, about, long_about = None)]
struct Cli {
    /// Load this file instead of the standard config locations.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the dispatcher on an interval, and the gateway if enabled.
    Serve,
    /// Run a single dispatcher pass and print the report.
    Dispatch,
    /// Schedule the journey for a lead entering a stage.
    Trigger {
        #[arg(long)]
        lead_id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        email: Option<String>,
        /// Stage the lead just entered.
        #[arg(long)]
        stage: String,
    },
    /// Show dispatch history, newest first.
    History {
        #[arg(long)]
        limit: Option<i64>,
    },
    /// Show scheduled messages.
    Schedules {
        /// Only rows that have not been sent.
        #[arg(long)]
        pending: bool,
        #[arg(long)]
        limit: Option<i64>,
    },
    /// Manage journey templates.
    Templates {
        #[command(subcommand)]
        action: TemplateCommands,
    },
    /// Print the effective configuration.
    Config,
}

#[derive(Subcommand, Debug)]
enum TemplateCommands {
    List,
    /// Upsert templates from a JSON array file.
    Import { file: PathBuf },
    Remove { id: String },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => leadflow_config::load_and_validate_path(path),
        None => leadflow_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            leadflow_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    serve::init_tracing(&config.service.log_level);

    let result = match cli.command {
        Commands::Serve => serve::run_serve(config).await,
        Commands::Dispatch => commands::run_dispatch(&config).await,
        Commands::Trigger {
            lead_id,
            name,
            phone,
            email,
            stage,
        } => {
            let lead = Lead {
                id: lead_id,
                name,
                phone,
                email,
                pipeline_stage: None,
            };
            commands::run_trigger(&config, lead, stage).await
        }
        Commands::History { limit } => commands::run_history(&config, limit).await,
        Commands::Schedules { pending, limit } => {
            commands::run_schedules(&config, pending, limit).await
        }
        Commands::Templates { action } => match action {
            TemplateCommands::List => commands::run_templates_list(&config).await,
            TemplateCommands::Import { file } => {
                commands::run_templates_import(&config, &file).await
            }
            TemplateCommands::Remove { id } => commands::run_templates_remove(&config, &id).await,
        },
        Commands::Config => commands::run_config_show(&config),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
