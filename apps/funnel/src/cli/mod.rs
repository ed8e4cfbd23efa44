//! # Funnel CLI Module
//!
//! This module implements the CLI interface.
//!
//! ## Available Commands
//!
//! - `funnel` - Folder Movement Summary (default)
//! - `conversion` - Source / CEFR conversion pivot
//! - `options` - Date bounds and filter choices in the data
//! - `server` - Start the HTTP server

mod commands;

use crate::config::{DEFAULT_CONFIG_FILE, FunnelConfig};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use funnel_core::{FunnelError, parse_date};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Funnel - recruiting pipeline metrics
///
/// Reads a candidate folder-movement export and reports how invitations
/// move through the pipeline.
#[derive(Parser, Debug)]
#[command(name = "funnel")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Print extra detail (population size)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner and headings
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the activity CSV export
    #[arg(short, long, global = true)]
    pub data: Option<PathBuf>,

    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    #[command(flatten)]
    pub filter: FilterArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Selection flags shared by every report.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// First invitation date (YYYY-MM-DD), inclusive
    #[arg(long, global = true, value_parser = parse_date)]
    pub start: Option<NaiveDate>,

    /// Last invitation date (YYYY-MM-DD), inclusive
    #[arg(long, global = true, value_parser = parse_date)]
    pub end: Option<NaiveDate>,

    /// Keep only this work location (repeatable)
    #[arg(long = "site", global = true)]
    pub sites: Vec<String>,

    /// Keep only this campaign title (repeatable)
    #[arg(long = "campaign", global = true)]
    pub campaigns: Vec<String>,

    /// Days before the latest invitation covered by the default range
    #[arg(long, global = true)]
    pub lookback_days: Option<u32>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the Folder Movement Summary
    Funnel,

    /// Show hires and endorsements by source and CEFR tier
    Conversion,

    /// List date bounds, sites and campaigns in the data
    Options,

    /// Start HTTP server
    Server {
        /// Host to bind to (overrides the config file)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to (overrides the config file)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), FunnelError> {
    let config = FunnelConfig::load_from(&cli.config)?;
    let ctx = RunContext {
        data_path: config.data_path(cli.data.as_deref()),
        json_mode: cli.json_mode,
        quiet: cli.quiet,
        verbose: cli.verbose,
        filter: cli.filter,
    };

    match cli.command {
        Some(Commands::Server { host, port }) => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            cmd_server(&ctx, &config, &host, port).await
        }
        Some(Commands::Conversion) => cmd_conversion(&ctx, &config),
        Some(Commands::Options) => cmd_options(&ctx, &config),
        Some(Commands::Funnel) | None => cmd_funnel(&ctx, &config),
    }
}
