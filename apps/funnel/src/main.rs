//! # Funnel - Recruiting Pipeline Metrics
//!
//! The main binary over the `funnel-core` metrics engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │             apps/funnel (THE BINARY)          │
//! │                                               │
//! │  ┌─────────────┐    ┌─────────────┐           │
//! │  │   CLI       │    │   HTTP API  │           │
//! │  │  (clap)     │    │   (axum)    │           │
//! │  └──────┬──────┘    └──────┬──────┘           │
//! │         └─────────┬────────┘                  │
//! │                   ▼                           │
//! │           ┌───────────────┐                   │
//! │           │  funnel-core  │                   │
//! │           │  (THE LOGIC)  │                   │
//! │           └───────────────┘                   │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Folder Movement Summary for March, one site
//! funnel -d activity.csv --start 2024-03-01 --end 2024-03-31 --site Manila
//!
//! # Source / CEFR conversion as JSON
//! funnel -d activity.csv conversion --json-mode
//!
//! # Start the HTTP server
//! funnel -d activity.csv server --port 8080
//! ```

use clap::Parser;
use funnel::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // FUNNEL_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("FUNNEL_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "funnel=info,funnel_core=info,tower_http=debug".into());

    // Logs go to stderr so report output on stdout stays parseable.
    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the startup banner.
fn print_banner() {
    println!(
        r#"
  ___ _   _ _  _ _  _ ___ _
 | __| | | | \| | \| | __| |
 | _|| |_| | .` | .` | _|| |__
 |_|  \___/|_|\_|_|\_|___|____|

  Recruiting Pipeline Metrics v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
