//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use super::FilterArgs;
use crate::api::{self, AppState};
use crate::config::FunnelConfig;
use funnel_core::{
    ConversionTable, DateRange, EventLog, FunnelError, FunnelReport, LoadSummary, Selection,
    read_event_log,
};
use serde_json::json;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum size of an activity export (500 MB).
///
/// The whole log is held in memory; this prevents exhaustion from an
/// accidental multi-gigabyte file.
const MAX_DATA_FILE_SIZE: u64 = 500 * 1024 * 1024;

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), FunnelError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| FunnelError::IoError(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(FunnelError::IoError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Canonicalize a path and ensure it names an existing regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, FunnelError> {
    let canonical = path.canonicalize().map_err(|e| {
        FunnelError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(FunnelError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

// =============================================================================
// SHARED HELPERS
// =============================================================================

/// Settings every command reads.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub data_path: PathBuf,
    pub json_mode: bool,
    pub quiet: bool,
    pub verbose: bool,
    pub filter: FilterArgs,
}

/// Read and decode the activity export, logging what the loader absorbed.
pub fn load_log(path: &Path) -> Result<EventLog, FunnelError> {
    let canonical = validate_file_path(path)?;
    validate_file_size(&canonical, MAX_DATA_FILE_SIZE)?;

    let file = File::open(&canonical).map_err(|e| {
        FunnelError::IoError(format!("Cannot open '{}': {}", canonical.display(), e))
    })?;
    let loaded = read_event_log(BufReader::new(file))?;
    log_summary(&canonical, &loaded.summary, loaded.log.population());
    Ok(loaded.log)
}

fn log_summary(path: &Path, summary: &LoadSummary, population: usize) {
    tracing::info!(
        path = %path.display(),
        rows = summary.rows_read,
        invitations = population,
        "Event log loaded"
    );
    if summary.dropped_missing_id > 0 {
        tracing::warn!(
            dropped = summary.dropped_missing_id,
            "Rows without an invitation id were dropped"
        );
    }
    if summary.malformed_rows > 0 {
        tracing::warn!(
            skipped = summary.malformed_rows,
            "Rows that could not be decoded were skipped"
        );
    }
    if summary.unparseable_timestamps > 0 {
        tracing::warn!(
            cells = summary.unparseable_timestamps,
            "Unparseable timestamps were treated as absent"
        );
    }
}

/// Turn the filter flags into a selection over this log.
pub fn build_selection(
    log: &EventLog,
    filter: &FilterArgs,
    config: &FunnelConfig,
) -> Result<Selection, FunnelError> {
    let lookback = filter.lookback_days.unwrap_or(config.lookback_days);
    let range = DateRange::resolve(log, filter.start, filter.end, Some(lookback))?;
    Ok(Selection::new(range)
        .with_sites(filter.sites.iter().cloned())
        .with_campaigns(filter.campaigns.iter().cloned()))
}

/// Load, select and return the view, or report "no data" and return `None`.
fn selected_view(
    ctx: &RunContext,
    config: &FunnelConfig,
) -> Result<Option<(Selection, EventLog)>, FunnelError> {
    let log = load_log(&ctx.data_path)?;
    let result =
        build_selection(&log, &ctx.filter, config).and_then(|s| s.apply(&log).map(|v| (s, v)));

    match result {
        Ok(selected) => Ok(Some(selected)),
        Err(e) if e.is_no_data() => {
            report_no_data(ctx, &e.to_string());
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

fn report_no_data(ctx: &RunContext, message: &str) {
    tracing::warn!("{}", message);
    if ctx.json_mode {
        print_json(&json!({ "message": message }));
    } else {
        println!("{}", message);
    }
}

fn print_json(value: &serde_json::Value) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

fn print_heading(ctx: &RunContext, title: &str, range: &DateRange) {
    if ctx.quiet {
        return;
    }
    println!("{}", title);
    println!("{}", "=".repeat(title.len()));
    println!("Invitations: {} to {}", range.start, range.end);
    println!();
}

/// Print rows under headers with every column padded to its widest cell.
fn print_table(headers: &[String], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let render = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    println!("{}", render(headers));
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    println!("{}", render(rule.as_slice()));
    for row in rows {
        println!("{}", render(row.as_slice()));
    }
}

// =============================================================================
// FUNNEL COMMAND
// =============================================================================

/// Show the Folder Movement Summary.
pub fn cmd_funnel(ctx: &RunContext, config: &FunnelConfig) -> Result<(), FunnelError> {
    let Some((selection, view)) = selected_view(ctx, config)? else {
        return Ok(());
    };
    let report = FunnelReport::compute(&view, &config.transitions());

    if ctx.json_mode {
        print_json(&json!({
            "range": selection.range,
            "population": report.population,
            "metrics": report.metrics,
        }));
        return Ok(());
    }

    print_heading(ctx, "Folder Movement Summary", &selection.range);
    let headers = [
        "Metric",
        "Candidate Count",
        "Percentage (%)",
        "Avg Duration (days)",
    ]
    .map(str::to_string);
    let rows: Vec<Vec<String>> = report
        .metrics
        .iter()
        .map(|m| {
            vec![
                m.title.clone(),
                m.count.to_string(),
                m.percentage.clone(),
                m.average_duration_days.clone(),
            ]
        })
        .collect();
    print_table(&headers, &rows);

    if ctx.verbose {
        println!();
        println!("Population: {} invitations", report.population);
    }

    Ok(())
}

// =============================================================================
// CONVERSION COMMAND
// =============================================================================

/// Show hires against endorsements by source and CEFR tier.
pub fn cmd_conversion(ctx: &RunContext, config: &FunnelConfig) -> Result<(), FunnelError> {
    let Some((selection, view)) = selected_view(ctx, config)? else {
        return Ok(());
    };
    let table = ConversionTable::compute(view.events());

    if table.is_empty() {
        report_no_data(ctx, "No Hired or Endorsed data");
        return Ok(());
    }

    let pivot = table.pivot();
    if ctx.json_mode {
        print_json(&json!({
            "range": selection.range,
            "rows": table.rows(),
            "pivot": pivot,
        }));
        return Ok(());
    }

    print_heading(ctx, "Source / CEFR Conversion", &selection.range);
    let mut headers = vec!["CEFR".to_string()];
    headers.extend(
        pivot
            .columns()
            .into_iter()
            .map(|(source, metric)| format!("{} / {}", source, metric)),
    );
    let rows: Vec<Vec<String>> = pivot
        .rows
        .iter()
        .map(|row| {
            std::iter::once(row.tier.clone())
                .chain(row.cells.iter().cloned())
                .collect()
        })
        .collect();
    print_table(&headers, &rows);

    Ok(())
}

// =============================================================================
// OPTIONS COMMAND
// =============================================================================

/// List the filter choices the data offers.
pub fn cmd_options(ctx: &RunContext, config: &FunnelConfig) -> Result<(), FunnelError> {
    let log = load_log(&ctx.data_path)?;
    let lookback = ctx.filter.lookback_days.unwrap_or(config.lookback_days);

    let Some((earliest, latest)) = log.invitation_date_bounds() else {
        report_no_data(ctx, &FunnelError::NoValidInvitationDates.to_string());
        return Ok(());
    };
    let default_range = DateRange::default_for(&log, lookback)?;
    let sites = log.campaign_sites();
    let campaigns = log.campaign_titles();

    if ctx.json_mode {
        print_json(&json!({
            "earliest": earliest.date(),
            "latest": latest.date(),
            "default_range": default_range,
            "sites": sites,
            "campaigns": campaigns,
        }));
        return Ok(());
    }

    if !ctx.quiet {
        println!("Filter Options");
        println!("==============");
    }
    println!("Invitation dates: {} to {}", earliest.date(), latest.date());
    println!(
        "Default range:    {} to {} ({} days back)",
        default_range.start, default_range.end, lookback
    );
    println!();
    println!("Sites ({}):", sites.len());
    for site in &sites {
        println!("  {}", site);
    }
    println!();
    println!("Campaigns ({}):", campaigns.len());
    for campaign in &campaigns {
        println!("  {}", campaign);
    }

    Ok(())
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server over the loaded log.
pub async fn cmd_server(
    ctx: &RunContext,
    config: &FunnelConfig,
    host: &str,
    port: u16,
) -> Result<(), FunnelError> {
    let log = load_log(&ctx.data_path)?;
    let transitions = config.transitions();

    if !ctx.quiet {
        println!("Funnel Metrics Server Starting...");
        println!();
        println!("Configuration:");
        println!("  Host:        {}", host);
        println!("  Port:        {}", port);
        println!("  Data:        {}", ctx.data_path.display());
        println!("  Transitions: {}", transitions.len());
        println!();
        println!("Endpoints:");
        println!("  GET /health     - Health check");
        println!("  GET /options    - Date bounds and filter choices");
        println!("  GET /funnel     - Folder Movement Summary");
        println!("  GET /conversion - Source / CEFR conversion");
        println!();
        println!("Press Ctrl+C to stop");
        println!();
    }

    let state = AppState::new(log, transitions, config.lookback_days);
    let addr = format!("{}:{}", host, port);
    api::run_server(&addr, state).await
}

// =============================================================================
// TESTS
// =============================================================================
