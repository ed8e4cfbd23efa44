//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.

use chrono::NaiveDate;
use funnel_core::{
    ConversionRow, DateRange, EventLog, FunnelError, FunnelReport, MetricResult, PivotTable,
    Selection, parse_date,
};
use serde::{Deserialize, Serialize};

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// FILTER QUERY
// =============================================================================

/// Selection parameters shared by the report endpoints.
///
/// `sites` and `campaigns` are comma-separated; empty means no restriction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterQuery {
    pub start: Option<String>,
    pub end: Option<String>,
    pub sites: Option<String>,
    pub campaigns: Option<String>,
}

impl FilterQuery {
    /// Resolve the query against a log, filling open bounds from the default range.
    pub fn to_selection(
        &self,
        log: &EventLog,
        lookback_days: u32,
    ) -> Result<Selection, FunnelError> {
        let start = parse_optional_date(self.start.as_deref())?;
        let end = parse_optional_date(self.end.as_deref())?;
        let range = DateRange::resolve(log, start, end, Some(lookback_days))?;

        Ok(Selection::new(range)
            .with_sites(split_list(self.sites.as_deref()))
            .with_campaigns(split_list(self.campaigns.as_deref())))
    }
}

fn parse_optional_date(value: Option<&str>) -> Result<Option<NaiveDate>, FunnelError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => parse_date(text).map(Some),
    }
}

fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// =============================================================================
// FUNNEL RESPONSE
// =============================================================================

/// Folder Movement Summary response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunnelResponse {
    pub range: Option<DateRange>,
    pub population: usize,
    pub metrics: Vec<MetricResult>,
    /// Set when there is nothing to report.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FunnelResponse {
    /// Create a response from a computed report.
    #[must_use]
    pub fn from_report(range: DateRange, report: FunnelReport) -> Self {
        Self {
            range: Some(range),
            population: report.population,
            metrics: report.metrics,
            message: None,
        }
    }

    /// Create an empty response carrying a message.
    #[must_use]
    pub fn no_data(message: impl Into<String>) -> Self {
        Self {
            range: None,
            population: 0,
            metrics: Vec::new(),
            message: Some(message.into()),
        }
    }
}

// =============================================================================
// CONVERSION RESPONSE
// =============================================================================

/// Source / CEFR conversion response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionResponse {
    pub range: Option<DateRange>,
    /// Typed cells; `null` counts mean no data for that side.
    pub rows: Vec<ConversionRow>,
    /// Rendered pivot with zeros blanked.
    pub pivot: Option<PivotTable>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ConversionResponse {
    /// Create a response from computed rows and their pivot.
    #[must_use]
    pub fn from_table(range: DateRange, rows: Vec<ConversionRow>, pivot: PivotTable) -> Self {
        Self {
            range: Some(range),
            rows,
            pivot: Some(pivot),
            message: None,
        }
    }

    /// Create an empty response carrying a message.
    #[must_use]
    pub fn no_data(range: Option<DateRange>, message: impl Into<String>) -> Self {
        Self {
            range,
            rows: Vec::new(),
            pivot: None,
            message: Some(message.into()),
        }
    }
}

// =============================================================================
// OPTIONS RESPONSE
// =============================================================================

/// Date bounds and filter choices offered by the loaded data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptionsResponse {
    pub earliest: Option<NaiveDate>,
    pub latest: Option<NaiveDate>,
    pub default_range: Option<DateRange>,
    pub sites: Vec<String>,
    pub campaigns: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// =============================================================================
// ERROR RESPONSE
// =============================================================================

/// Body of a 4xx/5xx answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
