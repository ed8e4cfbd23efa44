//! # CSV Event Log Format
//!
//! Decodes the activity export into an [`EventLog`].
//!
//! File I/O stays in the app layer: the decoder reads from any `io::Read`.
//!
//! ## Tolerance
//!
//! - Unparseable timestamps become absent and are counted, never fatal
//! - Rows without an invitation identity are dropped and counted
//! - Short rows read their missing trailing cells as null
//! - Rows that still cannot be decoded are skipped and counted
//! - Missing required columns, a malformed header and I/O failures are errors

use crate::log::EventLog;
use crate::primitives::{DATE_FORMATS, DATETIME_FORMATS, NULL_MARKERS, REQUIRED_COLUMNS};
use crate::types::{Event, Folder, FunnelError, InvitationId};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::io::Read;

// =============================================================================
// RAW RECORD
// =============================================================================

/// One CSV row as exported, before any interpretation.
///
/// Field renames follow the column names in [`REQUIRED_COLUMNS`].
#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(rename = "CAMPAIGNINVITATIONID")]
    invitation_id: Option<String>,
    #[serde(rename = "FOLDER_FROM_TITLE")]
    folder_from: Option<String>,
    #[serde(rename = "FOLDER_TO_TITLE")]
    folder_to: Option<String>,
    #[serde(rename = "ACTIVITY_CREATED_AT")]
    activity_at: Option<String>,
    #[serde(rename = "INVITATIONDT")]
    invited_at: Option<String>,
    #[serde(rename = "CAMPAIGN_SITE")]
    campaign_site: Option<String>,
    #[serde(rename = "CAMPAIGNTITLE")]
    campaign_title: Option<String>,
    #[serde(rename = "SOURCE")]
    source: Option<String>,
    #[serde(rename = "TALKSCORE_CEFR")]
    proficiency_tier: Option<String>,
}

// =============================================================================
// LOAD RESULT
// =============================================================================

/// What the loader absorbed while decoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadSummary {
    /// Data rows read from the file.
    pub rows_read: usize,
    /// Rows dropped because the invitation identity was null.
    pub dropped_missing_id: usize,
    /// Non-null timestamp cells that could not be parsed.
    pub unparseable_timestamps: usize,
    /// Rows skipped because they could not be decoded.
    pub malformed_rows: usize,
}

/// A decoded log plus its load summary.
#[derive(Debug, Clone)]
pub struct LoadedLog {
    pub log: EventLog,
    pub summary: LoadSummary,
}

// =============================================================================
// DECODER
// =============================================================================

/// Decode a CSV event log with a header row.
pub fn read_event_log<R: Read>(reader: R) -> Result<LoadedLog, FunnelError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(FunnelError::MissingColumn(column.to_string()));
        }
    }

    let mut summary = LoadSummary::default();
    let mut events = Vec::new();

    for record in csv_reader.records() {
        let mut record = match record {
            Ok(record) => record,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(_) => {
                summary.rows_read += 1;
                summary.malformed_rows += 1;
                continue;
            }
        };
        summary.rows_read += 1;

        // Short records are padded with empty cells, which decode as null.
        while record.len() < headers.len() {
            record.push_field("");
        }

        let Ok(raw) = record.deserialize::<RawRecord>(Some(&headers)) else {
            summary.malformed_rows += 1;
            continue;
        };

        let Some(invitation_id) = non_null(raw.invitation_id) else {
            summary.dropped_missing_id += 1;
            continue;
        };

        let activity_at = timestamp_cell(raw.activity_at, &mut summary);
        let invited_at = timestamp_cell(raw.invited_at, &mut summary);

        events.push(Event {
            invitation_id: InvitationId::new(invitation_id.trim()),
            from_folder: Folder::new(non_null(raw.folder_from)),
            to_folder: Folder::new(non_null(raw.folder_to)),
            activity_at,
            invited_at,
            campaign_site: non_null(raw.campaign_site),
            campaign_title: non_null(raw.campaign_title),
            source: non_null(raw.source),
            proficiency_tier: non_null(raw.proficiency_tier),
        });
    }

    Ok(LoadedLog {
        log: events.into_iter().collect(),
        summary,
    })
}

/// Parse a timestamp cell, falling back to absent.
///
/// Accepts RFC 3339 (offset normalized to UTC) and the layouts in
/// [`DATETIME_FORMATS`] and [`DATE_FORMATS`].
#[must_use]
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.naive_utc());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

fn timestamp_cell(cell: Option<String>, summary: &mut LoadSummary) -> Option<NaiveDateTime> {
    let text = non_null(cell)?;
    let parsed = parse_timestamp(&text);
    if parsed.is_none() {
        summary.unparseable_timestamps += 1;
    }
    parsed
}

fn non_null(cell: Option<String>) -> Option<String> {
    cell.filter(|v| {
        let v = v.trim();
        !v.is_empty() && !NULL_MARKERS.contains(&v)
    })
}

// =============================================================================
// TESTS
// =============================================================================
