//! # Core Type Definitions
//!
//! This module contains the row-level types every component of the pipeline reads:
//! - Invitation identity (`InvitationId`)
//! - Folder references annotated by the classifier (`Folder`, `FolderClass`)
//! - The folder-movement event (`Event`)
//! - Error types (`FunnelError`)
//!
//! ## Immutability
//!
//! Events are built once by a loader (or by tests) and never mutated afterwards.
//! Every derived view is a fresh `EventLog`, so no computation can observe
//! another computation's intermediate state.

use crate::taxonomy;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Identity of a candidate's campaign invitation.
///
/// The unit of identity for every count. Not unique per event: one invitation
/// accumulates many folder movements over its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InvitationId(pub String);

impl InvitationId {
    /// Create a new identity from a string.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the identity as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for InvitationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// FOLDERS
// =============================================================================

/// Category of a folder name under the pipeline taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FolderClass {
    /// One of the recruiter-internal pipeline folders.
    System,
    /// Any other non-empty folder: client-visible, campaign specific.
    Client,
    /// Null or blank.
    Empty,
}

/// A folder field of an event, annotated once at construction.
///
/// Keeps the raw value (to tell a null cell from a blank one) next to the
/// normalized key and its classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folder {
    name: Option<String>,
    key: String,
    class: FolderClass,
}

impl Folder {
    /// Annotate a raw folder value.
    #[must_use]
    pub fn new(name: Option<String>) -> Self {
        let key = name
            .as_deref()
            .map(taxonomy::normalize)
            .unwrap_or_default();
        let class = taxonomy::classify(&key);
        Self { name, key, class }
    }

    /// The raw value as recorded, `None` for a null cell.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Trimmed, lower-cased name (empty for null).
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Taxonomy classification of this folder.
    #[must_use]
    pub fn class(&self) -> FolderClass {
        self.class
    }

    /// True when the raw value is non-null.
    #[must_use]
    pub fn is_present(&self) -> bool {
        self.name.is_some()
    }
}

// =============================================================================
// EVENT
// =============================================================================

/// One recorded folder movement of one invitation.
///
/// `from_folder` is null exactly for the invitation's first event (pipeline entry).
/// Campaign and candidate attributes are denormalized onto every row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// The invitation this movement belongs to.
    pub invitation_id: InvitationId,
    /// Folder the candidate left.
    pub from_folder: Folder,
    /// Folder the candidate entered.
    pub to_folder: Folder,
    /// When the movement happened, absent if unparseable.
    pub activity_at: Option<NaiveDateTime>,
    /// When the invitation was created, absent if unparseable.
    pub invited_at: Option<NaiveDateTime>,
    /// Work location of the campaign.
    pub campaign_site: Option<String>,
    /// Campaign title.
    pub campaign_title: Option<String>,
    /// Lead source of the candidate.
    pub source: Option<String>,
    /// CEFR proficiency band.
    pub proficiency_tier: Option<String>,
}

impl Event {
    /// Create a movement with no timestamps or attributes.
    #[must_use]
    pub fn new(invitation_id: InvitationId, from: Option<&str>, to: Option<&str>) -> Self {
        Self {
            invitation_id,
            from_folder: Folder::new(from.map(str::to_string)),
            to_folder: Folder::new(to.map(str::to_string)),
            activity_at: None,
            invited_at: None,
            campaign_site: None,
            campaign_title: None,
            source: None,
            proficiency_tier: None,
        }
    }

    /// Set the activity timestamp.
    #[must_use]
    pub fn with_activity_at(mut self, at: NaiveDateTime) -> Self {
        self.activity_at = Some(at);
        self
    }

    /// Set the invitation timestamp.
    #[must_use]
    pub fn with_invited_at(mut self, at: NaiveDateTime) -> Self {
        self.invited_at = Some(at);
        self
    }

    /// Set the campaign site and title.
    #[must_use]
    pub fn with_campaign(mut self, site: impl Into<String>, title: impl Into<String>) -> Self {
        self.campaign_site = Some(site.into());
        self.campaign_title = Some(title.into());
        self
    }

    /// Set the lead source and proficiency tier.
    #[must_use]
    pub fn with_source_tier(mut self, source: impl Into<String>, tier: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self.proficiency_tier = Some(tier.into());
        self
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur while loading, selecting or configuring.
///
/// - One bad row never aborts a computation; it is absorbed by the loader
/// - `NoValidInvitationDates` and `NoMatchingData` are "no data" states,
///   reported to the user rather than treated as failures
/// - The core never panics
#[derive(Debug, Error)]
pub enum FunnelError {
    /// A required column is absent from the event log header.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// The event log header or stream could not be read as CSV.
    #[error("{0}")]
    Csv(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),

    /// A transition condition could not be parsed.
    #[error("Invalid folder condition: {0:?}")]
    InvalidCondition(String),

    /// A date argument is not `YYYY-MM-DD`.
    #[error("Invalid date {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),

    /// The selected date range is inverted.
    #[error("Invalid date range: {start} is after {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    /// Configuration could not be read or parsed.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// No row carries a usable invitation timestamp.
    #[error("No valid invitation dates available in the data")]
    NoValidInvitationDates,

    /// The selection leaves no rows.
    #[error("No data matches the current filter criteria")]
    NoMatchingData,
}

impl FunnelError {
    /// True for the empty-result states that callers report as "no data".
    #[must_use]
    pub fn is_no_data(&self) -> bool {
        matches!(
            self,
            FunnelError::NoValidInvitationDates | FunnelError::NoMatchingData
        )
    }
}

impl From<csv::Error> for FunnelError {
    fn from(e: csv::Error) -> Self {
        FunnelError::Csv(e.to_string())
    }
}

// =============================================================================
// TESTS
// =============================================================================
