//! # Fixed Primitives
//!
//! Compiled-in constants of the pipeline metrics engine.
//!
//! The folder taxonomy, column names and parsing formats are fixed logic:
//! they are part of the binary and immutable at runtime.

// =============================================================================
// FOLDER TAXONOMY
// =============================================================================

/// The recruiter-internal pipeline folders.
///
/// Any non-empty folder outside this list is a client folder.
/// Matching is case-insensitive on the trimmed name.
pub const SYSTEM_FOLDERS: [&str; 17] = [
    "Inbox",
    "Unresponsive",
    "Completed",
    "Unresponsive Talkscore",
    "Passed MQ",
    "Failed MQ",
    "TalkScore Retake",
    "Unresponsive Talkscore Retake",
    "Failed TalkScore",
    "Cold Leads",
    "Cold Leads Talkscore",
    "Cold Leads Talkscore Retake",
    "On hold",
    "Rejected",
    "Talent Pool",
    "Shortlisted",
    "Hired",
];

/// Normalized key of the pipeline entry folder.
pub const INBOX_KEY: &str = "inbox";

/// Normalized key of the terminal hiring folder.
pub const HIRED_KEY: &str = "hired";

// =============================================================================
// SELECTION DEFAULTS
// =============================================================================

/// Days before the latest invitation date covered by the default range.
pub const DEFAULT_LOOKBACK_DAYS: u32 = 60;

/// Displayed when no duration sample qualifies.
pub const NOT_AVAILABLE: &str = "N/A";

// =============================================================================
// EVENT LOG COLUMNS
// =============================================================================

pub const COL_INVITATION_ID: &str = "CAMPAIGNINVITATIONID";
pub const COL_FOLDER_FROM: &str = "FOLDER_FROM_TITLE";
pub const COL_FOLDER_TO: &str = "FOLDER_TO_TITLE";
pub const COL_ACTIVITY_AT: &str = "ACTIVITY_CREATED_AT";
pub const COL_INVITED_AT: &str = "INVITATIONDT";
pub const COL_CAMPAIGN_SITE: &str = "CAMPAIGN_SITE";
pub const COL_CAMPAIGN_TITLE: &str = "CAMPAIGNTITLE";
pub const COL_SOURCE: &str = "SOURCE";
pub const COL_PROFICIENCY_TIER: &str = "TALKSCORE_CEFR";

/// Columns the event log must carry. Extra columns are ignored.
pub const REQUIRED_COLUMNS: [&str; 9] = [
    COL_INVITATION_ID,
    COL_FOLDER_FROM,
    COL_FOLDER_TO,
    COL_ACTIVITY_AT,
    COL_INVITED_AT,
    COL_CAMPAIGN_SITE,
    COL_CAMPAIGN_TITLE,
    COL_SOURCE,
    COL_PROFICIENCY_TIER,
];

/// Cell contents read as null in addition to the empty cell.
pub const NULL_MARKERS: [&str; 7] = ["NA", "N/A", "NaN", "nan", "NULL", "null", "#N/A"];

// =============================================================================
// TIMESTAMP FORMATS
// =============================================================================

/// Accepted date-time layouts, tried in order after RFC 3339.
pub const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

/// Accepted date-only layouts, read as midnight.
pub const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];
