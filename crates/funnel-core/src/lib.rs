//! # funnel-core
//!
//! The deterministic metrics engine for the candidate pipeline - THE LOGIC.
//!
//! Reads an immutable log of folder movements and answers three questions
//! for any selection of it:
//! - how many invitations made a given transition, as a share of the population
//! - how many days that transition took on average
//! - how hires relate to client endorsements per lead source and CEFR tier
//!
//! ## Architectural Constraints
//!
//! - The event log is read-only; every filtered view is a fresh copy
//! - Results never depend on row order (BTreeMap/BTreeSet, min/max endpoints)
//! - No async, no network, no filesystem: decoders take any `io::Read`
//! - No logging: loaders return a summary for the caller to report

// =============================================================================
// MODULES
// =============================================================================

pub mod condition;
pub mod conversion;
pub mod engine;
pub mod filter;
pub mod formats;
pub mod log;
pub mod primitives;
pub mod taxonomy;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{Event, Folder, FolderClass, FunnelError, InvitationId};

// =============================================================================
// RE-EXPORTS: Metrics
// =============================================================================

pub use condition::{FolderCondition, TransitionSpec, standard_funnel};
pub use conversion::{
    ConversionCell, ConversionRow, ConversionTable, PIVOT_METRICS, PivotRow, PivotTable,
};
pub use engine::{FunnelReport, MetricEngine, MetricResult, compute_metric};
pub use filter::{DateRange, Selection, parse_date};
pub use log::EventLog;
pub use taxonomy::{classify, normalize};

// =============================================================================
// RE-EXPORTS: Formats (from formats module)
// =============================================================================

pub use formats::{LoadSummary, LoadedLog, parse_timestamp, read_event_log};
