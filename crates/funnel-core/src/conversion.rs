//! # Source / CEFR Conversion
//!
//! Cross-tabulates hires and endorsements by lead source and proficiency tier.
//!
//! - hired: distinct invitations with a movement into `Hired`
//! - endorsed: distinct invitations with a movement into a client folder
//! - conversion rate: `hired / endorsed * 100`, 0 when nothing was endorsed
//!
//! Rows without a source or a tier cannot be keyed and do not participate.
//! The pivoted rendering blanks every zero, so a missing combination and a
//! real zero look the same there; the typed cells keep them apart.

use crate::primitives::HIRED_KEY;
use crate::types::{Event, FolderClass, InvitationId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Sub-columns under every source, in display order.
pub const PIVOT_METRICS: [&str; 3] = ["Hired", "Unique Endorsed", "Conversion Rate"];

// =============================================================================
// CELLS
// =============================================================================

/// Counts for one (source, tier) combination. `None` means no data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionCell {
    pub hired: Option<usize>,
    pub endorsed: Option<usize>,
}

impl ConversionCell {
    /// `hired / endorsed * 100`; 0 when endorsed is missing or zero.
    #[must_use]
    pub fn conversion_rate(&self) -> f64 {
        match self.endorsed {
            Some(endorsed) if endorsed > 0 => {
                self.hired.unwrap_or(0) as f64 / endorsed as f64 * 100.0
            }
            _ => 0.0,
        }
    }
}

/// A flat, serializable view of one cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionRow {
    pub source: String,
    pub tier: String,
    pub hired: Option<usize>,
    pub endorsed: Option<usize>,
    pub conversion_rate: f64,
}

// =============================================================================
// TABLE
// =============================================================================

type Key = (String, String);

/// Hired and endorsed counts keyed by (source, tier).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionTable {
    cells: BTreeMap<Key, ConversionCell>,
}

impl ConversionTable {
    /// Aggregate a view.
    #[must_use]
    pub fn compute(events: &[Event]) -> Self {
        let hired = distinct_by_key(events, |e| e.to_folder.key() == HIRED_KEY);
        let endorsed = distinct_by_key(events, |e| e.to_folder.class() == FolderClass::Client);

        let mut cells: BTreeMap<Key, ConversionCell> = BTreeMap::new();
        for (key, ids) in hired {
            cells.entry(key).or_default().hired = Some(ids.len());
        }
        for (key, ids) in endorsed {
            cells.entry(key).or_default().endorsed = Some(ids.len());
        }
        Self { cells }
    }

    /// True if there is neither hired nor endorsed data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Counts for one combination, if any were observed.
    #[must_use]
    pub fn cell(&self, source: &str, tier: &str) -> Option<&ConversionCell> {
        self.cells.get(&(source.to_string(), tier.to_string()))
    }

    /// Sorted distinct sources (pivot column groups).
    #[must_use]
    pub fn sources(&self) -> Vec<&str> {
        self.cells
            .keys()
            .map(|(source, _)| source.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Sorted distinct tiers (pivot rows).
    #[must_use]
    pub fn tiers(&self) -> Vec<&str> {
        self.cells
            .keys()
            .map(|(_, tier)| tier.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Every observed combination, source-major.
    #[must_use]
    pub fn rows(&self) -> Vec<ConversionRow> {
        self.cells
            .iter()
            .map(|((source, tier), cell)| ConversionRow {
                source: source.clone(),
                tier: tier.clone(),
                hired: cell.hired,
                endorsed: cell.endorsed,
                conversion_rate: cell.conversion_rate(),
            })
            .collect()
    }

    /// Reshape into display rows: one per tier, three columns per source.
    #[must_use]
    pub fn pivot(&self) -> PivotTable {
        let sources = self.sources();
        let rows = self
            .tiers()
            .into_iter()
            .map(|tier| {
                let cells = sources
                    .iter()
                    .flat_map(|source| {
                        let cell = self.cell(source, tier).copied().unwrap_or_default();
                        [
                            blank_zero(cell.hired.unwrap_or(0).to_string()),
                            blank_zero(cell.endorsed.unwrap_or(0).to_string()),
                            blank_zero(format!("{:.0}%", cell.conversion_rate())),
                        ]
                    })
                    .collect();
                PivotRow {
                    tier: tier.to_string(),
                    cells,
                }
            })
            .collect();

        PivotTable {
            sources: sources.into_iter().map(str::to_string).collect(),
            metrics: PIVOT_METRICS.iter().map(|m| m.to_string()).collect(),
            rows,
        }
    }
}

/// Distinct invitations per (source, tier) among events that satisfy `keep`.
fn distinct_by_key<F>(events: &[Event], keep: F) -> BTreeMap<Key, BTreeSet<&InvitationId>>
where
    F: Fn(&Event) -> bool,
{
    let mut groups: BTreeMap<Key, BTreeSet<&InvitationId>> = BTreeMap::new();
    for event in events.iter().filter(|e| keep(*e)) {
        let (Some(source), Some(tier)) = (&event.source, &event.proficiency_tier) else {
            continue;
        };
        groups
            .entry((source.clone(), tier.clone()))
            .or_default()
            .insert(&event.invitation_id);
    }
    groups
}

fn blank_zero(rendered: String) -> String {
    if rendered == "0" || rendered == "0%" {
        String::new()
    } else {
        rendered
    }
}

// =============================================================================
// PIVOT
// =============================================================================

/// Rendered source-major pivot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PivotTable {
    /// Column groups, sorted.
    pub sources: Vec<String>,
    /// Sub-columns repeated under every source.
    pub metrics: Vec<String>,
    /// One row per tier, sorted.
    pub rows: Vec<PivotRow>,
}

impl PivotTable {
    /// Header labels as `(source, metric)` pairs, aligned with `PivotRow::cells`.
    #[must_use]
    pub fn columns(&self) -> Vec<(&str, &str)> {
        self.sources
            .iter()
            .flat_map(|s| self.metrics.iter().map(move |m| (s.as_str(), m.as_str())))
            .collect()
    }
}

/// One tier's rendered cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PivotRow {
    pub tier: String,
    pub cells: Vec<String>,
}

// =============================================================================
// TESTS
// =============================================================================
