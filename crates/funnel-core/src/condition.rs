//! # Transition Conditions
//!
//! Tagged conditions on the `from` and `to` side of a folder movement,
//! and the named transitions of the standard funnel.
//!
//! Conditions parse from the strings used in configuration files:
//! `"Any"`, `"Empty"`, `"Client Folder"`, or a literal folder name.

use crate::primitives::INBOX_KEY;
use crate::taxonomy::normalize;
use crate::types::{Event, Folder, FolderClass, FunnelError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

// =============================================================================
// FOLDER CONDITION
// =============================================================================

/// A condition on one side of a folder movement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FolderCondition {
    /// The folder is non-null.
    Any,
    /// The folder is null (on the `from` side: the first event).
    Empty,
    /// The folder is a non-empty name outside the system taxonomy.
    ClientFolder,
    /// The folder equals this normalized name.
    Literal(String),
}

impl FolderCondition {
    /// Build a literal condition, normalizing the name.
    #[must_use]
    pub fn literal(name: &str) -> Self {
        FolderCondition::Literal(normalize(name))
    }

    /// Event-level mask on the `from` folder, used to detect a transition.
    #[must_use]
    pub fn matches_from(&self, event: &Event) -> bool {
        self.matches_folder(&event.from_folder)
    }

    /// Event-level mask on the `to` folder, used for detection and the to-time.
    #[must_use]
    pub fn matches_to(&self, event: &Event) -> bool {
        self.matches_folder(&event.to_folder)
    }

    /// Mask on the `from` folder used to pick the from-time of a duration.
    ///
    /// Identical to [`matches_from`](Self::matches_from) except for `Any`,
    /// which selects pipeline entry: a `from` folder that is `inbox` or empty.
    #[must_use]
    pub fn matches_from_for_duration(&self, event: &Event) -> bool {
        match self {
            FolderCondition::Any => {
                let key = event.from_folder.key();
                key == INBOX_KEY || key.is_empty()
            }
            _ => self.matches_from(event),
        }
    }

    fn matches_folder(&self, folder: &Folder) -> bool {
        match self {
            FolderCondition::Any => folder.is_present(),
            FolderCondition::Empty => !folder.is_present(),
            FolderCondition::ClientFolder => folder.class() == FolderClass::Client,
            FolderCondition::Literal(key) => folder.key() == key,
        }
    }
}

impl FromStr for FolderCondition {
    type Err = FunnelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = normalize(s);
        match key.as_str() {
            "" => Err(FunnelError::InvalidCondition(s.to_string())),
            "any" => Ok(FolderCondition::Any),
            "empty" => Ok(FolderCondition::Empty),
            "client folder" => Ok(FolderCondition::ClientFolder),
            _ => Ok(FolderCondition::Literal(key)),
        }
    }
}

impl TryFrom<String> for FolderCondition {
    type Error = FunnelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FolderCondition> for String {
    fn from(condition: FolderCondition) -> Self {
        condition.to_string()
    }
}

impl std::fmt::Display for FolderCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FolderCondition::Any => f.write_str("Any"),
            FolderCondition::Empty => f.write_str("Empty"),
            FolderCondition::ClientFolder => f.write_str("Client Folder"),
            FolderCondition::Literal(key) => f.write_str(key),
        }
    }
}

// =============================================================================
// TRANSITION SPEC
// =============================================================================

/// A named `from → to` transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionSpec {
    /// Display title of the metric.
    pub title: String,
    /// Condition on the folder left.
    pub from: FolderCondition,
    /// Condition on the folder entered.
    pub to: FolderCondition,
}

impl TransitionSpec {
    /// Create a new transition.
    #[must_use]
    pub fn new(title: impl Into<String>, from: FolderCondition, to: FolderCondition) -> Self {
        Self {
            title: title.into(),
            from,
            to,
        }
    }

    /// True if this single movement is itself a `from → to` transition.
    #[must_use]
    pub fn is_satisfied_by(&self, event: &Event) -> bool {
        self.from.matches_from(event) && self.to.matches_to(event)
    }
}

/// The twelve transitions of the Folder Movement Summary, in display order.
#[must_use]
pub fn standard_funnel() -> Vec<TransitionSpec> {
    use FolderCondition::{Any, ClientFolder};
    let lit = FolderCondition::literal;

    vec![
        TransitionSpec::new("Application to Completed", Any, lit("Completed")),
        TransitionSpec::new("Application to Passed Prescreening", Any, lit("Passed MQ")),
        TransitionSpec::new(
            "Passed Prescreening to Talent Pool",
            lit("Passed MQ"),
            lit("Talent Pool"),
        ),
        TransitionSpec::new("Application to Talent Pool", Any, lit("Talent Pool")),
        TransitionSpec::new("Application to Client Folder", Any, ClientFolder),
        TransitionSpec::new("Application to Shortlisted", Any, lit("Shortlisted")),
        TransitionSpec::new("Application to Hired", Any, lit("Hired")),
        TransitionSpec::new(
            "Talent Pool to Client Folder",
            lit("Talent Pool"),
            ClientFolder,
        ),
        TransitionSpec::new(
            "Talent Pool to Shortlisted",
            lit("Talent Pool"),
            lit("Shortlisted"),
        ),
        TransitionSpec::new(
            "Client Folder to Shortlisted",
            ClientFolder,
            lit("Shortlisted"),
        ),
        TransitionSpec::new("Shortlisted to Hired", lit("Shortlisted"), lit("Hired")),
        TransitionSpec::new(
            "Shortlisted to Rejected",
            lit("Shortlisted"),
            lit("Rejected"),
        ),
    ]
}

// =============================================================================
// TESTS
// =============================================================================
