//! # Event Log
//!
//! The immutable in-memory table of folder movements that every metric reads.

use crate::types::{Event, InvitationId};
use chrono::NaiveDateTime;
use std::collections::BTreeSet;

/// An immutable table of folder-movement events.
///
/// Rows are not ordered; nothing downstream depends on their order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    /// Wrap a set of events.
    #[must_use]
    pub fn new(events: Vec<Event>) -> Self {
        Self { events }
    }

    /// All events.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True if there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of distinct invitations: the percentage baseline.
    #[must_use]
    pub fn population(&self) -> usize {
        self.events
            .iter()
            .map(|e| &e.invitation_id)
            .collect::<BTreeSet<&InvitationId>>()
            .len()
    }

    /// Earliest and latest valid invitation timestamps.
    #[must_use]
    pub fn invitation_date_bounds(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let mut stamps = self.events.iter().filter_map(|e| e.invited_at);
        let first = stamps.next()?;
        Some(stamps.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t))))
    }

    /// Sorted distinct work locations.
    #[must_use]
    pub fn campaign_sites(&self) -> Vec<String> {
        distinct(self.events.iter().map(|e| e.campaign_site.as_deref()))
    }

    /// Sorted distinct campaign titles.
    #[must_use]
    pub fn campaign_titles(&self) -> Vec<String> {
        distinct(self.events.iter().map(|e| e.campaign_title.as_deref()))
    }

    /// A fresh log holding the rows that satisfy `keep`.
    #[must_use]
    pub fn retain_view<F>(&self, keep: F) -> EventLog
    where
        F: Fn(&Event) -> bool,
    {
        EventLog::new(self.events.iter().filter(|e| keep(*e)).cloned().collect())
    }
}

impl FromIterator<Event> for EventLog {
    fn from_iter<T: IntoIterator<Item = Event>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

fn distinct<'a>(values: impl Iterator<Item = Option<&'a str>>) -> Vec<String> {
    values
        .flatten()
        .collect::<BTreeSet<&str>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .and_then(|d| d.and_hms_opt(9, 0, 0))
            .expect("valid date")
    }

    fn sample() -> EventLog {
        EventLog::new(vec![
            Event::new(InvitationId::new("a"), None, Some("Inbox"))
                .with_invited_at(at(4))
                .with_campaign("Manila", "Voice"),
            Event::new(InvitationId::new("a"), Some("Inbox"), Some("Completed"))
                .with_invited_at(at(4))
                .with_campaign("Manila", "Voice"),
            Event::new(InvitationId::new("b"), None, Some("Inbox"))
                .with_invited_at(at(1))
                .with_campaign("Cebu", "Chat"),
            Event::new(InvitationId::new("c"), None, Some("Inbox")).with_campaign("Cebu", "Voice"),
        ])
    }

    #[test]
    fn population_counts_distinct_invitations() {
        assert_eq!(sample().population(), 3);
        assert_eq!(sample().len(), 4);
    }

    #[test]
    fn date_bounds_skip_absent_timestamps() {
        assert_eq!(sample().invitation_date_bounds(), Some((at(1), at(4))));
        let undated = EventLog::new(vec![Event::new(InvitationId::new("x"), None, None)]);
        assert_eq!(undated.invitation_date_bounds(), None);
    }

    #[test]
    fn option_lists_are_sorted_and_distinct() {
        assert_eq!(sample().campaign_sites(), vec!["Cebu", "Manila"]);
        assert_eq!(sample().campaign_titles(), vec!["Chat", "Voice"]);
    }

    #[test]
    fn retain_view_leaves_source_untouched() {
        let log = sample();
        let view = log.retain_view(|e| e.invitation_id.as_str() == "a");
        assert_eq!(view.len(), 2);
        assert_eq!(log.len(), 4);
    }
}
