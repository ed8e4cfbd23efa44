//! # Transition Metric Engine
//!
//! Computes, for one named transition, how many invitations made it, what share
//! of the population that is, and the average number of days it took.
//!
//! ## Detection
//!
//! An invitation made a transition if at least one of its events satisfies the
//! `from` and the `to` condition on the same row.
//!
//! ## Duration
//!
//! For each invitation that made the transition, over all of its events:
//! - from-time: earliest activity whose `from` side matches (for `Any`: the
//!   earliest pipeline entry, see [`FolderCondition::matches_from_for_duration`])
//! - to-time: latest activity whose `to` side matches
//!
//! A sample counts only when both exist and `to-time >= from-time`; it is the
//! whole number of days between them, rounded down. Endpoint selection is by
//! min/max timestamp, so row order never matters.

use crate::condition::{FolderCondition, TransitionSpec};
use crate::log::EventLog;
use crate::primitives::NOT_AVAILABLE;
use crate::types::{Event, InvitationId};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// =============================================================================
// RESULTS
// =============================================================================

/// One row of the Folder Movement Summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricResult {
    /// Display title of the transition.
    pub title: String,
    /// Distinct invitations that made the transition.
    pub count: usize,
    /// `count / population * 100` with two decimals, `"0.00"` for an empty population.
    pub percentage: String,
    /// Mean duration in days with one decimal, or `"N/A"`.
    pub average_duration_days: String,
}

/// The ordered list of metrics for one selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunnelReport {
    /// Distinct invitations in the view.
    pub population: usize,
    /// One result per transition, in the order given.
    pub metrics: Vec<MetricResult>,
}

impl FunnelReport {
    /// Run every transition over the view with the view's population as baseline.
    #[must_use]
    pub fn compute(view: &EventLog, specs: &[TransitionSpec]) -> Self {
        let population = view.population();
        let metrics = specs
            .iter()
            .map(|spec| MetricEngine::compute_metric(view.events(), spec, population))
            .collect();
        Self {
            population,
            metrics,
        }
    }
}

// =============================================================================
// ENGINE
// =============================================================================

/// The transition metric computation. Stateless.
pub struct MetricEngine;

impl MetricEngine {
    /// Compute count, percentage and average duration for one transition.
    #[must_use]
    pub fn compute_metric(
        events: &[Event],
        spec: &TransitionSpec,
        population: usize,
    ) -> MetricResult {
        let transitioned = Self::transitioned(events, spec);
        let count = transitioned.len();

        let samples = Self::duration_samples(events, spec, &transitioned);
        let average_duration_days = average_days(&samples)
            .map(|avg| format!("{avg:.1}"))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());

        MetricResult {
            title: spec.title.clone(),
            count,
            percentage: format_percentage(count, population),
            average_duration_days,
        }
    }

    /// Invitations with at least one event satisfying the transition.
    #[must_use]
    pub fn transitioned<'a>(
        events: &'a [Event],
        spec: &TransitionSpec,
    ) -> BTreeSet<&'a InvitationId> {
        events
            .iter()
            .filter(|e| spec.is_satisfied_by(e))
            .map(|e| &e.invitation_id)
            .collect()
    }

    /// Whole-day durations for the given invitations, one per invitation at most.
    #[must_use]
    pub fn duration_samples(
        events: &[Event],
        spec: &TransitionSpec,
        transitioned: &BTreeSet<&InvitationId>,
    ) -> Vec<i64> {
        if transitioned.is_empty() {
            return Vec::new();
        }

        let relevant: Vec<&Event> = events
            .iter()
            .filter(|e| transitioned.contains(&e.invitation_id))
            .collect();

        let from_times = endpoint_times(
            &relevant,
            |e| spec.from.matches_from_for_duration(e),
            Ord::min,
        );
        let to_times = endpoint_times(&relevant, |e| spec.to.matches_to(e), Ord::max);

        transitioned
            .iter()
            .filter_map(|id| {
                let from = from_times.get(id)?;
                let to = to_times.get(id)?;
                (to >= from).then(|| (*to - *from).num_days())
            })
            .collect()
    }
}

/// Per-invitation timestamp among matching events, folded with `pick`.
fn endpoint_times<'a, M, P>(
    events: &[&'a Event],
    matches: M,
    pick: P,
) -> BTreeMap<&'a InvitationId, NaiveDateTime>
where
    M: Fn(&Event) -> bool,
    P: Fn(NaiveDateTime, NaiveDateTime) -> NaiveDateTime,
{
    let mut times: BTreeMap<&InvitationId, NaiveDateTime> = BTreeMap::new();
    for &event in events {
        if !matches(event) {
            continue;
        }
        let Some(at) = event.activity_at else {
            continue;
        };
        times
            .entry(&event.invitation_id)
            .and_modify(|t| *t = pick(*t, at))
            .or_insert(at);
    }
    times
}

fn format_percentage(count: usize, population: usize) -> String {
    if population == 0 {
        return "0.00".to_string();
    }
    format!("{:.2}", count as f64 / population as f64 * 100.0)
}

fn average_days(samples: &[i64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    let total: i64 = samples.iter().sum();
    Some(total as f64 / samples.len() as f64)
}

/// Convenience for a single ad-hoc transition over a view.
#[must_use]
pub fn compute_metric(
    view: &EventLog,
    title: &str,
    from: FolderCondition,
    to: FolderCondition,
) -> MetricResult {
    let spec = TransitionSpec::new(title, from, to);
    MetricEngine::compute_metric(view.events(), &spec, view.population())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn day(n: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|d| d.and_hms_opt(10, 0, 0))
            .expect("valid date")
            + Duration::days(n)
    }

    fn ev(id: &str, from: Option<&str>, to: Option<&str>, at: Option<NaiveDateTime>) -> Event {
        let event = Event::new(InvitationId::new(id), from, to);
        match at {
            Some(t) => event.with_activity_at(t),
            None => event,
        }
    }

    fn passed_mq() -> TransitionSpec {
        TransitionSpec::new(
            "Application to Passed Prescreening",
            FolderCondition::Any,
            FolderCondition::literal("Passed MQ"),
        )
    }

    #[test]
    fn entry_to_passed_mq_takes_five_days() {
        let events = vec![
            ev("1", None, Some("Inbox"), Some(day(0))),
            ev("1", Some("Inbox"), Some("Passed MQ"), Some(day(5))),
        ];
        let result = MetricEngine::compute_metric(&events, &passed_mq(), 1);
        assert_eq!(result.count, 1);
        assert_eq!(result.percentage, "100.00");
        assert_eq!(result.average_duration_days, "5.0");
    }

    #[test]
    fn to_time_is_latest_match() {
        let events = vec![
            ev("1", None, Some("Inbox"), Some(day(0))),
            ev("1", Some("Inbox"), Some("Passed MQ"), Some(day(3))),
            ev("1", Some("Failed MQ"), Some("Passed MQ"), Some(day(7))),
        ];
        let result = MetricEngine::compute_metric(&events, &passed_mq(), 1);
        assert_eq!(result.average_duration_days, "7.0");
    }

    #[test]
    fn partial_days_are_floored() {
        let events = vec![
            ev("1", None, Some("Inbox"), Some(day(0))),
            ev(
                "1",
                Some("Inbox"),
                Some("Passed MQ"),
                Some(day(2) + Duration::hours(23)),
            ),
        ];
        let result = MetricEngine::compute_metric(&events, &passed_mq(), 1);
        assert_eq!(result.average_duration_days, "2.0");
    }

    #[test]
    fn inverted_endpoints_are_skipped() {
        let spec = TransitionSpec::new(
            "Shortlisted to Hired",
            FolderCondition::literal("Shortlisted"),
            FolderCondition::literal("Hired"),
        );
        let events = vec![
            ev("1", Some("Shortlisted"), Some("Hired"), Some(day(2))),
            ev("1", Some("Shortlisted"), Some("Talent Pool"), Some(day(1))),
            ev("1", Some("Shortlisted"), Some("On hold"), Some(day(9))),
        ];
        // from-time = day 1, to-time = day 2 -> included
        let result = MetricEngine::compute_metric(&events, &spec, 4);
        assert_eq!(result.count, 1);
        assert_eq!(result.percentage, "25.00");
        assert_eq!(result.average_duration_days, "1.0");
    }

    #[test]
    fn late_from_after_early_to_is_excluded() {
        let spec = TransitionSpec::new(
            "Talent Pool to Shortlisted",
            FolderCondition::literal("Talent Pool"),
            FolderCondition::literal("Shortlisted"),
        );
        // from-time: earliest "from Talent Pool" (day 4); to-time: latest "to Shortlisted" (day 2)
        let events = vec![
            ev("1", Some("Talent Pool"), Some("Shortlisted"), None),
            ev("1", Some("Passed MQ"), Some("Shortlisted"), Some(day(2))),
            ev("1", Some("Talent Pool"), Some("On hold"), Some(day(4))),
        ];
        let result = MetricEngine::compute_metric(&events, &spec, 1);
        assert_eq!(result.count, 1);
        assert_eq!(result.average_duration_days, NOT_AVAILABLE);
    }

    #[test]
    fn no_transition_means_zero_and_not_available() {
        let events = vec![ev("1", None, Some("Inbox"), Some(day(0)))];
        let result = MetricEngine::compute_metric(&events, &passed_mq(), 1);
        assert_eq!(result.count, 0);
        assert_eq!(result.percentage, "0.00");
        assert_eq!(result.average_duration_days, NOT_AVAILABLE);
    }

    #[test]
    fn zero_population_reports_zero_percent() {
        let events = vec![ev("1", Some("Inbox"), Some("Passed MQ"), None)];
        let result = MetricEngine::compute_metric(&events, &passed_mq(), 0);
        assert_eq!(result.count, 1);
        assert_eq!(result.percentage, "0.00");
    }

    #[test]
    fn any_duration_starts_at_pipeline_entry() {
        // The counted movement is from Completed, but the clock starts at entry.
        let spec = TransitionSpec::new(
            "Application to Talent Pool",
            FolderCondition::Any,
            FolderCondition::literal("Talent Pool"),
        );
        let events = vec![
            ev("1", None, Some("Inbox"), Some(day(1))),
            ev("1", Some("Inbox"), Some("Completed"), Some(day(3))),
            ev("1", Some("Completed"), Some("Talent Pool"), Some(day(10))),
        ];
        let result = MetricEngine::compute_metric(&events, &spec, 1);
        assert_eq!(result.average_duration_days, "9.0");
    }

    #[test]
    fn empty_from_matches_first_event_only() {
        let spec = TransitionSpec::new(
            "Entered Inbox",
            FolderCondition::Empty,
            FolderCondition::literal("Inbox"),
        );
        let events = vec![
            ev("1", None, Some("Inbox"), Some(day(0))),
            ev("2", Some("On hold"), Some("Inbox"), Some(day(0))),
        ];
        let result = MetricEngine::compute_metric(&events, &spec, 2);
        assert_eq!(result.count, 1);
        assert_eq!(result.percentage, "50.00");
        assert_eq!(result.average_duration_days, "0.0");
    }

    #[test]
    fn client_folder_transitions_use_classification() {
        let spec = TransitionSpec::new(
            "Client Folder to Shortlisted",
            FolderCondition::ClientFolder,
            FolderCondition::literal("Shortlisted"),
        );
        let events = vec![
            ev("1", Some("Acme Review"), Some("Shortlisted"), Some(day(6))),
            ev("1", Some("Talent Pool"), Some("Acme Review"), Some(day(2))),
            ev("2", Some("Talent Pool"), Some("Shortlisted"), Some(day(3))),
        ];
        let result = MetricEngine::compute_metric(&events, &spec, 2);
        assert_eq!(result.count, 1);
        // from-time: earliest "from Acme Review" is day 6, to-time day 6
        assert_eq!(result.average_duration_days, "0.0");
    }

    #[test]
    fn average_over_several_invitations() {
        let events = vec![
            ev("1", None, Some("Inbox"), Some(day(0))),
            ev("1", Some("Inbox"), Some("Passed MQ"), Some(day(2))),
            ev("2", None, Some("Inbox"), Some(day(0))),
            ev("2", Some("Inbox"), Some("Passed MQ"), Some(day(5))),
            ev("3", Some("Inbox"), Some("Passed MQ"), None),
        ];
        let result = MetricEngine::compute_metric(&events, &passed_mq(), 3);
        assert_eq!(result.count, 3);
        assert_eq!(result.percentage, "100.00");
        assert_eq!(result.average_duration_days, "3.5");
    }

    #[test]
    fn report_follows_spec_order() {
        let view = EventLog::new(vec![
            ev("1", None, Some("Inbox"), Some(day(0))),
            ev("1", Some("Inbox"), Some("Completed"), Some(day(1))),
        ]);
        let report = FunnelReport::compute(&view, &crate::condition::standard_funnel());
        assert_eq!(report.population, 1);
        assert_eq!(report.metrics.len(), 12);
        assert_eq!(report.metrics[0].title, "Application to Completed");
        assert_eq!(report.metrics[0].count, 1);
        assert_eq!(report.metrics[0].average_duration_days, "1.0");
        assert!(report.metrics[1..].iter().all(|m| m.count == 0));
    }

    #[test]
    fn ad_hoc_metric_uses_view_population() {
        let view = EventLog::new(vec![
            ev("1", Some("Inbox"), Some("Passed MQ"), None),
            ev("2", None, Some("Inbox"), None),
        ]);
        let result = compute_metric(
            &view,
            "Passed",
            FolderCondition::Any,
            FolderCondition::literal("passed mq"),
        );
        assert_eq!(result.percentage, "50.00");
    }
}
