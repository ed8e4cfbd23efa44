//! # Selection
//!
//! Date-range, work-location and campaign filters that turn the full log
//! into the working view a report is computed on.
//!
//! The date range is inclusive at day granularity: rows are kept when
//! `start 00:00 <= invitation timestamp < (end + 1 day) 00:00`.

use crate::log::EventLog;
use crate::primitives::DEFAULT_LOOKBACK_DAYS;
use crate::types::{Event, FunnelError};
use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// =============================================================================
// DATE RANGE
// =============================================================================

/// Inclusive range of invitation dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Create a range, rejecting `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, FunnelError> {
        if start > end {
            return Err(FunnelError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// `[latest invitation date - lookback_days, latest invitation date]`.
    pub fn default_for(log: &EventLog, lookback_days: u32) -> Result<Self, FunnelError> {
        let (_, latest) = log
            .invitation_date_bounds()
            .ok_or(FunnelError::NoValidInvitationDates)?;
        let end = latest.date();
        let start = end
            .checked_sub_days(Days::new(u64::from(lookback_days)))
            .unwrap_or(NaiveDate::MIN);
        Ok(Self { start, end })
    }

    /// Fill in whichever bound the caller left open from the default range.
    pub fn resolve(
        log: &EventLog,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        lookback_days: Option<u32>,
    ) -> Result<Self, FunnelError> {
        let default = Self::default_for(log, lookback_days.unwrap_or(DEFAULT_LOOKBACK_DAYS))?;
        Self::new(start.unwrap_or(default.start), end.unwrap_or(default.end))
    }

    /// True if the timestamp falls on a day inside the range.
    #[must_use]
    pub fn contains(&self, at: NaiveDateTime) -> bool {
        let lower = self.start.and_time(NaiveTime::MIN);
        match self.end.checked_add_days(Days::new(1)) {
            Some(next_day) => lower <= at && at < next_day.and_time(NaiveTime::MIN),
            None => lower <= at,
        }
    }
}

/// Parse a `YYYY-MM-DD` date argument.
pub fn parse_date(value: &str) -> Result<NaiveDate, FunnelError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| FunnelError::InvalidDate(value.to_string()))
}

// =============================================================================
// SELECTION
// =============================================================================

/// A complete filter selection. Empty site or campaign sets do not restrict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub range: DateRange,
    pub sites: BTreeSet<String>,
    pub campaigns: BTreeSet<String>,
}

impl Selection {
    /// Select a date range with no site or campaign restriction.
    #[must_use]
    pub fn new(range: DateRange) -> Self {
        Self {
            range,
            sites: BTreeSet::new(),
            campaigns: BTreeSet::new(),
        }
    }

    /// Restrict to these work locations.
    #[must_use]
    pub fn with_sites<I, S>(mut self, sites: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sites.extend(sites.into_iter().map(Into::into));
        self
    }

    /// Restrict to these campaign titles.
    #[must_use]
    pub fn with_campaigns<I, S>(mut self, campaigns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.campaigns.extend(campaigns.into_iter().map(Into::into));
        self
    }

    /// True if the row passes every filter.
    #[must_use]
    pub fn admits(&self, event: &Event) -> bool {
        event.invited_at.is_some_and(|at| self.range.contains(at))
            && admits_value(&self.sites, event.campaign_site.as_deref())
            && admits_value(&self.campaigns, event.campaign_title.as_deref())
    }

    /// Produce the working view.
    ///
    /// Returns `NoMatchingData` when no row survives.
    pub fn apply(&self, log: &EventLog) -> Result<EventLog, FunnelError> {
        let view = log.retain_view(|e| self.admits(e));
        if view.is_empty() {
            return Err(FunnelError::NoMatchingData);
        }
        Ok(view)
    }
}

fn admits_value(allowed: &BTreeSet<String>, value: Option<&str>) -> bool {
    allowed.is_empty() || value.is_some_and(|v| allowed.contains(v))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::InvitationId;

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, month, day).expect("valid date")
    }

    fn at(month: u32, day: u32, hour: u32) -> NaiveDateTime {
        date(month, day).and_hms_opt(hour, 30, 0).expect("valid time")
    }

    fn invited(id: &str, when: NaiveDateTime, site: &str, title: &str) -> Event {
        Event::new(InvitationId::new(id), None, Some("Inbox"))
            .with_invited_at(when)
            .with_campaign(site, title)
    }

    fn sample() -> EventLog {
        EventLog::new(vec![
            invited("1", at(1, 2, 8), "Manila", "Voice"),
            invited("2", at(3, 1, 23), "Manila", "Chat"),
            invited("3", at(3, 2, 0), "Cebu", "Voice"),
            Event::new(InvitationId::new("4"), None, Some("Inbox")),
        ])
    }

    #[test]
    fn default_range_looks_back_sixty_days_from_latest() {
        let range = DateRange::default_for(&sample(), DEFAULT_LOOKBACK_DAYS).expect("range");
        assert_eq!(range.end, date(3, 2));
        assert_eq!(range.start, date(1, 2));
    }

    #[test]
    fn default_range_without_dates_is_no_data() {
        let log = EventLog::new(vec![Event::new(InvitationId::new("x"), None, None)]);
        let err = DateRange::default_for(&log, 60).expect_err("no dates");
        assert!(matches!(err, FunnelError::NoValidInvitationDates));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let err = DateRange::new(date(3, 2), date(3, 1)).expect_err("inverted");
        assert!(matches!(err, FunnelError::InvalidDateRange { .. }));
    }

    #[test]
    fn end_day_is_inclusive() {
        let range = DateRange::new(date(3, 1), date(3, 1)).expect("range");
        assert!(range.contains(at(3, 1, 23)));
        assert!(!range.contains(date(3, 2).and_time(NaiveTime::MIN)));
        assert!(!range.contains(at(2, 29, 23)));
    }

    #[test]
    fn parse_date_accepts_iso_only() {
        assert_eq!(parse_date(" 2024-03-01 ").expect("date"), date(3, 1));
        assert!(matches!(
            parse_date("03/01/2024"),
            Err(FunnelError::InvalidDate(_))
        ));
    }

    #[test]
    fn resolve_fills_open_bounds() {
        let range =
            DateRange::resolve(&sample(), Some(date(2, 15)), None, None).expect("resolved");
        assert_eq!(range, DateRange::new(date(2, 15), date(3, 2)).expect("range"));
    }

    #[test]
    fn apply_drops_rows_without_invitation_date() {
        let range = DateRange::new(date(1, 1), date(12, 31)).expect("range");
        let view = Selection::new(range).apply(&sample()).expect("view");
        assert_eq!(view.population(), 3);
    }

    #[test]
    fn site_and_campaign_filters_combine() {
        let range = DateRange::new(date(1, 1), date(12, 31)).expect("range");
        let selection = Selection::new(range)
            .with_sites(["Manila"])
            .with_campaigns(["Voice"]);
        let view = selection.apply(&sample()).expect("view");
        assert_eq!(view.len(), 1);
        assert_eq!(view.events()[0].invitation_id.as_str(), "1");
    }

    #[test]
    fn empty_selection_is_no_data() {
        let range = DateRange::new(date(6, 1), date(6, 30)).expect("range");
        let err = Selection::new(range).apply(&sample()).expect_err("empty");
        assert!(err.is_no_data());
    }
}
