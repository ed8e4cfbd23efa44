//! Unit tests for API types serialization/deserialization.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use funnel::api::{ConversionResponse, ErrorResponse, FilterQuery, FunnelResponse, HealthResponse};
use funnel_core::{DateRange, EventLog, FunnelError, FunnelReport, read_event_log};

fn sample_log() -> EventLog {
    let csv = "CAMPAIGNINVITATIONID,FOLDER_FROM_TITLE,FOLDER_TO_TITLE,ACTIVITY_CREATED_AT,\
INVITATIONDT,CAMPAIGN_SITE,CAMPAIGNTITLE,SOURCE,TALKSCORE_CEFR
1,,Inbox,2024-03-01 09:00:00,2024-03-01,Manila,Voice,Referral,B2
2,,Inbox,2024-03-05 09:00:00,2024-03-05,Cebu,Chat,Referral,B2
";
    read_event_log(csv.as_bytes()).unwrap().log
}

// =============================================================================
// HEALTH RESPONSE TESTS
// =============================================================================

#[test]
fn test_health_response_default() {
    let health = HealthResponse::default();
    assert_eq!(health.status, "ok");
    assert!(!health.version.is_empty());
}

#[test]
fn test_health_response_serialization() {
    let health = HealthResponse {
        status: "ok".to_string(),
        version: "0.4.2".to_string(),
    };

    let json = serde_json::to_string(&health).unwrap();
    assert!(json.contains("\"status\":\"ok\""));
    assert!(json.contains("\"version\":\"0.4.2\""));
}

// =============================================================================
// FILTER QUERY TESTS
// =============================================================================

#[test]
fn test_filter_query_defaults_to_lookback_range() {
    let log = sample_log();
    let selection = FilterQuery::default().to_selection(&log, 60).unwrap();

    assert_eq!(selection.range.end.to_string(), "2024-03-05");
    assert_eq!(selection.range.start.to_string(), "2024-01-05");
    assert!(selection.sites.is_empty());
    assert!(selection.campaigns.is_empty());
}

#[test]
fn test_filter_query_splits_lists() {
    let log = sample_log();
    let query = FilterQuery {
        sites: Some("Manila, Cebu,,".to_string()),
        campaigns: Some("Voice".to_string()),
        ..FilterQuery::default()
    };
    let selection = query.to_selection(&log, 60).unwrap();

    assert_eq!(selection.sites.len(), 2);
    assert!(selection.sites.contains("Cebu"));
    assert!(selection.campaigns.contains("Voice"));
}

#[test]
fn test_filter_query_blank_dates_are_open() {
    let log = sample_log();
    let query = FilterQuery {
        start: Some(String::new()),
        end: Some("2024-03-02".to_string()),
        ..FilterQuery::default()
    };
    let selection = query.to_selection(&log, 60).unwrap();
    assert_eq!(selection.range.end.to_string(), "2024-03-02");
    assert_eq!(selection.apply(&log).unwrap().population(), 1);
}

#[test]
fn test_filter_query_rejects_bad_dates() {
    let log = sample_log();
    let query = FilterQuery {
        end: Some("yesterday".to_string()),
        ..FilterQuery::default()
    };
    let err = query.to_selection(&log, 60).unwrap_err();
    assert!(matches!(err, FunnelError::InvalidDate(_)));
}

#[test]
fn test_filter_query_deserialization() {
    let json = r#"{"start":"2024-03-01","sites":"Manila"}"#;
    let query: FilterQuery = serde_json::from_str(json).unwrap();
    assert_eq!(query.start.as_deref(), Some("2024-03-01"));
    assert!(query.end.is_none());
    assert_eq!(query.sites.as_deref(), Some("Manila"));
}

// =============================================================================
// REPORT RESPONSE TESTS
// =============================================================================

#[test]
fn test_funnel_response_from_report() {
    let log = sample_log();
    let range = DateRange::default_for(&log, 60).unwrap();
    let report = FunnelReport::compute(&log, &funnel_core::standard_funnel());

    let response = FunnelResponse::from_report(range, report);
    assert_eq!(response.population, 2);
    assert_eq!(response.metrics.len(), 12);

    let json = serde_json::to_string(&response).unwrap();
    assert!(!json.contains("\"message\""));
    assert!(json.contains("\"average_duration_days\":\"N/A\""));
}

#[test]
fn test_funnel_response_no_data() {
    let response = FunnelResponse::no_data("No data matches the current filter criteria");
    let json = serde_json::to_string(&response).unwrap();
    assert!(json.contains("\"message\":\"No data matches the current filter criteria\""));
    assert!(json.contains("\"range\":null"));
}

#[test]
fn test_conversion_response_roundtrip() {
    let json = r#"{
        "range": {"start": "2024-03-01", "end": "2024-03-31"},
        "rows": [{"source": "Referral", "tier": "B2", "hired": null, "endorsed": 3, "conversion_rate": 0.0}],
        "pivot": null
    }"#;
    let response: ConversionResponse = serde_json::from_str(json).unwrap();
    assert_eq!(response.rows.len(), 1);
    assert_eq!(response.rows[0].hired, None);
    assert_eq!(response.rows[0].endorsed, Some(3));
    assert!(response.message.is_none());
}

#[test]
fn test_error_response_serialization() {
    let error = ErrorResponse::new("Invalid date \"x\", expected YYYY-MM-DD");
    let json = serde_json::to_string(&error).unwrap();
    assert!(json.starts_with("{\"error\":"));
}
