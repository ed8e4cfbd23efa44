//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.
//!
//! Every report reads the shared immutable log and computes on a fresh view,
//! so handlers never lock.

use super::{
    AppState,
    types::{
        ConversionResponse, ErrorResponse, FilterQuery, FunnelResponse, HealthResponse,
        OptionsResponse,
    },
};
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use funnel_core::{ConversionTable, DateRange, EventLog, FunnelError, FunnelReport, Selection};

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// OPTIONS HANDLER
// =============================================================================

/// Date bounds, default range and filter choices.
pub async fn options_handler(State(state): State<AppState>) -> impl IntoResponse {
    let log = &state.log;
    let mut response = OptionsResponse {
        sites: log.campaign_sites(),
        campaigns: log.campaign_titles(),
        ..OptionsResponse::default()
    };

    match log.invitation_date_bounds() {
        Some((earliest, latest)) => {
            response.earliest = Some(earliest.date());
            response.latest = Some(latest.date());
            response.default_range = DateRange::default_for(log, state.lookback_days).ok();
        }
        None => {
            response.message = Some(FunnelError::NoValidInvitationDates.to_string());
        }
    }

    (StatusCode::OK, Json(response))
}

// =============================================================================
// FUNNEL HANDLER
// =============================================================================

/// Folder Movement Summary over the selected view.
pub async fn funnel_handler(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> Response {
    let (selection, view) = match select(&state, &query) {
        Ok(selected) => selected,
        Err(e) if e.is_no_data() => {
            return (StatusCode::OK, Json(FunnelResponse::no_data(e.to_string()))).into_response();
        }
        Err(e) => return bad_request(&e),
    };

    let report = FunnelReport::compute(&view, &state.transitions);
    (
        StatusCode::OK,
        Json(FunnelResponse::from_report(selection.range, report)),
    )
        .into_response()
}

// =============================================================================
// CONVERSION HANDLER
// =============================================================================

/// Source / CEFR conversion over the selected view.
pub async fn conversion_handler(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> Response {
    let (selection, view) = match select(&state, &query) {
        Ok(selected) => selected,
        Err(e) if e.is_no_data() => {
            return (
                StatusCode::OK,
                Json(ConversionResponse::no_data(None, e.to_string())),
            )
                .into_response();
        }
        Err(e) => return bad_request(&e),
    };

    let table = ConversionTable::compute(view.events());
    let response = if table.is_empty() {
        ConversionResponse::no_data(Some(selection.range), "No Hired or Endorsed data")
    } else {
        ConversionResponse::from_table(selection.range, table.rows(), table.pivot())
    };

    (StatusCode::OK, Json(response)).into_response()
}

// =============================================================================
// HELPERS
// =============================================================================

fn select(state: &AppState, query: &FilterQuery) -> Result<(Selection, EventLog), FunnelError> {
    let selection = query.to_selection(&state.log, state.lookback_days)?;
    let view = selection.apply(&state.log)?;
    Ok((selection, view))
}

fn bad_request(error: &FunnelError) -> Response {
    tracing::debug!("Rejected report request: {}", error);
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new(error.to_string())),
    )
        .into_response()
}
