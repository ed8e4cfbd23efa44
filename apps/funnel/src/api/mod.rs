//! # Funnel HTTP API Module
//!
//! Read-only REST API over a log loaded once at startup.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /options` - Date bounds, default range, sites and campaigns
//! - `GET /funnel` - Folder Movement Summary
//! - `GET /conversion` - Source / CEFR conversion
//!
//! Report endpoints take `start`, `end` (YYYY-MM-DD) and comma-separated
//! `sites` / `campaigns`. An empty selection answers 200 with a `message`.
//!
//! ## Configuration (Environment Variables)
//!
//! - `FUNNEL_CORS_ORIGINS`: Comma-separated allowed origins, or "*" for all
//!   (default: `http://localhost` and `http://127.0.0.1` on any port)
//! - `FUNNEL_RATE_LIMIT`: Requests per second (default: 100, 0 to disable)

mod handlers;
mod middleware;
mod types;

pub use handlers::{conversion_handler, funnel_handler, health_handler, options_handler};
pub use middleware::{
    DEFAULT_RATE_LIMIT, GlobalRateLimiter, create_rate_limiter, get_rate_limit_from_env,
};
pub use types::{
    ConversionResponse, ErrorResponse, FilterQuery, FunnelResponse, HealthResponse,
    OptionsResponse,
};

use axum::{
    Router,
    http::{HeaderValue, Method, request::Parts},
    middleware as axum_middleware,
    routing::get,
};
use funnel_core::{EventLog, FunnelError, TransitionSpec};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state. The log is immutable, so no lock is needed.
#[derive(Clone)]
pub struct AppState {
    /// The full event log.
    pub log: Arc<EventLog>,
    /// Transitions reported by `/funnel`.
    pub transitions: Arc<Vec<TransitionSpec>>,
    /// Days covered by the default date range.
    pub lookback_days: u32,
}

impl AppState {
    /// Create new app state.
    #[must_use]
    pub fn new(log: EventLog, transitions: Vec<TransitionSpec>, lookback_days: u32) -> Self {
        Self {
            log: Arc::new(log),
            transitions: Arc::new(transitions),
            lookback_days,
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

const CORS_ORIGINS_ENV: &str = "FUNNEL_CORS_ORIGINS";

/// Browser origins allowed to read the API.
#[derive(Debug, Clone, PartialEq, Eq)]
enum CorsOrigins {
    /// Every origin (`*`).
    Any,
    /// `http://localhost` and `http://127.0.0.1` on any port.
    Loopback,
    /// An explicit allow-list.
    List(Vec<HeaderValue>),
}

impl CorsOrigins {
    fn from_env() -> Self {
        Self::parse(std::env::var(CORS_ORIGINS_ENV).ok().as_deref())
    }

    /// Unset, blank, or a list with no usable origin falls back to loopback.
    fn parse(value: Option<&str>) -> Self {
        let list = match value.map(str::trim) {
            None | Some("") => return Self::Loopback,
            Some("*") => return Self::Any,
            Some(list) => list,
        };

        let origins: Vec<HeaderValue> = list
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .filter_map(|origin| {
                if origin == "*" {
                    tracing::warn!("CORS: '*' inside a list is ignored; use it alone");
                    return None;
                }
                origin
                    .parse::<HeaderValue>()
                    .inspect_err(|e| tracing::warn!("CORS: Invalid origin '{}': {}", origin, e))
                    .ok()
            })
            .collect();

        if origins.is_empty() {
            tracing::warn!("CORS: No valid origins in {}, using loopback", CORS_ORIGINS_ENV);
            Self::Loopback
        } else {
            Self::List(origins)
        }
    }

    /// Every route is a GET without credentials, so that is all a preflight may allow.
    fn into_layer(self) -> CorsLayer {
        let allow_origin = match self {
            Self::Any => {
                tracing::warn!("CORS: Allowing ALL origins ({}=*)", CORS_ORIGINS_ENV);
                AllowOrigin::any()
            }
            Self::Loopback => {
                tracing::info!("CORS: Allowing loopback origins");
                AllowOrigin::predicate(|origin: &HeaderValue, _: &Parts| {
                    is_loopback_origin(origin)
                })
            }
            Self::List(origins) => {
                tracing::info!("CORS: Allowing {} configured origin(s)", origins.len());
                AllowOrigin::list(origins)
            }
        };

        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods([Method::GET])
    }
}

/// `http://localhost` or `http://127.0.0.1`, with an optional numeric port.
fn is_loopback_origin(origin: &HeaderValue) -> bool {
    let Ok(origin) = origin.to_str() else {
        return false;
    };
    ["http://localhost", "http://127.0.0.1"].iter().any(|host| {
        origin.strip_prefix(host).is_some_and(|rest| match rest.strip_prefix(':') {
            Some(port) => !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()),
            None => rest.is_empty(),
        })
    })
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. Tracing - logs all requests
/// 2. CORS - handles preflight requests
/// 3. Rate Limiting - global quota (if enabled)
pub fn create_router(state: AppState) -> Router {
    let cors = CorsOrigins::from_env().into_layer();

    let rate_limit = get_rate_limit_from_env();
    let rate_limiter = if rate_limit > 0 {
        tracing::info!("Rate limiting enabled: {} requests/second", rate_limit);
        Some(create_rate_limiter(rate_limit))
    } else {
        tracing::info!("Rate limiting disabled");
        None
    };

    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/options", get(handlers::options_handler))
        .route("/funnel", get(handlers::funnel_handler))
        .route("/conversion", get(handlers::conversion_handler));

    if let Some(limiter) = rate_limiter {
        router = router.layer(axum_middleware::from_fn_with_state(
            limiter,
            middleware::rate_limit_middleware,
        ));
    }

    router
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Serve until Ctrl+C.
pub async fn run_server(addr: &str, state: AppState) -> Result<(), FunnelError> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| FunnelError::IoError(format!("Bind failed: {}", e)))?;

    tracing::info!("Funnel HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| FunnelError::IoError(format!("Server error: {}", e)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Cannot listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

// =============================================================================
// TESTS
// =============================================================================
