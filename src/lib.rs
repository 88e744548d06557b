pub mod audit;
pub mod auth;
pub mod billing;
pub mod config;
pub mod error;
pub mod extract;
pub mod idempotency;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::audit::AuditLog;
use crate::billing::BillingProvider;
use crate::config::Config;
use crate::idempotency::{CheckoutSessions, ProcessedEvents};
use crate::state::{AppState, SharedState};

pub fn build_app(config: Config, billing: Arc<dyn BillingProvider>) -> (Router, SharedState) {
    if config.api_key.is_none() {
        tracing::warn!("OUTPOST_API_KEY not set; /api/jobs and /api/audit will reject every request");
    }

    let max_body_size = config.max_body_size;
    let state: SharedState = Arc::new(AppState {
        audit: AuditLog::new(config.audit_log_path.clone()),
        config,
        billing,
        processed_events: ProcessedEvents::new(),
        checkout_sessions: CheckoutSessions::new(),
    });
    tracing::info!("Audit log at {}", state.audit.path().display());

    let app = Router::new()
        .merge(routes::api_routes())
        .route("/health", axum::routing::get(health))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(max_body_size)),
        )
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .with_state(state.clone());

    (app, state)
}

async fn health() -> &'static str {
    "ok"
}
