//! Ops endpoints: health check and relay counters.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::context::RelayContext;

/// Health check response.
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: String,
    version: &'static str,
}

/// `GET /health`: liveness, version and current timestamp.
pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy",
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}

/// `GET /metrics`: relay counters plus the current subscriber count.
///
/// A store failure is logged and reported as `"subscribers": null`; the
/// endpoint still answers 200.
pub async fn metrics_handler(State(ctx): State<RelayContext>) -> impl IntoResponse {
    let subscribers = match ctx.store.count().await {
        Ok(n) => Some(n),
        Err(e) => {
            tracing::warn!(error = %e, "subscriber count unavailable");
            None
        }
    };
    (StatusCode::OK, Json(ctx.metrics.to_json(subscribers)))
}

/// Ops routes.
pub fn routes() -> Router<RelayContext> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
}
