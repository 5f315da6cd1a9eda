//! Ops HTTP layer.
//!
//! The relay has no public API; this router only serves `/health` and
//! `/metrics` for orchestration and dashboards.

pub mod system;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::context::RelayContext;

/// Builds the ops router with request tracing, bound to `ctx`.
pub fn build_router(ctx: RelayContext) -> Router {
    Router::new()
        .merge(system::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}
