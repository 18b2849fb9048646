//! Axum router wiring.
//!
//! API and ops routes are matched first; every other path is served from
//! `server.static_dir`.

use std::sync::Arc;

use axum::{middleware, routing::get, Router};
use tower_http::{services::ServeDir, trace::TraceLayer};

use tally_core::Result;

use crate::{api::handlers, app_state::AppState, config::TallyConfig, ops, store::CounterStore};

/// Initialize the counters, then build state and router.
///
/// No router exists unless `initialize` succeeded, so a store that cannot be
/// prepared never gets served.
pub async fn init_app(
    cfg: TallyConfig,
    store: Arc<dyn CounterStore>,
) -> Result<(AppState, Router)> {
    store.initialize().await?;
    tracing::info!(backend = store.backend(), "counters initialized");

    let state = AppState::new(cfg, store);
    let app = build_router(state.clone());
    Ok((state, app))
}

pub fn build_router(state: AppState) -> Router {
    let assets = ServeDir::new(&state.cfg().server.static_dir);

    Router::new()
        .route("/data", get(handlers::data))
        .route("/update/:key/:value", get(handlers::update))
        .route("/healthz", get(ops::healthz))
        .route("/readyz", get(ops::readyz))
        .route("/metrics", get(ops::metrics))
        .fallback_service(assets)
        .layer(middleware::from_fn_with_state(state.clone(), ops::track_requests))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
