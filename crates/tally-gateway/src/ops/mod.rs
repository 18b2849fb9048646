//! Operational HTTP endpoints.
//!
//! - `/healthz` : liveness
//! - `/readyz`  : readiness (503 when draining or the store is unreachable)
//! - `/metrics` : Prometheus text format

use axum::{
    extract::{MatchedPath, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::app_state::AppState;

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    if state.is_draining() {
        return (StatusCode::SERVICE_UNAVAILABLE, "draining");
    }
    match state.store().ping().await {
        Ok(()) => (StatusCode::OK, "ready"),
        Err(e) => {
            tracing::warn!(backend = state.store().backend(), error = %e, "readiness ping failed");
            (StatusCode::SERVICE_UNAVAILABLE, "store unavailable")
        }
    }
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    let body = state.metrics().render();

    (
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
        .into_response()
}

/// Count every response by matched route and status. Unmatched paths fall
/// through to the static file service and are labelled `static`.
pub async fn track_requests(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "static".to_string());

    let res = next.run(req).await;
    let status = res.status();
    state
        .metrics()
        .http_requests
        .inc(&[("route", route.as_str()), ("status", status.as_str())]);
    res
}
