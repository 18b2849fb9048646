use axum::{
    extract::{rejection::PathRejection, Path, State},
    Json,
};

use tally_core::{Snapshot, TallyError};

use crate::api::ApiError;
use crate::app_state::AppState;

const READ_FAILED: &str = "failed to retrieve data";
const UPDATE_FAILED: &str = "failed to update data";

/// `GET /data`
pub async fn data(State(state): State<AppState>) -> Result<Json<Snapshot>, ApiError> {
    let snap = state
        .store_op("read_all", state.store().read_all())
        .await
        .map_err(|e| ApiError::store(e, READ_FAILED))?;

    tracing::debug!(?snap, "served counters");
    Ok(Json(snap))
}

/// `GET /update/:key/:value`
///
/// `key` is passed through unchecked: names outside the fixed set become
/// loose store entries that `/data` never shows. A `value` that is not an
/// `i64` is rejected before the store is touched, as is a path segment that
/// does not decode to UTF-8.
pub async fn update(
    State(state): State<AppState>,
    params: Result<Path<(String, String)>, PathRejection>,
) -> Result<Json<Snapshot>, ApiError> {
    let Path((key, value)) =
        params.map_err(|e| TallyError::BadRequest(e.body_text()))?;
    let delta = parse_delta(&value)?;

    let updated = state
        .store_op("increment", state.store().increment(&key, delta))
        .await
        .map_err(|e| ApiError::store(e, UPDATE_FAILED))?;
    tracing::debug!(%key, delta, updated, "counter incremented");

    let snap = state
        .store_op("read_all", state.store().read_all())
        .await
        .map_err(|e| ApiError::store(e, READ_FAILED))?;
    Ok(Json(snap))
}

fn parse_delta(raw: &str) -> Result<i64, TallyError> {
    raw.parse::<i64>()
        .map_err(|e| TallyError::BadRequest(format!("value {raw:?} is not an integer: {e}")))
}
