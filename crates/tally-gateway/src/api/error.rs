//! HTTP mapping for `TallyError`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use tally_core::TallyError;

/// Error returned by API handlers.
///
/// `message` is what the client sees; for store failures it is a fixed
/// string and the backend detail stays in the logs.
#[derive(Debug)]
pub struct ApiError {
    err: TallyError,
    message: String,
}

impl ApiError {
    /// Wrap a store failure behind a generic client message.
    pub fn store(err: TallyError, message: &str) -> Self {
        let message = match err {
            TallyError::Store(_) | TallyError::Internal(_) => message.to_string(),
            _ => err.to_string(),
        };
        Self { err, message }
    }

    pub fn status(&self) -> StatusCode {
        match self.err {
            TallyError::BadRequest(_) => StatusCode::BAD_REQUEST,
            TallyError::Store(_) | TallyError::InvalidConfig(_) | TallyError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<TallyError> for ApiError {
    fn from(err: TallyError) -> Self {
        let message = err.to_string();
        Self { err, message }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.err.client_code().as_str(),
            "message": self.message,
        }));
        (self.status(), body).into_response()
    }
}
