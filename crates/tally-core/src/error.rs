//! Shared error type across tally crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input / malformed request.
    BadRequest,
    /// Backend unreachable or rejected the command.
    StoreUnavailable,
    /// Config file or environment override rejected.
    InvalidConfig,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::StoreUnavailable => "STORE_UNAVAILABLE",
            ClientCode::InvalidConfig => "INVALID_CONFIG",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, TallyError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum TallyError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("store: {0}")]
    Store(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl TallyError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            TallyError::BadRequest(_) => ClientCode::BadRequest,
            TallyError::Store(_) => ClientCode::StoreUnavailable,
            TallyError::InvalidConfig(_) => ClientCode::InvalidConfig,
            TallyError::Internal(_) => ClientCode::Internal,
        }
    }
}
