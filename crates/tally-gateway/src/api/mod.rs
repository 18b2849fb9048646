//! HTTP façade: `/data` and `/update/:key/:value`.

pub mod error;
pub mod handlers;

pub use error::ApiError;
