//! tally gateway library entry.
//!
//! Wires config, the counter store, the HTTP façade, and ops endpoints into
//! one router. Consumed by the binary (`main.rs`) and by integration tests.

pub mod api;
pub mod app_state;
pub mod config;
pub mod obs;
pub mod ops;
pub mod router;
pub mod store;
