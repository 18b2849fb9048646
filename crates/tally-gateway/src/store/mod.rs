//! Counter store contract and backends.
//!
//! The store is built once at startup and shared by every handler as
//! `Arc<dyn CounterStore>`. Mutation only ever goes through `increment`, which
//! each backend maps onto a single atomic add.

pub mod memory;
pub mod redis_store;

use std::sync::Arc;

use async_trait::async_trait;

use tally_core::{Result, Snapshot};

use crate::config::{StoreBackend, StoreSection};

pub use self::memory::MemoryStore;
pub use self::redis_store::RedisStore;

#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Backend name for logs and metric labels.
    fn backend(&self) -> &'static str;

    /// Set every absent fixed counter to `0`. Existing values are kept.
    async fn initialize(&self) -> Result<()>;

    /// Batch-read the fixed counters. Missing entries read as `0`.
    async fn read_all(&self) -> Result<Snapshot>;

    /// Atomically add `delta` to `key` and return the new value.
    ///
    /// `key` is not checked against the fixed set; unknown keys become loose
    /// entries that `read_all` never reports.
    async fn increment(&self, key: &str, delta: i64) -> Result<i64>;

    /// Round-trip to the backend.
    async fn ping(&self) -> Result<()>;
}

/// Build the configured backend. Redis connects eagerly so startup fails fast.
pub async fn connect(cfg: &StoreSection) -> Result<Arc<dyn CounterStore>> {
    match cfg.backend {
        StoreBackend::Redis => Ok(Arc::new(RedisStore::connect(&cfg.url).await?)),
        StoreBackend::Memory => Ok(Arc::new(MemoryStore::new())),
    }
}
