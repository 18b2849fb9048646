//! Shared application state for the tally gateway.
//!
//! The counter store is constructed by the caller and injected here, so the
//! same router runs against Redis in production and `MemoryStore` or any
//! other double in tests.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use tally_core::Result;

use crate::config::TallyConfig;
use crate::obs::TallyMetrics;
use crate::store::CounterStore;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: TallyConfig,
    store: Arc<dyn CounterStore>,
    metrics: TallyMetrics,
}

impl AppState {
    pub fn new(cfg: TallyConfig, store: Arc<dyn CounterStore>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                cfg,
                store,
                metrics: TallyMetrics::default(),
            }),
        }
    }

    pub fn cfg(&self) -> &TallyConfig {
        &self.inner.cfg
    }

    pub fn store(&self) -> &dyn CounterStore {
        self.inner.store.as_ref()
    }

    pub fn metrics(&self) -> &TallyMetrics {
        &self.inner.metrics
    }

    pub fn set_draining(&self) {
        self.inner.metrics.set_draining();
    }

    pub fn is_draining(&self) -> bool {
        self.inner.metrics.is_draining()
    }

    /// Run one store operation, recording its latency and outcome.
    pub async fn store_op<T, F>(&self, op: &'static str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let started = Instant::now();
        let res = fut.await;
        let metrics = self.metrics();
        metrics
            .store_op_duration
            .observe(&[("op", op)], started.elapsed());

        match &res {
            Ok(_) => metrics.store_ops.inc(&[("op", op), ("outcome", "ok")]),
            Err(e) => {
                metrics.store_ops.inc(&[("op", op), ("outcome", "error")]);
                tracing::error!(op, backend = self.store().backend(), error = %e, "store operation failed");
            }
        }
        res
    }
}
