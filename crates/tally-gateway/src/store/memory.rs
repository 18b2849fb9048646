use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;

use tally_core::error::{Result, TallyError};
use tally_core::{Counter, Snapshot};

use super::CounterStore;

/// In-process backend: one `AtomicI64` per key.
///
/// Increments are a CAS loop on the key's atomic, so concurrent adds on the
/// same key never lose an update.
#[derive(Default)]
pub struct MemoryStore {
    values: DashMap<String, AtomicI64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            values: DashMap::new(),
        }
    }

    /// Seed raw entries, bypassing `initialize`.
    pub fn with_values<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, i64)>,
        K: Into<String>,
    {
        let store = Self::new();
        for (k, v) in entries {
            store.values.insert(k.into(), AtomicI64::new(v));
        }
        store
    }

    /// Raw lookup of any key, fixed or loose.
    pub fn get(&self, key: &str) -> Option<i64> {
        self.values.get(key).map(|v| v.load(Ordering::SeqCst))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[async_trait]
impl CounterStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn initialize(&self) -> Result<()> {
        for key in Counter::keys() {
            self.values
                .entry(key.to_string())
                .or_insert_with(|| AtomicI64::new(0));
        }
        Ok(())
    }

    async fn read_all(&self) -> Result<Snapshot> {
        Ok(Snapshot::from_values(
            Counter::keys().into_iter().map(|k| self.get(k)),
        ))
    }

    async fn increment(&self, key: &str, delta: i64) -> Result<i64> {
        let slot = self
            .values
            .entry(key.to_string())
            .or_insert_with(|| AtomicI64::new(0));

        // Same contract as INCRBY: an overflowing add fails and leaves the value as is.
        slot.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |cur| cur.checked_add(delta))
            .map(|prev| prev + delta)
            .map_err(|cur| {
                TallyError::Store(format!("increment of {key} by {delta} overflows {cur}"))
            })
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
