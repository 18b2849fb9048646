use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use tally_core::error::{Result, TallyError};
use tally_core::{Counter, Snapshot};

use super::CounterStore;

/// Redis backend.
///
/// Holds one multiplexed `ConnectionManager`; clones share the underlying
/// connection and reconnect transparently after a drop.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| TallyError::InvalidConfig(format!("redis url {url}: {e}")))?;
        let conn = ConnectionManager::new(client).await.map_err(store_err)?;
        tracing::info!(%url, "redis client connected");
        Ok(Self { conn })
    }
}

fn store_err(e: redis::RedisError) -> TallyError {
    TallyError::Store(e.to_string())
}

#[async_trait]
impl CounterStore for RedisStore {
    fn backend(&self) -> &'static str {
        "redis"
    }

    async fn initialize(&self) -> Result<()> {
        let mut pipe = redis::pipe();
        pipe.atomic();
        for key in Counter::keys() {
            pipe.cmd("SET").arg(key).arg(0).arg("NX").ignore();
        }

        let mut conn = self.conn.clone();
        let () = pipe.query_async(&mut conn).await.map_err(store_err)?;
        Ok(())
    }

    async fn read_all(&self) -> Result<Snapshot> {
        let mut conn = self.conn.clone();
        let values: Vec<Option<i64>> = conn.mget(&Counter::keys()[..]).await.map_err(store_err)?;
        Ok(Snapshot::from_values(values))
    }

    async fn increment(&self, key: &str, delta: i64) -> Result<i64> {
        let mut conn = self.conn.clone();
        let value: i64 = conn.incr(key, delta).await.map_err(store_err)?;
        Ok(value)
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(store_err)?;
        Ok(())
    }
}
