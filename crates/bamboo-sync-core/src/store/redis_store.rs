//! Redis implementation of [`CollectionStore`].

use super::{CollectionStore, ScanPage};
use crate::Result;
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use std::collections::HashMap;
use tracing::debug;

/// Webrecorder's Redis database.
pub struct RedisStore {
    connection: MultiplexedConnection,
}

impl RedisStore {
    /// Connect to `url`, e.g. `redis://127.0.0.1:6379/2`.
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let connection = client.get_multiplexed_async_connection().await?;
        debug!("Connected to Redis at {}", url);
        Ok(Self { connection })
    }
}

#[async_trait]
impl CollectionStore for RedisStore {
    async fn scan(&self, cursor: u64, pattern: &str, count: usize) -> Result<ScanPage> {
        let mut connection = self.connection.clone();
        let (cursor, keys): (u64, Vec<String>) = redis::cmd("SCAN")
            .arg(cursor)
            .arg("MATCH")
            .arg(pattern)
            .arg("COUNT")
            .arg(count)
            .query_async(&mut connection)
            .await?;
        Ok(ScanPage { cursor, keys })
    }

    async fn hash_fields(&self, key: &str) -> Result<HashMap<String, String>> {
        let mut connection = self.connection.clone();
        let fields: HashMap<String, String> = redis::cmd("HGETALL")
            .arg(key)
            .query_async(&mut connection)
            .await?;
        Ok(fields)
    }
}
