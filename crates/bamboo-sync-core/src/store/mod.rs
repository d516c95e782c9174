//! Read-only access to Webrecorder's collection records.
//!
//! Webrecorder keeps one Redis hash per collection at `c:{id}:info` and a
//! hash of `filename -> url` at `c:{id}:warc`.

mod collection;
mod redis_store;

pub use collection::{collection_id_from_key, info_key, warc_key, CollectionRecord, WarcEntries};
pub use redis_store::RedisStore;

use crate::config::SyncDefaults;
use crate::Result;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::warn;

/// One batch of a cursor scan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanPage {
    /// Cursor for the next call; zero once the scan is complete.
    pub cursor: u64,
    pub keys: Vec<String>,
}

/// Key-value store operations used by the sync.
#[async_trait]
pub trait CollectionStore: Send + Sync {
    /// Scan keys matching a glob `pattern`, starting at `cursor`.
    async fn scan(&self, cursor: u64, pattern: &str, count: usize) -> Result<ScanPage>;

    /// All fields of the hash at `key`; empty when the key is missing.
    async fn hash_fields(&self, key: &str) -> Result<HashMap<String, String>>;
}

/// Lazily yields collection ids from a store, one page at a time.
///
/// Order is whatever the store returns. A key may be reported more than
/// once by a cursor scan; duplicates within a run are dropped.
pub struct CollectionScan<'a> {
    store: &'a dyn CollectionStore,
    cursor: u64,
    started: bool,
    buffered: VecDeque<String>,
    seen: HashSet<String>,
}

impl<'a> CollectionScan<'a> {
    pub fn new(store: &'a dyn CollectionStore) -> Self {
        Self {
            store,
            cursor: 0,
            started: false,
            buffered: VecDeque::new(),
            seen: HashSet::new(),
        }
    }

    /// Next collection id, or `None` when the scan is exhausted.
    pub async fn next(&mut self) -> Result<Option<String>> {
        loop {
            if let Some(id) = self.buffered.pop_front() {
                return Ok(Some(id));
            }
            if self.started && self.cursor == 0 {
                return Ok(None);
            }

            let page = self
                .store
                .scan(
                    self.cursor,
                    SyncDefaults::COLLECTION_KEY_PATTERN,
                    SyncDefaults::SCAN_BATCH_SIZE,
                )
                .await?;
            self.started = true;
            self.cursor = page.cursor;

            for key in page.keys {
                match collection_id_from_key(&key) {
                    Some(id) => {
                        if self.seen.insert(id.to_string()) {
                            self.buffered.push_back(id.to_string());
                        }
                    }
                    None => warn!("Ignoring key {} that does not name a collection", key),
                }
            }
        }
    }
}
