//! Collection records as stored by Webrecorder.

use crate::{Result, SyncError};
use std::collections::{BTreeMap, HashMap};

pub fn info_key(collection_id: &str) -> String {
    format!("c:{}:info", collection_id)
}

pub fn warc_key(collection_id: &str) -> String {
    format!("c:{}:warc", collection_id)
}

/// Extract `id` from `c:{id}:info`.
pub fn collection_id_from_key(key: &str) -> Option<&str> {
    let mut parts = key.split(':');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some("c"), Some(id), Some("info"), None) if !id.is_empty() => Some(id),
        _ => None,
    }
}

/// WARC files of a collection: filename to recorded URL, in filename order.
pub type WarcEntries = BTreeMap<String, String>;

/// The `c:{id}:info` hash of a collection.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionRecord {
    pub id: String,
    pub owner: String,
    /// Seconds since the epoch.
    pub created_at: i64,
    pub title: String,
    pub description: String,
}

impl CollectionRecord {
    /// Build a record from the raw hash fields.
    ///
    /// `owner` and `created_at` are required. Title and description default
    /// to empty strings.
    pub fn from_fields(id: &str, fields: &HashMap<String, String>) -> Result<Self> {
        let key = info_key(id);
        let required = |name: &str| {
            fields.get(name).ok_or_else(|| SyncError::MalformedRecord {
                key: key.clone(),
                field: format!("missing '{}'", name),
            })
        };

        let owner = required("owner")?.clone();
        let created_raw = required("created_at")?;
        let created_at = created_raw
            .trim()
            .parse::<i64>()
            .map_err(|_| SyncError::MalformedRecord {
                key: key.clone(),
                field: format!("created_at '{}' is not an integer", created_raw),
            })?;

        Ok(Self {
            id: id.to_string(),
            owner,
            created_at,
            title: fields.get("title").cloned().unwrap_or_default(),
            description: fields.get("desc").cloned().unwrap_or_default(),
        })
    }

    /// Creation time in milliseconds, as Bamboo stores it.
    pub fn created_millis(&self) -> i64 {
        self.created_at.saturating_mul(1000)
    }
}
