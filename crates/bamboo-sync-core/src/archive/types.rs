//! Bamboo resource types.
//!
//! Bamboo exposes Spring Data REST resources: JSON objects with camelCase
//! fields and a `_links.self.href`. Crawls are kept as raw JSON objects so
//! that reconciliation can compare exactly what the server returned.

use crate::{Result, SyncError};
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::PathBuf;

/// Field names shared by the crawl payloads.
pub mod crawl_field {
    pub const COLLECTION_ID: &str = "webrecorderCollectionId";
    pub const CREATED: &str = "created";
    pub const CREATOR: &str = "creator";
    pub const DESCRIPTION: &str = "description";
    pub const NAME: &str = "name";
    pub const SERIES_ID: &str = "crawlSeriesId";
}

/// Numeric id of a resource: the `id` field, or the last segment of its
/// self link when the server does not expose ids.
pub(crate) fn resource_id(object: &Map<String, Value>) -> Option<i64> {
    if let Some(id) = object.get("id").and_then(value_as_i64) {
        return Some(id);
    }
    self_href(object)?
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .and_then(|segment| segment.parse().ok())
}

fn self_href(object: &Map<String, Value>) -> Option<&str> {
    object
        .get("_links")?
        .get("self")?
        .get("href")?
        .as_str()
}

fn value_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn into_object(value: Value, kind: &str) -> Result<Map<String, Value>> {
    match value {
        Value::Object(object) => Ok(object),
        other => Err(SyncError::Other(format!(
            "expected a {} object, got {}",
            kind, other
        ))),
    }
}

/// Organization ids are opaque strings in the directory but integers in
/// Bamboo; send a number whenever the id is numeric.
pub fn organization_json(organization_id: &str) -> Value {
    organization_id
        .parse::<i64>()
        .map(Value::from)
        .unwrap_or_else(|_| Value::String(organization_id.to_string()))
}

/// A crawl series.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub id: i64,
    pub organization_id: Option<String>,
    pub name: String,
}

impl Series {
    pub fn from_json(value: Value) -> Result<Self> {
        let object = into_object(value, "series")?;
        let id = resource_id(&object)
            .ok_or_else(|| SyncError::Other("series resource has no id".to_string()))?;
        let organization_id = object.get("agencyId").and_then(|v| match v {
            Value::Number(n) => Some(n.to_string()),
            Value::String(s) => Some(s.clone()),
            _ => None,
        });
        let name = object
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Ok(Self {
            id,
            organization_id,
            name,
        })
    }
}

/// Body for `POST /api/series`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSeries {
    pub agency_id: Value,
    pub name: String,
    pub description: String,
}

/// Fields of a crawl derived from a collection record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlFields {
    pub webrecorder_collection_id: String,
    /// Milliseconds since the epoch.
    pub created: i64,
    pub creator: String,
    pub description: String,
    pub name: String,
    pub crawl_series_id: i64,
}

impl CrawlFields {
    /// The fields as the JSON object Bamboo expects, in a stable order.
    pub fn to_json_fields(&self) -> Vec<(&'static str, Value)> {
        vec![
            (
                crawl_field::COLLECTION_ID,
                Value::from(self.webrecorder_collection_id.clone()),
            ),
            (crawl_field::CREATED, Value::from(self.created)),
            (crawl_field::CREATOR, Value::from(self.creator.clone())),
            (crawl_field::DESCRIPTION, Value::from(self.description.clone())),
            (crawl_field::NAME, Value::from(self.name.clone())),
            (crawl_field::SERIES_ID, Value::from(self.crawl_series_id)),
        ]
    }
}

/// A crawl as returned by Bamboo.
#[derive(Debug, Clone, PartialEq)]
pub struct Crawl {
    pub id: i64,
    fields: Map<String, Value>,
}

impl Crawl {
    pub fn from_json(value: Value) -> Result<Self> {
        let fields = into_object(value, "crawl")?;
        let id = resource_id(&fields)
            .ok_or_else(|| SyncError::Other("crawl resource has no id".to_string()))?;
        Ok(Self { id, fields })
    }

    /// Raw field value; `None` when absent.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn self_href(&self) -> Option<&str> {
        self_href(&self.fields)
    }

    /// Apply a patch locally so the crawl reflects what was written.
    pub fn apply(&mut self, patch: &CrawlPatch) {
        for (name, value) in patch.iter() {
            self.fields.insert(name.clone(), value.clone());
        }
    }
}

/// Changed crawl fields, sent as a partial update.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CrawlPatch(Map<String, Value>);

impl CrawlPatch {
    pub fn insert(&mut self, name: &str, value: Value) {
        self.0.insert(name.to_string(), value);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.0.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

/// An uploaded WARC file.
#[derive(Debug, Clone, PartialEq)]
pub struct WarcArtifact {
    pub id: Option<i64>,
    pub filename: String,
}

impl WarcArtifact {
    pub fn from_json(value: Value) -> Result<Self> {
        let object = into_object(value, "warc")?;
        Ok(Self {
            id: resource_id(&object),
            filename: object
                .get("filename")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        })
    }
}

/// A local WARC file ready to be streamed to Bamboo.
#[derive(Debug)]
pub struct WarcUpload {
    pub filename: String,
    pub path: PathBuf,
    pub length: u64,
    pub file: tokio::fs::File,
}
