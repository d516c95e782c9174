//! In-memory stand-ins for Redis, Keycloak and Bamboo.

#![allow(dead_code)]

pub mod http;

use async_trait::async_trait;
use bamboo_sync::archive::{NewSeries, WarcUpload};
use bamboo_sync::store::ScanPage;
use bamboo_sync::{
    ArchiveApi, CollectionStore, Crawl, CrawlFields, CrawlPatch, Directory, DirectoryUser, Lookup,
    Result, Series, SyncError, WarcArtifact,
};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Redis stand-in. Keys are scanned in sorted order, two per page.
#[derive(Default)]
pub struct MemoryStore {
    hashes: Mutex<BTreeMap<String, HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn put_collection(&self, id: &str, owner: &str, created_at: i64, title: &str, desc: &str) {
        let mut fields = HashMap::new();
        fields.insert("owner".to_string(), owner.to_string());
        fields.insert("created_at".to_string(), created_at.to_string());
        fields.insert("title".to_string(), title.to_string());
        fields.insert("desc".to_string(), desc.to_string());
        self.hashes
            .lock()
            .unwrap()
            .insert(format!("c:{}:info", id), fields);
    }

    pub fn set_field(&self, key: &str, field: &str, value: &str) {
        self.hashes
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_default()
            .insert(field.to_string(), value.to_string());
    }

    pub fn put_warc(&self, id: &str, filename: &str, url: &str) {
        self.set_field(&format!("c:{}:warc", id), filename, url);
    }
}

fn glob_matches(pattern: &str, key: &str) -> bool {
    match pattern.split_once('*') {
        Some((prefix, suffix)) => {
            key.len() >= prefix.len() + suffix.len()
                && key.starts_with(prefix)
                && key.ends_with(suffix)
        }
        None => pattern == key,
    }
}

#[async_trait]
impl CollectionStore for MemoryStore {
    async fn scan(&self, cursor: u64, pattern: &str, _count: usize) -> Result<ScanPage> {
        const PAGE: usize = 2;
        let hashes = self.hashes.lock().unwrap();
        let keys: Vec<&String> = hashes.keys().collect();
        let start = cursor as usize;
        let end = (start + PAGE).min(keys.len());
        let page = keys[start.min(end)..end]
            .iter()
            .filter(|key| glob_matches(pattern, key))
            .map(|key| key.to_string())
            .collect();
        let next = if end >= keys.len() { 0 } else { end as u64 };
        Ok(ScanPage {
            cursor: next,
            keys: page,
        })
    }

    async fn hash_fields(&self, key: &str) -> Result<HashMap<String, String>> {
        Ok(self
            .hashes
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .unwrap_or_default())
    }
}

/// Keycloak stand-in with substring search semantics.
#[derive(Default)]
pub struct FakeDirectory {
    users: Vec<DirectoryUser>,
    pub searches: Mutex<usize>,
}

impl FakeDirectory {
    pub fn with_user(mut self, username: &str, agency: Option<&str>) -> Self {
        let mut attributes = HashMap::new();
        if let Some(agency) = agency {
            attributes.insert("agencyId".to_string(), vec![agency.to_string()]);
        }
        self.users.push(DirectoryUser {
            username: username.to_string(),
            attributes,
        });
        self
    }
}

#[async_trait]
impl Directory for FakeDirectory {
    async fn search_users(&self, query: &str) -> Result<Vec<DirectoryUser>> {
        *self.searches.lock().unwrap() += 1;
        Ok(self
            .users
            .iter()
            .filter(|user| user.username.contains(query))
            .cloned()
            .collect())
    }
}

/// A recorded WARC upload.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedUpload {
    pub crawl_id: i64,
    pub filename: String,
    pub path: PathBuf,
    pub length: u64,
}

#[derive(Default)]
struct ArchiveState {
    next_id: i64,
    series: Vec<(String, Series)>,
    crawls: Vec<Value>,
    warcs: HashMap<String, i64>,
    series_searches: usize,
    series_created: usize,
    crawls_created: usize,
    patches: Vec<(i64, CrawlPatch)>,
    uploads: Vec<RecordedUpload>,
    fail_uploads_of: Option<String>,
}

/// Bamboo stand-in that records every write.
#[derive(Default)]
pub struct FakeArchive {
    state: Mutex<ArchiveState>,
}

impl FakeArchive {
    fn next_id(state: &mut ArchiveState) -> i64 {
        state.next_id += 1;
        state.next_id
    }

    pub fn seed_series(&self, organization_id: &str, name: &str) -> i64 {
        let mut state = self.state.lock().unwrap();
        let id = Self::next_id(&mut state);
        state.series.push((
            organization_id.to_string(),
            Series {
                id,
                organization_id: Some(organization_id.to_string()),
                name: name.to_string(),
            },
        ));
        id
    }

    pub fn seed_crawl(&self, crawl: Value) {
        self.state.lock().unwrap().crawls.push(crawl);
    }

    pub fn seed_warc(&self, filename: &str, crawl_id: i64) {
        self.state
            .lock()
            .unwrap()
            .warcs
            .insert(filename.to_string(), crawl_id);
    }

    pub fn fail_uploads_of(&self, filename: &str) {
        self.state.lock().unwrap().fail_uploads_of = Some(filename.to_string());
    }

    pub fn series_searches(&self) -> usize {
        self.state.lock().unwrap().series_searches
    }

    pub fn series_created(&self) -> usize {
        self.state.lock().unwrap().series_created
    }

    pub fn crawls_created(&self) -> usize {
        self.state.lock().unwrap().crawls_created
    }

    pub fn patches(&self) -> Vec<(i64, CrawlPatch)> {
        self.state.lock().unwrap().patches.clone()
    }

    pub fn uploads(&self) -> Vec<RecordedUpload> {
        self.state.lock().unwrap().uploads.clone()
    }

    pub fn crawls(&self) -> Vec<Value> {
        self.state.lock().unwrap().crawls.clone()
    }

    pub fn crawl_for(&self, collection_id: &str) -> Option<Value> {
        self.crawls()
            .into_iter()
            .find(|c| c["webrecorderCollectionId"] == collection_id)
    }

    /// Total create, patch and upload calls.
    pub fn writes(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.series_created + state.crawls_created + state.patches.len() + state.uploads.len()
    }
}

#[async_trait]
impl ArchiveApi for FakeArchive {
    async fn find_series(&self, organization_id: &str, name: &str) -> Result<Vec<Series>> {
        let mut state = self.state.lock().unwrap();
        state.series_searches += 1;
        Ok(state
            .series
            .iter()
            .filter(|(org, series)| org == organization_id && series.name == name)
            .map(|(_, series)| series.clone())
            .collect())
    }

    async fn create_series(&self, series: &NewSeries) -> Result<Series> {
        let mut state = self.state.lock().unwrap();
        let id = Self::next_id(&mut state);
        let organization_id = match &series.agency_id {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        let created = Series {
            id,
            organization_id: Some(organization_id.clone()),
            name: series.name.clone(),
        };
        state.series.push((organization_id, created.clone()));
        state.series_created += 1;
        Ok(created)
    }

    async fn find_crawl(&self, collection_id: &str) -> Result<Lookup<Crawl>> {
        let state = self.state.lock().unwrap();
        match state
            .crawls
            .iter()
            .find(|crawl| crawl["webrecorderCollectionId"] == collection_id)
        {
            Some(crawl) => Ok(Lookup::Found(Crawl::from_json(crawl.clone())?)),
            None => Ok(Lookup::NotFound),
        }
    }

    async fn create_crawl(&self, fields: &CrawlFields) -> Result<Crawl> {
        let mut state = self.state.lock().unwrap();
        let id = Self::next_id(&mut state);
        let mut crawl = serde_json::to_value(fields)?;
        crawl["id"] = json!(id);
        crawl["_links"] = json!({"self": {"href": format!("http://bamboo/api/crawls/{}", id)}});
        state.crawls.push(crawl.clone());
        state.crawls_created += 1;
        Crawl::from_json(crawl)
    }

    async fn patch_crawl(&self, crawl: &Crawl, patch: &CrawlPatch) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let stored = state
            .crawls
            .iter_mut()
            .find(|c| c["id"] == crawl.id)
            .ok_or_else(|| SyncError::Upstream {
                service: "bamboo".into(),
                method: "PATCH".into(),
                url: format!("http://bamboo/api/crawls/{}", crawl.id),
                status: 404,
                body: None,
            })?;
        for (name, value) in patch.iter() {
            stored[name.as_str()] = value.clone();
        }
        state.patches.push((crawl.id, patch.clone()));
        Ok(())
    }

    async fn find_warc(&self, filename: &str) -> Result<Lookup<WarcArtifact>> {
        let state = self.state.lock().unwrap();
        match state.warcs.get(filename) {
            Some(_) => Ok(Lookup::Found(WarcArtifact {
                id: None,
                filename: filename.to_string(),
            })),
            None => Ok(Lookup::NotFound),
        }
    }

    async fn upload_warc(&self, crawl_id: i64, upload: WarcUpload) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_uploads_of.as_deref() == Some(upload.filename.as_str()) {
            return Err(SyncError::Upstream {
                service: "bamboo".into(),
                method: "POST".into(),
                url: format!("http://bamboo/crawls/{}/warcs/upload", crawl_id),
                status: 500,
                body: Some(json!({"error": "disk full"})),
            });
        }
        state.warcs.insert(upload.filename.clone(), crawl_id);
        state.uploads.push(RecordedUpload {
            crawl_id,
            filename: upload.filename,
            path: upload.path,
            length: upload.length,
        });
        Ok(())
    }
}

/// Collects formatted log lines for the current thread.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    /// Route this thread's tracing events here until the guard drops.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let logs = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || logs.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    /// Lines logged at WARN level.
    pub fn warnings(&self) -> Vec<String> {
        self.contents()
            .lines()
            .filter(|line| line.contains(" WARN "))
            .map(str::to_string)
            .collect()
    }
}

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
