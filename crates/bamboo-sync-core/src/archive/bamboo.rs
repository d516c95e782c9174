//! HTTP implementation of [`ArchiveApi`] against Bamboo's REST API.
//!
//! Search endpoints are Spring Data REST repository queries:
//! - list queries answer `{"_embedded": {"<collection>": [...]}}`
//! - single-result queries answer the resource itself, or 404
//!
//! WARC uploads go through the web endpoint
//! `POST /crawls/{id}/warcs/upload`, streamed from disk as the multipart
//! field `warcFile`.

use super::{ArchiveApi, Crawl, CrawlFields, CrawlPatch, NewSeries, Series, WarcArtifact, WarcUpload};
use crate::network::{join_url, HttpClient, Lookup};
use crate::{Result, SyncError};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tracing::{debug, info};

const UPLOAD_FIELD: &str = "warcFile";
const WARC_CONTENT_TYPE: &str = "application/warc";

/// Bamboo API client.
pub struct BambooClient {
    http: HttpClient,
    base_url: String,
}

impl BambooClient {
    pub fn new(http: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            http: http.for_service("bamboo"),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    fn crawl_url(&self, crawl: &Crawl) -> String {
        match crawl.self_href() {
            Some(href) => href.to_string(),
            None => self.url(&format!("/api/crawls/{}", crawl.id)),
        }
    }
}

/// Items of a Spring Data REST collection response.
///
/// An empty result still carries `_embedded.<rel>: []`, so a missing or
/// non-array relation means the response is not the expected resource.
fn embedded_items(mut body: Value, rel: &str) -> Result<Vec<Value>> {
    match body
        .get_mut("_embedded")
        .and_then(|embedded| embedded.get_mut(rel))
        .map(Value::take)
    {
        Some(Value::Array(items)) => Ok(items),
        Some(other) => Err(SyncError::Other(format!(
            "Expected _embedded.{} to be an array, got {}",
            rel, other
        ))),
        None => Err(SyncError::Other(format!(
            "Response has no _embedded.{} relation: {}",
            rel, body
        ))),
    }
}

#[async_trait]
impl ArchiveApi for BambooClient {
    async fn find_series(&self, organization_id: &str, name: &str) -> Result<Vec<Series>> {
        let url = self.url("/api/series/search/findByAgencyIdAndName");
        let body: Value = self
            .http
            .get_json(&url, &[("agencyId", organization_id), ("name", name)])
            .await?;

        embedded_items(body, "series")?
            .into_iter()
            .map(Series::from_json)
            .collect()
    }

    async fn create_series(&self, series: &NewSeries) -> Result<Series> {
        let body: Value = self.http.post_json(&self.url("/api/series"), series).await?;
        let created = Series::from_json(body)?;
        info!("Created series {} '{}'", created.id, created.name);
        Ok(created)
    }

    async fn find_crawl(&self, collection_id: &str) -> Result<Lookup<Crawl>> {
        let url = self.url("/api/crawls/search/findByWebrecorderCollectionId");
        let lookup: Lookup<Value> = self
            .http
            .lookup_json(&url, &[("webrecorderCollectionId", collection_id)])
            .await?;

        match lookup {
            Lookup::Found(body) => Ok(Lookup::Found(Crawl::from_json(body)?)),
            Lookup::NotFound => Ok(Lookup::NotFound),
        }
    }

    async fn create_crawl(&self, fields: &CrawlFields) -> Result<Crawl> {
        let body: Value = self.http.post_json(&self.url("/api/crawls"), fields).await?;
        Crawl::from_json(body)
    }

    async fn patch_crawl(&self, crawl: &Crawl, patch: &CrawlPatch) -> Result<()> {
        let url = self.crawl_url(crawl);
        debug!("Patching crawl {} fields {:?}", crawl.id, patch.field_names());
        self.http.patch_json(&url, patch).await
    }

    async fn find_warc(&self, filename: &str) -> Result<Lookup<WarcArtifact>> {
        let url = self.url("/api/warcs/search/findByFilename");
        let lookup: Lookup<Value> = self.http.lookup_json(&url, &[("filename", filename)]).await?;

        match lookup {
            Lookup::Found(body) => Ok(Lookup::Found(WarcArtifact::from_json(body)?)),
            Lookup::NotFound => Ok(Lookup::NotFound),
        }
    }

    async fn upload_warc(&self, crawl_id: i64, upload: WarcUpload) -> Result<()> {
        let url = self.url(&format!("/crawls/{}/warcs/upload", crawl_id));
        let WarcUpload {
            filename,
            path,
            length,
            file,
        } = upload;

        let part = Part::stream_with_length(reqwest::Body::from(file), length)
            .file_name(filename.clone())
            .mime_str(WARC_CONTENT_TYPE)
            .map_err(|e| SyncError::Network {
                message: format!("Invalid content type for {}: {}", path.display(), e),
                source: Some(e),
            })?;

        self.http
            .post_multipart(&url, Form::new().part(UPLOAD_FIELD, part))
            .await
    }
}
