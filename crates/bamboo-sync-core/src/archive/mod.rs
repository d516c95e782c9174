//! Archival management API: series, crawls and WARC files in Bamboo.

mod bamboo;
pub mod types;

pub use bamboo::BambooClient;
pub use types::{
    organization_json, Crawl, CrawlFields, CrawlPatch, NewSeries, Series, WarcArtifact, WarcUpload,
};

use crate::network::Lookup;
use crate::Result;
use async_trait::async_trait;

/// Operations the sync needs from the archival management system.
///
/// Lookups that can legitimately find nothing return [`Lookup`]; any
/// other failure is an error.
#[async_trait]
pub trait ArchiveApi: Send + Sync {
    /// Series with exactly this organization and name.
    async fn find_series(&self, organization_id: &str, name: &str) -> Result<Vec<Series>>;

    async fn create_series(&self, series: &NewSeries) -> Result<Series>;

    /// The crawl recorded for a Webrecorder collection.
    async fn find_crawl(&self, collection_id: &str) -> Result<Lookup<Crawl>>;

    async fn create_crawl(&self, fields: &CrawlFields) -> Result<Crawl>;

    /// Partial update carrying only the fields in `patch`.
    async fn patch_crawl(&self, crawl: &Crawl, patch: &CrawlPatch) -> Result<()>;

    async fn find_warc(&self, filename: &str) -> Result<Lookup<WarcArtifact>>;

    /// Upload a WARC file and attach it to `crawl_id`.
    async fn upload_warc(&self, crawl_id: i64, upload: WarcUpload) -> Result<()>;
}
