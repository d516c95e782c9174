//! The sync run: scan collections and reconcile each one in turn.

use super::artifacts::{upload_missing_warcs, ArtifactSummary, PathRewrite};
use super::crawl::{reconcile_crawl, CrawlOutcome};
use super::series::SeriesResolver;
use super::SyncReport;
use crate::archive::ArchiveApi;
use crate::config::{FailurePolicy, SyncConfig};
use crate::directory::{resolve_organization, Directory};
use crate::store::{
    info_key, warc_key, CollectionRecord, CollectionScan, CollectionStore, WarcEntries,
};
use crate::Result;
use tracing::{error, info, warn};

/// Per-run settings for [`SyncDriver`].
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub series_name: String,
    pub path_rewrite: PathRewrite,
    pub failure_policy: FailurePolicy,
}

impl SyncOptions {
    pub fn from_config(config: &SyncConfig) -> Self {
        Self {
            series_name: config.series_name.clone(),
            path_rewrite: PathRewrite::new(&config.warc_url_prefix, &config.warc_path_prefix),
            failure_policy: config.failure_policy,
        }
    }
}

/// Result of processing one collection.
#[derive(Debug, Clone, PartialEq)]
pub enum CollectionOutcome {
    /// The owner has no organization; nothing was written.
    Skipped { owner: String },
    Synced {
        series_created: bool,
        crawl: CrawlOutcome,
        artifacts: ArtifactSummary,
    },
}

/// Drives identity, series, crawl and WARC reconciliation per collection.
pub struct SyncDriver<'a> {
    store: &'a dyn CollectionStore,
    directory: &'a dyn Directory,
    archive: &'a dyn ArchiveApi,
    options: SyncOptions,
}

impl<'a> SyncDriver<'a> {
    pub fn new(
        store: &'a dyn CollectionStore,
        directory: &'a dyn Directory,
        archive: &'a dyn ArchiveApi,
        options: SyncOptions,
    ) -> Self {
        Self {
            store,
            directory,
            archive,
            options,
        }
    }

    /// Process every collection in the store, one at a time.
    ///
    /// Under [`FailurePolicy::Abort`] the first failing collection ends the
    /// run with its error. Under [`FailurePolicy::Isolate`] failures are
    /// logged and counted in the report. Store scan errors always end the run.
    pub async fn run(&self) -> Result<SyncReport> {
        let mut report = SyncReport::default();
        let mut series = SeriesResolver::new(self.archive);
        let mut scan = CollectionScan::new(self.store);

        while let Some(collection_id) = scan.next().await? {
            report.collections_seen += 1;

            match self.sync_collection(&collection_id, &mut series).await {
                Ok(outcome) => report.record(&outcome),
                Err(err) => match self.options.failure_policy {
                    FailurePolicy::Abort => return Err(err),
                    FailurePolicy::Isolate => {
                        error!("Collection {} failed: {}", collection_id, err);
                        report.failures.push((collection_id, err.to_string()));
                    }
                },
            }
        }

        info!(
            "Sync finished: {} collections, {} skipped, {} failed, {} writes",
            report.collections_seen,
            report.collections_skipped,
            report.failures.len(),
            report.writes()
        );
        Ok(report)
    }

    /// Reconcile a single collection by id.
    pub async fn sync_collection(
        &self,
        collection_id: &str,
        series: &mut SeriesResolver<'_>,
    ) -> Result<CollectionOutcome> {
        let fields = self.store.hash_fields(&info_key(collection_id)).await?;
        let record = CollectionRecord::from_fields(collection_id, &fields)?;

        let Some(organization_id) = resolve_organization(self.directory, &record.owner).await?
        else {
            warn!(
                "User '{}' has no agencyId attribute in the directory; ignoring collection {}",
                record.owner, record.id
            );
            return Ok(CollectionOutcome::Skipped {
                owner: record.owner,
            });
        };

        let resolution = series
            .resolve(&organization_id, &self.options.series_name)
            .await?;
        info!(
            "Collection {} owner {} organization {} series {}",
            record.id, record.owner, organization_id, resolution.series.id
        );

        let reconciled = reconcile_crawl(self.archive, &record, &resolution.series).await?;

        let entries: WarcEntries = self
            .store
            .hash_fields(&warc_key(collection_id))
            .await?
            .into_iter()
            .collect();
        let artifacts = upload_missing_warcs(
            self.archive,
            reconciled.crawl.id,
            &entries,
            &self.options.path_rewrite,
        )
        .await?;

        Ok(CollectionOutcome::Synced {
            series_created: resolution.created,
            crawl: reconciled.outcome,
            artifacts,
        })
    }
}
