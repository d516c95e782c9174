//! Reconciliation of Webrecorder collections into Bamboo.
//!
//! Per collection, strictly in order:
//! 1. resolve the owner to an organization (skip if unknown)
//! 2. get or create the organization's series
//! 3. create or patch the crawl
//! 4. upload WARC files Bamboo does not have yet

pub mod artifacts;
pub mod crawl;
pub mod driver;
pub mod series;

pub use artifacts::{upload_missing_warcs, ArtifactSummary, PathRewrite};
pub use crawl::{candidate_fields, diff_crawl, reconcile_crawl, CrawlOutcome, ReconciledCrawl};
pub use driver::{CollectionOutcome, SyncDriver, SyncOptions};
pub use series::{get_or_create_series, SeriesResolution, SeriesResolver};

/// Totals for a sync run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncReport {
    pub collections_seen: usize,
    pub collections_skipped: usize,
    pub series_created: usize,
    pub crawls_created: usize,
    pub crawls_updated: usize,
    pub crawls_unchanged: usize,
    pub warcs_uploaded: usize,
    pub warcs_present: usize,
    /// Collection id and error message for each isolated failure.
    pub failures: Vec<(String, String)>,
}

impl SyncReport {
    pub fn record(&mut self, outcome: &CollectionOutcome) {
        match outcome {
            CollectionOutcome::Skipped { .. } => self.collections_skipped += 1,
            CollectionOutcome::Synced {
                series_created,
                crawl,
                artifacts,
            } => {
                if *series_created {
                    self.series_created += 1;
                }
                match crawl {
                    CrawlOutcome::Created => self.crawls_created += 1,
                    CrawlOutcome::Updated(_) => self.crawls_updated += 1,
                    CrawlOutcome::Unchanged => self.crawls_unchanged += 1,
                }
                self.warcs_uploaded += artifacts.uploaded;
                self.warcs_present += artifacts.already_present;
            }
        }
    }

    /// Number of create, patch and upload calls made against Bamboo.
    pub fn writes(&self) -> usize {
        self.series_created + self.crawls_created + self.crawls_updated + self.warcs_uploaded
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}
