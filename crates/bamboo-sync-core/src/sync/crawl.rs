//! Crawl reconciliation.
//!
//! Each Webrecorder collection maps to exactly one crawl. An existing crawl
//! is patched with only the fields that drifted from the collection record.
//! `created` is written once at creation and never patched afterwards.

use crate::archive::types::crawl_field;
use crate::archive::{ArchiveApi, Crawl, CrawlFields, CrawlPatch, Series};
use crate::network::Lookup;
use crate::store::CollectionRecord;
use crate::Result;
use tracing::{debug, info};

/// What reconciliation did to the crawl.
#[derive(Debug, Clone, PartialEq)]
pub enum CrawlOutcome {
    Created,
    Updated(CrawlPatch),
    Unchanged,
}

/// The crawl after reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciledCrawl {
    pub crawl: Crawl,
    pub outcome: CrawlOutcome,
}

/// Fields a crawl should carry for `record` in `series`.
pub fn candidate_fields(record: &CollectionRecord, series: &Series) -> CrawlFields {
    CrawlFields {
        webrecorder_collection_id: record.id.clone(),
        created: record.created_millis(),
        creator: record.owner.clone(),
        description: record.description.clone(),
        name: record.title.clone(),
        crawl_series_id: series.id,
    }
}

/// Fields of `candidate` that differ from `existing`, excluding `created`.
///
/// A field missing from `existing` counts as different.
pub fn diff_crawl(candidate: &CrawlFields, existing: &Crawl) -> CrawlPatch {
    let mut patch = CrawlPatch::default();
    for (name, value) in candidate.to_json_fields() {
        if name == crawl_field::CREATED {
            continue;
        }
        if existing.field(name) != Some(&value) {
            patch.insert(name, value);
        }
    }
    patch
}

/// Ensure the crawl for `record` exists and matches it.
pub async fn reconcile_crawl(
    api: &dyn ArchiveApi,
    record: &CollectionRecord,
    series: &Series,
) -> Result<ReconciledCrawl> {
    let candidate = candidate_fields(record, series);

    match api.find_crawl(&record.id).await? {
        Lookup::NotFound => {
            let crawl = api.create_crawl(&candidate).await?;
            info!("Created crawl {} for collection {}", crawl.id, record.id);
            Ok(ReconciledCrawl {
                crawl,
                outcome: CrawlOutcome::Created,
            })
        }
        Lookup::Found(mut crawl) => {
            let patch = diff_crawl(&candidate, &crawl);
            if patch.is_empty() {
                debug!("Crawl {} for collection {} is up to date", crawl.id, record.id);
                return Ok(ReconciledCrawl {
                    crawl,
                    outcome: CrawlOutcome::Unchanged,
                });
            }

            api.patch_crawl(&crawl, &patch).await?;
            info!(
                "Updated crawl {} for collection {}: {:?}",
                crawl.id,
                record.id,
                patch.field_names()
            );
            crawl.apply(&patch);
            Ok(ReconciledCrawl {
                crawl,
                outcome: CrawlOutcome::Updated(patch),
            })
        }
    }
}
