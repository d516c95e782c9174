//! Upload of WARC files that Bamboo does not have yet.
//!
//! Files are matched by filename only. A file already known to Bamboo is
//! never compared or uploaded again.

use crate::archive::{ArchiveApi, WarcUpload};
use crate::network::Lookup;
use crate::store::WarcEntries;
use crate::{Result, SyncError};
use std::path::PathBuf;
use tracing::{debug, info};

/// Maps the URL Webrecorder recorded for a WARC onto the local mount that
/// holds the same file.
#[derive(Debug, Clone, PartialEq)]
pub struct PathRewrite {
    url_prefix: String,
    path_prefix: String,
}

impl PathRewrite {
    pub fn new(url_prefix: impl Into<String>, path_prefix: impl Into<String>) -> Self {
        Self {
            url_prefix: url_prefix.into(),
            path_prefix: path_prefix.into(),
        }
    }

    /// Local path for `url`. URLs outside the prefix are used as-is.
    pub fn local_path(&self, url: &str) -> PathBuf {
        match url.strip_prefix(&self.url_prefix) {
            Some(rest) => PathBuf::from(format!("{}{}", self.path_prefix, rest)),
            None => PathBuf::from(url),
        }
    }
}

/// Counts for one collection's WARC files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArtifactSummary {
    pub uploaded: usize,
    pub already_present: usize,
}

/// Upload every entry of `entries` that Bamboo has no WARC for.
pub async fn upload_missing_warcs(
    api: &dyn ArchiveApi,
    crawl_id: i64,
    entries: &WarcEntries,
    rewrite: &PathRewrite,
) -> Result<ArtifactSummary> {
    let mut summary = ArtifactSummary::default();

    for (filename, url) in entries {
        if let Lookup::Found(existing) = api.find_warc(filename).await? {
            debug!("WARC {} already in Bamboo (id {:?})", filename, existing.id);
            summary.already_present += 1;
            continue;
        }

        let path = rewrite.local_path(url);
        let upload = open_upload(filename, path).await?;
        let length = upload.length;
        api.upload_warc(crawl_id, upload).await?;
        info!(
            "Uploaded {} ({} bytes) to crawl {}",
            filename, length, crawl_id
        );
        summary.uploaded += 1;
    }

    Ok(summary)
}

async fn open_upload(filename: &str, path: PathBuf) -> Result<WarcUpload> {
    let file = tokio::fs::File::open(&path)
        .await
        .map_err(|e| SyncError::io_with_path(e, &path))?;
    let length = file
        .metadata()
        .await
        .map_err(|e| SyncError::io_with_path(e, &path))?
        .len();

    Ok(WarcUpload {
        filename: filename.to_string(),
        path,
        length,
        file,
    })
}
