//! Get-or-create of the series that groups an organization's crawls.

use crate::archive::{organization_json, ArchiveApi, NewSeries, Series};
use crate::config::SyncDefaults;
use crate::Result;
use std::collections::HashMap;
use tracing::{debug, info};

/// A series and whether this run created it.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesResolution {
    pub series: Series,
    pub created: bool,
}

/// Resolves `(organization, name)` to a series, creating it on first use.
///
/// Results are remembered for the rest of the run, so each key costs at
/// most one search and one create.
pub struct SeriesResolver<'a> {
    api: &'a dyn ArchiveApi,
    resolved: HashMap<(String, String), Series>,
}

impl<'a> SeriesResolver<'a> {
    pub fn new(api: &'a dyn ArchiveApi) -> Self {
        Self {
            api,
            resolved: HashMap::new(),
        }
    }

    pub async fn resolve(&mut self, organization_id: &str, name: &str) -> Result<SeriesResolution> {
        let key = (organization_id.to_string(), name.to_string());
        if let Some(series) = self.resolved.get(&key) {
            return Ok(SeriesResolution {
                series: series.clone(),
                created: false,
            });
        }

        let resolution = get_or_create_series(self.api, organization_id, name).await?;
        self.resolved.insert(key, resolution.series.clone());
        Ok(resolution)
    }
}

/// Search for the series by exact organization and name; create it when the
/// search comes back empty. The first search result wins.
pub async fn get_or_create_series(
    api: &dyn ArchiveApi,
    organization_id: &str,
    name: &str,
) -> Result<SeriesResolution> {
    let existing = api.find_series(organization_id, name).await?;
    if let Some(series) = existing.into_iter().next() {
        debug!(
            "Found series {} '{}' for organization {}",
            series.id, name, organization_id
        );
        return Ok(SeriesResolution {
            series,
            created: false,
        });
    }

    let series = api
        .create_series(&NewSeries {
            agency_id: organization_json(organization_id),
            name: name.to_string(),
            description: SyncDefaults::SERIES_DESCRIPTION.to_string(),
        })
        .await?;
    info!(
        "Created series {} '{}' for organization {}",
        series.id, name, organization_id
    );

    Ok(SeriesResolution {
        series,
        created: true,
    })
}
