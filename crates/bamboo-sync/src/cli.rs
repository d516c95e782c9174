//! Command-line and environment configuration.

use bamboo_sync::{FailurePolicy, SyncConfig, SyncDefaults};
use clap::Parser;

/// Configuration comes from the environment; flags override it.
#[derive(Parser, Debug)]
#[command(name = "bamboo-webrecorder-sync")]
#[command(about = "Sync Webrecorder collections into Bamboo series, crawls and WARCs")]
#[command(
    after_help = "Configure through the environment variables shown in brackets. \
                  The flags override them and are meant for one-off runs."
)]
pub struct Args {
    /// Bamboo base URL
    #[arg(long, env = "BAMBOO_URL")]
    pub bamboo_url: String,

    /// OpenID Connect realm URL, e.g. https://sso/auth/realms/pandas
    #[arg(long, env = "OIDC_URL")]
    pub oidc_url: String,

    /// OAuth client id of the sync service account
    #[arg(long, env = "OIDC_CLIENT_ID")]
    pub client_id: String,

    /// OAuth client secret of the sync service account
    #[arg(long, env = "OIDC_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: String,

    /// Webrecorder Redis database
    #[arg(long, env = "REDIS_URL", default_value = SyncDefaults::REDIS_URL)]
    pub redis_url: String,

    /// Series each organization's Webrecorder crawls are filed under
    #[arg(long, env = "SYNC_SERIES_NAME", default_value = SyncDefaults::SERIES_NAME)]
    pub series_name: String,

    /// URL prefix Webrecorder records for WARC files
    #[arg(long, env = "WARC_URL_PREFIX", default_value = SyncDefaults::WARC_URL_PREFIX)]
    pub warc_url_prefix: String,

    /// Local mount that replaces the URL prefix
    #[arg(long, env = "WARC_PATH_PREFIX", default_value = SyncDefaults::WARC_PATH_PREFIX)]
    pub warc_path_prefix: String,

    /// Keep going after a collection fails instead of stopping the run
    #[arg(long, env = "SYNC_ISOLATE_FAILURES")]
    pub isolate_failures: bool,

    /// Enable debug logging
    #[arg(short, long, env = "SYNC_DEBUG")]
    pub debug: bool,
}

impl Args {
    pub fn to_config(&self) -> bamboo_sync::Result<SyncConfig> {
        let mut config = SyncConfig::new(
            &self.bamboo_url,
            &self.oidc_url,
            &self.client_id,
            &self.client_secret,
        )?;
        config.redis_url = self.redis_url.clone();
        config.series_name = self.series_name.clone();
        config.warc_url_prefix = self.warc_url_prefix.clone();
        config.warc_path_prefix = self.warc_path_prefix.clone();
        config.failure_policy = if self.isolate_failures {
            FailurePolicy::Isolate
        } else {
            FailurePolicy::Abort
        };
        config.validate()?;
        Ok(config)
    }
}
