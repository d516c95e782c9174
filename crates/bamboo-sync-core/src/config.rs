//! Centralized configuration for the sync.
//!
//! Constants mirror the Webrecorder deployment layout and the Bamboo API
//! paths. [`SyncConfig`] holds the per-run settings assembled by the binary.

use crate::{Result, SyncError};

/// Fixed values shared by every run.
pub struct SyncDefaults;

impl SyncDefaults {
    pub const SERIES_NAME: &'static str = "Webrecorder";
    pub const SERIES_DESCRIPTION: &'static str =
        "Created automatically by bamboo-webrecorder-sync. Do not rename.";
    pub const REDIS_URL: &'static str = "redis://127.0.0.1:6379/2";
    pub const WARC_URL_PREFIX: &'static str = "http://nginx:6090/";
    pub const WARC_PATH_PREFIX: &'static str = "/opt/webrecorder/";
    pub const COLLECTION_KEY_PATTERN: &'static str = "c:*:info";
    pub const SCAN_BATCH_SIZE: usize = 1000;
}

/// Network-related configuration.
///
/// No timeouts are set: a WARC upload may take as long as it needs.
pub struct NetworkConfig;

impl NetworkConfig {
    pub const USER_AGENT: &'static str = "bamboo-webrecorder-sync/0.1";
    pub const WELL_KNOWN_PATH: &'static str = "/.well-known/openid-configuration";
}

/// What happens to the rest of the run when one collection fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// The first failing collection ends the whole run.
    #[default]
    Abort,
    /// Log the failure, count it, and carry on with the next collection.
    Isolate,
}

/// Client credentials for the identity provider.
#[derive(Clone)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Settings for a single sync run.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub bamboo_url: String,
    pub oidc_url: String,
    pub credentials: ClientCredentials,
    pub redis_url: String,
    pub series_name: String,
    pub warc_url_prefix: String,
    pub warc_path_prefix: String,
    pub failure_policy: FailurePolicy,
}

impl SyncConfig {
    /// Build a config with defaults for everything but the required values.
    ///
    /// Trailing slashes are stripped from both base URLs.
    pub fn new(
        bamboo_url: &str,
        oidc_url: &str,
        client_id: &str,
        client_secret: &str,
    ) -> Result<Self> {
        let config = Self {
            bamboo_url: bamboo_url.trim_end_matches('/').to_string(),
            oidc_url: oidc_url.trim_end_matches('/').to_string(),
            credentials: ClientCredentials {
                client_id: client_id.to_string(),
                client_secret: client_secret.to_string(),
            },
            redis_url: SyncDefaults::REDIS_URL.to_string(),
            series_name: SyncDefaults::SERIES_NAME.to_string(),
            warc_url_prefix: SyncDefaults::WARC_URL_PREFIX.to_string(),
            warc_path_prefix: SyncDefaults::WARC_PATH_PREFIX.to_string(),
            failure_policy: FailurePolicy::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that the required values are present and the URLs parse.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("BAMBOO_URL", &self.bamboo_url),
            ("OIDC_URL", &self.oidc_url),
            ("OIDC_CLIENT_ID", &self.credentials.client_id),
            ("OIDC_CLIENT_SECRET", &self.credentials.client_secret),
        ] {
            if value.trim().is_empty() {
                return Err(SyncError::Config {
                    message: format!("{} must not be empty", name),
                });
            }
        }

        for (name, value) in [("BAMBOO_URL", &self.bamboo_url), ("OIDC_URL", &self.oidc_url)] {
            url::Url::parse(value).map_err(|e| SyncError::Config {
                message: format!("{} is not a valid URL ({}): {}", name, value, e),
            })?;
        }

        if self.series_name.trim().is_empty() {
            return Err(SyncError::Config {
                message: "series name must not be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Keycloak admin API base for the configured realm.
    ///
    /// `https://sso/auth/realms/pandas` becomes
    /// `https://sso/auth/admin/realms/pandas`.
    pub fn oidc_admin_url(&self) -> String {
        self.oidc_url.replacen("/realms/", "/admin/realms/", 1)
    }
}
