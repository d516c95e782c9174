//! Bearer token acquisition via OpenID Connect client credentials.
//!
//! The token endpoint is discovered from the provider's well-known
//! configuration document. A token is fetched once per process and is never
//! refreshed, so a run must finish within the token's lifetime.

use super::client::{join_url, HttpClient};
use crate::config::{ClientCredentials, NetworkConfig};
use crate::{Result, SyncError};
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, warn};

/// The subset of the OpenID provider metadata we need.
#[derive(Debug, Clone, Deserialize)]
pub struct OidcDiscovery {
    pub token_endpoint: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// An access token issued to this process.
#[derive(Clone)]
pub struct AccessToken {
    secret: String,
    expires_in: Option<Duration>,
}

impl AccessToken {
    pub fn new(secret: impl Into<String>, expires_in: Option<Duration>) -> Self {
        Self {
            secret: secret.into(),
            expires_in,
        }
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("secret", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Discover the token endpoint and exchange client credentials for a token.
pub async fn fetch_access_token(
    http: &HttpClient,
    oidc_url: &str,
    credentials: &ClientCredentials,
) -> Result<AccessToken> {
    let discovery_url = join_url(oidc_url, NetworkConfig::WELL_KNOWN_PATH);
    let discovery: OidcDiscovery = http.get_json(&discovery_url, &[]).await?;

    let response: TokenResponse = http
        .post_form(
            &discovery.token_endpoint,
            &[
                ("grant_type", "client_credentials"),
                ("client_id", credentials.client_id.as_str()),
                ("client_secret", credentials.client_secret.as_str()),
            ],
        )
        .await?;

    token_from_response(response, &credentials.client_id)
}

fn token_from_response(response: TokenResponse, client_id: &str) -> Result<AccessToken> {
    if response.access_token.trim().is_empty() {
        return Err(SyncError::Auth {
            message: format!("token endpoint returned an empty token for {}", client_id),
        });
    }

    let expires_in = response.expires_in.map(Duration::from_secs);
    match expires_in {
        Some(lifetime) if lifetime < Duration::from_secs(300) => warn!(
            "Access token for {} expires in {:?}; long runs may fail part way",
            client_id, lifetime
        ),
        _ => info!("Obtained access token for client {}", client_id),
    }

    Ok(AccessToken::new(response.access_token, expires_in))
}
