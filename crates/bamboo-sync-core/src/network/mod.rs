//! Network plumbing shared by the upstream clients.
//!
//! This module provides:
//! - An HTTP client wrapper with bearer auth and typed lookup outcomes
//! - OpenID Connect discovery and the client-credentials token exchange

mod auth;
mod client;

pub use auth::{fetch_access_token, AccessToken, OidcDiscovery};
pub use client::{join_url, HttpClient, Lookup};
