//! Bamboo Sync - reconciles Webrecorder collections into Bamboo.
//!
//! Webrecorder records each collection in Redis. This crate makes every
//! collection discoverable in Bamboo by ensuring, per collection:
//! - the owner's organization has a "Webrecorder" series
//! - a crawl in that series mirrors the collection's title, description
//!   and creator
//! - every WARC file of the collection is uploaded to the crawl
//!
//! Re-running against unchanged data makes no writes.
//!
//! # Example
//!
//! ```rust,ignore
//! use bamboo_sync::{
//!     fetch_access_token, BambooClient, HttpClient, KeycloakDirectory, RedisStore, SyncConfig,
//!     SyncDriver, SyncOptions,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> bamboo_sync::Result<()> {
//!     let config = SyncConfig::new("http://bamboo", "https://sso/auth/realms/pandas", "id", "secret")?;
//!     let http = HttpClient::new("oidc")?;
//!     let token = fetch_access_token(&http, &config.oidc_url, &config.credentials).await?;
//!     let http = http.with_bearer_token(token.secret());
//!
//!     let store = RedisStore::connect(&config.redis_url).await?;
//!     let directory = KeycloakDirectory::new(http.clone(), config.oidc_admin_url());
//!     let bamboo = BambooClient::new(http, &config.bamboo_url);
//!
//!     let report = SyncDriver::new(&store, &directory, &bamboo, SyncOptions::from_config(&config))
//!         .run()
//!         .await?;
//!     println!("{} writes", report.writes());
//!     Ok(())
//! }
//! ```

pub mod archive;
pub mod config;
pub mod directory;
pub mod error;
pub mod network;
pub mod store;
pub mod sync;

// Re-export commonly used types
pub use archive::{ArchiveApi, BambooClient, Crawl, CrawlFields, CrawlPatch, Series, WarcArtifact};
pub use config::{ClientCredentials, FailurePolicy, SyncConfig, SyncDefaults};
pub use directory::{resolve_organization, Directory, DirectoryUser, KeycloakDirectory};
pub use error::{Result, SyncError};
pub use network::{fetch_access_token, AccessToken, HttpClient, Lookup};
pub use store::{CollectionRecord, CollectionStore, RedisStore, WarcEntries};
pub use sync::{CollectionOutcome, CrawlOutcome, SyncDriver, SyncOptions, SyncReport};
