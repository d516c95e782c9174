//! bamboo-webrecorder-sync - one reconciliation pass from Webrecorder into Bamboo.
//!
//! Meant to be run periodically by an external scheduler. The service
//! account needs the Keycloak roles `realm:panadmin`,
//! `realm-management:query-users` and `realm-management:view-users`.

mod cli;

use anyhow::{Context, Result};
use bamboo_sync::{
    fetch_access_token, BambooClient, HttpClient, KeycloakDirectory, RedisStore, SyncDriver,
    SyncError, SyncOptions, SyncReport,
};
use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = cli::Args::parse();

    // Set up logging
    let log_level = if args.debug { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    match run(&args).await {
        Ok(report) if report.is_success() => ExitCode::SUCCESS,
        Ok(report) => {
            for (collection_id, message) in &report.failures {
                error!("Collection {} was not synced: {}", collection_id, message);
            }
            ExitCode::FAILURE
        }
        Err(err) => {
            error!("{:#}", err);
            if let Some(body) = err
                .downcast_ref::<SyncError>()
                .and_then(SyncError::response_body)
            {
                error!("Response body: {}", body);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &cli::Args) -> Result<SyncReport> {
    let config = args.to_config()?;
    info!("Syncing Webrecorder collections into {}", config.bamboo_url);

    let http = HttpClient::new("oidc")?;
    let token = fetch_access_token(&http, &config.oidc_url, &config.credentials)
        .await
        .context("Failed to obtain an access token")?;
    let http = http.with_bearer_token(token.secret());

    let store = RedisStore::connect(&config.redis_url)
        .await
        .with_context(|| format!("Failed to connect to Redis at {}", config.redis_url))?;
    let directory = KeycloakDirectory::new(http.clone(), config.oidc_admin_url());
    let bamboo = BambooClient::new(http, &config.bamboo_url);

    let driver = SyncDriver::new(&store, &directory, &bamboo, SyncOptions::from_config(&config));
    let report = driver.run().await?;

    info!(
        "Series created: {}, crawls created: {}, updated: {}, unchanged: {}, WARCs uploaded: {}, already present: {}",
        report.series_created,
        report.crawls_created,
        report.crawls_updated,
        report.crawls_unchanged,
        report.warcs_uploaded,
        report.warcs_present
    );
    Ok(report)
}
