//! QuoteSync client - periodic reconciliation of a local quote collection
//! against a remote source.
//!
//! Loads its configuration from the environment, wires the scheduler to file
//! storage and the HTTP remote, and runs sync cycles until stopped.

use quotesync_client::{
    Config, ConflictPolicy, HttpRemote, Interactive, JsonFileStorage, LogNotifier, PolicyMode,
    RemoteWins, StdinPrompt, SyncScheduler,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quotesync=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    tracing::info!(
        remote = %config.remote_url,
        interval_secs = config.poll_interval.as_secs(),
        "Starting QuoteSync client"
    );

    let storage = Arc::new(JsonFileStorage::new(&config.data_dir)?);
    let remote = Arc::new(HttpRemote::new(config.remote_url.clone()));
    let policy: Arc<dyn ConflictPolicy> = match config.policy {
        PolicyMode::RemoteWins => Arc::new(RemoteWins),
        PolicyMode::Interactive => Arc::new(Interactive::new(
            Box::new(StdinPrompt),
            config.push_on_local_win,
        )),
    };
    let notifier = Arc::new(LogNotifier);

    let scheduler = SyncScheduler::new(
        storage,
        remote,
        policy,
        notifier,
        config.poll_interval,
        config.fetch_cap,
    );

    scheduler.run().await;

    Ok(())
}
