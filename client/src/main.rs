//! Stash - loads every store against a backend and prints a summary.
//!
//! Reads `STASH_*` variables (and `.env`), loads the session, fetches every
//! remote store once and prints each store's count and status as JSON.

use stash_client::{AppContext, ClientConfig, EpochToken};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stash_client=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = ClientConfig::from_env()?;

    tracing::info!("Connecting to {}", config.api_url);

    let context = AppContext::new(&config)?;
    let session = context.bootstrap().await;

    let started = chrono::Utc::now();
    let refresh = context.refresh_all(&EpochToken::detached()).await;
    let elapsed = chrono::Utc::now() - started;

    tracing::info!(elapsed_ms = elapsed.num_milliseconds(), "Refresh finished");

    let summary = serde_json::json!({
        "apiUrl": config.api_url,
        "refreshedAt": started,
        "session": session,
        "refresh": refresh,
        "stores": context.summary(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
