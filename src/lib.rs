pub mod analytics; // compliance, streaks, trends, alert classification
pub mod api;
pub mod config;
pub mod core_state;
pub mod dashboard; // health dashboard & report assembly
pub mod db;
pub mod models;
pub mod validation;

use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Initialize logging, open the data directory, and serve the API.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("Silverline starting v{}", config::APP_VERSION);

    let core = Arc::new(core_state::CoreState::new()?);
    api::server::serve(core, config::bind_addr()).await?;
    Ok(())
}
