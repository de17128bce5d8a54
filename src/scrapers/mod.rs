pub mod browser;
pub mod selenium;

use crate::batch::collect_batch;
use crate::config::ScraperConfig;
use crate::types::BatchResult;
use anyhow::Result;
use browser::Browser;
use selenium::WebDriverSession;
use tracing::{info, warn};

/// Start a browser session, scrape one batch, and close the browser on every
/// path before returning.
pub async fn scrape_projects(config: &ScraperConfig) -> Result<BatchResult> {
    let session = WebDriverSession::start(config).await?;

    let batch = collect_batch(&session, config).await;

    if let Err(e) = session.close().await {
        warn!("Failed to quit browser: {}", e);
    } else {
        info!("Browser closed");
    }

    Ok(batch)
}
