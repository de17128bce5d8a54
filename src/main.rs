use anyhow::Result;
use rera_projects::{config, scrapers, storage};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rera_projects=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let root = std::env::var("ROOT").unwrap_or_else(|_| ".".to_string());
    let config = config::load_config(&root)?;

    println!("Starting Odisha RERA Projects Scraper...");
    println!("This will scrape the first {} projects from the RERA portal", config.batch_size);

    let batch = scrapers::scrape_projects(&config).await?;

    if batch.is_empty() {
        warn!("No data to save");
        println!("No data available to display");
        return Ok(());
    }

    print!("{}", storage::render_table(&batch));

    storage::write_csv(&config.output_path, &batch)?;
    info!("Data saved to {}", config.output_path);
    println!("\nData saved to {}", config.output_path);
    println!("Total projects scraped: {}", batch.len());
    println!(
        "Fully populated records: {}/{}",
        batch.fully_populated(),
        batch.len()
    );

    Ok(())
}
