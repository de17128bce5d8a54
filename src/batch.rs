//! Batch Driver
//!
//! Scrapes records by index, one at a time. A failure at any index becomes an
//! all-empty record so the output always has one row per attempted index.

use crate::assembler::assemble;
use crate::config::ScraperConfig;
use crate::document::Document;
use crate::error::NavigationError;
use crate::matcher::extract_region;
use crate::navigator::Navigator;
use crate::scrapers::browser::Browser;
use crate::types::{BatchResult, FieldValues, Record, Region};
use crate::wait::settle;
use tracing::{debug, error, info, warn};

pub struct BatchDriver<'a, B: Browser> {
    browser: &'a B,
    config: &'a ScraperConfig,
}

impl<'a, B: Browser> BatchDriver<'a, B> {
    pub fn new(browser: &'a B, config: &'a ScraperConfig) -> Self {
        Self { browser, config }
    }

    /// Load the list once and count the visible record affordances.
    pub async fn discover(&self) -> Result<usize, NavigationError> {
        let mut nav = Navigator::new(self.browser, self.config);
        nav.load_list().await?;
        let found = nav.enumerate().await?.len();
        Ok(found)
    }

    /// Scrape indices `0..target` (clamped to `batch_size`).
    pub async fn run(&self, target: usize) -> BatchResult {
        let target = target.min(self.config.batch_size);
        let mut batch = BatchResult::with_capacity(target);

        for index in 0..target {
            info!("Scraping project {}/{}...", index + 1, target);

            match self.scrape_index(index).await {
                Ok(record) => {
                    info!("Scraped project {}: {:?}", index + 1, record);
                    batch.push(record);
                }
                Err(e) => {
                    error!("Error scraping project details for index {}: {}", index, e);
                    warn!("Failed to scrape project {}", index + 1);
                    batch.push(Record::empty());
                }
            }

            if index + 1 < target {
                settle(self.config.inter_record_delay()).await;
            }
        }

        info!("Completed scraping {} projects", batch.len());
        batch
    }

    /// Drive one record from a fresh list load through both regions.
    pub async fn scrape_index(&self, index: usize) -> Result<Record, NavigationError> {
        let mut nav = Navigator::new(self.browser, self.config);
        nav.load_list().await?;
        nav.open_detail(index).await?;

        let overview = extract_current(&nav, Region::Overview).await;

        let promoter = if nav.open_promoter_tab().await {
            extract_current(&nav, Region::PromoterTab).await
        } else {
            warn!("Could not access promoter details tab");
            FieldValues::new()
        };

        Ok(assemble(overview, promoter))
    }
}

/// Snapshot the page and extract a region. A failed snapshot yields no fields.
async fn extract_current<B: Browser>(nav: &Navigator<'_, B>, region: Region) -> FieldValues {
    match nav.snapshot().await {
        Ok(doc) => {
            debug!("Captured {:?} page '{}'", region, doc.title());
            let values = extract_region(&doc, region);
            info!("Extracted {:?} data: {:?}", region, values);
            values
        }
        Err(e) => {
            error!("Error capturing {:?} page: {}", region, e);
            FieldValues::new()
        }
    }
}

/// Discover the record count, then scrape that many. When discovery fails the
/// full `batch_size` is attempted so each index still yields a row.
pub async fn collect_batch<B: Browser>(browser: &B, config: &ScraperConfig) -> BatchResult {
    let driver = BatchDriver::new(browser, config);

    let target = match driver.discover().await {
        Ok(0) => {
            error!("No View Details buttons found");
            0
        }
        Ok(found) => {
            let target = found.min(config.batch_size);
            info!("Found {} projects to scrape", target);
            target
        }
        Err(e) => {
            error!("Failed to load projects page: {}", e);
            config.batch_size
        }
    };

    driver.run(target).await
}
