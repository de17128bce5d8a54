//! Navigation State Machine
//!
//! ```text
//! Start -> ListPage -> ListLoaded -> DetailPage -> PromoterTab
//! ```
//!
//! Every record starts from a fresh list load: element handles go stale as
//! soon as the page navigates, so affordances are re-enumerated by index
//! each time.

use crate::config::ScraperConfig;
use crate::document::HtmlDocument;
use crate::error::{BrowserError, NavigationError, Stage};
use crate::scrapers::browser::{Browser, Locator};
use crate::wait::{poll_until, settle};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// "View Details" controls on the project list
pub const DETAIL_AFFORDANCES: &[Locator] = &[
    Locator::XPath("//button[contains(text(), 'View Details')]"),
    Locator::XPath("//a[contains(text(), 'View Details')]"),
];

/// Candidate controls for the promoter tab, tried in order
pub const PROMOTER_TAB_AFFORDANCES: &[Locator] = &[
    Locator::XPath("//a[contains(text(), 'Promoter Details')]"),
    Locator::XPath("//button[contains(text(), 'Promoter Details')]"),
    Locator::XPath("//li[contains(text(), 'Promoter Details')]"),
    Locator::XPath("//*[contains(@class, 'nav') and contains(text(), 'Promoter')]"),
    Locator::XPath("//*[@role='tab' and contains(text(), 'Promoter')]"),
    Locator::XPath("//a[@href='#promoter-details']"),
    Locator::XPath("//a[contains(@href, 'promoter')]"),
    Locator::XPath("//*[contains(@class, 'tab') and contains(text(), 'Promoter')]"),
];

const SCROLL_HEIGHT: &str = "return document.body.scrollHeight";
const SCROLL_TO_BOTTOM: &str = "window.scrollTo(0, document.body.scrollHeight);";
const SCROLL_TO_TOP: &str = "window.scrollTo(0, 0);";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavState {
    Start,
    ListPage,
    ListLoaded,
    DetailPage,
    PromoterTab,
}

pub struct Navigator<'a, B: Browser> {
    browser: &'a B,
    config: &'a ScraperConfig,
    state: NavState,
}

impl<'a, B: Browser> Navigator<'a, B> {
    pub fn new(browser: &'a B, config: &'a ScraperConfig) -> Self {
        Self {
            browser,
            config,
            state: NavState::Start,
        }
    }

    pub fn state(&self) -> NavState {
        self.state
    }

    /// Go to the list page and wait until at least one record affordance is
    /// present, then let the rest of the list render.
    pub async fn load_list(&mut self) -> Result<(), NavigationError> {
        info!("Navigating to RERA projects page...");
        self.browser.goto(&self.config.list_url).await?;
        self.state = NavState::ListPage;

        let browser = self.browser;
        let present = poll_until(self.config.ready_timeout(), self.config.poll_interval(), || async move {
            any_present(browser, DETAIL_AFFORDANCES).await.then_some(())
        })
        .await;

        if present.is_none() {
            return Err(NavigationError::Timeout {
                stage: Stage::ListPage,
                waited: self.config.ready_timeout(),
            });
        }

        settle(self.config.list_settle()).await;
        self.state = NavState::ListLoaded;
        info!("Successfully loaded projects page");
        Ok(())
    }

    /// Visible record affordances in page order, at most `batch_size`.
    pub async fn enumerate(&mut self) -> Result<Vec<B::Element>, NavigationError> {
        self.scroll_to_end().await;

        let mut seen = HashSet::new();
        let mut affordances = Vec::new();
        for locator in DETAIL_AFFORDANCES {
            let elements = match self.browser.find_all(locator).await {
                Ok(elements) => elements,
                Err(e) => {
                    debug!("Affordance lookup {} failed: {}", locator, e);
                    continue;
                }
            };
            for element in elements {
                if !self.browser.is_displayed(&element).await.unwrap_or(false) {
                    continue;
                }
                if seen.insert(self.browser.element_key(&element)) {
                    affordances.push(element);
                }
            }
        }

        info!("Found {} View Details buttons", affordances.len());
        affordances.truncate(self.config.batch_size);
        Ok(affordances)
    }

    /// Scroll down until the page stops growing (or the round limit), then
    /// back to the top. Best effort: script failures end the scroll early.
    async fn scroll_to_end(&self) {
        let mut last = match self.scroll_height().await {
            Some(height) => height,
            None => return,
        };

        for _ in 0..self.config.scroll_rounds {
            if let Err(e) = self.browser.execute(SCROLL_TO_BOTTOM).await {
                debug!("Scroll failed: {}", e);
                break;
            }
            settle(self.config.scroll_pause()).await;
            match self.scroll_height().await {
                Some(height) if height != last => last = height,
                _ => break,
            }
        }

        if let Err(e) = self.browser.execute(SCROLL_TO_TOP).await {
            debug!("Scroll to top failed: {}", e);
        }
        settle(self.config.scroll_pause()).await;
    }

    async fn scroll_height(&self) -> Option<f64> {
        match self.browser.execute(SCROLL_HEIGHT).await {
            Ok(value) => value.as_f64(),
            Err(e) => {
                debug!("Could not read scroll height: {}", e);
                None
            }
        }
    }

    /// Open the detail view of the record at `index` on the loaded list.
    pub async fn open_detail(&mut self, index: usize) -> Result<(), NavigationError> {
        let affordances = self.enumerate().await?;
        let affordance = affordances
            .get(index)
            .ok_or(NavigationError::AffordanceMissing {
                index,
                found: affordances.len(),
            })?;

        self.browser.scroll_into_view(affordance).await?;
        settle(self.config.scroll_into_view_pause()).await;
        self.click_with_fallback(affordance).await?;

        self.wait_for_detail().await?;
        settle(self.config.detail_settle()).await;
        self.state = NavState::DetailPage;
        Ok(())
    }

    /// The detail view has rendered once the URL moved off the list page or
    /// the list affordances are gone.
    async fn wait_for_detail(&self) -> Result<(), NavigationError> {
        let browser = self.browser;
        let list_url = self.config.list_url.as_str();
        let ready = poll_until(self.config.ready_timeout(), self.config.poll_interval(), || async move {
            let moved = match browser.current_url().await {
                Ok(url) => url.trim_end_matches('/') != list_url.trim_end_matches('/'),
                Err(_) => false,
            };
            (moved || !any_present(browser, DETAIL_AFFORDANCES).await).then_some(())
        })
        .await;

        ready.ok_or(NavigationError::Timeout {
            stage: Stage::DetailPage,
            waited: self.config.ready_timeout(),
        })
    }

    /// Try each promoter tab locator in order and click the first visible
    /// match. Returns `false` when no candidate could be clicked; the caller
    /// records the promoter fields as empty.
    pub async fn open_promoter_tab(&mut self) -> bool {
        for locator in PROMOTER_TAB_AFFORDANCES {
            let candidates = match self.browser.find_all(locator).await {
                Ok(candidates) => candidates,
                Err(e) => {
                    debug!("Tab selector failed: {} - {}", locator, e);
                    continue;
                }
            };

            for tab in candidates {
                if !self.browser.is_displayed(&tab).await.unwrap_or(false) {
                    continue;
                }
                match self.click_with_fallback(&tab).await {
                    Ok(()) => {
                        settle(self.config.tab_settle()).await;
                        self.state = NavState::PromoterTab;
                        info!("Successfully clicked Promoter Details tab");
                        return true;
                    }
                    Err(e) => {
                        debug!("Tab selector failed: {} - {}", locator, e);
                        break;
                    }
                }
            }
        }

        warn!("Could not find or click Promoter Details tab");
        false
    }

    /// Capture the current page for extraction.
    pub async fn snapshot(&self) -> Result<HtmlDocument, NavigationError> {
        let source = self.browser.page_source().await?;
        let title = match self.browser.title().await {
            Ok(title) => Some(title),
            Err(e) => {
                debug!("Could not read page title: {}", e);
                None
            }
        };
        Ok(HtmlDocument::new(&source, title))
    }

    async fn click_with_fallback(&self, element: &B::Element) -> Result<(), BrowserError> {
        match self.browser.click(element, self.config.ready_timeout()).await {
            Ok(()) => Ok(()),
            Err(e) => {
                debug!("Direct click failed, using script click: {}", e);
                self.browser.script_click(element).await
            }
        }
    }
}

async fn any_present<B: Browser>(browser: &B, locators: &[Locator]) -> bool {
    for locator in locators {
        if let Ok(found) = browser.find_all(locator).await {
            if !found.is_empty() {
                return true;
            }
        }
    }
    false
}
