use super::browser::{Browser, Locator};
use crate::config::ScraperConfig;
use crate::error::BrowserError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use thirtyfour::prelude::*;
use tracing::{debug, info, warn};

const CLICKABLE_POLL: Duration = Duration::from_millis(250);

const HIDE_WEBDRIVER: &str =
    "Object.defineProperty(navigator, 'webdriver', {get: () => undefined})";
const SCROLL_INTO_VIEW: &str = "arguments[0].scrollIntoView({block: 'center'});";
const SCRIPT_CLICK: &str = "arguments[0].click();";

fn chrome_args(headless: bool) -> Vec<&'static str> {
    let mut args = vec![
        "--no-sandbox",
        "--disable-dev-shm-usage",
        "--disable-gpu",
        "--window-size=1920,1080",
        "--disable-blink-features=AutomationControlled",
        "--user-agent=Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    ];
    if headless {
        args.insert(0, "--headless=new");
    }
    args
}

/// Chrome session behind ChromeDriver.
pub struct WebDriverSession {
    driver: WebDriver,
}

impl WebDriverSession {
    pub async fn start(config: &ScraperConfig) -> Result<Self> {
        info!(
            "Connecting to ChromeDriver at {} (headless: {})",
            config.webdriver_url, config.headless
        );

        let mut caps = DesiredCapabilities::chrome();
        caps.add_chrome_option("args", chrome_args(config.headless))?;
        caps.add_chrome_option("excludeSwitches", vec!["enable-automation"])?;
        caps.add_chrome_option("useAutomationExtension", false)?;

        let driver = WebDriver::new(config.webdriver_url.as_str(), caps)
            .await
            .context("Failed to connect to ChromeDriver")?;

        if let Err(e) = driver.execute(HIDE_WEBDRIVER, Vec::new()).await {
            warn!("Could not mask navigator.webdriver: {}", e);
        }

        Ok(Self { driver })
    }
}

fn by(locator: &Locator) -> By {
    match *locator {
        Locator::XPath(xpath) => By::XPath(xpath),
    }
}

#[async_trait(?Send)]
impl Browser for WebDriverSession {
    type Element = WebElement;

    async fn goto(&self, url: &str) -> Result<(), BrowserError> {
        debug!("Navigating to {}", url);
        self.driver.goto(url).await?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String, BrowserError> {
        Ok(self.driver.current_url().await?.to_string())
    }

    async fn execute(&self, script: &str) -> Result<Value, BrowserError> {
        let ret = self.driver.execute(script, Vec::new()).await?;
        Ok(ret.json().clone())
    }

    async fn find_all(&self, locator: &Locator) -> Result<Vec<WebElement>, BrowserError> {
        Ok(self.driver.find_all(by(locator)).await?)
    }

    fn element_key(&self, element: &WebElement) -> String {
        format!("{:?}", element.element_id())
    }

    async fn is_displayed(&self, element: &WebElement) -> Result<bool, BrowserError> {
        Ok(element.is_displayed().await?)
    }

    async fn scroll_into_view(&self, element: &WebElement) -> Result<(), BrowserError> {
        self.driver
            .execute(SCROLL_INTO_VIEW, vec![element.to_json()?])
            .await?;
        Ok(())
    }

    async fn click(&self, element: &WebElement, timeout: Duration) -> Result<(), BrowserError> {
        element
            .wait_until()
            .wait(timeout, CLICKABLE_POLL)
            .clickable()
            .await?;
        element.click().await?;
        Ok(())
    }

    async fn script_click(&self, element: &WebElement) -> Result<(), BrowserError> {
        self.driver
            .execute(SCRIPT_CLICK, vec![element.to_json()?])
            .await?;
        Ok(())
    }

    async fn title(&self) -> Result<String, BrowserError> {
        Ok(self.driver.title().await?)
    }

    async fn page_source(&self) -> Result<String, BrowserError> {
        Ok(self.driver.source().await?)
    }

    async fn close(&self) -> Result<(), BrowserError> {
        self.driver.clone().quit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chrome_args_headless_flag() {
        assert!(chrome_args(true).contains(&"--headless=new"));
        assert!(!chrome_args(false).iter().any(|a| a.starts_with("--headless")));
        assert!(chrome_args(false).contains(&"--disable-blink-features=AutomationControlled"));
    }
}
