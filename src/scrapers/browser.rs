use crate::error::BrowserError;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// How to find elements in the live page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Locator {
    XPath(&'static str),
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Locator::XPath(x) => write!(f, "xpath={}", x),
        }
    }
}

/// The rendering collaborator. One page at a time, driven sequentially.
///
/// `WebDriverSession` talks to ChromeDriver; tests provide an in-memory
/// implementation that serves static HTML.
#[async_trait(?Send)]
pub trait Browser {
    type Element: Clone;

    async fn goto(&self, url: &str) -> Result<(), BrowserError>;

    async fn current_url(&self) -> Result<String, BrowserError>;

    /// Run a script with no arguments and return its JSON result.
    async fn execute(&self, script: &str) -> Result<Value, BrowserError>;

    async fn find_all(&self, locator: &Locator) -> Result<Vec<Self::Element>, BrowserError>;

    /// Stable identity of an element within the current page.
    fn element_key(&self, element: &Self::Element) -> String;

    async fn is_displayed(&self, element: &Self::Element) -> Result<bool, BrowserError>;

    async fn scroll_into_view(&self, element: &Self::Element) -> Result<(), BrowserError>;

    /// Native click, after waiting up to `timeout` for the element to be clickable.
    async fn click(&self, element: &Self::Element, timeout: Duration) -> Result<(), BrowserError>;

    /// Click dispatched from page script.
    async fn script_click(&self, element: &Self::Element) -> Result<(), BrowserError>;

    async fn title(&self) -> Result<String, BrowserError>;

    async fn page_source(&self) -> Result<String, BrowserError>;

    async fn close(&self) -> Result<(), BrowserError>;
}
