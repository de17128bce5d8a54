//! Error taxonomy
//!
//! Strategy failures never leave the matcher, a missing promoter tab is a
//! plain `false`, and navigation errors stop at the batch driver. Only
//! session startup and I/O surface to `main` (as `anyhow` errors).

use std::time::Duration;
use thiserror::Error;

/// A single document query could not be evaluated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("anchor value is empty")]
    EmptyAnchor,
}

/// Failure reported by the rendering collaborator.
#[derive(Error, Debug)]
pub enum BrowserError {
    #[error("webdriver: {0}")]
    WebDriver(#[from] thirtyfour::error::WebDriverError),

    #[error("{0}")]
    Other(String),
}

/// Navigation stage that was waiting when a timeout fired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ListPage,
    DetailPage,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::ListPage => f.write_str("list page"),
            Stage::DetailPage => f.write_str("detail page"),
        }
    }
}

/// Failure while driving one record through the navigation states.
#[derive(Error, Debug)]
pub enum NavigationError {
    #[error("{stage} not ready after {waited:?}")]
    Timeout { stage: Stage, waited: Duration },

    #[error("record affordance {index} not found ({found} available)")]
    AffordanceMissing { index: usize, found: usize },

    #[error(transparent)]
    Browser(#[from] BrowserError),
}

impl NavigationError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, NavigationError::Timeout { .. })
    }
}
