//! Odisha RERA project scraper
//!
//! Drives a browser through the RERA project list, opens each project's
//! detail view and promoter tab, and extracts five fields per project with
//! ordered, validated fallback strategies.

pub mod assembler;
pub mod batch;
pub mod config;
pub mod document;
pub mod error;
pub mod matcher;
pub mod navigator;
pub mod profiles;
pub mod scrapers;
pub mod storage;
pub mod types;
pub mod wait;

pub use types::*;
