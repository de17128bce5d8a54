use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_LIST_URL: &str = "https://rera.odisha.gov.in/projects/project-list";
pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";
pub const DEFAULT_BATCH_SIZE: usize = 6;
pub const DEFAULT_OUTPUT: &str = "odisha_rera_projects.csv";

/// Run settings. Every field has a default, so a partial YAML file is fine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScraperConfig {
    pub list_url: String,
    pub webdriver_url: String,
    pub headless: bool,
    pub batch_size: usize,
    pub output_path: String,

    pub ready_timeout_ms: u64,
    pub poll_interval_ms: u64,

    pub list_settle_ms: u64,
    pub scroll_rounds: u32,
    pub scroll_pause_ms: u64,
    pub scroll_into_view_ms: u64,
    pub detail_settle_ms: u64,
    pub tab_settle_ms: u64,
    pub inter_record_ms: u64,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            list_url: DEFAULT_LIST_URL.to_string(),
            webdriver_url: DEFAULT_WEBDRIVER_URL.to_string(),
            headless: false,
            batch_size: DEFAULT_BATCH_SIZE,
            output_path: DEFAULT_OUTPUT.to_string(),
            ready_timeout_ms: 20_000,
            poll_interval_ms: 250,
            list_settle_ms: 5_000,
            scroll_rounds: 3,
            scroll_pause_ms: 2_000,
            scroll_into_view_ms: 2_000,
            detail_settle_ms: 6_000,
            tab_settle_ms: 4_000,
            inter_record_ms: 3_000,
        }
    }
}

impl ScraperConfig {
    /// No settle delays and short waits; for tests and dry runs.
    pub fn immediate() -> Self {
        Self {
            ready_timeout_ms: 200,
            poll_interval_ms: 10,
            list_settle_ms: 0,
            scroll_pause_ms: 0,
            scroll_into_view_ms: 0,
            detail_settle_ms: 0,
            tab_settle_ms: 0,
            inter_record_ms: 0,
            ..Self::default()
        }
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.ready_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn list_settle(&self) -> Duration {
        Duration::from_millis(self.list_settle_ms)
    }

    pub fn scroll_pause(&self) -> Duration {
        Duration::from_millis(self.scroll_pause_ms)
    }

    pub fn scroll_into_view_pause(&self) -> Duration {
        Duration::from_millis(self.scroll_into_view_ms)
    }

    pub fn detail_settle(&self) -> Duration {
        Duration::from_millis(self.detail_settle_ms)
    }

    pub fn tab_settle(&self) -> Duration {
        Duration::from_millis(self.tab_settle_ms)
    }

    pub fn inter_record_delay(&self) -> Duration {
        Duration::from_millis(self.inter_record_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            bail!("batch_size must be at least 1");
        }
        if self.list_url.trim().is_empty() {
            bail!("list_url is empty");
        }
        if self.webdriver_url.trim().is_empty() {
            bail!("webdriver_url is empty");
        }
        if self.poll_interval_ms == 0 {
            bail!("poll_interval_ms must be positive");
        }
        Ok(())
    }

    /// `RERA_HEADLESS`, `WEBDRIVER_URL` and `RERA_OUTPUT` win over the file.
    pub fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("RERA_HEADLESS") {
            self.headless = parse_flag(&v);
        }
        if let Ok(v) = std::env::var("WEBDRIVER_URL") {
            if !v.trim().is_empty() {
                self.webdriver_url = v;
            }
        }
        if let Ok(v) = std::env::var("RERA_OUTPUT") {
            if !v.trim().is_empty() {
                self.output_path = v;
            }
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

/// Load `config/scraper.yml` under `root`, falling back to defaults when the
/// file does not exist. Environment overrides are applied last.
pub fn load_config(root: &str) -> Result<ScraperConfig> {
    let path = PathBuf::from(root).join("config/scraper.yml");

    let mut config = if path.exists() {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        parse_config(&content)?
    } else {
        ScraperConfig::default()
    };

    config.apply_env();
    config.validate()?;
    Ok(config)
}

pub fn parse_config(content: &str) -> Result<ScraperConfig> {
    let config: ScraperConfig = serde_yaml::from_str(content)
        .with_context(|| "Failed to parse scraper config YAML")?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_site_timings() {
        let config = ScraperConfig::default();
        assert_eq!(config.batch_size, 6);
        assert_eq!(config.ready_timeout(), Duration::from_secs(20));
        assert_eq!(config.detail_settle(), Duration::from_secs(6));
        assert!(!config.headless);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = parse_config("headless: true\nbatch_size: 3\n").unwrap();
        assert!(config.headless);
        assert_eq!(config.batch_size, 3);
        assert_eq!(config.list_url, DEFAULT_LIST_URL);
        assert_eq!(config.tab_settle_ms, 4_000);
    }

    #[test]
    fn test_validate_rejects_zero_batch() {
        let config = ScraperConfig { batch_size: 0, ..ScraperConfig::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(dir.path().to_str().unwrap()).unwrap();
        assert_eq!(config.list_url, DEFAULT_LIST_URL);
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("TRUE"));
        assert!(parse_flag(" 1 "));
        assert!(!parse_flag("no"));
        assert!(!parse_flag(""));
    }
}
