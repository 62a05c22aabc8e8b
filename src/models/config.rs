//! Runtime configuration of the scraper.
//!
//! Values come from an optional YAML file and `SCRAPER__`-prefixed
//! environment variables (`SCRAPER__OUTPUT__MODE=sql`), the latter taking
//! precedence.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

use crate::domain::product::DEFAULT_BRANDS;

/// Chrome user agent presented to marketplaces.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Top-level configuration of a scraping run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Pages to scrape, in order.
    pub targets: Vec<TargetConfig>,
    /// Spreadsheet (`csv` or `xlsx`) with additional targets.
    pub targets_file: Option<PathBuf>,
    /// Marketplace selector sets. Entries replace built-ins with the same id.
    pub marketplaces: Vec<MarketplaceConfig>,
    pub output: OutputConfig,
    pub browser: BrowserConfig,
    /// Brands recognised when deriving product identity from names.
    pub brands: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            targets: Vec::new(),
            targets_file: None,
            marketplaces: Vec::new(),
            output: OutputConfig::default(),
            browser: BrowserConfig::default(),
            brands: DEFAULT_BRANDS.iter().map(|b| b.to_string()).collect(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `path` (if it exists) and the environment.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("SCRAPER").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// Parse configuration from a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()?
            .try_deserialize()
    }
}

/// A single page to scrape.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TargetConfig {
    pub url: String,
    /// Marketplace id; resolved from the URL host when absent.
    #[serde(default)]
    pub marketplace: Option<String>,
    /// Product label from the target list, used in log messages.
    #[serde(default)]
    pub product: Option<String>,
}

/// CSS selectors for one marketplace's product page.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SelectorConfig {
    pub name: String,
    pub price: String,
    pub rating: String,
    #[serde(default)]
    pub shipping: Option<String>,
    #[serde(default)]
    pub shipping_eta: Option<String>,
    #[serde(default)]
    pub seller: Option<String>,
    /// Element whose presence marks the page as rendered. Defaults to the
    /// price selector.
    #[serde(default)]
    pub wait_for: Option<String>,
}

/// A marketplace and the selectors used to read its pages.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MarketplaceConfig {
    pub id: String,
    /// Display name, also used as the supplier name.
    pub name: String,
    /// Hosts served by this marketplace, matched as suffixes.
    #[serde(default)]
    pub domains: Vec<String>,
    /// Fall back to `application/ld+json` product data on selector misses.
    #[serde(default)]
    pub json_ld: bool,
    pub selectors: SelectorConfig,
}

/// Where normalized listings are written.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    #[default]
    Csv,
    Xlsx,
    Sql,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub mode: OutputMode,
    /// Export file for `csv`/`xlsx`; the extension is added when missing.
    pub path: PathBuf,
    /// SQLite database for `sql`.
    pub database_url: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            mode: OutputMode::Csv,
            path: PathBuf::from("listings"),
            database_url: "listings.db".to_string(),
        }
    }
}

/// Lifetime of the browser process.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionScope {
    /// One browser for the whole run.
    #[default]
    PerRun,
    /// A fresh browser for every URL.
    PerUrl,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub headless: bool,
    pub session: SessionScope,
    /// Maximum wait for the `wait_for` element.
    pub wait_timeout_secs: u64,
    /// Delay between presence checks.
    pub poll_interval_ms: u64,
    pub navigation_timeout_secs: u64,
    pub window_width: u32,
    pub window_height: u32,
    pub user_agent: Option<String>,
    pub chrome_path: Option<PathBuf>,
    pub language: String,
    /// Scroll through the page before reading it so lazy blocks render.
    pub warmup_scroll: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            session: SessionScope::PerRun,
            wait_timeout_secs: 20,
            poll_interval_ms: 250,
            navigation_timeout_secs: 60,
            window_width: 1366,
            window_height: 900,
            user_agent: Some(DEFAULT_USER_AGENT.to_string()),
            chrome_path: None,
            language: "pt-BR".to_string(),
            warmup_scroll: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = AppConfig::from_yaml("{}").unwrap();

        assert!(config.targets.is_empty());
        assert_eq!(config.output.mode, OutputMode::Csv);
        assert_eq!(config.browser.session, SessionScope::PerRun);
        assert!(config.brands.iter().any(|b| b == "Samsung"));
    }

    #[test]
    fn example_configuration_parses() {
        let config = AppConfig::from_yaml(include_str!("../../scraper.example.yaml")).unwrap();

        assert_eq!(config.targets.len(), 2);
        assert_eq!(config.targets[1].product.as_deref(), Some("Fone Bluetooth XYZ"));
        assert_eq!(config.marketplaces[0].selectors.wait_for.as_deref(), Some("h1"));
    }

    #[test]
    fn parses_targets_marketplaces_and_output() {
        let yaml = r#"
targets:
  - url: "https://www.amazon.com.br/dp/B0XYZ"
    marketplace: amazon
output:
  mode: sql
  database_url: "/tmp/listings.db"
browser:
  session: per_url
  wait_timeout_secs: 5
marketplaces:
  - id: shop
    name: Shop
    domains: ["shop.example.com"]
    selectors:
      name: h1
      price: ".price"
      rating: ".stars"
"#;
        let config = AppConfig::from_yaml(yaml).unwrap();

        assert_eq!(config.targets.len(), 1);
        assert_eq!(config.targets[0].marketplace.as_deref(), Some("amazon"));
        assert_eq!(config.output.mode, OutputMode::Sql);
        assert_eq!(config.output.database_url, "/tmp/listings.db");
        assert_eq!(config.browser.session, SessionScope::PerUrl);
        assert_eq!(config.browser.wait_timeout_secs, 5);
        assert_eq!(config.browser.poll_interval_ms, 250);
        assert_eq!(config.marketplaces[0].selectors.shipping, None);
        assert!(!config.marketplaces[0].json_ld);
    }
}
