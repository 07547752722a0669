//! Configuration infrastructure
//!
//! Settings are layered with the `config` crate:
//! 1. Built-in defaults (`AppConfig::default()`)
//! 2. An optional TOML/JSON file
//! 3. Environment variables, e.g. `GROCERY_CATALOG__SEARCH__PAGE_SIZE=400`
//!
//! Price-band breakpoints, page size, caps, endpoints, selectors and output
//! paths all live here rather than in code.

#![allow(clippy::uninlined_format_args)]

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::info;

use crate::domain::pagination::ExhaustionSignal;
use crate::domain::price_band::{DEFAULT_BREAKPOINTS, PartitionError, PricePartition};
use crate::domain::product::RankingWeights;
use crate::infrastructure::http_client::HttpClientConfig;
use crate::infrastructure::parsing::config::ListingSelectors;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config: {source}")]
    FileLoad {
        #[from]
        source: config::ConfigError,
    },

    #[error("Invalid price partition: {source}")]
    Partition {
        #[from]
        source: PartitionError,
    },

    #[error("Configuration validation failed: {message}")]
    Validation { message: String },
}

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub http: HttpClientConfig,
    pub search: SearchConfig,
    pub partition: PartitionConfig,
    pub listing: ListingConfig,
    pub ranking: RankingWeights,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

/// JSON search endpoint and the fixed-partition collector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Search endpoint URL (without query string)
    pub endpoint: String,

    /// Records requested per page (`size`)
    pub page_size: u32,

    /// Results the API returns at most for any single query
    pub result_cap: u32,

    /// Safety stop per band
    pub max_pages_per_band: u32,

    /// Which signal ends a band
    pub exhaustion: ExhaustionSignal,

    /// Bands fetched at the same time; pages inside a band stay sequential
    pub band_concurrency: usize,
}

/// Breakpoints of the price partition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartitionConfig {
    pub breakpoints: Vec<f64>,

    /// Add a final band from the last breakpoint without upper bound
    pub open_tail: bool,
}

/// HTML listing pages and the dynamic-floor collector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingConfig {
    /// Site root used to absolutize product and category links
    pub base_url: String,

    /// Category overview page
    pub categories_url: String,

    /// Records a full listing page renders; fewer means the last round
    pub batch_size: u32,

    /// Safety stop on the number of floor rounds
    pub max_rounds: u32,

    /// Upper price bound of every dynamic query
    pub price_ceiling: f64,

    /// Listing pages are cumulative; `page` grows the rendered card count
    pub page_offset: u32,

    /// Value of the `sortBy` query parameter
    pub sort_by: String,

    pub selectors: ListingSelectors,
}

/// Output files, all overwritten on every run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub directory: PathBuf,
    pub html_report: String,
    pub raw_json: String,
    pub catalog_json: String,

    /// Keep only this many rows in the HTML report
    pub report_limit: Option<usize>,

    /// Write the pre-merge raw dump at all
    pub write_raw: bool,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted file logs
    pub json_format: bool,

    pub console_output: bool,

    pub file_output: bool,

    /// Log directory; defaults to `logs/` next to the executable
    pub directory: Option<PathBuf>,

    pub file_name: String,

    /// Number of log files to keep (older files will be deleted)
    pub max_files: u32,

    /// Enable automatic log cleanup on startup
    pub auto_cleanup_logs: bool,

    /// Module-specific log level filters (e.g., "reqwest": "info")
    pub module_filters: HashMap<String, String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: albert_heijn::SEARCH_API.to_string(),
            page_size: defaults::PAGE_SIZE,
            result_cap: defaults::RESULT_CAP,
            max_pages_per_band: defaults::MAX_PAGES_PER_BAND,
            exhaustion: ExhaustionSignal::default(),
            band_concurrency: defaults::BAND_CONCURRENCY,
        }
    }
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            breakpoints: DEFAULT_BREAKPOINTS.to_vec(),
            open_tail: true,
        }
    }
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            base_url: albert_heijn::BASE_URL.to_string(),
            categories_url: albert_heijn::CATEGORIES_PAGE.to_string(),
            batch_size: defaults::LISTING_BATCH_SIZE,
            max_rounds: defaults::LISTING_MAX_ROUNDS,
            price_ceiling: defaults::LISTING_PRICE_CEILING,
            page_offset: defaults::LISTING_PAGE_OFFSET,
            sort_by: "price".to_string(),
            selectors: ListingSelectors::default(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            html_report: defaults::HTML_REPORT.to_string(),
            raw_json: defaults::RAW_JSON.to_string(),
            catalog_json: defaults::CATALOG_JSON.to_string(),
            report_limit: None,
            write_raw: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: defaults::LOG_JSON_FORMAT,
            console_output: defaults::LOG_CONSOLE_OUTPUT,
            file_output: defaults::LOG_FILE_OUTPUT,
            directory: None,
            file_name: defaults::LOG_FILE_NAME.to_string(),
            max_files: defaults::LOG_MAX_FILES,
            auto_cleanup_logs: defaults::LOG_AUTO_CLEANUP,
            module_filters: {
                let mut filters = HashMap::new();
                filters.insert("reqwest".to_string(), "info".to_string());
                filters.insert("hyper".to_string(), "warn".to_string());
                filters.insert("html5ever".to_string(), "warn".to_string());
                filters.insert("selectors".to_string(), "warn".to_string());
                filters
            },
        }
    }
}

impl AppConfig {
    /// Check cross-field constraints the types cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search.result_cap == 0 {
            return Err(ConfigError::Validation {
                message: "search.result_cap must be greater than 0".to_string(),
            });
        }

        if self.search.page_size == 0 || self.search.page_size > self.search.result_cap {
            return Err(ConfigError::Validation {
                message: format!(
                    "search.page_size must be between 1 and result_cap ({}), got {}",
                    self.search.result_cap, self.search.page_size
                ),
            });
        }

        if self.search.max_pages_per_band == 0 || self.listing.max_rounds == 0 {
            return Err(ConfigError::Validation {
                message: "page and round caps must be greater than 0".to_string(),
            });
        }

        if self.search.band_concurrency == 0 {
            return Err(ConfigError::Validation {
                message: "search.band_concurrency must be greater than 0".to_string(),
            });
        }

        if self.listing.batch_size == 0 {
            return Err(ConfigError::Validation {
                message: "listing.batch_size must be greater than 0".to_string(),
            });
        }

        if !(self.listing.price_ceiling.is_finite() && self.listing.price_ceiling > 0.0) {
            return Err(ConfigError::Validation {
                message: format!(
                    "listing.price_ceiling must be a positive number, got {}",
                    self.listing.price_ceiling
                ),
            });
        }

        if !(self.ranking.absolute_divisor > 0.0 && self.ranking.percentage_divisor > 0.0) {
            return Err(ConfigError::Validation {
                message: "ranking divisors must be greater than 0".to_string(),
            });
        }

        self.price_partition()?;
        Ok(())
    }

    /// Bands of the fixed-partition collector
    pub fn price_partition(&self) -> Result<PricePartition, ConfigError> {
        Ok(PricePartition::from_breakpoints(
            &self.partition.breakpoints,
            self.partition.open_tail,
        )?)
    }
}

/// Configuration manager for loading and saving settings
pub struct ConfigManager {
    config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Environment variable prefix, nesting separated by `__`
    pub const ENV_PREFIX: &'static str = "GROCERY_CATALOG";

    /// File looked up in the working directory when no path is given
    pub const LOCAL_FILE: &'static str = "grocery-catalog.toml";

    /// Use `explicit` when given, otherwise the first existing default location
    pub fn new(explicit: Option<PathBuf>) -> Self {
        let config_path = explicit.or_else(Self::discover_config_file);
        Self { config_path }
    }

    /// Get the application configuration directory
    pub fn get_config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("grocery-catalog"))
    }

    fn discover_config_file() -> Option<PathBuf> {
        let local = PathBuf::from(Self::LOCAL_FILE);
        if local.exists() {
            return Some(local);
        }

        Self::get_config_dir()
            .map(|dir| dir.join("config.toml"))
            .filter(|path| path.exists())
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Merge defaults, file and environment, then validate
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        self.load_with_environment(None)
    }

    /// `env` replaces the process environment when given
    fn load_with_environment(
        &self,
        env: Option<config::Map<String, String>>,
    ) -> Result<AppConfig, ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default())?);

        if let Some(path) = &self.config_path {
            info!("Loading configuration from: {:?}", path);
            builder = builder.add_source(config::File::from(path.as_path()).required(true));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(Self::ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("partition.breakpoints")
                    .try_parsing(true)
                    .source(env),
            )
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default configuration as JSON, creating parent directories
    pub async fn write_default(path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create config directory")?;
        }

        let content = serde_json::to_string_pretty(&AppConfig::default())
            .context("Failed to serialize configuration")?;

        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write configuration file {:?}", path))?;

        info!("Saved default configuration to: {:?}", path);
        Ok(())
    }
}

/// Retailer URLs
pub mod albert_heijn {
    /// Site root
    pub const BASE_URL: &str = "https://www.ah.nl";

    /// Undocumented JSON product search endpoint
    pub const SEARCH_API: &str = "https://www.ah.nl/zoeken/api/products/search";

    /// Category overview page
    pub const CATEGORIES_PAGE: &str = "https://www.ah.nl/producten";
}

/// Default configuration values
pub mod defaults {
    /// Search API page size (the endpoint serves up to 500)
    pub const PAGE_SIZE: u32 = 500;

    /// Results returned at most for one query, observed empirically
    pub const RESULT_CAP: u32 = 2500;

    /// Safety stop per band
    pub const MAX_PAGES_PER_BAND: u32 = 20;

    pub const BAND_CONCURRENCY: usize = 1;

    /// Cards a full listing page renders
    pub const LISTING_BATCH_SIZE: u32 = 1000;

    pub const LISTING_MAX_ROUNDS: u32 = 30;

    pub const LISTING_PRICE_CEILING: f64 = 120.0;

    pub const LISTING_PAGE_OFFSET: u32 = 55;

    /// Default request timeout in seconds
    pub const REQUEST_TIMEOUT_SECONDS: u64 = 30;

    pub const HTML_REPORT: &str = "AH_prod.html";

    pub const RAW_JSON: &str = "allproducts_summary.json";

    pub const CATALOG_JSON: &str = "catalog.json";

    pub const LOG_LEVEL: &str = "info";

    pub const LOG_JSON_FORMAT: bool = false;

    pub const LOG_CONSOLE_OUTPUT: bool = true;

    pub const LOG_FILE_OUTPUT: bool = false;

    pub const LOG_FILE_NAME: &str = "grocery-catalog.log";

    pub const LOG_MAX_FILES: u32 = 5;

    pub const LOG_AUTO_CLEANUP: bool = true;
}

/// URL building helper functions
pub mod utils {
    use url::Url;

    /// Resolve a link found on a page against the site root
    ///
    /// Absolute links are returned unchanged; anything unparsable falls back
    /// to plain concatenation, mirroring how the site builds its own links.
    pub fn resolve_url(base_url: &str, href: &str) -> String {
        if href.starts_with("http://") || href.starts_with("https://") {
            return href.to_string();
        }

        match Url::parse(base_url).and_then(|base| base.join(href)) {
            Ok(url) => url.to_string(),
            Err(_) => format!(
                "{}/{}",
                base_url.trim_end_matches('/'),
                href.trim_start_matches('/')
            ),
        }
    }
}
