//! Infrastructure layer: HTTP, HTML/JSON parsing, output files, config and logging
//!
//! Implements the service seams declared in `domain::services`.

pub mod config; // Layered settings and endpoint constants
pub mod http_client;
pub mod listing_page_client;
pub mod logging;
pub mod parsing;
pub mod parsing_error;
pub mod report_writer;
pub mod search_api_client;

// Re-export commonly used items
pub use config::{AppConfig, ConfigError, ConfigManager, albert_heijn};
pub use http_client::{HttpClient, HttpClientConfig};
pub use listing_page_client::ListingPageClient;
pub use logging::{get_log_directory, init_logging_with_config};
pub use parsing::{Category, CategoryParser, FieldExtractor, ParseContext, ProductCardParser};
pub use parsing_error::{ExtractionError, ExtractionResult};
pub use report_writer::{CatalogJsonSink, HtmlReportSink, RawJsonSink};
pub use search_api_client::SearchApiClient;
