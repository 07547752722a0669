//! Grocery Catalog - price-banded product crawler for a grocery retailer
//!
//! Collects the full product catalog by walking price bands on the search
//! API (or rising price floors on HTML listing pages), merges and ranks the
//! records by discount, and writes an HTML report plus JSON dumps.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{CatalogRun, RunMode, RunSummary};
pub use domain::{Catalog, Collection, PriceBand, PricePartition, ProductRecord, RankedProduct};
pub use infrastructure::{AppConfig, ConfigManager};
