//! Application layer module
//!
//! Collectors and the run orchestrator that tie the domain rules to the
//! infrastructure sources and sinks.

pub mod band_collector;
pub mod catalog_run;
pub mod category_discovery_service;
pub mod floor_collector;

pub use band_collector::{BandCollector, BandCollectorConfig};
pub use catalog_run::{CatalogRun, RunMode, RunSummary, publish};
pub use category_discovery_service::CategoryDiscoveryService;
pub use floor_collector::{FloorCollector, FloorCollectorConfig};
