//! Domain layer: products, price bands, pagination rules and the catalog
//!
//! Nothing in here performs I/O.

pub mod catalog;
pub mod collection;
pub mod pagination;
pub mod price_band;
pub mod product;
pub mod raw_record;
pub mod services;

pub use catalog::Catalog;
pub use collection::{BandReport, Collection, CollectionReport, CollectionWarning};
pub use pagination::{ExhaustionSignal, PageQuery, PaginationCalculator};
pub use price_band::{PartitionError, PriceBand, PricePartition};
pub use product::{ProductRecord, RankedProduct, RankingWeights};
pub use raw_record::RawRecord;
