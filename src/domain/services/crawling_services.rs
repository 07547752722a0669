//! Service seams of the crawl pipeline
//!
//! Collectors only talk to a `PageSource` and a `RecordExtractor`; the HTTP
//! clients and HTML/JSON parsers in `infrastructure` implement them, test
//! fakes implement them in memory.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::catalog::Catalog;
use crate::domain::collection::Collection;
use crate::domain::pagination::PageQuery;
use crate::domain::product::ProductRecord;
use crate::domain::raw_record::RawRecord;

/// One page could not be fetched; the caller counts it as empty
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Invalid request URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("HTTP error {status}: {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },
}

/// Raw records of one page plus the pagination metadata the source reports
#[derive(Debug, Clone, Default)]
pub struct FetchedPage {
    pub records: Vec<RawRecord>,
    pub total_available: Option<u64>,
}

impl FetchedPage {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Issues exactly one request per call and never retries
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    async fn fetch(&self, query: &PageQuery) -> Result<FetchedPage, FetchError>;
}

/// Turns one raw record into one product, substituting defaults per field
///
/// A non-empty `label` is attached to the record.
pub trait RecordExtractor: Send + Sync {
    fn extract(&self, raw: &RawRecord, label: Option<&str>) -> ProductRecord;
}

/// Everything a sink may render for one run
#[derive(Debug, Clone, Copy)]
pub struct RunArtifacts<'a> {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub collection: &'a Collection,
    pub catalog: &'a Catalog,
}

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize output for {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Persists one artifact of a run, overwriting whatever the previous run left
#[async_trait]
pub trait CatalogSink: Send + Sync {
    fn name(&self) -> &'static str;

    async fn write(&self, artifacts: &RunArtifacts<'_>) -> Result<PathBuf, SinkError>;
}
