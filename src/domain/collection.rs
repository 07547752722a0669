//! Collection output and the non-fatal conditions met while collecting
//!
//! Nothing in here aborts a run. Every lossy condition is recorded as a
//! `CollectionWarning` on the band that produced it so the summary can show
//! where the catalog is known to be incomplete.

use serde::Serialize;
use std::fmt;

use super::price_band::PriceBand;
use super::product::ProductRecord;
use super::raw_record::RawRecord;

/// Recoverable-but-lossy conditions met during collection
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CollectionWarning {
    /// The band matches more results than the API will ever return
    CapExceeded { reported_total: u64, cap: u32 },
    /// Safety stop: the last-page signal never fired
    PageCapReached { pages: u32 },
    /// The last servable page was full and no total was reported
    ResultCapReached { cap: u32, pages: u32 },
    /// A page could not be fetched and was counted as empty
    FetchFailed { page_index: u32, reason: String },
    /// Dynamic mode: the floor price did not move between rounds
    FloorStalled { floor: f64 },
}

impl fmt::Display for CollectionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapExceeded {
                reported_total,
                cap,
            } => write!(
                f,
                "reported total {reported_total} exceeds the per-query cap of {cap}"
            ),
            Self::PageCapReached { pages } => write!(f, "stopped after the page cap of {pages}"),
            Self::ResultCapReached { cap, pages } => write!(
                f,
                "last servable page {pages} was full, results beyond the cap of {cap} are unreachable"
            ),
            Self::FetchFailed { page_index, reason } => {
                write!(f, "page {page_index} failed: {reason}")
            }
            Self::FloorStalled { floor } => write!(f, "floor price stalled at {floor}"),
        }
    }
}

/// What happened inside one band (or one dynamic-floor sweep)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandReport {
    pub band: PriceBand,
    pub label: Option<String>,
    pub pages_fetched: u32,
    pub records: usize,
    pub out_of_band_dropped: usize,
    pub reported_total: Option<u64>,
    pub warnings: Vec<CollectionWarning>,
}

impl BandReport {
    pub const fn new(band: PriceBand) -> Self {
        Self {
            band,
            label: None,
            pages_fetched: 0,
            records: 0,
            out_of_band_dropped: 0,
            reported_total: None,
            warnings: Vec::new(),
        }
    }

    /// Known to be missing products
    pub fn is_incomplete(&self) -> bool {
        self.warnings.iter().any(|w| {
            matches!(
                w,
                CollectionWarning::CapExceeded { .. }
                    | CollectionWarning::ResultCapReached { .. }
                    | CollectionWarning::PageCapReached { .. }
            )
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CollectionReport {
    pub bands: Vec<BandReport>,
}

impl CollectionReport {
    pub fn total_pages(&self) -> u32 {
        self.bands.iter().map(|b| b.pages_fetched).sum()
    }

    pub fn warning_count(&self) -> usize {
        self.bands.iter().map(|b| b.warnings.len()).sum()
    }

    pub fn incomplete_bands(&self) -> impl Iterator<Item = &BandReport> {
        self.bands.iter().filter(|b| b.is_incomplete())
    }
}

/// Everything collected in a run, before merging
///
/// `records` is in band order then page order and still contains every
/// duplicate that crossed a band boundary.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    pub records: Vec<ProductRecord>,
    pub raw: Vec<RawRecord>,
    pub report: CollectionReport,
}

impl Collection {
    /// Append another collection, keeping order
    pub fn absorb(&mut self, other: Self) {
        self.records.extend(other.records);
        self.raw.extend(other.raw);
        self.report.bands.extend(other.report.bands);
    }
}
