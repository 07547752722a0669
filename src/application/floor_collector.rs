//! Dynamic-floor collector for HTML listing pages
//!
//! Listing pages sorted by price render a bounded batch of cards. Each round
//! queries `[floor, ceiling]`, then raises the floor to the highest current
//! price seen so far. Products priced exactly at a floor show up in two
//! rounds; merge-time dedup removes them.

#![allow(clippy::uninlined_format_args)]

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::collection::{BandReport, Collection, CollectionReport, CollectionWarning};
use crate::domain::pagination::PageQuery;
use crate::domain::price_band::PriceBand;
use crate::domain::services::{PageSource, RecordExtractor};
use crate::infrastructure::config::ListingConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloorCollectorConfig {
    /// Cards a full page renders; fewer means this was the last round
    pub batch_size: u32,
    pub max_rounds: u32,
    pub price_ceiling: f64,
    pub start_floor: f64,
}

impl From<&ListingConfig> for FloorCollectorConfig {
    fn from(config: &ListingConfig) -> Self {
        Self {
            batch_size: config.batch_size,
            max_rounds: config.max_rounds,
            price_ceiling: config.price_ceiling,
            start_floor: 0.0,
        }
    }
}

pub struct FloorCollector {
    source: Arc<dyn PageSource>,
    extractor: Arc<dyn RecordExtractor>,
    config: FloorCollectorConfig,
}

impl FloorCollector {
    pub fn new(
        source: Arc<dyn PageSource>,
        extractor: Arc<dyn RecordExtractor>,
        config: FloorCollectorConfig,
    ) -> Self {
        Self {
            source,
            extractor,
            config,
        }
    }

    /// Sweep the listing from the start floor up to the ceiling
    pub async fn collect(&self, label: Option<&str>) -> Collection {
        let ceiling = self.config.price_ceiling;
        let mut floor = self.config.start_floor;
        let mut report = BandReport::new(PriceBand::new(floor, ceiling));
        report.label = label.filter(|l| !l.is_empty()).map(str::to_string);

        let mut collection = Collection::default();
        let mut highest_price: Option<f64> = None;
        let mut finished = false;

        for round in 0..self.config.max_rounds {
            let band = PriceBand::new(floor, ceiling);
            let query = PageQuery::new(band, round, self.config.batch_size);

            let page = match self.source.fetch(&query).await {
                Ok(page) => page,
                Err(e) => {
                    warn!("❌ Round {} from floor {} failed: {}", round, floor, e);
                    report.warnings.push(CollectionWarning::FetchFailed {
                        page_index: round,
                        reason: e.to_string(),
                    });
                    finished = true;
                    break;
                }
            };
            report.pages_fetched += 1;

            let received = page.len();
            debug!("Round {} from floor {}: {} items found", round, floor, received);

            for raw in page.records {
                let record = self.extractor.extract(&raw, label);
                match record.current_price() {
                    Some(price) if !band.contains(price) => {
                        report.out_of_band_dropped += 1;
                    }
                    Some(price) => {
                        highest_price = Some(highest_price.map_or(price, |h| h.max(price)));
                        collection.records.push(record);
                    }
                    None => collection.records.push(record),
                }
                collection.raw.push(raw);
            }

            if received < self.config.batch_size as usize {
                finished = true;
                break;
            }

            match highest_price {
                Some(next) if next > floor => floor = next,
                _ => {
                    let warning = CollectionWarning::FloorStalled { floor };
                    warn!("⚠️ {}", warning);
                    report.warnings.push(warning);
                    finished = true;
                    break;
                }
            }
        }

        if !finished {
            let warning = CollectionWarning::PageCapReached {
                pages: self.config.max_rounds,
            };
            warn!("⚠️ Listing sweep {}", warning);
            report.warnings.push(warning);
        }

        report.records = collection.records.len();
        info!(
            "📊 Listing {}: {} records over {} rounds",
            label.unwrap_or("(unlabelled)"),
            report.records,
            report.pages_fetched
        );

        collection.report = CollectionReport {
            bands: vec![report],
        };
        collection
    }
}
