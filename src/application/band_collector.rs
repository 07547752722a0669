//! Fixed-partition collector for the search API
//!
//! Walks a `PricePartition` band by band and pages through each band until
//! the exhaustion signal fires. Every lossy condition becomes a warning on
//! the band's report; nothing here fails the run.

#![allow(clippy::uninlined_format_args)]

use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::collection::{BandReport, Collection, CollectionReport, CollectionWarning};
use crate::domain::pagination::{ExhaustionSignal, PageQuery, PaginationCalculator};
use crate::domain::price_band::{PriceBand, PricePartition};
use crate::domain::services::{PageSource, RecordExtractor};
use crate::infrastructure::config::SearchConfig;

/// Pagination limits of one collector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandCollectorConfig {
    pub page_size: u32,
    pub result_cap: u32,
    pub max_pages_per_band: u32,
    pub exhaustion: ExhaustionSignal,
    pub band_concurrency: usize,
}

impl From<&SearchConfig> for BandCollectorConfig {
    fn from(config: &SearchConfig) -> Self {
        Self {
            page_size: config.page_size,
            result_cap: config.result_cap,
            max_pages_per_band: config.max_pages_per_band,
            exhaustion: config.exhaustion,
            band_concurrency: config.band_concurrency,
        }
    }
}

impl Default for BandCollectorConfig {
    fn default() -> Self {
        Self::from(&SearchConfig::default())
    }
}

pub struct BandCollector {
    source: Arc<dyn PageSource>,
    extractor: Arc<dyn RecordExtractor>,
    config: BandCollectorConfig,
    pagination: PaginationCalculator,
}

impl BandCollector {
    pub fn new(
        source: Arc<dyn PageSource>,
        extractor: Arc<dyn RecordExtractor>,
        config: BandCollectorConfig,
    ) -> Self {
        Self {
            source,
            extractor,
            pagination: PaginationCalculator::new(config.page_size, config.result_cap),
            config,
        }
    }

    /// Collect every band of `partition`
    ///
    /// Up to `band_concurrency` bands are in flight at once; results are
    /// concatenated in band order regardless of completion order.
    pub async fn collect(&self, partition: &PricePartition) -> Collection {
        info!(
            "🔍 Collecting {} price bands from {} (page size {}, cap {})",
            partition.len(),
            self.source.name(),
            self.config.page_size,
            self.config.result_cap
        );

        let per_band: Vec<Collection> = stream::iter(partition.bands().iter().copied())
            .map(|band| self.collect_band(band))
            .buffered(self.config.band_concurrency.max(1))
            .collect()
            .await;

        let mut collection = Collection::default();
        for band_collection in per_band {
            collection.absorb(band_collection);
        }

        info!(
            "✅ Collected {} records over {} pages, {} warnings",
            collection.records.len(),
            collection.report.total_pages(),
            collection.report.warning_count()
        );
        collection
    }

    /// Page through one band; pages are strictly sequential
    pub async fn collect_band(&self, band: PriceBand) -> Collection {
        let mut report = BandReport::new(band);
        let mut collection = Collection::default();
        let mut query = PageQuery::new(band, 0, self.config.page_size);

        loop {
            if report.pages_fetched >= self.config.max_pages_per_band {
                let warning = CollectionWarning::PageCapReached {
                    pages: report.pages_fetched,
                };
                warn!("⚠️ Band {}: {}", band, warning);
                report.warnings.push(warning);
                break;
            }

            let page = match self.source.fetch(&query).await {
                Ok(page) => page,
                Err(e) => {
                    warn!("❌ Band {} page {} failed: {}", band, query.page_index, e);
                    report.warnings.push(CollectionWarning::FetchFailed {
                        page_index: query.page_index,
                        reason: e.to_string(),
                    });
                    break;
                }
            };
            report.pages_fetched += 1;

            if let Some(total) = page.total_available {
                report.reported_total = Some(total);
                let already_warned = report
                    .warnings
                    .iter()
                    .any(|w| matches!(w, CollectionWarning::CapExceeded { .. }));
                if total > u64::from(self.config.result_cap) && !already_warned {
                    let warning = CollectionWarning::CapExceeded {
                        reported_total: total,
                        cap: self.config.result_cap,
                    };
                    warn!("⚠️ WARNING band {}: {}", band, warning);
                    report.warnings.push(warning);
                }
            }

            let received = page.len();
            for raw in page.records {
                let record = self.extractor.extract(&raw, None);
                // minPrice/maxPrice filter on the shelf price (`price.now`)
                match record.current_price() {
                    Some(price) if !band.contains(price) => {
                        debug!("Dropping '{}' priced {} outside band {}", record.name, price, band);
                        report.out_of_band_dropped += 1;
                    }
                    _ => collection.records.push(record),
                }
                collection.raw.push(raw);
            }

            debug!(
                "Band {} page {}: {} records",
                band, query.page_index, received
            );

            if self.pagination.is_exhausted(
                self.config.exhaustion,
                query.page_index,
                received,
                page.total_available,
            ) {
                // A reported total already told us whether the cap truncated the band
                if report.reported_total.is_none()
                    && self.pagination.hit_result_cap(query.page_index, received)
                {
                    let warning = CollectionWarning::ResultCapReached {
                        cap: self.config.result_cap,
                        pages: report.pages_fetched,
                    };
                    warn!("⚠️ Band {}: {}", band, warning);
                    report.warnings.push(warning);
                }
                break;
            }
            query = query.next();
        }

        report.records = collection.records.len();
        info!(
            "📊 Band {}: {} records from {} pages",
            band, report.records, report.pages_fetched
        );

        collection.report = CollectionReport {
            bands: vec![report],
        };
        collection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::raw_record::{RawRecord, SearchCard};
    use crate::domain::services::{FetchError, FetchedPage};
    use crate::infrastructure::parsing::{FieldExtractor, ListingSelectors, ParseContext};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Serves `per_page` cards priced at the band minimum until `available` is used up
    struct CountingSource {
        available: usize,
        reported_total: Option<u64>,
        requests: Mutex<Vec<PageQuery>>,
    }

    fn card(name: &str, price: f64) -> RawRecord {
        let card: SearchCard = serde_json::from_value(serde_json::json!({
            "products": [{ "title": name, "price": { "now": price } }]
        }))
        .unwrap();
        RawRecord::Card(card)
    }

    #[async_trait]
    impl PageSource for CountingSource {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn fetch(&self, query: &PageQuery) -> Result<FetchedPage, FetchError> {
            self.requests.lock().unwrap().push(*query);
            let start = (query.page_index * query.page_size) as usize;
            let end = (start + query.page_size as usize).min(self.available);
            let records = (start..end.max(start))
                .map(|i| card(&format!("p{i}"), query.band.min))
                .collect();
            Ok(FetchedPage {
                records,
                total_available: self.reported_total,
            })
        }
    }

    fn extractor() -> Arc<dyn RecordExtractor> {
        Arc::new(
            FieldExtractor::new(
                &ListingSelectors::default(),
                &ParseContext::new("https://www.ah.nl"),
            )
            .unwrap(),
        )
    }

    fn collector(source: Arc<CountingSource>, config: BandCollectorConfig) -> BandCollector {
        BandCollector::new(source, extractor(), config)
    }

    fn config(page_size: u32, result_cap: u32) -> BandCollectorConfig {
        BandCollectorConfig {
            page_size,
            result_cap,
            ..BandCollectorConfig::default()
        }
    }

    #[tokio::test]
    async fn test_capped_band_warns_once_and_stops_at_cap() {
        let source = Arc::new(CountingSource {
            available: 3000,
            reported_total: Some(3000),
            requests: Mutex::new(Vec::new()),
        });
        let collection = collector(source.clone(), config(500, 2500))
            .collect_band(PriceBand::new(1.0, 2.0))
            .await;

        let report = &collection.report.bands[0];
        assert_eq!(collection.records.len(), 2500);
        assert_eq!(report.pages_fetched, 5);
        assert_eq!(
            report.warnings,
            vec![CollectionWarning::CapExceeded {
                reported_total: 3000,
                cap: 2500
            }]
        );
        assert!(report.is_incomplete());
        let pages: Vec<u32> = source
            .requests
            .lock()
            .unwrap()
            .iter()
            .map(|q| q.page_index)
            .collect();
        assert_eq!(pages, vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_full_pages_up_to_cap_without_total_mark_band_incomplete() {
        for exhaustion in [ExhaustionSignal::ShortPage, ExhaustionSignal::ReportedTotal] {
            let source = Arc::new(CountingSource {
                available: usize::MAX / 2,
                reported_total: None,
                requests: Mutex::new(Vec::new()),
            });
            let config = BandCollectorConfig {
                exhaustion,
                ..config(500, 2500)
            };
            let collection = collector(source, config)
                .collect_band(PriceBand::new(1.0, 2.0))
                .await;

            let report = &collection.report.bands[0];
            assert_eq!(collection.records.len(), 2500);
            assert_eq!(report.pages_fetched, 5);
            assert_eq!(
                report.warnings,
                vec![CollectionWarning::ResultCapReached {
                    cap: 2500,
                    pages: 5
                }]
            );
            assert!(report.is_incomplete());
        }
    }

    #[tokio::test]
    async fn test_total_at_cap_is_complete() {
        let source = Arc::new(CountingSource {
            available: 2500,
            reported_total: Some(2500),
            requests: Mutex::new(Vec::new()),
        });
        let collection = collector(source, config(500, 2500))
            .collect_band(PriceBand::new(1.0, 2.0))
            .await;

        assert_eq!(collection.records.len(), 2500);
        assert!(collection.report.bands[0].warnings.is_empty());
    }

    #[tokio::test]
    async fn test_short_page_ends_band() {
        let source = Arc::new(CountingSource {
            available: 700,
            reported_total: None,
            requests: Mutex::new(Vec::new()),
        });
        let collection = collector(source.clone(), config(500, 2500))
            .collect_band(PriceBand::new(0.0, 0.5))
            .await;

        assert_eq!(collection.records.len(), 700);
        assert_eq!(collection.raw.len(), 700);
        assert_eq!(source.requests.lock().unwrap().len(), 2);
        assert!(collection.report.bands[0].warnings.is_empty());
    }

    #[tokio::test]
    async fn test_page_cap_is_a_warning() {
        let source = Arc::new(CountingSource {
            available: 10_000,
            reported_total: None,
            requests: Mutex::new(Vec::new()),
        });
        let config = BandCollectorConfig {
            max_pages_per_band: 3,
            ..config(100, 10_000)
        };
        let collection = collector(source, config)
            .collect_band(PriceBand::new(0.0, 1.0))
            .await;

        assert_eq!(collection.records.len(), 300);
        assert_eq!(
            collection.report.bands[0].warnings,
            vec![CollectionWarning::PageCapReached { pages: 3 }]
        );
    }

    #[tokio::test]
    async fn test_bands_concatenate_in_order_with_concurrency() {
        let source = Arc::new(CountingSource {
            available: 3,
            reported_total: Some(3),
            requests: Mutex::new(Vec::new()),
        });
        let config = BandCollectorConfig {
            band_concurrency: 4,
            ..config(500, 2500)
        };
        let partition = PricePartition::from_breakpoints(&[0.0, 1.0, 2.0, 3.0], false).unwrap();
        let collection = collector(source, config).collect(&partition).await;

        let prices: Vec<Option<f64>> = collection.records.iter().map(|r| r.price).collect();
        assert_eq!(
            prices,
            vec![
                Some(0.0),
                Some(0.0),
                Some(0.0),
                Some(1.0),
                Some(1.0),
                Some(1.0),
                Some(2.0),
                Some(2.0),
                Some(2.0)
            ]
        );
        assert_eq!(collection.report.bands.len(), 3);
        assert_eq!(collection.report.bands[2].band, PriceBand::new(2.0, 3.0));
    }
}
