//! Fixed-partition collection against an in-memory search API

use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use grocery_catalog::application::{BandCollector, BandCollectorConfig};
use grocery_catalog::domain::Catalog;
use grocery_catalog::domain::collection::CollectionWarning;
use grocery_catalog::domain::pagination::{ExhaustionSignal, PageQuery};
use grocery_catalog::domain::price_band::{PriceBand, PricePartition};
use grocery_catalog::domain::product::RankingWeights;
use grocery_catalog::domain::raw_record::{RawRecord, SearchCard};
use grocery_catalog::domain::services::{FetchError, FetchedPage, PageSource, RecordExtractor};
use grocery_catalog::infrastructure::parsing::ListingSelectors;
use grocery_catalog::infrastructure::{FieldExtractor, ParseContext};

/// Catalog of `(name, now, was)` products; answers like the real endpoint
///
/// Bands are inclusive on both ends, so a product priced at a breakpoint is
/// served by both neighbouring bands.
struct FakeSearchApi {
    products: Vec<(String, f64, Option<f64>)>,
    failing_pages: HashMap<(u64, u32), FetchError>,
    requests: Mutex<Vec<PageQuery>>,
}

impl FakeSearchApi {
    fn new(products: Vec<(&str, f64, Option<f64>)>) -> Self {
        Self {
            products: products
                .into_iter()
                .map(|(n, now, was)| (n.to_string(), now, was))
                .collect(),
            failing_pages: HashMap::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn fail(mut self, band_min: f64, page_index: u32) -> Self {
        self.failing_pages.insert(
            (band_min.to_bits(), page_index),
            FetchError::Status {
                url: "https://www.ah.nl/zoeken/api/products/search".to_string(),
                status: 503,
            },
        );
        self
    }

    fn requested_pages(&self, band_min: f64) -> Vec<u32> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|q| q.band.min == band_min)
            .map(|q| q.page_index)
            .collect()
    }
}

#[async_trait]
impl PageSource for FakeSearchApi {
    fn name(&self) -> &'static str {
        "fake-search-api"
    }

    async fn fetch(&self, query: &PageQuery) -> Result<FetchedPage, FetchError> {
        self.requests.lock().unwrap().push(*query);
        if let Some(err) = self
            .failing_pages
            .get(&(query.band.min.to_bits(), query.page_index))
        {
            return Err(err.clone());
        }

        let matching: Vec<&(String, f64, Option<f64>)> = self
            .products
            .iter()
            .filter(|(_, now, _)| query.band.contains(*now))
            .collect();

        let start = (query.page_index * query.page_size) as usize;
        let records = matching
            .iter()
            .skip(start)
            .take(query.page_size as usize)
            .map(|(name, now, was)| {
                let card: SearchCard = serde_json::from_value(json!({
                    "products": [{
                        "title": name,
                        "link": format!("/producten/product/{name}"),
                        "price": { "now": now, "was": was, "unitSize": "1 st" }
                    }]
                }))
                .unwrap();
                RawRecord::Card(card)
            })
            .collect();

        Ok(FetchedPage {
            records,
            total_available: Some(matching.len() as u64),
        })
    }
}

fn extractor() -> Arc<dyn RecordExtractor> {
    Arc::new(
        FieldExtractor::new(&ListingSelectors::default(), &ParseContext::new("https://www.ah.nl"))
            .unwrap(),
    )
}

fn config(page_size: u32, result_cap: u32) -> BandCollectorConfig {
    BandCollectorConfig {
        page_size,
        result_cap,
        max_pages_per_band: 20,
        exhaustion: ExhaustionSignal::ShortPage,
        band_concurrency: 1,
    }
}

#[tokio::test]
async fn boundary_products_are_merged_and_stay_inside_the_partition() {
    let api = Arc::new(FakeSearchApi::new(vec![
        ("appel", 0.25, None),
        ("banaan", 1.0, None),
        ("citroen", 1.0, Some(1.2)),
        ("dadels", 1.75, Some(2.5)),
        ("eieren", 2.0, None),
    ]));
    let partition = PricePartition::from_breakpoints(&[0.0, 1.0, 2.0], false).unwrap();

    let collection = BandCollector::new(api, extractor(), config(2, 10))
        .collect(&partition)
        .await;
    // banaan and citroen are served by both bands
    assert_eq!(collection.records.len(), 7);

    let catalog = Catalog::merge(collection.records, &RankingWeights::default());
    assert_eq!(catalog.len(), 5);
    assert_eq!(catalog.duplicates_removed(), 2);
    for product in catalog.products() {
        let current = product.record.current_price().unwrap();
        assert!((0.0..=2.0).contains(&current), "{current}");
    }

    // the steepest discount ranks first
    assert_eq!(catalog.products()[0].record.name, "dadels");
}

#[tokio::test]
async fn reported_total_above_cap_warns_once_per_band() {
    let products: Vec<(String, f64)> = (0..3000).map(|i| (format!("p{i}"), 1.5)).collect();
    let api = Arc::new(FakeSearchApi::new(
        products.iter().map(|(n, p)| (n.as_str(), *p, None)).collect(),
    ));

    let collection = BandCollector::new(api.clone(), extractor(), config(500, 2500))
        .collect_band(PriceBand::new(1.0, 2.0))
        .await;

    assert!(collection.records.len() <= 2500);
    let warnings = &collection.report.bands[0].warnings;
    assert_eq!(warnings.len(), 1);
    assert!(matches!(
        warnings[0],
        CollectionWarning::CapExceeded {
            reported_total: 3000,
            cap: 2500
        }
    ));
    assert_eq!(api.requested_pages(1.0), vec![0, 1, 2, 3, 4]);
}

#[tokio::test]
async fn empty_page_stops_the_band() {
    // Exactly one full page: the short-page signal needs an empty page 1 to stop
    let api = Arc::new(FakeSearchApi::new(vec![
        ("a", 0.5, None),
        ("b", 0.6, None),
    ]));

    let collection = BandCollector::new(api.clone(), extractor(), config(2, 10))
        .collect_band(PriceBand::new(0.0, 1.0))
        .await;

    assert_eq!(collection.records.len(), 2);
    assert_eq!(api.requested_pages(0.0), vec![0, 1]);
    assert_eq!(collection.report.bands[0].pages_fetched, 2);
}

#[tokio::test]
async fn reported_total_signal_skips_the_empty_page() {
    let api = Arc::new(FakeSearchApi::new(vec![
        ("a", 0.5, None),
        ("b", 0.6, None),
    ]));
    let config = BandCollectorConfig {
        exhaustion: ExhaustionSignal::ReportedTotal,
        ..config(2, 10)
    };

    BandCollector::new(api.clone(), extractor(), config)
        .collect_band(PriceBand::new(0.0, 1.0))
        .await;

    assert_eq!(api.requested_pages(0.0), vec![0]);
}

#[tokio::test]
async fn failed_page_is_counted_as_empty() {
    let api = Arc::new(
        FakeSearchApi::new(vec![
            ("a", 0.1, None),
            ("b", 0.2, None),
            ("c", 0.3, None),
            ("d", 1.5, None),
        ])
        .fail(0.0, 1),
    );
    let partition = PricePartition::from_breakpoints(&[0.0, 1.0, 2.0], false).unwrap();

    let collection = BandCollector::new(api.clone(), extractor(), config(2, 10))
        .collect(&partition)
        .await;

    // page 1 of the first band is lost, the second band is unaffected
    let names: Vec<&str> = collection.records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b", "d"]);
    assert!(matches!(
        collection.report.bands[0].warnings.as_slice(),
        [CollectionWarning::FetchFailed { page_index: 1, .. }]
    ));
    assert!(collection.report.bands[1].warnings.is_empty());
}

#[tokio::test]
async fn records_priced_outside_the_band_are_dropped() {
    // The discounted price decides; 1.5 now / 3.0 was lands in [1, 2] only
    let api = Arc::new(FakeSearchApi::new(vec![("korting", 1.5, Some(3.0))]));

    struct WideBandSource(Arc<FakeSearchApi>);

    #[async_trait]
    impl PageSource for WideBandSource {
        fn name(&self) -> &'static str {
            "wide"
        }

        async fn fetch(&self, query: &PageQuery) -> Result<FetchedPage, FetchError> {
            // ignores the band like a misbehaving endpoint would
            let everything =
                PageQuery::new(PriceBand::open_ended(0.0), query.page_index, query.page_size);
            self.0.fetch(&everything).await
        }
    }

    let source = Arc::new(WideBandSource(api));
    let collection = BandCollector::new(source, extractor(), config(500, 2500))
        .collect_band(PriceBand::new(2.0, 3.0))
        .await;

    assert!(collection.records.is_empty());
    assert_eq!(collection.raw.len(), 1);
    assert_eq!(collection.report.bands[0].out_of_band_dropped, 1);
}
