//! Run orchestration: collect, merge, write outputs
//!
//! The orchestrator owns the run's `Collection` and `Catalog`; nothing is
//! shared between runs.

#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::catalog::Catalog;
use crate::domain::collection::Collection;
use crate::domain::product::RankingWeights;
use crate::domain::services::{CatalogSink, RunArtifacts, SinkError};
use crate::infrastructure::config::AppConfig;
use super::band_collector::{BandCollector, BandCollectorConfig};
use super::category_discovery_service::CategoryDiscoveryService;
use super::floor_collector::{FloorCollector, FloorCollectorConfig};
use crate::infrastructure::parsing::{
    CategoryParser, FieldExtractor, ParseContext, ProductCardParser,
};
use crate::infrastructure::report_writer::{CatalogJsonSink, HtmlReportSink, RawJsonSink};
use crate::infrastructure::{HttpClient, ListingPageClient, SearchApiClient};

/// Which source and collector a run uses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    /// Search API over the configured price partition
    Bands,
    /// Every category of the overview page, swept with a rising floor
    Categories,
    /// One listing URL, swept with a rising floor
    Listing { url: String, label: Option<String> },
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bands => write!(f, "bands"),
            Self::Categories => write!(f, "categories"),
            Self::Listing { url, .. } => write!(f, "listing {}", url),
        }
    }
}

/// Outcome of one run, logged at the end and printed by the binary
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub collected_records: usize,
    pub products: usize,
    pub discounted_products: usize,
    pub duplicates_removed: usize,
    pub pages_fetched: u32,
    pub warnings: usize,
    pub incomplete_bands: Vec<String>,
    pub outputs: Vec<PathBuf>,
}

pub struct CatalogRun {
    config: AppConfig,
    http_client: HttpClient,
    extractor: Arc<FieldExtractor>,
}

impl CatalogRun {
    pub fn new(config: AppConfig) -> Result<Self> {
        let http_client = HttpClient::new(&config.http).context("Failed to build HTTP client")?;
        let extractor = FieldExtractor::new(
            &config.listing.selectors,
            &ParseContext::new(config.listing.base_url.clone()),
        )
        .context("Invalid listing selectors")?;

        Ok(Self {
            config,
            http_client,
            extractor: Arc::new(extractor),
        })
    }

    /// Run one full collection and write every output
    pub async fn execute(&self, mode: &RunMode) -> Result<RunSummary> {
        let run_id = Uuid::new_v4();
        info!("🚀 Starting catalog run {} ({})", run_id, mode);

        let collection = self.collect(mode).await?;
        let summary = publish(run_id, collection, &self.config.ranking, &self.sinks()).await?;

        info!(
            "✅ Run {} finished: {} records collected, {} products ({} discounted), {} duplicates removed",
            summary.run_id,
            summary.collected_records,
            summary.products,
            summary.discounted_products,
            summary.duplicates_removed
        );
        if !summary.incomplete_bands.is_empty() {
            warn!(
                "⚠️ {} bands are known to be incomplete: {}",
                summary.incomplete_bands.len(),
                summary.incomplete_bands.join(", ")
            );
        }
        Ok(summary)
    }

    async fn collect(&self, mode: &RunMode) -> Result<Collection> {
        match mode {
            RunMode::Bands => {
                let partition = self.config.price_partition()?;
                let source = SearchApiClient::new(
                    self.http_client.clone(),
                    self.config.search.endpoint.clone(),
                );
                let collector = BandCollector::new(
                    Arc::new(source),
                    self.extractor.clone(),
                    BandCollectorConfig::from(&self.config.search),
                );
                Ok(collector.collect(&partition).await)
            }
            RunMode::Categories => {
                let listing = &self.config.listing;
                let parser = CategoryParser::new(&listing.selectors, &listing.base_url)?;
                let discovery = CategoryDiscoveryService::new(
                    self.http_client.clone(),
                    self.config.listing.categories_url.clone(),
                    parser,
                );
                let categories = discovery
                    .discover()
                    .await
                    .context("Category discovery failed")?;

                let mut collection = Collection::default();
                for category in &categories {
                    let collector = self.listing_collector(&category.link)?;
                    collection.absorb(collector.collect(Some(&category.name)).await);
                }
                Ok(collection)
            }
            RunMode::Listing { url, label } => {
                let collector = self.listing_collector(url)?;
                Ok(collector.collect(label.as_deref()).await)
            }
        }
    }

    fn listing_collector(&self, url: &str) -> Result<FloorCollector> {
        let listing = &self.config.listing;
        let parser = ProductCardParser::new(&listing.selectors, listing.base_url.clone())?;
        let source = ListingPageClient::new(
            self.http_client.clone(),
            url,
            listing.sort_by.clone(),
            listing.page_offset,
            parser,
        );

        Ok(FloorCollector::new(
            Arc::new(source),
            self.extractor.clone(),
            FloorCollectorConfig::from(listing),
        ))
    }

    /// Output sinks in write order: raw dump, HTML report, catalog JSON
    pub fn sinks(&self) -> Vec<Box<dyn CatalogSink>> {
        let output = &self.config.output;
        let mut sinks: Vec<Box<dyn CatalogSink>> = Vec::new();
        if output.write_raw {
            sinks.push(Box::new(RawJsonSink::new(output.directory.join(&output.raw_json))));
        }
        sinks.push(Box::new(HtmlReportSink::new(
            output.directory.join(&output.html_report),
            output.report_limit,
        )));
        sinks.push(Box::new(CatalogJsonSink::new(
            output.directory.join(&output.catalog_json),
        )));
        sinks
    }
}

/// Merge a collection and hand the result to every sink in order
///
/// The first sink error aborts; files already written stay in place.
pub async fn publish(
    run_id: Uuid,
    collection: Collection,
    weights: &RankingWeights,
    sinks: &[Box<dyn CatalogSink>],
) -> Result<RunSummary, SinkError> {
    let collected_records = collection.records.len();
    let catalog = Catalog::merge(collection.records.clone(), weights);

    let artifacts = RunArtifacts {
        run_id,
        generated_at: Utc::now(),
        collection: &collection,
        catalog: &catalog,
    };

    let mut outputs = Vec::with_capacity(sinks.len());
    for sink in sinks {
        outputs.push(sink.write(&artifacts).await?);
    }

    let report = &collection.report;
    Ok(RunSummary {
        run_id,
        collected_records,
        products: catalog.len(),
        discounted_products: catalog.discounted().count(),
        duplicates_removed: catalog.duplicates_removed(),
        pages_fetched: report.total_pages(),
        warnings: report.warning_count(),
        incomplete_bands: report
            .incomplete_bands()
            .map(|b| match &b.label {
                Some(label) => format!("{} {}", label, b.band),
                None => b.band.to_string(),
            })
            .collect(),
        outputs,
    })
}
