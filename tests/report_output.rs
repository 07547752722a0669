//! Output files written by the sinks

use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use grocery_catalog::application::publish;
use grocery_catalog::domain::Catalog;
use grocery_catalog::domain::collection::Collection;
use grocery_catalog::domain::product::{ProductRecord, RankingWeights};
use grocery_catalog::domain::raw_record::{ListingCard, RawRecord};
use grocery_catalog::domain::services::{CatalogSink, RunArtifacts};
use grocery_catalog::infrastructure::{CatalogJsonSink, HtmlReportSink, RawJsonSink};

fn record(name: &str, price: f64, discounted: Option<f64>) -> ProductRecord {
    ProductRecord::new(
        name.to_string(),
        format!("https://www.ah.nl/producten/product/{name}"),
        "1 st".to_string(),
        String::new(),
        Some(price),
        discounted,
    )
}

fn collection() -> Collection {
    let mut collection = Collection::default();
    collection.records = vec![
        record("komkommer", 0.89, None),
        record("avocado", 1.99, Some(1.49)),
        record("avocado", 1.99, Some(1.49)),
    ];
    collection.raw = vec![RawRecord::Listing(ListingCard {
        html: "<article data-testhook=\"product-card\"></article>".to_string(),
    })];
    collection
}

#[tokio::test]
async fn sinks_overwrite_previous_output() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("AH_prod.html");
    std::fs::write(&path, "stale report from an earlier run ".repeat(1000)).unwrap();

    let collection = collection();
    let catalog = Catalog::merge(collection.records.clone(), &RankingWeights::default());
    let artifacts = RunArtifacts {
        run_id: Uuid::new_v4(),
        generated_at: Utc::now(),
        collection: &collection,
        catalog: &catalog,
    };

    let written = HtmlReportSink::new(&path, None).write(&artifacts).await.unwrap();
    let html = std::fs::read_to_string(written).unwrap();

    assert!(!html.contains("stale report"));
    assert!(html.contains("<a href=\"https://www.ah.nl/producten/product/avocado\">link</a>"));
    // discounted product first, unscored last
    assert!(html.find("avocado").unwrap() < html.find("komkommer").unwrap());
}

#[tokio::test]
async fn raw_dump_keeps_pre_merge_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("allproducts_summary.json");

    let collection = collection();
    let catalog = Catalog::default();
    let artifacts = RunArtifacts {
        run_id: Uuid::new_v4(),
        generated_at: Utc::now(),
        collection: &collection,
        catalog: &catalog,
    };
    RawJsonSink::new(&path).write(&artifacts).await.unwrap();

    let dump: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let entries = dump.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert!(entries[0]["html"].as_str().unwrap().contains("product-card"));
}

#[tokio::test]
async fn publish_writes_catalog_json_with_ranking_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.json");
    let sinks: Vec<Box<dyn CatalogSink>> = vec![Box::new(CatalogJsonSink::new(&path))];

    let summary = publish(Uuid::new_v4(), collection(), &RankingWeights::default(), &sinks)
        .await
        .unwrap();
    assert_eq!(summary.products, 2);
    assert_eq!(summary.outputs, vec![path.clone()]);

    let document: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(document["product_count"], 2);
    assert_eq!(document["duplicates_removed"], 1);

    let first = &document["products"][0];
    assert_eq!(first["name"], "avocado");
    assert!((first["discount"].as_f64().unwrap() - 0.5).abs() < 1e-9);
    assert!(document["products"][1]["discount_relative"].is_null());
}
