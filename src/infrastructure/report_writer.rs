//! Output sinks: HTML report, raw JSON dump and catalog JSON
//!
//! Every sink rewrites its file from scratch on each run.

#![allow(clippy::uninlined_format_args)]

use async_trait::async_trait;
use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;
use uuid::Uuid;

use crate::domain::collection::CollectionReport;
use crate::domain::product::RankedProduct;
use crate::domain::raw_record::RawRecord;
use crate::domain::services::{CatalogSink, RunArtifacts, SinkError};

/// Write `content` to `path`, replacing any previous file
async fn overwrite(path: &Path, content: &[u8]) -> Result<(), SinkError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|source| SinkError::Io {
                path: path.to_path_buf(),
                source,
            })?;
    }

    fs::write(path, content)
        .await
        .map_err(|source| SinkError::Io {
            path: path.to_path_buf(),
            source,
        })
}

fn to_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<Vec<u8>, SinkError> {
    serde_json::to_vec_pretty(value).map_err(|source| SinkError::Serialize {
        path: path.to_path_buf(),
        source,
    })
}

/// Static HTML table, one row per catalog product, in catalog order
pub struct HtmlReportSink {
    path: PathBuf,
    limit: Option<usize>,
}

impl HtmlReportSink {
    pub fn new(path: impl Into<PathBuf>, limit: Option<usize>) -> Self {
        Self {
            path: path.into(),
            limit,
        }
    }

    /// Render the full document
    pub fn render(&self, artifacts: &RunArtifacts<'_>) -> String {
        let products = artifacts.catalog.products();
        let shown = self.limit.map_or(products.len(), |limit| limit.min(products.len()));

        let mut html = String::with_capacity(256 + shown * 512);
        html.push_str("<!DOCTYPE html>\n<html lang=\"nl\">\n<head>\n<meta charset=\"utf-8\">\n");
        html.push_str("<title>Product catalog</title>\n</head>\n<body>\n");
        let _ = writeln!(
            html,
            "<p>Run {} generated {}: {} products, {} with a discount, {} duplicates removed.</p>",
            artifacts.run_id,
            artifacts.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            products.len(),
            artifacts.catalog.discounted().count(),
            artifacts.catalog.duplicates_removed()
        );

        html.push_str("<table border=\"1\" class=\"dataframe\">\n<thead>\n<tr>");
        for column in [
            "",
            "name",
            "link",
            "quantity",
            "promotion",
            "price",
            "price_discounted",
            "label",
            "discount",
            "discount_percentage",
            "discount_relative",
        ] {
            let _ = write!(html, "<th>{}</th>", column);
        }
        html.push_str("</tr>\n</thead>\n<tbody>\n");

        for (index, product) in products.iter().take(shown).enumerate() {
            render_row(&mut html, index, product);
        }

        html.push_str("</tbody>\n</table>\n</body>\n</html>\n");
        html
    }
}

fn render_row(html: &mut String, index: usize, product: &RankedProduct) {
    let record = &product.record;
    let _ = write!(html, "<tr><th>{}</th>", index);
    let _ = write!(html, "<td>{}</td>", escape_html(&record.name));
    if record.link.is_empty() {
        html.push_str("<td></td>");
    } else {
        let _ = write!(
            html,
            "<td><a href=\"{}\">link</a></td>",
            escape_html(&record.link)
        );
    }
    let _ = write!(html, "<td>{}</td>", escape_html(&record.quantity));
    let _ = write!(html, "<td>{}</td>", escape_html(&record.promotion));
    let _ = write!(html, "<td>{}</td>", format_number(record.price, 2));
    let _ = write!(html, "<td>{}</td>", format_number(record.price_discounted, 2));
    let _ = write!(
        html,
        "<td>{}</td>",
        escape_html(record.label.as_deref().unwrap_or_default())
    );
    let _ = write!(html, "<td>{}</td>", format_number(product.discount, 2));
    let _ = write!(html, "<td>{}</td>", format_number(product.discount_percentage, 1));
    let _ = write!(html, "<td>{}</td>", format_number(product.discount_relative, 3));
    html.push_str("</tr>\n");
}

fn format_number(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(String::new, |v| format!("{:.*}", precision, v))
}

/// Escape text for use in element content and quoted attributes
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[async_trait]
impl CatalogSink for HtmlReportSink {
    fn name(&self) -> &'static str {
        "html-report"
    }

    async fn write(&self, artifacts: &RunArtifacts<'_>) -> Result<PathBuf, SinkError> {
        let html = self.render(artifacts);
        overwrite(&self.path, html.as_bytes()).await?;
        info!("📄 HTML report written to {:?}", self.path);
        Ok(self.path.clone())
    }
}

/// Pre-merge raw records as returned by the page sources
pub struct RawJsonSink {
    path: PathBuf,
}

impl RawJsonSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogSink for RawJsonSink {
    fn name(&self) -> &'static str {
        "raw-json"
    }

    async fn write(&self, artifacts: &RunArtifacts<'_>) -> Result<PathBuf, SinkError> {
        let raw: &[RawRecord] = &artifacts.collection.raw;
        let content = to_json(&self.path, raw)?;
        overwrite(&self.path, &content).await?;
        info!("Raw dump of {} records written to {:?}", raw.len(), self.path);
        Ok(self.path.clone())
    }
}

#[derive(Serialize)]
struct CatalogDocument<'a> {
    run_id: Uuid,
    generated_at: String,
    product_count: usize,
    duplicates_removed: usize,
    collection: &'a CollectionReport,
    products: &'a [RankedProduct],
}

/// Merged catalog plus the collection report
pub struct CatalogJsonSink {
    path: PathBuf,
}

impl CatalogJsonSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogSink for CatalogJsonSink {
    fn name(&self) -> &'static str {
        "catalog-json"
    }

    async fn write(&self, artifacts: &RunArtifacts<'_>) -> Result<PathBuf, SinkError> {
        let document = CatalogDocument {
            run_id: artifacts.run_id,
            generated_at: artifacts.generated_at.to_rfc3339(),
            product_count: artifacts.catalog.len(),
            duplicates_removed: artifacts.catalog.duplicates_removed(),
            collection: &artifacts.collection.report,
            products: artifacts.catalog.products(),
        };
        let content = to_json(&self.path, &document)?;
        overwrite(&self.path, &content).await?;
        info!("Catalog JSON written to {:?}", self.path);
        Ok(self.path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::Catalog;
    use crate::domain::collection::Collection;
    use crate::domain::product::{ProductRecord, RankingWeights};
    use chrono::Utc;

    fn catalog() -> Catalog {
        Catalog::merge(
            vec![
                ProductRecord::new(
                    "Ben & Jerry's <Cookie Dough>".to_string(),
                    "https://www.ah.nl/producten/product/wi1?a=1&b=2".to_string(),
                    "465 ml".to_string(),
                    "25% korting".to_string(),
                    Some(6.99),
                    Some(5.24),
                ),
                ProductRecord::new(
                    "AH Water".to_string(),
                    String::new(),
                    "1,5 l".to_string(),
                    String::new(),
                    Some(0.45),
                    None,
                ),
            ],
            &RankingWeights::default(),
        )
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_render_links_and_escapes() {
        let catalog = catalog();
        let collection = Collection::default();
        let artifacts = RunArtifacts {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            collection: &collection,
            catalog: &catalog,
        };

        let html = HtmlReportSink::new("unused.html", None).render(&artifacts);
        assert!(html.contains(
            "<a href=\"https://www.ah.nl/producten/product/wi1?a=1&amp;b=2\">link</a>"
        ));
        assert!(html.contains("Ben &amp; Jerry&#39;s &lt;Cookie Dough&gt;"));
        assert!(html.contains("<td>6.99</td><td>5.24</td>"));
        assert_eq!(html.matches("<tr><th>").count(), 2);

        let limited = HtmlReportSink::new("unused.html", Some(1)).render(&artifacts);
        assert_eq!(limited.matches("<tr><th>").count(), 1);
    }
}
