//! Merged, deduplicated and ranked product catalog

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;

use super::product::{ProductRecord, RankedProduct, RankingWeights};

/// The one catalog of a run, produced by `Catalog::merge`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    products: Vec<RankedProduct>,
    duplicates_removed: usize,
}

impl Catalog {
    /// Dedup, rank, and order collected records
    ///
    /// First occurrences win, so the surviving order is band order then
    /// page order before the stable sort by `discount_relative`.
    pub fn merge(collected: Vec<ProductRecord>, weights: &RankingWeights) -> Self {
        let collected_count = collected.len();
        let unique = dedup_records(collected);
        let duplicates_removed = collected_count - unique.len();

        let mut products: Vec<RankedProduct> = unique
            .into_iter()
            .map(|record| RankedProduct::rank(record, weights))
            .collect();
        products.sort_by(|a, b| compare_relative(a.discount_relative, b.discount_relative));

        tracing::debug!(
            "Merged {} collected records into {} products ({} duplicates)",
            collected_count,
            products.len(),
            duplicates_removed
        );

        Self {
            products,
            duplicates_removed,
        }
    }

    pub fn products(&self) -> &[RankedProduct] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub const fn duplicates_removed(&self) -> usize {
        self.duplicates_removed
    }

    /// Products with a computable discount
    pub fn discounted(&self) -> impl Iterator<Item = &RankedProduct> {
        self.products.iter().filter(|p| p.discount_relative.is_some())
    }

    /// Back to plain records, in catalog order
    pub fn into_records(self) -> Vec<ProductRecord> {
        self.products.into_iter().map(|p| p.record).collect()
    }
}

/// Remove exact duplicates (all fields equal), keeping first occurrences in order
pub fn dedup_records(records: Vec<ProductRecord>) -> Vec<ProductRecord> {
    let mut unique = Vec::with_capacity(records.len());
    {
        let mut seen = HashSet::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            if seen.insert(record.identity_key()) {
                unique.push(index);
            }
        }
    }

    let mut keep = unique.into_iter().peekable();
    records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| {
            if keep.peek() == Some(&index) {
                keep.next();
                Some(record)
            } else {
                None
            }
        })
        .collect()
}

/// Descending by score; records without a score sort last
fn compare_relative(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
