//! Product records extracted from listing cards and search results
//!
//! A `ProductRecord` is created once per collected card and never mutated
//! afterwards. Ranking fields are attached at merge time by wrapping the
//! record in a `RankedProduct`.

use serde::{Deserialize, Serialize};

/// One product as seen on one page of one band
///
/// The retailer exposes no stable product identifier, so two records are the
/// same product only when every field is equal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub name: String,
    pub link: String,
    pub quantity: String,
    pub promotion: String,
    pub price: Option<f64>,
    pub price_discounted: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl ProductRecord {
    /// Build a record, enforcing `price_discounted <= price`
    ///
    /// A discounted price above the regular price cannot be a discount; it is
    /// dropped rather than kept as a negative saving.
    pub fn new(
        name: String,
        link: String,
        quantity: String,
        promotion: String,
        price: Option<f64>,
        price_discounted: Option<f64>,
    ) -> Self {
        let price_discounted = match (price, price_discounted) {
            (Some(regular), Some(discounted)) if discounted > regular => {
                tracing::debug!(
                    "Dropping discounted price {} above regular price {} for '{}'",
                    discounted,
                    regular,
                    name
                );
                None
            }
            (_, discounted) => discounted,
        };

        Self {
            name,
            link,
            quantity,
            promotion,
            price,
            price_discounted,
            label: None,
        }
    }

    /// Attach a category label; an empty label leaves the record unlabelled
    pub fn with_label(mut self, label: Option<&str>) -> Self {
        self.label = label.filter(|l| !l.is_empty()).map(str::to_string);
        self
    }

    /// The price the shopper pays right now: the discounted price when there is one
    pub fn current_price(&self) -> Option<f64> {
        self.price_discounted.or(self.price)
    }

    /// Key used for exact-duplicate detection
    ///
    /// Floats are compared by bit pattern so the key can be hashed.
    pub fn identity_key(&self) -> ProductKey<'_> {
        ProductKey {
            name: &self.name,
            link: &self.link,
            quantity: &self.quantity,
            promotion: &self.promotion,
            price: self.price.map(f64::to_bits),
            price_discounted: self.price_discounted.map(f64::to_bits),
            label: self.label.as_deref(),
        }
    }
}

/// Borrowed full-field identity of a `ProductRecord`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProductKey<'a> {
    name: &'a str,
    link: &'a str,
    quantity: &'a str,
    promotion: &'a str,
    price: Option<u64>,
    price_discounted: Option<u64>,
    label: Option<&'a str>,
}

/// Weights of the composite ranking score
///
/// `discount_relative = discount / absolute_divisor + discount_percentage / percentage_divisor`.
/// The defaults (10 and 50) are a hand-tuned heuristic mixing absolute and
/// relative savings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankingWeights {
    pub absolute_divisor: f64,
    pub percentage_divisor: f64,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            absolute_divisor: 10.0,
            percentage_divisor: 50.0,
        }
    }
}

/// A deduplicated record with its derived discount fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedProduct {
    #[serde(flatten)]
    pub record: ProductRecord,
    pub discount: Option<f64>,
    pub discount_percentage: Option<f64>,
    pub discount_relative: Option<f64>,
}

impl RankedProduct {
    /// Compute derived fields; any missing input leaves all three empty
    pub fn rank(record: ProductRecord, weights: &RankingWeights) -> Self {
        let derived = match (record.price, record.price_discounted) {
            (Some(price), Some(discounted)) if price > 0.0 => {
                let discount = price - discounted;
                let percentage = discount / price * 100.0;
                let relative =
                    discount / weights.absolute_divisor + percentage / weights.percentage_divisor;
                Some((discount, percentage, relative))
            }
            _ => None,
        };

        Self {
            record,
            discount: derived.map(|d| d.0),
            discount_percentage: derived.map(|d| d.1),
            discount_relative: derived.map(|d| d.2),
        }
    }
}
