//! Typed snapshot of the raw records the two external sources return
//!
//! Search API cards are deserialized into a fixed schema; fields this crate
//! does not read are kept in `extra` so the raw dump stays complete. Listing
//! cards keep the outer HTML of one `product-card` element.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One entry as returned by a page source
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RawRecord {
    Card(SearchCard),
    Listing(ListingCard),
}

/// Outer HTML of a single product card from a listing page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingCard {
    pub html: String,
}

/// One element of `cards` in a search response
///
/// A card groups the variants of one product; the first entry of `products`
/// is the one shown on the card.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchCard {
    #[serde(default)]
    pub products: Vec<SearchProduct>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchProduct {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub price: Option<SearchPrice>,
    #[serde(default)]
    pub shield: Option<SearchShield>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPrice {
    #[serde(default)]
    pub now: Option<f64>,
    #[serde(default)]
    pub was: Option<f64>,
    #[serde(default)]
    pub unit_size: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchShield {
    #[serde(default)]
    pub text: Option<ShieldText>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Shield text arrives either as one string or as one string per line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ShieldText {
    One(String),
    Lines(Vec<String>),
}

/// Envelope of one search API response page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub cards: Vec<SearchCard>,
    #[serde(default)]
    pub page: Option<SearchPageInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPageInfo {
    #[serde(default)]
    pub total_elements: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
