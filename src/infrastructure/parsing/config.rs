//! Parsing configuration for HTML extraction
//!
//! CSS selectors for listing and category pages. Every field holds a list of
//! fallbacks tried in order; the first one that matches wins.

use serde::{Deserialize, Serialize};

/// CSS selectors for product listing and category overview pages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingSelectors {
    /// One element per product card
    pub product_card: Vec<String>,

    /// Product name; the first text node is used
    pub title: Vec<String>,

    /// Anchor whose `href` is the product page
    pub link: Vec<String>,

    /// Package size, e.g. "500 g"
    pub unit_size: Vec<String>,

    /// Promotion shield; each `promotion_line` inside it is one line
    pub shield: Vec<String>,

    pub promotion_line: Vec<String>,

    /// Price elements: regular first, discounted second
    pub price_amount: Vec<String>,

    /// Anchors on the category overview page
    pub category_card: Vec<String>,
}

impl Default for ListingSelectors {
    fn default() -> Self {
        Self {
            product_card: vec!["[data-testhook='product-card']".to_string()],
            title: vec![
                ".line-clamp.line-clamp--active.title_lineclamp__10wki".to_string(),
                "[data-testhook='product-title']".to_string(),
            ],
            link: vec!["a.link_root__fmxIo".to_string(), "a[href]".to_string()],
            unit_size: vec!["[data-testhook='product-unit-size']".to_string()],
            shield: vec!["[data-testhook='product-shield']".to_string()],
            promotion_line: vec!["span".to_string()],
            price_amount: vec!["[data-testhook='price-amount']".to_string()],
            category_card: vec!["a.taxonomy-card_imageLink__13VS1".to_string()],
        }
    }
}
