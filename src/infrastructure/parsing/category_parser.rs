//! Category overview page parser

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

use crate::infrastructure::config::utils::resolve_url;
use crate::infrastructure::parsing_error::ExtractionResult;
use super::compile_selectors;
use super::config::ListingSelectors;

/// One product category of the retailer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub link: String,
}

#[derive(Debug)]
pub struct CategoryParser {
    base_url: String,
    card_selectors: Vec<Selector>,
}

impl CategoryParser {
    pub fn new(
        selectors: &ListingSelectors,
        base_url: impl Into<String>,
    ) -> ExtractionResult<Self> {
        Ok(Self {
            base_url: base_url.into(),
            card_selectors: compile_selectors(&selectors.category_card)?,
        })
    }

    /// Every category anchor with both a `title` and an `href`, in page order
    pub fn discover_categories(&self, html: &str) -> Vec<Category> {
        let document = Html::parse_document(html);

        self.card_selectors
            .iter()
            .flat_map(|selector| document.select(selector))
            .filter_map(|anchor| {
                let element = anchor.value();
                let name = element.attr("title").map(str::trim).filter(|t| !t.is_empty())?;
                let href = element.attr("href").filter(|h| !h.is_empty())?;
                Some(Category {
                    name: name.to_string(),
                    link: resolve_url(&self.base_url, href),
                })
            })
            .collect()
    }
}
