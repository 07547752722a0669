//! HTML and JSON field extraction
//!
//! Selector lists are compiled once; a selector that fails to compile is
//! skipped with a warning as long as at least one of its fallbacks compiles.

pub mod category_parser;
pub mod config;
pub mod context;
pub mod product_card_parser;
pub mod search_card_parser;

pub use category_parser::{Category, CategoryParser};
pub use config::ListingSelectors;
pub use context::ParseContext;
pub use product_card_parser::ProductCardParser;
pub use search_card_parser::SearchCardParser;

use scraper::Selector;
use tracing::warn;

use crate::domain::product::ProductRecord;
use crate::domain::raw_record::RawRecord;
use crate::domain::services::RecordExtractor;
use crate::infrastructure::parsing_error::{ExtractionError, ExtractionResult};

/// Compile multiple selector strings into Selector objects
pub(crate) fn compile_selectors(selector_strings: &[String]) -> ExtractionResult<Vec<Selector>> {
    let mut selectors = Vec::new();
    let mut errors = Vec::new();

    for selector_str in selector_strings {
        match Selector::parse(selector_str) {
            Ok(selector) => selectors.push(selector),
            Err(e) => {
                warn!("Failed to compile selector '{}': {}", selector_str, e);
                errors.push(format!("'{selector_str}': {e}"));
            }
        }
    }

    if selectors.is_empty() {
        return Err(ExtractionError::invalid_selector(
            &selector_strings.join(", "),
            &format!("no valid selectors compiled ({})", errors.join(", ")),
        ));
    }

    Ok(selectors)
}

/// Extractor for both raw record kinds
#[derive(Debug)]
pub struct FieldExtractor {
    cards: ProductCardParser,
    search: SearchCardParser,
}

impl FieldExtractor {
    pub fn new(selectors: &ListingSelectors, context: &ParseContext) -> ExtractionResult<Self> {
        Ok(Self {
            cards: ProductCardParser::new(selectors, context.base_url.clone())?,
            search: SearchCardParser::new(context.base_url.clone()),
        })
    }
}

impl RecordExtractor for FieldExtractor {
    fn extract(&self, raw: &RawRecord, label: Option<&str>) -> ProductRecord {
        let record = match raw {
            RawRecord::Card(card) => self.search.parse_card(card),
            RawRecord::Listing(card) => self.cards.parse_card(card),
        };
        record.with_label(label)
    }
}
