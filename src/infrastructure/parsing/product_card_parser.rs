//! Product card parser for HTML listing pages
//!
//! A listing page is split into one raw record per product card; each card is
//! then parsed field by field. Fields that cannot be found fall back to their
//! default without affecting the other fields of the card.

#![allow(clippy::uninlined_format_args)]

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::domain::product::ProductRecord;
use crate::domain::raw_record::{ListingCard, RawRecord};
use crate::infrastructure::config::utils::resolve_url;
use crate::infrastructure::parsing_error::{ExtractionError, ExtractionResult, or_default};
use super::compile_selectors;
use super::config::ListingSelectors;

/// Parser for product cards on listing pages
#[derive(Debug)]
pub struct ProductCardParser {
    base_url: String,
    card_selectors: Vec<Selector>,
    title_selectors: Vec<Selector>,
    link_selectors: Vec<Selector>,
    unit_size_selectors: Vec<Selector>,
    shield_selectors: Vec<Selector>,
    promotion_line_selectors: Vec<Selector>,
    price_selectors: Vec<Selector>,
}

/// Regular and discounted price of one card
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CardPrices {
    pub price: Option<f64>,
    pub price_discounted: Option<f64>,
}

impl ProductCardParser {
    /// Create parser with custom selector configuration
    pub fn new(
        selectors: &ListingSelectors,
        base_url: impl Into<String>,
    ) -> ExtractionResult<Self> {
        Ok(Self {
            base_url: base_url.into(),
            card_selectors: compile_selectors(&selectors.product_card)?,
            title_selectors: compile_selectors(&selectors.title)?,
            link_selectors: compile_selectors(&selectors.link)?,
            unit_size_selectors: compile_selectors(&selectors.unit_size)?,
            shield_selectors: compile_selectors(&selectors.shield)?,
            promotion_line_selectors: compile_selectors(&selectors.promotion_line)?,
            price_selectors: compile_selectors(&selectors.price_amount)?,
        })
    }

    /// Split a listing page into one raw record per product card
    ///
    /// The first card selector that matches anything is used.
    pub fn split_cards(&self, html: &str) -> Vec<RawRecord> {
        let document = Html::parse_document(html);

        for selector in &self.card_selectors {
            let cards: Vec<RawRecord> = document
                .select(selector)
                .map(|card| {
                    RawRecord::Listing(ListingCard {
                        html: card.html(),
                    })
                })
                .collect();

            if !cards.is_empty() {
                debug!("{} items found", cards.len());
                return cards;
            }
        }

        debug!("No product cards found");
        Vec::new()
    }

    /// Parse one card; every field is looked up independently
    pub fn parse_card(&self, card: &ListingCard) -> ProductRecord {
        let fragment = Html::parse_fragment(&card.html);
        let root = fragment.root_element();
        let prices = or_default("price", self.prices(root));

        ProductRecord::new(
            or_default("name", self.name(root)),
            or_default("link", self.link(root)),
            or_default("quantity", self.quantity(root)),
            or_default("promotion", self.promotion(root)),
            prices.price,
            prices.price_discounted,
        )
    }

    fn name(&self, card: ElementRef<'_>) -> ExtractionResult<String> {
        first_text_with_fallbacks(card, &self.title_selectors)
            .ok_or_else(|| ExtractionError::missing("name"))
    }

    fn link(&self, card: ElementRef<'_>) -> ExtractionResult<String> {
        self.link_selectors
            .iter()
            .find_map(|selector| card.select(selector).next())
            .and_then(|anchor| anchor.value().attr("href"))
            .map(|href| resolve_url(&self.base_url, href))
            .ok_or_else(|| ExtractionError::missing("link"))
    }

    fn quantity(&self, card: ElementRef<'_>) -> ExtractionResult<String> {
        first_text_with_fallbacks(card, &self.unit_size_selectors)
            .ok_or_else(|| ExtractionError::missing("quantity"))
    }

    /// Lines of the first shield, joined with ". "
    fn promotion(&self, card: ElementRef<'_>) -> ExtractionResult<String> {
        let shield = self
            .shield_selectors
            .iter()
            .find_map(|selector| card.select(selector).next())
            .ok_or_else(|| ExtractionError::missing("promotion"))?;

        let lines: Vec<String> = self
            .promotion_line_selectors
            .iter()
            .flat_map(|selector| shield.select(selector))
            .filter_map(first_text)
            .collect();

        if lines.is_empty() {
            return Err(ExtractionError::missing("promotion"));
        }
        Ok(lines.join(". "))
    }

    /// First price element is the regular price; a second one is the
    /// discounted price only when there are exactly two
    fn prices(&self, card: ElementRef<'_>) -> ExtractionResult<CardPrices> {
        let amounts: Vec<ElementRef<'_>> = self
            .price_selectors
            .iter()
            .map(|selector| card.select(selector).collect::<Vec<_>>())
            .find(|found| !found.is_empty())
            .ok_or_else(|| ExtractionError::missing("price"))?;

        let price = parse_price_amount(amounts[0])?;
        let price_discounted = match amounts.as_slice() {
            [_, discounted] => Some(parse_price_amount(*discounted)?),
            _ => None,
        };

        Ok(CardPrices {
            price: Some(price),
            price_discounted,
        })
    }
}

/// Rebuild a price from its whole-part, separator and fractional-part children
///
/// `<span>12</span><span>,</span><span>99</span>` becomes `12.99`. Elements
/// without three children are read from their full text.
pub fn parse_price_amount(element: ElementRef<'_>) -> ExtractionResult<f64> {
    let parts: Vec<&str> = element
        .children()
        .filter_map(ElementRef::wrap)
        .take(3)
        .filter_map(|part| part.text().map(str::trim).find(|t| !t.is_empty()))
        .collect();

    let raw = if parts.len() == 3 {
        parts.concat()
    } else {
        element.text().collect::<String>()
    };

    parse_price_text(&raw)
}

/// Parse "1,99", "1.99" or "1" into a price
pub fn parse_price_text(raw: &str) -> ExtractionResult<f64> {
    let normalized: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    normalized
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value >= 0.0)
        .ok_or_else(|| ExtractionError::invalid_number("price", raw))
}

fn first_text(element: ElementRef<'_>) -> Option<String> {
    element
        .text()
        .map(str::trim)
        .find(|text| !text.is_empty())
        .map(str::to_string)
}

/// First non-empty text node of the first element matching any selector
fn first_text_with_fallbacks(element: ElementRef<'_>, selectors: &[Selector]) -> Option<String> {
    selectors
        .iter()
        .flat_map(|selector| element.select(selector))
        .find_map(first_text)
}
