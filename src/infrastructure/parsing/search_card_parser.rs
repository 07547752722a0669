//! Field extraction for search API cards

use crate::domain::product::ProductRecord;
use crate::domain::raw_record::{SearchCard, SearchProduct, ShieldText};
use crate::infrastructure::config::utils::resolve_url;
use crate::infrastructure::parsing_error::{ExtractionError, ExtractionResult, or_default};

/// Maps the typed search card onto a `ProductRecord`
#[derive(Debug, Clone)]
pub struct SearchCardParser {
    base_url: String,
}

impl SearchCardParser {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Read the card's first product
    ///
    /// With a `was` price the product is discounted: `was` is the regular
    /// price and `now` the discounted one. Otherwise `now` is the regular price.
    pub fn parse_card(&self, card: &SearchCard) -> ProductRecord {
        let Some(product) = card.products.first() else {
            tracing::trace!("Search card without products");
            return ProductRecord::new(
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                None,
                None,
            );
        };

        let (price, price_discounted) = or_default("price", Self::prices(product));

        ProductRecord::new(
            or_default("name", Self::name(product)),
            or_default("link", self.link(product)),
            or_default("quantity", Self::quantity(product)),
            or_default("promotion", Self::promotion(product)),
            price,
            price_discounted,
        )
    }

    fn name(product: &SearchProduct) -> ExtractionResult<String> {
        product
            .title
            .clone()
            .ok_or_else(|| ExtractionError::missing("name"))
    }

    fn link(&self, product: &SearchProduct) -> ExtractionResult<String> {
        product
            .link
            .as_deref()
            .map(|href| resolve_url(&self.base_url, href))
            .ok_or_else(|| ExtractionError::missing("link"))
    }

    fn quantity(product: &SearchProduct) -> ExtractionResult<String> {
        product
            .price
            .as_ref()
            .and_then(|p| p.unit_size.clone())
            .ok_or_else(|| ExtractionError::missing("quantity"))
    }

    fn promotion(product: &SearchProduct) -> ExtractionResult<String> {
        match product.shield.as_ref().and_then(|s| s.text.as_ref()) {
            Some(ShieldText::One(text)) => Ok(text.clone()),
            Some(ShieldText::Lines(lines)) => Ok(lines.join(". ")),
            None => Err(ExtractionError::missing("promotion")),
        }
    }

    fn prices(product: &SearchProduct) -> ExtractionResult<(Option<f64>, Option<f64>)> {
        let price = product
            .price
            .as_ref()
            .ok_or_else(|| ExtractionError::missing("price"))?;

        Ok(match (price.was, price.now) {
            (Some(was), now) => (Some(was), now),
            (None, now) => (now, None),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::raw_record::SearchResponse;

    fn first_card(body: &str) -> ProductRecord {
        let response: SearchResponse = serde_json::from_str(body).unwrap();
        SearchCardParser::new("https://www.ah.nl").parse_card(&response.cards[0])
    }

    #[test]
    fn test_discounted_card() {
        let record = first_card(
            r#"{"cards": [{"products": [{
                "title": "Lay's Naturel",
                "link": "/producten/product/wi1234/lays-naturel",
                "price": {"now": 1.49, "was": 2.19, "unitSize": "225 g"},
                "shield": {"text": ["2 voor", "3,00"]}
            }]}]}"#,
        );

        assert_eq!(record.name, "Lay's Naturel");
        assert_eq!(record.link, "https://www.ah.nl/producten/product/wi1234/lays-naturel");
        assert_eq!(record.quantity, "225 g");
        assert_eq!(record.promotion, "2 voor. 3,00");
        assert_eq!(record.price, Some(2.19));
        assert_eq!(record.price_discounted, Some(1.49));
    }

    #[test]
    fn test_card_without_shield_or_was() {
        let record = first_card(
            r#"{"cards": [{"products": [{
                "title": "AH Volkoren brood",
                "price": {"now": 1.85}
            }]}]}"#,
        );

        assert_eq!(record.promotion, "");
        assert_eq!(record.name, "AH Volkoren brood");
        assert_eq!(record.price, Some(1.85));
        assert_eq!(record.price_discounted, None);
        assert_eq!(record.link, "");
        assert_eq!(record.quantity, "");
    }

    #[test]
    fn test_card_without_products_is_all_defaults() {
        let record = first_card(r#"{"cards": [{"id": 1}]}"#);
        assert_eq!(record.name, "");
        assert_eq!(record.price, None);
    }
}
