//! Page source for HTML listing pages (category pages and search results)
//!
//! Listing pages are cumulative: a higher `page` value renders more cards.
//! `page_index` of a query is added to the configured page offset.

use async_trait::async_trait;
use tracing::debug;

use crate::domain::pagination::PageQuery;
use crate::domain::services::{FetchError, FetchedPage, PageSource};
use crate::infrastructure::http_client::HttpClient;
use crate::infrastructure::parsing::ProductCardParser;

/// `GET <listing-url>?sortBy=price&minPrice=&maxPrice=&page=`
pub struct ListingPageClient {
    http_client: HttpClient,
    listing_url: String,
    sort_by: String,
    page_offset: u32,
    parser: ProductCardParser,
}

impl ListingPageClient {
    pub fn new(
        http_client: HttpClient,
        listing_url: impl Into<String>,
        sort_by: impl Into<String>,
        page_offset: u32,
        parser: ProductCardParser,
    ) -> Self {
        Self {
            http_client,
            listing_url: listing_url.into(),
            sort_by: sort_by.into(),
            page_offset,
            parser,
        }
    }

    /// Query parameters of one round; an open band sends no `maxPrice`
    pub fn query_params(&self, query: &PageQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("sortBy", self.sort_by.clone()),
            ("minPrice", query.band.min.to_string()),
        ];
        if let Some(max) = query.band.max {
            params.push(("maxPrice", max.to_string()));
        }
        params.push(("page", (self.page_offset + query.page_index).to_string()));
        params
    }
}

#[async_trait]
impl PageSource for ListingPageClient {
    fn name(&self) -> &'static str {
        "listing-page"
    }

    async fn fetch(&self, query: &PageQuery) -> Result<FetchedPage, FetchError> {
        let params = self.query_params(query);
        debug!("Searching through {} with {:?}", self.listing_url, params);

        let html = self.http_client.get_text(&self.listing_url, &params).await?;
        let records = self.parser.split_cards(&html);

        Ok(FetchedPage {
            records,
            total_available: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::price_band::PriceBand;
    use crate::infrastructure::http_client::HttpClientConfig;
    use crate::infrastructure::parsing::ListingSelectors;

    fn client() -> ListingPageClient {
        ListingPageClient::new(
            HttpClient::new(&HttpClientConfig::default()).unwrap(),
            "https://www.ah.nl/producten/zuivel-eieren",
            "price",
            55,
            ProductCardParser::new(&ListingSelectors::default(), "https://www.ah.nl").unwrap(),
        )
    }

    #[test]
    fn test_query_params_offset_page() {
        let query = PageQuery::new(PriceBand::new(1.25, 120.0), 3, 1000);
        let params = client().query_params(&query);
        assert_eq!(
            params,
            vec![
                ("sortBy", "price".to_string()),
                ("minPrice", "1.25".to_string()),
                ("maxPrice", "120".to_string()),
                ("page", "58".to_string()),
            ]
        );
    }

    #[test]
    fn test_params_join_existing_query() {
        let client = client();
        let query = PageQuery::new(PriceBand::new(0.0, 120.0), 0, 1000);
        let url = HttpClient::build_url(
            "https://www.ah.nl/zoeken?query=kaas",
            &client.query_params(&query),
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.ah.nl/zoeken?query=kaas&sortBy=price&minPrice=0&maxPrice=120&page=55"
        );
    }
}
