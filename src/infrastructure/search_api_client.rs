//! Page source for the JSON product search endpoint

use async_trait::async_trait;
use tracing::debug;

use crate::domain::pagination::PageQuery;
use crate::domain::raw_record::{RawRecord, SearchResponse};
use crate::domain::services::{FetchError, FetchedPage, PageSource};
use crate::infrastructure::http_client::HttpClient;

/// `GET <endpoint>?minPrice=&maxPrice=&size=&page=`
pub struct SearchApiClient {
    http_client: HttpClient,
    endpoint: String,
}

impl SearchApiClient {
    pub fn new(http_client: HttpClient, endpoint: impl Into<String>) -> Self {
        Self {
            http_client,
            endpoint: endpoint.into(),
        }
    }

    /// Query parameters of one page; an open band sends no `maxPrice`
    pub fn query_params(query: &PageQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![("minPrice", query.band.min.to_string())];
        if let Some(max) = query.band.max {
            params.push(("maxPrice", max.to_string()));
        }
        params.push(("size", query.page_size.to_string()));
        params.push(("page", query.page_index.to_string()));
        params
    }
}

#[async_trait]
impl PageSource for SearchApiClient {
    fn name(&self) -> &'static str {
        "search-api"
    }

    async fn fetch(&self, query: &PageQuery) -> Result<FetchedPage, FetchError> {
        let params = Self::query_params(query);
        let response: SearchResponse = self.http_client.get_json(&self.endpoint, &params).await?;

        let total_available = response.page.as_ref().and_then(|page| page.total_elements);
        debug!(
            "Band {} page {}: {} cards (total {:?})",
            query.band,
            query.page_index,
            response.cards.len(),
            total_available
        );

        Ok(FetchedPage {
            records: response.cards.into_iter().map(RawRecord::Card).collect(),
            total_available,
        })
    }
}
