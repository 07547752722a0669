//! Category Discovery Service
//!
//! Fetches the category overview page and lists the product categories it
//! links to. Each category is then swept with the dynamic-floor collector.

use tracing::{info, warn};

use crate::domain::services::FetchError;
use crate::infrastructure::HttpClient;
use crate::infrastructure::parsing::{Category, CategoryParser};

/// Service for discovering product categories
pub struct CategoryDiscoveryService {
    http_client: HttpClient,
    categories_url: String,
    parser: CategoryParser,
}

impl CategoryDiscoveryService {
    pub fn new(
        http_client: HttpClient,
        categories_url: impl Into<String>,
        parser: CategoryParser,
    ) -> Self {
        Self {
            http_client,
            categories_url: categories_url.into(),
            parser,
        }
    }

    /// Fetch the overview page and parse its category cards
    pub async fn discover(&self) -> Result<Vec<Category>, FetchError> {
        info!("🔍 Discovering categories from {}", self.categories_url);

        let html = self.http_client.get_text(&self.categories_url, &[]).await?;
        let categories = self.parser.discover_categories(&html);

        if categories.is_empty() {
            warn!("⚠️ No categories found on {}", self.categories_url);
        } else {
            info!("✅ Found {} categories", categories.len());
        }
        Ok(categories)
    }
}
