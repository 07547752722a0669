//! HTTP client for the search API and listing pages
//!
//! One request per call: no retry, no rate limiting. Failures are reported
//! as `FetchError` so a collector can count the page as empty and move on.

use reqwest::{
    Client, Response, Url,
    header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue, USER_AGENT},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::time::Duration;

use crate::domain::services::FetchError;
use crate::infrastructure::config::defaults;

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpClientConfig {
    pub user_agent: String,
    pub accept_language: String,
    pub timeout_seconds: u64,
    pub follow_redirects: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0 Safari/537.36".to_string(),
            accept_language: "nl-NL,nl;q=0.9".to_string(),
            timeout_seconds: defaults::REQUEST_TIMEOUT_SECONDS,
            follow_redirects: true,
        }
    }
}

/// Thin wrapper over `reqwest::Client`
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client with the given configuration
    pub fn new(config: &HttpClientConfig) -> anyhow::Result<Self> {
        use anyhow::Context;

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent).context("Invalid user agent")?,
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&config.accept_language).context("Invalid accept-language")?,
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .default_headers(headers)
            .gzip(true)
            .brotli(true)
            .redirect(if config.follow_redirects {
                reqwest::redirect::Policy::limited(10)
            } else {
                reqwest::redirect::Policy::none()
            })
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Build `url` with `query` appended, keeping any query it already has
    pub fn build_url(url: &str, query: &[(&str, String)]) -> Result<Url, FetchError> {
        let mut parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        if !query.is_empty() {
            parsed
                .query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(parsed)
    }

    async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<Response, FetchError> {
        let url = Self::build_url(url, query)?;
        tracing::debug!("Fetching URL: {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }

    /// Fetch `url` with `query` appended and return the body as text
    pub async fn get_text(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<String, FetchError> {
        let response = self.get(url, query).await?;
        let final_url = response.url().to_string();
        let text = response.text().await.map_err(|e| FetchError::Transport {
            url: final_url.clone(),
            message: e.to_string(),
        })?;

        tracing::debug!("Successfully fetched: {} ({} chars)", final_url, text.len());
        Ok(text)
    }

    /// Fetch `url` with `query` appended and decode the JSON body
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let body = self.get_text(url, query).await?;
        serde_json::from_str(&body).map_err(|e| FetchError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_client_creation() {
        let client = HttpClient::new(&HttpClientConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_invalid_user_agent_is_rejected() {
        let config = HttpClientConfig {
            user_agent: "bad\nagent".to_string(),
            ..Default::default()
        };
        assert!(HttpClient::new(&config).is_err());
    }

    #[test]
    fn test_build_url_appends_to_existing_query() {
        let url = HttpClient::build_url(
            "https://www.ah.nl/producten/zuivel?kenmerk=bio",
            &[("page", "3".to_string())],
        )
        .unwrap();
        assert_eq!(url.as_str(), "https://www.ah.nl/producten/zuivel?kenmerk=bio&page=3");
    }

    #[test]
    fn test_build_url_rejects_relative() {
        let err = HttpClient::build_url("/producten", &[]).unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl { .. }));
    }
}
