use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use tracing::{debug, error};
use url::Url;

use crate::config::AppConfig;
use crate::external::price_provider::{PriceProvider, PriceProviderError};
use crate::models::{PriceSeries, StockListing};

/// Client for the stock exchange test server.
///
/// Every request carries the static bearer token; there is no token refresh
/// and no retry. A single failed attempt is reported to the caller.
pub struct StockExchangeProvider {
    client: reqwest::Client,
    base_url: Url,
}

#[derive(Debug, Deserialize)]
struct StocksResponse {
    stocks: StockListing,
}

impl StockExchangeProvider {
    pub fn new(base_url: &str, access_token: &str, timeout: Duration) -> Result<Self, PriceProviderError> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", access_token))
            .map_err(|e| PriceProviderError::Network(format!("invalid access token: {}", e)))?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let base_url = Url::parse(base_url)
            .map_err(|e| PriceProviderError::InvalidRequest(format!("invalid base url '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(PriceProviderError::InvalidRequest(format!("'{}' cannot be a base url", base_url)));
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| PriceProviderError::Network(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, PriceProviderError> {
        Self::new(
            config.base_url.as_str(),
            &config.access_token,
            config.upstream_timeout,
        )
    }

    /// Base URL extended with `segments`, each percent-encoded as one path segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, PriceProviderError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| PriceProviderError::InvalidRequest(format!("'{}' cannot be a base url", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T, PriceProviderError> {
        let resp = self.client.get(url.clone()).query(query).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!("Upstream request to {} failed with {}: {}", url, status, body);
            return Err(PriceProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let text = resp.text().await?;
        serde_json::from_str(&text).map_err(|e| PriceProviderError::Parse(e.to_string()))
    }
}

#[async_trait]
impl PriceProvider for StockExchangeProvider {
    async fn fetch_price_history(
        &self,
        ticker: &str,
        minutes: u32,
    ) -> Result<PriceSeries, PriceProviderError> {
        // Dot segments would be dropped by the URL builder and hit another endpoint.
        if ticker.is_empty() || ticker == "." || ticker == ".." {
            return Err(PriceProviderError::InvalidRequest(format!("invalid ticker '{}'", ticker)));
        }
        let url = self.endpoint(&["stocks", ticker])?;
        debug!("Fetching {} minutes of prices for {} from {}", minutes, ticker, url);

        self.get_json(url, &[("minutes", minutes.to_string())]).await
    }

    async fn list_stocks(&self) -> Result<StockListing, PriceProviderError> {
        let url = self.endpoint(&["stocks"])?;
        let body: StocksResponse = self.get_json(url, &[]).await?;
        Ok(body.stocks)
    }
}
