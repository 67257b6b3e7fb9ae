use async_trait::async_trait;
use thiserror::Error;

use crate::models::{PriceSeries, StockListing};

#[derive(Debug, Error)]
pub enum PriceProviderError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("upstream returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl From<reqwest::Error> for PriceProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            PriceProviderError::Timeout(e.to_string())
        } else if e.is_decode() {
            PriceProviderError::Parse(e.to_string())
        } else {
            PriceProviderError::Network(e.to_string())
        }
    }
}

#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Price samples for `ticker` over the last `minutes` minutes, in upstream order.
    async fn fetch_price_history(
        &self,
        ticker: &str,
        minutes: u32,
    ) -> Result<PriceSeries, PriceProviderError>;

    async fn list_stocks(&self) -> Result<StockListing, PriceProviderError>;
}
