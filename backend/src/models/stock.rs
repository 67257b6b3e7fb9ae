use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::PriceSeries;

/// Company name to ticker symbol, as listed by the exchange.
pub type StockListing = BTreeMap<String, String>;

#[derive(Debug, Serialize, Deserialize)]
pub struct StockListingResponse {
    pub stocks: StockListing,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AveragePriceResponse {
    pub average_stock_price: f64,
    pub price_history: PriceSeries,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockSummary {
    pub average_price: f64,
    pub price_history: PriceSeries,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CorrelationResponse {
    pub correlation: f64,
    /// Keyed by ticker, in request order.
    pub stocks: IndexMap<String, StockSummary>,
}
