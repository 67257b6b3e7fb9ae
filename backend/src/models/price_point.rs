use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// A single price sample as reported by the upstream exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePoint {
    pub price: f64,
    pub last_updated_at: DateTime<Utc>,
}

impl PricePoint {
    pub fn new(price: f64, last_updated_at: DateTime<Utc>) -> Self {
        Self { price, last_updated_at }
    }
}

/// Price samples in upstream response order, treated as chronological.
pub type PriceSeries = Vec<PricePoint>;
