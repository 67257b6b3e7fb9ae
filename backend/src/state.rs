use std::sync::Arc;

use crate::config::AppConfig;
use crate::external::price_provider::PriceProvider;
use crate::services::price_cache::PriceCache;
use crate::services::statistics::CorrelationMethod;

#[derive(Clone)]
pub struct AppState {
    pub price_provider: Arc<dyn PriceProvider>,
    pub price_cache: PriceCache,
    pub default_window_minutes: u32,
    pub correlation_method: CorrelationMethod,
}

impl AppState {
    pub fn new(price_provider: Arc<dyn PriceProvider>, config: &AppConfig) -> Self {
        Self {
            price_provider,
            price_cache: PriceCache::new(config.cache_ttl),
            default_window_minutes: config.default_window_minutes,
            correlation_method: config.correlation_method,
        }
    }
}
