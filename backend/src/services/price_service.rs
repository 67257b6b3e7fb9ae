use indexmap::IndexMap;
use tracing::{error, info};

use crate::errors::AppError;
use crate::external::price_provider::PriceProvider;
use crate::models::{PriceSeries, StockListing, StockSummary};
use crate::services::price_cache::PriceCache;
use crate::services::statistics::{self, CorrelationMethod};

/// Price history for one ticker, served from the cache while it is fresh.
///
/// On a miss the exchange is queried and the result cached. A failed fetch
/// leaves the cache as it was.
pub async fn get_price_history(
    provider: &dyn PriceProvider,
    cache: &PriceCache,
    ticker: &str,
    minutes: u32,
) -> Result<PriceSeries, AppError> {
    if let Some(series) = cache.get(ticker, minutes) {
        return Ok(series);
    }

    let series = provider
        .fetch_price_history(ticker, minutes)
        .await
        .map_err(|e| {
            error!("Error fetching price for {} ({} min): {}", ticker, minutes, e);
            AppError::Upstream(e)
        })?;

    cache.put(ticker, minutes, series.clone());
    Ok(series)
}

pub async fn get_average(
    provider: &dyn PriceProvider,
    cache: &PriceCache,
    ticker: &str,
    minutes: u32,
) -> Result<f64, AppError> {
    let series = get_price_history(provider, cache, ticker, minutes).await?;
    Ok(statistics::average(&series))
}

pub async fn get_stock_summary(
    provider: &dyn PriceProvider,
    cache: &PriceCache,
    ticker: &str,
    minutes: u32,
) -> Result<StockSummary, AppError> {
    let price_history = get_price_history(provider, cache, ticker, minutes).await?;
    let average_price = statistics::average(&price_history);
    info!("Average price for {} over {} min: {}", ticker, minutes, average_price);

    Ok(StockSummary {
        average_price,
        price_history,
    })
}

/// Fetches both series concurrently. If either fetch fails the pair fails.
async fn get_pair_histories(
    provider: &dyn PriceProvider,
    cache: &PriceCache,
    ticker_a: &str,
    ticker_b: &str,
    minutes: u32,
) -> Result<(PriceSeries, PriceSeries), AppError> {
    tokio::try_join!(
        get_price_history(provider, cache, ticker_a, minutes),
        get_price_history(provider, cache, ticker_b, minutes),
    )
}

pub async fn get_correlation(
    provider: &dyn PriceProvider,
    cache: &PriceCache,
    ticker_a: &str,
    ticker_b: &str,
    minutes: u32,
    method: CorrelationMethod,
) -> Result<f64, AppError> {
    let (series_a, series_b) = get_pair_histories(provider, cache, ticker_a, ticker_b, minutes).await?;
    Ok(statistics::correlate(&series_a, &series_b, method).value_or_zero())
}

/// Correlation plus per-ticker summaries, built from a single fetch of each series.
pub async fn get_pair_report(
    provider: &dyn PriceProvider,
    cache: &PriceCache,
    ticker_a: &str,
    ticker_b: &str,
    minutes: u32,
    method: CorrelationMethod,
) -> Result<(f64, IndexMap<String, StockSummary>), AppError> {
    let (series_a, series_b) = get_pair_histories(provider, cache, ticker_a, ticker_b, minutes).await?;

    let correlation = statistics::correlate(&series_a, &series_b, method).value_or_zero();
    info!("Correlation between {} and {}: {}", ticker_a, ticker_b, correlation);

    let mut stocks = IndexMap::with_capacity(2);
    for (ticker, series) in [(ticker_a, series_a), (ticker_b, series_b)] {
        stocks.insert(
            ticker.to_string(),
            StockSummary {
                average_price: statistics::average(&series),
                price_history: series,
            },
        );
    }

    Ok((correlation, stocks))
}

pub async fn list_stocks(provider: &dyn PriceProvider) -> Result<StockListing, AppError> {
    provider.list_stocks().await.map_err(|e| {
        error!("Error fetching stocks: {}", e);
        AppError::Upstream(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::price_provider::PriceProviderError;
    use crate::models::PricePoint;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockProvider {
        call_count: AtomicUsize,
        prices: HashMap<String, Vec<f64>>,
    }

    impl MockProvider {
        fn new(prices: &[(&str, &[f64])]) -> Self {
            Self {
                call_count: AtomicUsize::new(0),
                prices: prices
                    .iter()
                    .map(|(t, p)| (t.to_string(), p.to_vec()))
                    .collect(),
            }
        }

        fn calls(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PriceProvider for MockProvider {
        async fn fetch_price_history(
            &self,
            ticker: &str,
            _minutes: u32,
        ) -> Result<PriceSeries, PriceProviderError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            match self.prices.get(ticker) {
                Some(prices) => Ok(prices.iter().map(|p| PricePoint::new(*p, Utc::now())).collect()),
                None => Err(PriceProviderError::Status {
                    status: 404,
                    body: format!("unknown ticker {}", ticker),
                }),
            }
        }

        async fn list_stocks(&self) -> Result<StockListing, PriceProviderError> {
            Ok(self.prices.keys().map(|t| (format!("{} Inc.", t), t.clone())).collect())
        }
    }

    #[tokio::test]
    async fn test_second_request_is_served_from_cache() {
        let provider = MockProvider::new(&[("NVDA", &[10.0, 20.0])]);
        let cache = PriceCache::default();

        let first = get_price_history(&provider, &cache, "NVDA", 50).await.unwrap();
        let second = get_price_history(&provider, &cache, "NVDA", 50).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_different_window_refetches() {
        let provider = MockProvider::new(&[("NVDA", &[10.0, 20.0])]);
        let cache = PriceCache::default();

        get_price_history(&provider, &cache, "NVDA", 50).await.unwrap();
        get_price_history(&provider, &cache, "NVDA", 10).await.unwrap();

        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_stale_entry_triggers_refetch() {
        let provider = MockProvider::new(&[("AAPL", &[1.0, 2.0, 3.0])]);
        let cache = PriceCache::default();

        let old = vec![PricePoint::new(99.0, Utc::now())];
        cache.put_at("AAPL", 50, old, Utc::now() - chrono::Duration::seconds(61));

        let series = get_price_history(&provider, &cache, "AAPL", 50).await.unwrap();

        assert_eq!(provider.calls(), 1);
        assert_eq!(series.len(), 3);
        assert_eq!(cache.get("AAPL", 50).unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_cache_untouched() {
        let provider = MockProvider::new(&[]);
        let cache = PriceCache::default();
        let stale_at = Utc::now() - chrono::Duration::seconds(120);
        cache.put_at("GONE", 50, vec![PricePoint::new(5.0, stale_at)], stale_at);

        let result = get_price_history(&provider, &cache, "GONE", 50).await;

        assert!(matches!(result, Err(AppError::Upstream(_))));
        assert_eq!(cache.len(), 1);
        assert!(cache.get("GONE", 50).is_none());
    }

    #[tokio::test]
    async fn test_get_average() {
        let provider = MockProvider::new(&[("MSFT", &[10.0, 20.0]), ("EMPTY", &[])]);
        let cache = PriceCache::default();

        assert_eq!(get_average(&provider, &cache, "MSFT", 50).await.unwrap(), 15.0);
        assert_eq!(get_average(&provider, &cache, "EMPTY", 50).await.unwrap(), 0.0);
    }

    #[tokio::test]
    async fn test_get_correlation_methods() {
        let provider = MockProvider::new(&[
            ("A", &[1.0, 2.0, 3.0, 4.0, 5.0]),
            ("B", &[2.0, 4.0, 6.0, 8.0, 10.0]),
        ]);
        let cache = PriceCache::default();

        let legacy = get_correlation(&provider, &cache, "A", "B", 50, CorrelationMethod::Legacy)
            .await
            .unwrap();
        let pearson = get_correlation(&provider, &cache, "A", "B", 50, CorrelationMethod::Pearson)
            .await
            .unwrap();

        assert_eq!(legacy, 0.16);
        assert_eq!(pearson, 1.0);
        // second call reused both cached series
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_correlation_fails_if_either_fetch_fails() {
        let provider = MockProvider::new(&[("A", &[1.0, 2.0, 3.0])]);
        let cache = PriceCache::default();

        let result = get_correlation(&provider, &cache, "A", "MISSING", 50, CorrelationMethod::Legacy).await;
        assert!(matches!(result, Err(AppError::Upstream(_))));

        let result = get_correlation(&provider, &cache, "MISSING", "A", 50, CorrelationMethod::Legacy).await;
        assert!(matches!(result, Err(AppError::Upstream(_))));
    }

    #[tokio::test]
    async fn test_pair_report_contains_both_summaries() {
        let provider = MockProvider::new(&[("NVDA", &[10.0, 20.0, 30.0]), ("PYPL", &[5.0, 5.0])]);
        let cache = PriceCache::default();

        let (correlation, stocks) = get_pair_report(&provider, &cache, "NVDA", "PYPL", 50, CorrelationMethod::Legacy)
            .await
            .unwrap();

        assert_eq!(correlation, 0.0);
        assert_eq!(stocks.len(), 2);
        assert_eq!(stocks["NVDA"].average_price, 20.0);
        assert_eq!(stocks["NVDA"].price_history.len(), 3);
        assert_eq!(stocks["PYPL"].average_price, 5.0);
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_pair_report_keeps_request_order() {
        let provider = MockProvider::new(&[("ZM", &[1.0, 2.0]), ("AAPL", &[3.0, 4.0])]);
        let cache = PriceCache::default();

        let (_, stocks) = get_pair_report(&provider, &cache, "ZM", "AAPL", 50, CorrelationMethod::Legacy)
            .await
            .unwrap();
        let order: Vec<&str> = stocks.keys().map(String::as_str).collect();
        assert_eq!(order, vec!["ZM", "AAPL"]);

        let (_, stocks) = get_pair_report(&provider, &cache, "AAPL", "ZM", 50, CorrelationMethod::Legacy)
            .await
            .unwrap();
        let order: Vec<&str> = stocks.keys().map(String::as_str).collect();
        assert_eq!(order, vec!["AAPL", "ZM"]);
    }

    #[tokio::test]
    async fn test_list_stocks_passthrough() {
        let provider = MockProvider::new(&[("AMD", &[1.0])]);
        let stocks = list_stocks(&provider).await.unwrap();
        assert_eq!(stocks.get("AMD Inc.").map(String::as_str), Some("AMD"));
    }
}
