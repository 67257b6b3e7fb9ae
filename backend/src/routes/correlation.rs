use axum::extract::{RawQuery, State};
use axum::routing::get;
use axum::{Json, Router};
use tracing::{error, info, warn};

use crate::errors::AppError;
use crate::models::CorrelationResponse;
use crate::routes::params::{parse_minutes, query_list, validate_ticker};
use crate::services;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_stock_correlation))
}

/// GET /api/stockcorrelation?ticker=A&ticker=B&minutes=N
///
/// `ticker[]=A&ticker[]=B` is accepted as well.
pub async fn get_stock_correlation(
    RawQuery(query): RawQuery,
    State(state): State<AppState>,
) -> Result<Json<CorrelationResponse>, AppError> {
    let tickers = query_list(query.as_deref(), "ticker");
    if tickers.len() != 2 || tickers.iter().any(|t| t.trim().is_empty()) {
        warn!("Invalid number of tickers provided: {:?}", tickers);
        return Err(AppError::validation(
            "Exactly 2 tickers must be provided",
            "Provide two stock tickers in the \"ticker\" query parameter",
        ));
    }
    for ticker in &tickers {
        validate_ticker(ticker)?;
    }
    let minutes = parse_minutes(query.as_deref(), state.default_window_minutes)?;
    let (ticker_a, ticker_b) = (&tickers[0], &tickers[1]);

    info!(
        "GET /api/stockcorrelation - {} vs {} over {} minutes ({})",
        ticker_a, ticker_b, minutes, state.correlation_method
    );

    let (correlation, stocks) = services::price_service::get_pair_report(
        state.price_provider.as_ref(),
        &state.price_cache,
        ticker_a,
        ticker_b,
        minutes,
        state.correlation_method,
    )
    .await
    .map_err(|e| {
        error!(
            "Failed to correlate {} and {} ({} min): {}",
            ticker_a, ticker_b, minutes, e
        );
        e
    })?;

    Ok(Json(CorrelationResponse { correlation, stocks }))
}
