use axum::extract::{Path, RawQuery, State};
use axum::routing::get;
use axum::{Json, Router};
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::{AveragePriceResponse, StockListingResponse};
use crate::routes::params::{parse_minutes, validate_ticker};
use crate::services;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_stocks))
        .route("/:ticker", get(get_average_price))
}

/// GET /api/stocks/:ticker?minutes=N
pub async fn get_average_price(
    Path(ticker): Path<String>,
    RawQuery(query): RawQuery,
    State(state): State<AppState>,
) -> Result<Json<AveragePriceResponse>, AppError> {
    validate_ticker(&ticker)?;
    let minutes = parse_minutes(query.as_deref(), state.default_window_minutes)?;
    info!("GET /api/stocks/{} - Fetching prices for last {} minutes", ticker, minutes);

    let summary = services::price_service::get_stock_summary(
        state.price_provider.as_ref(),
        &state.price_cache,
        &ticker,
        minutes,
    )
    .await
    .map_err(|e| {
        error!("Failed to get average price for {} ({} min): {}", ticker, minutes, e);
        e
    })?;

    Ok(Json(AveragePriceResponse {
        average_stock_price: summary.average_price,
        price_history: summary.price_history,
    }))
}

/// GET /api/stocks
pub async fn list_stocks(State(state): State<AppState>) -> Result<Json<StockListingResponse>, AppError> {
    info!("GET /api/stocks - Listing stocks");
    let stocks = services::price_service::list_stocks(state.price_provider.as_ref()).await?;
    Ok(Json(StockListingResponse { stocks }))
}
