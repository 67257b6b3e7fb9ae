use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::Router;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::routes::{correlation, health, stocks};
use crate::state::AppState;

pub fn create_app(state: AppState) -> Router {
    let api = Router::<AppState>::new()
        .nest("/stocks", stocks::router())
        .nest("/stockcorrelation", correlation::router())
        .layer(middleware::from_fn(log_request));

    Router::<AppState>::new()
        .nest("/health", health::router())
        .nest("/api", api)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let query = request.uri().query().unwrap_or("").to_string();

    info!(%method, %path, %query, "API request");
    let response = next.run(request).await;
    info!(%method, %path, status = response.status().as_u16(), "API response");

    response
}
