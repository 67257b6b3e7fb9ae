use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::external::price_provider::PriceProviderError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{message}: {details}")]
    Validation { message: String, details: String },
    #[error("Upstream error: {0}")]
    Upstream(#[from] PriceProviderError),
}

impl AppError {
    pub fn validation(message: impl Into<String>, details: impl Into<String>) -> Self {
        AppError::Validation {
            message: message.into(),
            details: details.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub details: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match self {
            AppError::Validation { message, details } => (StatusCode::BAD_REQUEST, message, details),
            AppError::Upstream(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to retrieve stock prices".to_string(),
                e.to_string(),
            ),
        };
        (status, Json(ErrorBody { error, details })).into_response()
    }
}
