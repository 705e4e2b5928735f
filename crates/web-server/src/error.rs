use analytics::AnalyticsError;
use axum::{
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Message returned when there is nothing to analyze.
pub const NO_DATA_MESSAGE: &str = "No stock data available";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] database::DbError),
    #[error("Analytics error: {0}")]
    Analytics(#[from] AnalyticsError),
    #[error("Invalid query: {0}")]
    InvalidQuery(#[from] QueryRejection),
}

/// Converts our custom `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Database(db_err) => {
                tracing::error!(error = ?db_err, "Database error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal database error occurred".to_string(),
                )
            }
            AppError::Analytics(AnalyticsError::EmptySeries) => {
                (StatusCode::NOT_FOUND, NO_DATA_MESSAGE.to_string())
            }
            AppError::Analytics(err @ AnalyticsError::InvalidWindow { .. }) => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            AppError::Analytics(err @ AnalyticsError::NumericOverflow(_)) => {
                tracing::warn!(error = %err, "Stored prices cannot be analyzed.");
                (StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
            }
            AppError::InvalidQuery(rejection) => (StatusCode::BAD_REQUEST, rejection.body_text()),
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
