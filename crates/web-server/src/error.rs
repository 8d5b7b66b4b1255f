use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] database::DbError),
    #[error("KPI computation error: {0}")]
    Kpi(#[from] kpi_engine::KpiError),
    #[error("Configuration error: {0}")]
    Config(#[from] configuration::error::ConfigError),
}

/// Converts our custom `AppError` into an HTTP response.
///
/// A failed store read aborts the whole computation: the service never
/// answers with a partial snapshot.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Database(db_err) => {
                tracing::error!(error = ?db_err, "Entity store read failed.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal database error occurred".to_string(),
                )
            }
            AppError::Kpi(kpi_err) => {
                tracing::error!(error = ?kpi_err, "KPI computation failed.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An error occurred while computing the KPI snapshot".to_string(),
                )
            }
            AppError::Config(config_err) => {
                tracing::error!(error = ?config_err, "Configuration error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A server configuration error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({ "success": false, "error": error_message }));
        (status, body).into_response()
    }
}
