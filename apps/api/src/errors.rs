use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::job_search::JobSearchError;
use crate::rag::error::RagError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// "No jobs matched" is never an error; only pipeline failures end up here.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Rag(#[from] RagError),

    #[error("Job search error: {0}")]
    JobSearch(#[from] JobSearchError),

    #[error("Request timed out after {0}s")]
    Timeout(u64),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Rag(RagError::Configuration(msg)) => {
                tracing::error!("Configuration error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CONFIGURATION_ERROR",
                    "The matching service is misconfigured".to_string(),
                )
            }
            AppError::Rag(RagError::Ingestion(e)) => {
                tracing::error!("Ingestion error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "INGESTION_ERROR",
                    "Failed to index job postings".to_string(),
                )
            }
            AppError::Rag(RagError::Retrieval(e)) => {
                tracing::error!("Retrieval error: {e}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "RETRIEVAL_ERROR",
                    "The job index is unavailable".to_string(),
                )
            }
            AppError::Rag(RagError::Generation(e)) => {
                tracing::error!("Generation error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "GENERATION_ERROR",
                    "The AI matching step failed, please retry".to_string(),
                )
            }
            AppError::JobSearch(e) => {
                tracing::error!("Job search error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "JOB_SEARCH_ERROR",
                    "Failed to fetch jobs from the search provider".to_string(),
                )
            }
            AppError::Timeout(secs) => {
                tracing::warn!("Request exceeded {secs}s deadline");
                (
                    StatusCode::GATEWAY_TIMEOUT,
                    "TIMEOUT",
                    format!("Matching did not finish within {secs} seconds"),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
