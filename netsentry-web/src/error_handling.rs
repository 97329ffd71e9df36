use axum::{
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("File processing error: {message}")]
    FileProcessing { message: String },

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Internal server error: {message}")]
    Internal { message: String },
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub code: String,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_type: &str, message: String, code: String) -> Self {
        Self {
            error: error_type.to_string(),
            message,
            code,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match self {
            AppError::Database(ref e) => {
                error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(
                        "database_error",
                        format!("A database error occurred: {}", e),
                        "DB_ERROR".to_string(),
                    ),
                )
            }

            AppError::Validation { ref message } => {
                warn!("Validation error: {}", message);
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    ErrorResponse::new(
                        "validation_error",
                        message.clone(),
                        "VALIDATION_FAILED".to_string(),
                    ),
                )
            }

            AppError::NotFound { ref resource } => {
                warn!("Resource not found: {}", resource);
                (
                    StatusCode::NOT_FOUND,
                    ErrorResponse::new(
                        "not_found",
                        format!("Resource not found: {}", resource),
                        "NOT_FOUND".to_string(),
                    ),
                )
            }

            AppError::FileProcessing { ref message } => {
                error!("File processing error: {}", message);
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    ErrorResponse::new(
                        "file_processing_error",
                        message.clone(),
                        "FILE_PROCESSING".to_string(),
                    ),
                )
            }

            AppError::BadRequest { ref message } => {
                warn!("Bad request: {}", message);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::new("bad_request", message.clone(), "BAD_REQUEST".to_string()),
                )
            }

            AppError::Internal { ref message } => {
                error!("Internal error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(
                        "internal_error",
                        "An internal error occurred".to_string(),
                        "INTERNAL_ERROR".to_string(),
                    ),
                )
            }
        };

        (status, Json(error_response)).into_response()
    }
}

// Helper functions for creating specific errors
impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn file_processing(message: impl Into<String>) -> Self {
        Self::FileProcessing {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

// 404 handler
pub async fn handle_404(uri: Uri) -> impl IntoResponse {
    let error_response = ErrorResponse::new(
        "not_found",
        format!("No route found for {}", uri.path()),
        "ROUTE_NOT_FOUND".to_string(),
    );

    (StatusCode::NOT_FOUND, Json(error_response))
}

// Result type alias
pub type AppResult<T> = Result<T, AppError>;

// Health check types and functions
#[derive(Serialize, Deserialize, Debug)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: String,
    pub version: String,
    pub services: HashMap<String, ServiceHealth>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ServiceHealth {
    pub status: String,
    pub response_time_ms: Option<f64>,
    pub error: Option<String>,
    pub last_check: String,
}

pub async fn check_database_health(pool: &sqlx::Pool<sqlx::Sqlite>) -> ServiceHealth {
    let start = std::time::Instant::now();

    match sqlx::query("SELECT 1").fetch_one(pool).await {
        Ok(_) => ServiceHealth {
            status: "healthy".to_string(),
            response_time_ms: Some(start.elapsed().as_millis() as f64),
            error: None,
            last_check: chrono::Utc::now().to_rfc3339(),
        },
        Err(e) => ServiceHealth {
            status: "unhealthy".to_string(),
            response_time_ms: Some(start.elapsed().as_millis() as f64),
            error: Some(e.to_string()),
            last_check: chrono::Utc::now().to_rfc3339(),
        },
    }
}

// Middleware for request tracing
use axum::{extract::Request, middleware::Next};

pub async fn trace_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = std::time::Instant::now();

    let trace_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(
        trace_id = %trace_id,
        method = %method,
        uri = %uri,
        "Request started"
    );

    let response = next.run(request).await;

    let status = response.status();
    let duration = start.elapsed();

    tracing::info!(
        trace_id = %trace_id,
        method = %method,
        uri = %uri,
        status = %status,
        duration_ms = duration.as_millis(),
        "Request completed"
    );

    response
}
