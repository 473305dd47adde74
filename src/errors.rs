use crate::services::device_service::ServiceError;
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;
use utoipa::ToSchema;

/// Message sent for every failure whose details must stay server-side.
pub const GENERIC_ERROR_MESSAGE: &str = "An unexpected error occurred. Please try again later.";

/// Error response returned when an API operation fails.
#[derive(Serialize, ToSchema, Debug)]
pub struct ErrorResponse {
    /// HTTP status code
    #[schema(example = 404)]
    pub status: u16,
    /// Error message describing what went wrong
    #[schema(example = "Device not found with id: 123")]
    pub message: String,
}

/// A lightweight wrapper for general errors that keeps the message local.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
        }
    }

    /// 500 with the generic message. The detail is logged, never returned.
    pub fn internal(detail: impl fmt::Display) -> Self {
        tracing::error!(error = %detail, "Unexpected error occurred");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, GENERIC_ERROR_MESSAGE)
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            status: self.status.as_u16(),
            message: self.message,
        });

        (self.status, body).into_response()
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(_) => AppError::not_found(err.to_string()),
            ServiceError::Validation(msg) => AppError::bad_request(msg),
            ServiceError::Conflict(_) => AppError::new(StatusCode::CONFLICT, err.to_string()),
            ServiceError::Repository(inner) => AppError::internal(inner),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::bad_request(rejection.body_text())
    }
}
