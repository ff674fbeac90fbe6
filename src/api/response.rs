//! Response types for the Budget Allocation API.
//!
//! This module defines the error response structures and error handling
//! for the HTTP API.

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::models::ValidationResult;

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// The validation result, when validation caused the error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationResult>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            validation: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            details: Some(details.into()),
            ..Self::new(code, message)
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }

    /// Creates an invalid id error response.
    pub fn invalid_id(raw: &str) -> Self {
        Self::with_details(
            "INVALID_ID",
            format!("Invalid allocation id: {}", raw),
            "Allocation ids are UUIDs",
        )
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// Pairs an error body with a status code.
    pub fn new(status: StatusCode, error: ApiError) -> Self {
        Self { status, error }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, "application/json")],
            Json(self.error),
        )
            .into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        match error {
            EngineError::ConfigNotFound { path } => ApiErrorResponse::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration error",
                    format!("Configuration file not found: {}", path),
                ),
            ),
            EngineError::ConfigParseError { path, message } => ApiErrorResponse::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration parse error",
                    format!("Failed to parse {}: {}", path, message),
                ),
            ),
            EngineError::DepartmentNotFound { id } => ApiErrorResponse::new(
                StatusCode::BAD_REQUEST,
                ApiError::with_details(
                    "DEPARTMENT_NOT_FOUND",
                    message,
                    format!("The department '{}' is not in the registry", id),
                ),
            ),
            EngineError::AllocationNotFound { .. } => ApiErrorResponse::new(
                StatusCode::NOT_FOUND,
                ApiError::new("ALLOCATION_NOT_FOUND", message),
            ),
            EngineError::NoAllocationForPeriod { .. } => ApiErrorResponse::new(
                StatusCode::NOT_FOUND,
                ApiError::new("NO_ALLOCATION_FOR_PERIOD", message),
            ),
            EngineError::NoDraftLoaded => ApiErrorResponse::new(
                StatusCode::BAD_REQUEST,
                ApiError::new("NO_DRAFT", message),
            ),
            EngineError::InvalidBudget { .. } => ApiErrorResponse::new(
                StatusCode::BAD_REQUEST,
                ApiError::new("INVALID_BUDGET", message),
            ),
            EngineError::InvalidLineValue { .. } => ApiErrorResponse::new(
                StatusCode::BAD_REQUEST,
                ApiError::new("INVALID_LINE_VALUE", message),
            ),
            EngineError::DraftLocked { .. } => ApiErrorResponse::new(
                StatusCode::CONFLICT,
                ApiError::with_details(
                    "DRAFT_LOCKED",
                    message,
                    "Only allocations in draft status can be edited",
                ),
            ),
            EngineError::VersionConflict { .. } => ApiErrorResponse::new(
                StatusCode::CONFLICT,
                ApiError::with_details(
                    "VERSION_CONFLICT",
                    message,
                    "Reload the allocation and apply your changes again",
                ),
            ),
            EngineError::InvalidTransition { .. } => ApiErrorResponse::new(
                StatusCode::CONFLICT,
                ApiError::new("INVALID_TRANSITION", message),
            ),
            EngineError::SubmissionBlocked { validation } => ApiErrorResponse::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiError {
                    validation: Some(*validation),
                    ..ApiError::new("SUBMISSION_BLOCKED", message)
                },
            ),
            EngineError::UnsupportedExportFormat { .. } => ApiErrorResponse::new(
                StatusCode::BAD_REQUEST,
                ApiError::with_details(
                    "UNSUPPORTED_FORMAT",
                    message,
                    "Supported formats are csv and json",
                ),
            ),
            EngineError::ExportError { .. } => ApiErrorResponse::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("EXPORT_ERROR", message),
            ),
        }
    }
}
