//! Error handling utilities for API responses.
//!
//! Provides structured error responses and conversion between service-layer
//! errors and HTTP responses. Includes:
//! - Standard error response format
//! - ServiceError to HTTP status code mapping
//!
//! # Response Format
//! All errors return consistent JSON responses containing:
//! - `error`: Human-readable message
//! - `error_type`: Machine-readable error category
//! - `details`: Optional field-specific validation errors
//!
//! # Error Handling Flow
//! 1. Service layer returns domain-specific `ServiceError`
//! 2. `service_error_to_http` converts to appropriate HTTP response
//! 3. Unexpected failures are logged server-side and surfaced only as a
//!    generic internal error, never with detail

use crate::errors::ServiceError;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

/// Standard API response wrapper for all endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Indicates if the request was successful
    pub success: bool,
    /// Response data (present on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Human-readable message
    pub message: String,
    /// Error details (present on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetails>,
    /// Request timestamp
    pub timestamp: String,
}

/// Error details for failed requests
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Machine-readable error type identifier
    pub error_type: String,
    /// Field-specific validation errors when applicable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

/// Field-specific validation error details
#[derive(Debug, Serialize, Deserialize)]
pub struct FieldError {
    /// Name of the field with validation error
    pub field: String,
    /// Description of the validation failure
    pub message: String,
}

impl<T> ApiResponse<T> {
    /// Create a successful response
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: message.into(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Create an error response
    pub fn error(
        message: impl Into<String>,
        error_type: impl Into<String>,
        details: Option<Vec<FieldError>>,
    ) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            message: message.into(),
            error: Some(ErrorDetails {
                error_type: error_type.into(),
                details,
            }),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Converts ServiceError to appropriate HTTP response with standard format
pub fn service_error_to_http(error: ServiceError) -> (StatusCode, String) {
    let (status, error_type, message) = match error {
        ServiceError::Validation { message } => {
            (StatusCode::BAD_REQUEST, "validation_error", message)
        }
        ServiceError::NotFound { entity, .. } => (
            StatusCode::NOT_FOUND,
            "not_found",
            format!("{} not found", entity),
        ),
        // Registration conflicts surface as a plain 400, matching the rest
        // of the request-shaped failures on that endpoint.
        ServiceError::AlreadyExists { entity, .. } => (
            StatusCode::BAD_REQUEST,
            "already_exists",
            format!("{} already exists", entity),
        ),
        // One message for unknown email and wrong password alike, so the
        // endpoint cannot be used to enumerate accounts.
        ServiceError::InvalidCredentials => (
            StatusCode::UNAUTHORIZED,
            "invalid_credentials",
            "Invalid credentials".to_string(),
        ),
        ServiceError::Unauthorized => (
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "Unauthorized".to_string(),
        ),
        ServiceError::PermissionDenied { message } => {
            (StatusCode::FORBIDDEN, "permission_denied", message)
        }
        ServiceError::Database { source } => {
            tracing::error!("Database error: {}", source);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Internal server error".to_string(),
            )
        }
        ServiceError::ExternalService { message } => {
            tracing::error!("External service error: {}", message);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Internal server error".to_string(),
            )
        }
        ServiceError::Internal { message } => {
            tracing::error!("Internal error: {}", message);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Internal server error".to_string(),
            )
        }
    };

    let error_response = ApiResponse::<()>::error(message, error_type, None);
    (status, serde_json::to_string(&error_response).unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ServiceError;

    #[test]
    fn status_mapping_follows_the_error_taxonomy() {
        let cases = [
            (
                service_error_to_http(ServiceError::validation("bad input")).0,
                StatusCode::BAD_REQUEST,
            ),
            (
                service_error_to_http(ServiceError::already_exists("User", "a@x.com")).0,
                StatusCode::BAD_REQUEST,
            ),
            (
                service_error_to_http(ServiceError::InvalidCredentials).0,
                StatusCode::UNAUTHORIZED,
            ),
            (
                service_error_to_http(ServiceError::Unauthorized).0,
                StatusCode::UNAUTHORIZED,
            ),
            (
                service_error_to_http(ServiceError::permission_denied("admins only")).0,
                StatusCode::FORBIDDEN,
            ),
            (
                service_error_to_http(ServiceError::not_found("User", "id")).0,
                StatusCode::NOT_FOUND,
            ),
            (
                service_error_to_http(ServiceError::internal("boom")).0,
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                service_error_to_http(ServiceError::external_service("idp down")).0,
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (actual, expected) in cases {
            assert_eq!(actual, expected);
        }
    }

    #[test]
    fn unexpected_failures_surface_no_detail() {
        let (_, body) = service_error_to_http(ServiceError::internal("secret detail"));
        assert!(!body.contains("secret detail"));
        assert!(body.contains("Internal server error"));
    }

    #[test]
    fn credential_failures_share_one_message() {
        let (status, body) = service_error_to_http(ServiceError::InvalidCredentials);
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("Invalid credentials"));
    }
}
