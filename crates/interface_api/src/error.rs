//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain_staging::StagingError;
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Validation error: {0}")]
    Validation(String, Vec<String>),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
            ApiError::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "unavailable"),
            ApiError::Validation(..) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error"),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = match self {
            ApiError::Validation(message, details) => ErrorResponse {
                error: error_type.to_string(),
                message,
                details: (!details.is_empty()).then_some(details),
            },
            ApiError::NotFound(message)
            | ApiError::BadRequest(message)
            | ApiError::Conflict(message)
            | ApiError::Internal(message)
            | ApiError::Unavailable(message) => ErrorResponse {
                error: error_type.to_string(),
                message,
                details: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<StagingError> for ApiError {
    fn from(err: StagingError) -> Self {
        let message = err.to_string();
        match err {
            StagingError::Validation(_) | StagingError::Arithmetic(_) => {
                ApiError::Validation(message, Vec::new())
            }
            StagingError::NotFound { .. } => ApiError::NotFound(message),
            StagingError::InvalidState(_) | StagingError::Conflict(_) => ApiError::Conflict(message),
            StagingError::StoreUnavailable(_) => ApiError::Unavailable(message),
            StagingError::Storage(_) => ApiError::Internal(message),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let details = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(message) => format!("{}: {}", field, message),
                    None => format!("{}: {}", field, e.code),
                })
            })
            .collect();
        ApiError::Validation("Request failed validation".to_string(), details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staging_errors_map_to_status() {
        let cases = [
            (StagingError::validation("bad"), StatusCode::UNPROCESSABLE_ENTITY),
            (StagingError::not_found("Client", 1), StatusCode::NOT_FOUND),
            (StagingError::invalid_state("approved"), StatusCode::CONFLICT),
            (
                StagingError::StoreUnavailable("down".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];

        for (err, expected) in cases {
            let response = ApiError::from(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }
}
