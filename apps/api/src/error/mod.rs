use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::models::ErrorResponse;

pub type Result<T> = std::result::Result<T, ApiError>;

const FORBIDDEN_MESSAGE: &str =
    "Access to the book service is currently forbidden. Please check service permissions.";
const GEO_RESTRICTED_MESSAGE: &str =
    "Book service access failed due to geographic restrictions. Please check the service settings.";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The search API answered with a non-success status.
    #[error("Open Library API request failed ({status}): {message}")]
    SearchFailed { status: u16, message: String },

    /// No response was received at all.
    #[error("Transport error: {0}")]
    TransportError(String),

    /// A response arrived but does not have the expected shape.
    #[error("Upstream contract violation: {0}")]
    UpstreamContractError(String),

    #[error("External service error: {0}")]
    ExternalServiceError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl ApiError {
    /// HTTP status reported by the search API, if this is a search failure.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            ApiError::SearchFailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message suitable for showing to an end user.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::SearchFailed { status: 403, .. } => FORBIDDEN_MESSAGE.to_string(),
            ApiError::SearchFailed { message, .. }
                if message
                    .to_lowercase()
                    .contains("cannot determine user location") =>
            {
                GEO_RESTRICTED_MESSAGE.to_string()
            }
            ApiError::SearchFailed { .. } | ApiError::TransportError(_) => {
                format!("Failed to fetch books: {}", self)
            }
            ApiError::InvalidInput(message) => message.clone(),
            ApiError::UpstreamContractError(_) | ApiError::ExternalServiceError(_) => {
                "Failed to get recommendations. Please try again.".to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::SearchFailed { .. }
            | ApiError::TransportError(_)
            | ApiError::UpstreamContractError(_)
            | ApiError::ExternalServiceError(_) => StatusCode::BAD_GATEWAY,
            ApiError::ConfigError(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        HttpResponse::build(status).json(ErrorResponse {
            error: self.user_message(),
            status: status.as_u16(),
        })
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::SerializationError(err.to_string())
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::TransportError(err.to_string())
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::InternalError(err.to_string())
    }
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::InternalError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forbidden_gets_friendly_message() {
        let err = ApiError::SearchFailed {
            status: 403,
            message: "blocked".to_string(),
        };

        assert_eq!(err.upstream_status(), Some(403));
        assert_eq!(err.user_message(), FORBIDDEN_MESSAGE);
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_geographic_restriction_message() {
        let err = ApiError::SearchFailed {
            status: 400,
            message: "Cannot determine user location for geographically restricted operation"
                .to_string(),
        };

        assert_eq!(err.user_message(), GEO_RESTRICTED_MESSAGE);
    }

    #[test]
    fn test_other_search_failures_keep_details() {
        let err = ApiError::SearchFailed {
            status: 500,
            message: "Internal Server Error".to_string(),
        };

        let message = err.user_message();
        assert!(message.starts_with("Failed to fetch books:"));
        assert!(message.contains("(500)"));
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::InvalidInput("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::UpstreamContractError("x".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::ConfigError("x".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::InternalError("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ApiError::InvalidInput("x".into()).upstream_status(), None);
    }
}
