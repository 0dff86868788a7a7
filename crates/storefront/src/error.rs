//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::commerce::CommerceError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Remote commerce API operation failed.
    #[error("Commerce error: {0}")]
    Commerce(#[from] CommerceError),

    /// Session read or write failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        let is_server_error = match &self {
            Self::Session(_) | Self::Internal(_) => true,
            Self::Commerce(err) => !matches!(
                err,
                CommerceError::NotFound(_) | CommerceError::Unauthorized
            ),
            _ => false,
        };
        if is_server_error {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Commerce(err) => match err {
                CommerceError::NotFound(_) => StatusCode::NOT_FOUND,
                CommerceError::Unauthorized => StatusCode::UNAUTHORIZED,
                CommerceError::RateLimited(_) => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::BAD_GATEWAY,
            },
            Self::Session(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Session(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Commerce(err) => match err {
                CommerceError::NotFound(_) => "Not found".to_string(),
                CommerceError::Unauthorized => "Please sign in and try again".to_string(),
                CommerceError::RateLimited(_) => {
                    "The store is busy right now, please retry shortly".to_string()
                }
                _ => "External service error".to_string(),
            },
            _ => self.to_string(),
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a customer id.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(customer_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(customer_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product-123".to_string());
        assert_eq!(err.to_string(), "Not found: product-123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            let response = err.into_response();
            response.status()
        }

        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_commerce_error_status_codes() {
        let not_found: AppError = CommerceError::NotFound("cart".to_string()).into();
        assert_eq!(not_found.into_response().status(), StatusCode::NOT_FOUND);

        let unauthorized: AppError = CommerceError::Unauthorized.into();
        assert_eq!(
            unauthorized.into_response().status(),
            StatusCode::UNAUTHORIZED
        );

        let rate_limited: AppError = CommerceError::RateLimited(5).into();
        assert_eq!(
            rate_limited.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );

        let api: AppError = CommerceError::Api {
            status: 500,
            message: "boom".to_string(),
        }
        .into();
        assert_eq!(api.into_response().status(), StatusCode::BAD_GATEWAY);
    }
}
