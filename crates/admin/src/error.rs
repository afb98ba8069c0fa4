//! Unified error handling for the admin API.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::models::GiftCardError;

/// Application-level error type for the admin API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User lacks permission.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Request conflicts with current resource state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<GiftCardError> for AppError {
    fn from(err: GiftCardError) -> Self {
        match err {
            GiftCardError::Validation(msg) => Self::BadRequest(msg),
            GiftCardError::InsufficientBalance { current_balance } => Self::Conflict(format!(
                "amount exceeds the card's current balance of {current_balance}"
            )),
            GiftCardError::ZeroBalance => Self::Conflict(
                "a card with a zero balance cannot be activated; refund or adjust it first"
                    .to_string(),
            ),
            GiftCardError::NotFound => Self::NotFound("gift card".to_string()),
            GiftCardError::DataCorruption(msg) => Self::Internal(msg),
            GiftCardError::Persistence(e) => Self::Database(RepositoryError::Database(e)),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log server errors with Sentry
        if matches!(self, Self::Database(_) | Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        }

        let status = match &self {
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("gift card".to_string());
        assert_eq!(err.to_string(), "Not found: gift card");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        // Test that errors map to correct HTTP status codes
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
            get_status(AppError::Forbidden("test".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Conflict("test".to_string())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_gift_card_error_mapping() {
        assert!(matches!(
            AppError::from(GiftCardError::Validation("bad amount".to_string())),
            AppError::BadRequest(_)
        ));
        assert!(matches!(
            AppError::from(GiftCardError::InsufficientBalance {
                current_balance: Decimal::new(3000, 2)
            }),
            AppError::Conflict(_)
        ));
        assert!(matches!(
            AppError::from(GiftCardError::ZeroBalance),
            AppError::Conflict(_)
        ));
        assert!(matches!(
            AppError::from(GiftCardError::NotFound),
            AppError::NotFound(_)
        ));
    }
}
