use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::db::DatabaseError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Database(ref err) => match err {
                DatabaseError::NotFound => (StatusCode::NOT_FOUND, "Resource not found"),
                DatabaseError::Duplicate => (StatusCode::CONFLICT, "Resource already exists"),
                DatabaseError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "Invalid input data"),
                DatabaseError::InsufficientFunds => {
                    (StatusCode::PAYMENT_REQUIRED, "Insufficient wallet balance")
                }
                DatabaseError::SlotUnavailable => {
                    (StatusCode::CONFLICT, "Slot is no longer available")
                }
                DatabaseError::InvalidTransition { .. } => {
                    (StatusCode::CONFLICT, "Illegal booking status transition")
                }
                DatabaseError::Sqlx(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred",
                ),
            },
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "Validation error"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "Bad request"),
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Request failed: {}", self);
        }

        let body = Json(json!({
            "error": {
                "message": error_message,
                "details": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::BookingStatus;

    #[test]
    fn insufficient_funds_maps_to_payment_required() {
        let response = AppError::Database(DatabaseError::InsufficientFunds).into_response();
        assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    }

    #[test]
    fn illegal_transition_maps_to_conflict() {
        let err = AppError::Database(DatabaseError::InvalidTransition {
            from: BookingStatus::Cancelled,
            to: BookingStatus::Accepted,
        });
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn invalid_input_maps_to_bad_request() {
        let err = AppError::Database(DatabaseError::InvalidInput(
            "provider has no hourly rate configured".into(),
        ));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn validation_maps_to_bad_request() {
        let err = AppError::Validation("slot start must be before slot end".into());
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
