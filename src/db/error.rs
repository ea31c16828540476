use thiserror::Error;

use crate::db::models::BookingStatus;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Record not found")]
    NotFound,

    #[error("Duplicate record")]
    Duplicate,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Insufficient wallet balance")]
    InsufficientFunds,

    #[error("Slot is no longer available")]
    SlotUnavailable,

    #[error("Booking cannot move from {from:?} to {to:?}")]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },
}
