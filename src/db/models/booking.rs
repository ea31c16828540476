use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use time::{Date, OffsetDateTime, Time};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "booking_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    PendingPayment,
    PaymentHeld,
    Accepted,
    Cancelled,
    Completed,
}

impl BookingStatus {
    /// The one authoritative transition table. Status is never mutated
    /// without a corresponding persisted write that re-checks the current
    /// value, so an out-of-date client cannot skip a state.
    pub fn can_transition_to(self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, next),
            (PendingPayment, PaymentHeld)
                | (PendingPayment, Cancelled)
                | (PaymentHeld, Accepted)
                | (PaymentHeld, Cancelled)
                | (Accepted, Completed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, BookingStatus::Cancelled | BookingStatus::Completed)
    }
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub booker_id: Uuid,
    pub provider_id: Uuid,
    pub slot_date: Date,
    pub start_time: Time,
    pub end_time: Time,
    pub rate_per_hour: f64,
    pub total_amount: f64,
    pub status: BookingStatus,
    pub hotel_name: Option<String>,
    pub hotel_location: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewBookingPayload {
    pub booker_id: Uuid,
    pub provider_id: Uuid,
    pub date: Date,
    #[validate(length(min = 1, message = "Start time must not be empty"))]
    pub start: String,
    #[validate(length(min = 1, message = "End time must not be empty"))]
    pub end: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct QuotePayload {
    pub provider_id: Uuid,
    #[validate(length(min = 1, message = "Start time must not be empty"))]
    pub start: String,
    #[validate(length(min = 1, message = "End time must not be empty"))]
    pub end: String,
}

#[derive(Debug, Serialize)]
pub struct Quote {
    pub provider_id: Uuid,
    pub rate_per_hour: f64,
    pub duration_hours: f64,
    pub total_amount: f64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SelectHotelPayload {
    #[validate(length(min = 1, message = "Hotel name must not be empty"))]
    pub hotel_name: String,
    pub hotel_location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BookingListQuery {
    pub booker_id: Option<Uuid>,
    pub provider_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::BookingStatus::*;

    #[test]
    fn held_payment_can_be_accepted_or_cancelled() {
        assert!(PaymentHeld.can_transition_to(Accepted));
        assert!(PaymentHeld.can_transition_to(Cancelled));
        assert!(!PaymentHeld.can_transition_to(Completed));
        assert!(!PaymentHeld.can_transition_to(PendingPayment));
    }

    #[test]
    fn only_accepted_bookings_complete() {
        assert!(Accepted.can_transition_to(Completed));
        assert!(!Accepted.can_transition_to(Cancelled));
        assert!(!PendingPayment.can_transition_to(Completed));
    }

    #[test]
    fn terminal_states_admit_no_transition() {
        for next in [PendingPayment, PaymentHeld, Accepted, Cancelled, Completed] {
            assert!(!Cancelled.can_transition_to(next));
            assert!(!Completed.can_transition_to(next));
        }
        assert!(Cancelled.is_terminal());
        assert!(Completed.is_terminal());
        assert!(!Accepted.is_terminal());
    }
}
