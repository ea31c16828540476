use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "escrow_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EscrowStatus {
    Held,
    Released,
}

/// Held-funds record bridging the booker's debit and the provider payout.
/// Created in the same transaction as its booking; released either to the
/// provider on check-in or back to the booker on decline.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct EscrowPayment {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub payer_id: Uuid,
    pub provider_id: Uuid,
    pub amount: f64,
    pub status: EscrowStatus,
    pub payment_ref: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}
