use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use time::OffsetDateTime;
use validator::Validate;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Wallet {
    pub profile_id: Uuid,
    pub balance: f64,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "transaction_direction", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TransactionDirection {
    Credit,
    Debit,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct WalletTransaction {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub amount: f64,
    pub direction: TransactionDirection,
    pub payment_ref: Option<String>,
    pub created_at: OffsetDateTime,
}

/// Gateway credit notification. `payment_ref` is the idempotency key:
/// redelivery of an already-applied reference leaves the balance untouched.
#[derive(Debug, Deserialize, Validate)]
pub struct CreditWalletPayload {
    #[validate(range(min = 0.01, message = "Amount must be positive"))]
    pub amount: f64,
    #[validate(length(min = 1, message = "Payment reference must not be empty"))]
    pub payment_ref: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credit_payload_rejects_non_positive_amounts() {
        let payload = CreditWalletPayload {
            amount: 0.0,
            payment_ref: "txn_123".to_string(),
        };
        assert!(payload.validate().is_err());

        let payload = CreditWalletPayload {
            amount: 25.0,
            payment_ref: String::new(),
        };
        assert!(payload.validate().is_err());

        let payload = CreditWalletPayload {
            amount: 25.0,
            payment_ref: "txn_123".to_string(),
        };
        assert!(payload.validate().is_ok());
    }
}
