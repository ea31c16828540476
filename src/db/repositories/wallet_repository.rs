use sqlx::types::Uuid;
use sqlx::{PgPool, Postgres, Transaction};

use crate::db::models::{CreditWalletPayload, TransactionDirection, Wallet, WalletTransaction};
use crate::db::DatabaseError;

#[derive(Debug)]
pub enum CreditOutcome {
    Applied(Wallet),
    /// The payment reference was seen before; the balance is untouched.
    AlreadyApplied(Wallet),
}

pub struct WalletRepository;

impl WalletRepository {
    pub async fn get(pool: &PgPool, profile_id: Uuid) -> Result<Wallet, DatabaseError> {
        sqlx::query_as::<_, Wallet>("SELECT * FROM wallets WHERE profile_id = $1")
            .bind(profile_id)
            .fetch_optional(pool)
            .await?
            .ok_or(DatabaseError::NotFound)
    }

    /// Guarded debit: the balance check and the subtraction are one
    /// statement, so concurrent debits can never overdraw the wallet.
    pub async fn debit(
        tx: &mut Transaction<'_, Postgres>,
        profile_id: Uuid,
        amount: f64,
    ) -> Result<Wallet, DatabaseError> {
        let updated = sqlx::query_as::<_, Wallet>(
            r#"
            UPDATE wallets
            SET balance = balance - $2, updated_at = NOW()
            WHERE profile_id = $1 AND balance >= $2
            RETURNING *
            "#,
        )
        .bind(profile_id)
        .bind(amount)
        .fetch_optional(&mut **tx)
        .await?;

        let wallet = match updated {
            Some(wallet) => wallet,
            None => {
                let exists =
                    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM wallets WHERE profile_id = $1")
                        .bind(profile_id)
                        .fetch_one(&mut **tx)
                        .await?;
                return Err(if exists == 0 {
                    DatabaseError::NotFound
                } else {
                    DatabaseError::InsufficientFunds
                });
            }
        };

        Self::record_transaction(tx, profile_id, amount, TransactionDirection::Debit, None).await?;
        Ok(wallet)
    }

    pub async fn credit(
        tx: &mut Transaction<'_, Postgres>,
        profile_id: Uuid,
        amount: f64,
        payment_ref: Option<&str>,
    ) -> Result<Wallet, DatabaseError> {
        let wallet = sqlx::query_as::<_, Wallet>(
            r#"
            UPDATE wallets
            SET balance = balance + $2, updated_at = NOW()
            WHERE profile_id = $1
            RETURNING *
            "#,
        )
        .bind(profile_id)
        .bind(amount)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(DatabaseError::NotFound)?;

        Self::record_transaction(tx, profile_id, amount, TransactionDirection::Credit, payment_ref)
            .await?;
        Ok(wallet)
    }

    /// Gateway credit keyed by payment reference. The ledger row is claimed
    /// first; if the reference was already recorded the whole call is a
    /// no-op, so webhook redelivery cannot double-credit.
    pub async fn credit_idempotent(
        pool: &PgPool,
        profile_id: Uuid,
        payload: &CreditWalletPayload,
    ) -> Result<CreditOutcome, DatabaseError> {
        let mut tx = pool.begin().await?;

        let claimed = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO wallet_transactions (profile_id, amount, direction, payment_ref)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (payment_ref) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(profile_id)
        .bind(payload.amount)
        .bind(TransactionDirection::Credit)
        .bind(&payload.payment_ref)
        .fetch_optional(&mut *tx)
        .await?;

        if claimed.is_none() {
            tx.rollback().await?;
            return Ok(CreditOutcome::AlreadyApplied(Self::get(pool, profile_id).await?));
        }

        let wallet = sqlx::query_as::<_, Wallet>(
            r#"
            UPDATE wallets
            SET balance = balance + $2, updated_at = NOW()
            WHERE profile_id = $1
            RETURNING *
            "#,
        )
        .bind(profile_id)
        .bind(payload.amount)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(DatabaseError::NotFound)?;

        tx.commit().await?;
        Ok(CreditOutcome::Applied(wallet))
    }

    /// Ledger view, newest first.
    pub async fn transactions(
        pool: &PgPool,
        profile_id: Uuid,
    ) -> Result<Vec<WalletTransaction>, DatabaseError> {
        let entries = sqlx::query_as::<_, WalletTransaction>(
            r#"
            SELECT * FROM wallet_transactions
            WHERE profile_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(profile_id)
        .fetch_all(pool)
        .await?;

        Ok(entries)
    }

    async fn record_transaction(
        tx: &mut Transaction<'_, Postgres>,
        profile_id: Uuid,
        amount: f64,
        direction: TransactionDirection,
        payment_ref: Option<&str>,
    ) -> Result<(), DatabaseError> {
        // Ledger rows carry strictly positive amounts; the table check
        // enforces the same, so fail with a typed error instead of a
        // constraint violation.
        if amount <= 0.0 {
            return Err(DatabaseError::InvalidInput(
                "ledger amounts must be positive".to_string(),
            ));
        }

        sqlx::query(
            r#"
            INSERT INTO wallet_transactions (profile_id, amount, direction, payment_ref)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(profile_id)
        .bind(amount)
        .bind(direction)
        .bind(payment_ref)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}
