use sqlx::types::Uuid;
use sqlx::{PgPool, Postgres, Transaction};

use crate::db::models::{NewProfilePayload, PricingSettings, Profile, ProfileRole};
use crate::db::DatabaseError;

pub struct ProfileRepository;

impl ProfileRepository {
    /// Creates the profile together with its wallet (and, for providers,
    /// a zero-rate pricing row) in one transaction.
    pub async fn create(pool: &PgPool, payload: &NewProfilePayload) -> Result<Profile, DatabaseError> {
        let mut tx = pool.begin().await?;

        let profile = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (display_name, email, role)
            VALUES ($1, LOWER($2), $3)
            RETURNING *
            "#,
        )
        .bind(&payload.display_name)
        .bind(&payload.email)
        .bind(payload.role)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => DatabaseError::Duplicate,
            _ => DatabaseError::from(e),
        })?;

        sqlx::query("INSERT INTO wallets (profile_id) VALUES ($1)")
            .bind(profile.id)
            .execute(&mut *tx)
            .await?;

        if profile.role == ProfileRole::Provider {
            sqlx::query("INSERT INTO pricing_settings (provider_id, rate_per_hour) VALUES ($1, 0)")
                .bind(profile.id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(profile)
    }

    pub async fn get(pool: &PgPool, id: Uuid) -> Result<Profile, DatabaseError> {
        sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or(DatabaseError::NotFound)
    }

    /// Resolves a profile that must carry the provider role.
    pub async fn provider(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> Result<Profile, DatabaseError> {
        sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = $1 AND role = $2")
            .bind(id)
            .bind(ProfileRole::Provider)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or(DatabaseError::NotFound)
    }

    pub async fn pricing(pool: &PgPool, provider_id: Uuid) -> Result<PricingSettings, DatabaseError> {
        sqlx::query_as::<_, PricingSettings>(
            "SELECT * FROM pricing_settings WHERE provider_id = $1",
        )
        .bind(provider_id)
        .fetch_optional(pool)
        .await?
        .ok_or(DatabaseError::NotFound)
    }

    pub async fn pricing_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        provider_id: Uuid,
    ) -> Result<PricingSettings, DatabaseError> {
        sqlx::query_as::<_, PricingSettings>(
            "SELECT * FROM pricing_settings WHERE provider_id = $1",
        )
        .bind(provider_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(DatabaseError::NotFound)
    }

    pub async fn upsert_pricing(
        pool: &PgPool,
        provider_id: Uuid,
        rate_per_hour: f64,
    ) -> Result<PricingSettings, DatabaseError> {
        sqlx::query_as::<_, PricingSettings>(
            r#"
            INSERT INTO pricing_settings (provider_id, rate_per_hour)
            VALUES ($1, $2)
            ON CONFLICT (provider_id)
            DO UPDATE SET rate_per_hour = EXCLUDED.rate_per_hour, updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(provider_id)
        .bind(rate_per_hour)
        .fetch_one(pool)
        .await
        .map_err(DatabaseError::from)
    }
}
