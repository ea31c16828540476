use sqlx::types::Uuid;
use sqlx::{PgPool, Postgres, Transaction};
use time::Date;

use crate::db::models::{is_duplicate, AvailabilitySlot, SlotWindow};
use crate::db::DatabaseError;

#[derive(Debug)]
pub enum AddSlotOutcome {
    Created(AvailabilitySlot),
    /// The date already held an identical (start, end) pair. Duplicate
    /// submissions are suppressed silently, not reported as errors.
    Unchanged,
}

pub struct AvailabilityRepository;

impl AvailabilityRepository {
    pub async fn add_slot(
        pool: &PgPool,
        provider_id: Uuid,
        date: Date,
        window: SlotWindow,
    ) -> Result<AddSlotOutcome, DatabaseError> {
        let existing = Self::slots_for_date(pool, provider_id, date).await?;
        if is_duplicate(&existing, window) {
            return Ok(AddSlotOutcome::Unchanged);
        }

        let inserted = sqlx::query_as::<_, AvailabilitySlot>(
            r#"
            INSERT INTO availability_slots (provider_id, slot_date, start_time, end_time)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (provider_id, slot_date, start_time, end_time) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(provider_id)
        .bind(date)
        .bind(window.start)
        .bind(window.end)
        .fetch_optional(pool)
        .await?;

        // A concurrent insert of the same window lands on the conflict
        // target and surfaces as the same silent no-op.
        Ok(match inserted {
            Some(slot) => AddSlotOutcome::Created(slot),
            None => AddSlotOutcome::Unchanged,
        })
    }

    /// Removes the slot matching the exact (start, end) pair. With one row
    /// per slot, removing the last slot of a date removes the date entry.
    pub async fn remove_slot(
        pool: &PgPool,
        provider_id: Uuid,
        date: Date,
        window: SlotWindow,
    ) -> Result<bool, DatabaseError> {
        let result = sqlx::query(
            r#"
            DELETE FROM availability_slots
            WHERE provider_id = $1 AND slot_date = $2 AND start_time = $3 AND end_time = $4
            "#,
        )
        .bind(provider_id)
        .bind(date)
        .bind(window.start)
        .bind(window.end)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn remove_date(
        pool: &PgPool,
        provider_id: Uuid,
        date: Date,
    ) -> Result<u64, DatabaseError> {
        let result = sqlx::query(
            "DELETE FROM availability_slots WHERE provider_id = $1 AND slot_date = $2",
        )
        .bind(provider_id)
        .bind(date)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// All of a provider's slots ordered by date, then start time. This is
    /// the sole read path the booking client consumes.
    pub async fn list_for_provider(
        pool: &PgPool,
        provider_id: Uuid,
    ) -> Result<Vec<AvailabilitySlot>, DatabaseError> {
        let slots = sqlx::query_as::<_, AvailabilitySlot>(
            r#"
            SELECT * FROM availability_slots
            WHERE provider_id = $1
            ORDER BY slot_date ASC, start_time ASC
            "#,
        )
        .bind(provider_id)
        .fetch_all(pool)
        .await?;

        Ok(slots)
    }

    pub async fn slots_for_date(
        pool: &PgPool,
        provider_id: Uuid,
        date: Date,
    ) -> Result<Vec<AvailabilitySlot>, DatabaseError> {
        let slots = sqlx::query_as::<_, AvailabilitySlot>(
            r#"
            SELECT * FROM availability_slots
            WHERE provider_id = $1 AND slot_date = $2
            ORDER BY start_time ASC
            "#,
        )
        .bind(provider_id)
        .bind(date)
        .fetch_all(pool)
        .await?;

        Ok(slots)
    }

    /// Claims the slot for a booking. The `is_booked = FALSE` guard makes
    /// two concurrent confirmations race safely: one flips the row, the
    /// other sees no match and fails with `SlotUnavailable`.
    pub async fn mark_booked(
        tx: &mut Transaction<'_, Postgres>,
        provider_id: Uuid,
        date: Date,
        window: SlotWindow,
    ) -> Result<AvailabilitySlot, DatabaseError> {
        sqlx::query_as::<_, AvailabilitySlot>(
            r#"
            UPDATE availability_slots
            SET is_booked = TRUE
            WHERE provider_id = $1 AND slot_date = $2
              AND start_time = $3 AND end_time = $4
              AND is_booked = FALSE
            RETURNING *
            "#,
        )
        .bind(provider_id)
        .bind(date)
        .bind(window.start)
        .bind(window.end)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(DatabaseError::SlotUnavailable)
    }

    /// Returns a slot to the bookable pool after a declined booking.
    pub async fn release(
        tx: &mut Transaction<'_, Postgres>,
        provider_id: Uuid,
        date: Date,
        window: SlotWindow,
    ) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            UPDATE availability_slots
            SET is_booked = FALSE
            WHERE provider_id = $1 AND slot_date = $2
              AND start_time = $3 AND end_time = $4
            "#,
        )
        .bind(provider_id)
        .bind(date)
        .bind(window.start)
        .bind(window.end)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}

#[cfg(all(test, feature = "pg-tests"))]
mod pg_tests {
    use super::*;
    use sqlx::PgPool;
    use time::macros::date;

    use crate::db::models::{NewProfilePayload, ProfileRole};
    use crate::db::repositories::ProfileRepository;

    async fn seed_provider(pool: &PgPool) -> Uuid {
        ProfileRepository::create(
            pool,
            &NewProfilePayload {
                display_name: "Bola".to_string(),
                email: "bola@example.com".to_string(),
                role: ProfileRole::Provider,
            },
        )
        .await
        .unwrap()
        .id
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn adding_an_identical_slot_twice_keeps_one_row(pool: PgPool) {
        let provider = seed_provider(&pool).await;
        let day = date!(2025 - 09 - 10);
        let window = SlotWindow::parse("14:00", "18:00").unwrap();

        let first = AvailabilityRepository::add_slot(&pool, provider, day, window)
            .await
            .unwrap();
        assert!(matches!(first, AddSlotOutcome::Created(_)));

        let second = AvailabilityRepository::add_slot(&pool, provider, day, window)
            .await
            .unwrap();
        assert!(matches!(second, AddSlotOutcome::Unchanged));

        let slots = AvailabilityRepository::slots_for_date(&pool, provider, day)
            .await
            .unwrap();
        assert_eq!(slots.len(), 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn removing_the_last_slot_drops_the_date_entry(pool: PgPool) {
        let provider = seed_provider(&pool).await;
        let day = date!(2025 - 09 - 10);
        let window = SlotWindow::parse("09:00", "12:00").unwrap();

        AvailabilityRepository::add_slot(&pool, provider, day, window)
            .await
            .unwrap();
        let removed = AvailabilityRepository::remove_slot(&pool, provider, day, window)
            .await
            .unwrap();
        assert!(removed);

        let all = AvailabilityRepository::list_for_provider(&pool, provider)
            .await
            .unwrap();
        assert!(all.is_empty());
    }
}
