use sqlx::types::Uuid;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::info;

use crate::db::models::{
    price_for, Booking, BookingListQuery, BookingStatus, EscrowPayment, EscrowStatus,
    NewBookingPayload, SelectHotelPayload, SlotWindow,
};
use crate::db::repositories::{AvailabilityRepository, ProfileRepository, WalletRepository};
use crate::db::DatabaseError;

#[derive(Debug, serde::Serialize)]
pub struct ConfirmedBooking {
    pub booking: Booking,
    pub escrow: EscrowPayment,
}

#[derive(Debug, serde::Serialize)]
pub struct BookingDetail {
    pub booking: Booking,
    pub escrow: Option<EscrowPayment>,
}

pub struct BookingRepository;

impl BookingRepository {
    /// Confirms a booking in one transaction: provider and rate lookup,
    /// slot claim, wallet debit, booking insert, escrow insert. The debit
    /// strictly precedes the booking insert, and a failure at any step
    /// rolls everything back, debit included.
    pub async fn confirm(
        pool: &PgPool,
        payload: &NewBookingPayload,
        window: SlotWindow,
    ) -> Result<ConfirmedBooking, DatabaseError> {
        let mut tx = pool.begin().await?;

        let provider = ProfileRepository::provider(&mut tx, payload.provider_id).await?;
        let pricing = ProfileRepository::pricing_in_tx(&mut tx, provider.id).await?;
        if !pricing.is_bookable() {
            return Err(DatabaseError::InvalidInput(
                "provider has no hourly rate configured".to_string(),
            ));
        }
        let total = price_for(pricing.rate_per_hour, window.start, window.end);

        AvailabilityRepository::mark_booked(&mut tx, provider.id, payload.date, window).await?;
        WalletRepository::debit(&mut tx, payload.booker_id, total).await?;

        let booking = sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings
                (booker_id, provider_id, slot_date, start_time, end_time,
                 rate_per_hour, total_amount, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(payload.booker_id)
        .bind(provider.id)
        .bind(payload.date)
        .bind(window.start)
        .bind(window.end)
        .bind(pricing.rate_per_hour)
        .bind(total)
        .bind(BookingStatus::PaymentHeld)
        .fetch_one(&mut *tx)
        .await?;

        let escrow = sqlx::query_as::<_, EscrowPayment>(
            r#"
            INSERT INTO escrow_payments (booking_id, payer_id, provider_id, amount, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(booking.id)
        .bind(payload.booker_id)
        .bind(provider.id)
        .bind(total)
        .bind(EscrowStatus::Held)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            booking_id = %booking.id,
            booker_id = %booking.booker_id,
            provider_id = %booking.provider_id,
            total_amount = booking.total_amount,
            "Booking confirmed with funds held in escrow"
        );

        Ok(ConfirmedBooking { booking, escrow })
    }

    pub async fn get(pool: &PgPool, id: Uuid) -> Result<Booking, DatabaseError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or(DatabaseError::NotFound)
    }

    pub async fn detail(pool: &PgPool, id: Uuid) -> Result<BookingDetail, DatabaseError> {
        let booking = Self::get(pool, id).await?;
        let escrow =
            sqlx::query_as::<_, EscrowPayment>("SELECT * FROM escrow_payments WHERE booking_id = $1")
                .bind(id)
                .fetch_optional(pool)
                .await?;

        Ok(BookingDetail { booking, escrow })
    }

    pub async fn list(pool: &PgPool, query: &BookingListQuery) -> Result<Vec<Booking>, DatabaseError> {
        let bookings = sqlx::query_as::<_, Booking>(
            r#"
            SELECT * FROM bookings
            WHERE ($1::uuid IS NULL OR booker_id = $1)
              AND ($2::uuid IS NULL OR provider_id = $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(query.booker_id)
        .bind(query.provider_id)
        .fetch_all(pool)
        .await?;

        Ok(bookings)
    }

    /// Provider accepts a held booking. Persisted, unlike a client-local
    /// status flip.
    pub async fn accept(pool: &PgPool, id: Uuid) -> Result<Booking, DatabaseError> {
        let mut tx = pool.begin().await?;
        let booking =
            Self::guarded_transition(&mut tx, id, BookingStatus::PaymentHeld, BookingStatus::Accepted)
                .await?;
        tx.commit().await?;
        Ok(booking)
    }

    /// Provider declines: the booking is cancelled, the escrow released
    /// back to the payer, and the slot returned to the pool, atomically.
    pub async fn decline(pool: &PgPool, id: Uuid) -> Result<Booking, DatabaseError> {
        let mut tx = pool.begin().await?;

        let booking =
            Self::guarded_transition(&mut tx, id, BookingStatus::PaymentHeld, BookingStatus::Cancelled)
                .await?;
        let escrow = Self::release_escrow(&mut tx, booking.id).await?;
        WalletRepository::credit(&mut tx, escrow.payer_id, escrow.amount, None).await?;
        AvailabilityRepository::release(
            &mut tx,
            booking.provider_id,
            booking.slot_date,
            SlotWindow {
                start: booking.start_time,
                end: booking.end_time,
            },
        )
        .await?;

        tx.commit().await?;

        info!(booking_id = %booking.id, refund = escrow.amount, "Booking declined, payer refunded");
        Ok(booking)
    }

    /// Booker check-in: completes the booking and pays the held amount out
    /// to the provider wallet in the same transaction.
    pub async fn check_in(pool: &PgPool, id: Uuid) -> Result<Booking, DatabaseError> {
        let mut tx = pool.begin().await?;

        let booking =
            Self::guarded_transition(&mut tx, id, BookingStatus::Accepted, BookingStatus::Completed)
                .await?;
        let escrow = Self::release_escrow(&mut tx, booking.id).await?;
        WalletRepository::credit(&mut tx, escrow.provider_id, escrow.amount, None).await?;

        tx.commit().await?;

        info!(
            booking_id = %booking.id,
            provider_id = %escrow.provider_id,
            payout = escrow.amount,
            "Check-in recorded, escrow released to provider"
        );
        Ok(booking)
    }

    /// Hotel selection is an independent failure domain from booking
    /// creation; it touches only the hotel columns.
    pub async fn select_hotel(
        pool: &PgPool,
        id: Uuid,
        payload: &SelectHotelPayload,
    ) -> Result<Booking, DatabaseError> {
        sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings
            SET hotel_name = $2, hotel_location = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&payload.hotel_name)
        .bind(&payload.hotel_location)
        .fetch_optional(pool)
        .await?
        .ok_or(DatabaseError::NotFound)
    }

    /// Single-statement compare-and-set against the expected status. A
    /// no-match re-read distinguishes a missing booking from an illegal
    /// transition (or a lost race, which reports the same way).
    async fn guarded_transition(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        expected: BookingStatus,
        next: BookingStatus,
    ) -> Result<Booking, DatabaseError> {
        debug_assert!(expected.can_transition_to(next));

        let updated = sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings
            SET status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(expected)
        .bind(next)
        .fetch_optional(&mut **tx)
        .await?;

        match updated {
            Some(booking) => Ok(booking),
            None => {
                let current = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
                    .bind(id)
                    .fetch_optional(&mut **tx)
                    .await?
                    .ok_or(DatabaseError::NotFound)?;
                Err(DatabaseError::InvalidTransition {
                    from: current.status,
                    to: next,
                })
            }
        }
    }

    async fn release_escrow(
        tx: &mut Transaction<'_, Postgres>,
        booking_id: Uuid,
    ) -> Result<EscrowPayment, DatabaseError> {
        sqlx::query_as::<_, EscrowPayment>(
            r#"
            UPDATE escrow_payments
            SET status = $2, updated_at = NOW()
            WHERE booking_id = $1 AND status = $3
            RETURNING *
            "#,
        )
        .bind(booking_id)
        .bind(EscrowStatus::Released)
        .bind(EscrowStatus::Held)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(DatabaseError::NotFound)
    }
}

#[cfg(all(test, feature = "pg-tests"))]
mod pg_tests {
    use super::*;
    use sqlx::PgPool;
    use time::macros::date;

    use crate::db::models::{CreditWalletPayload, NewProfilePayload, ProfileRole};
    use crate::db::repositories::AddSlotOutcome;

    async fn seed_profile(pool: &PgPool, name: &str, email: &str, role: ProfileRole) -> Uuid {
        ProfileRepository::create(
            pool,
            &NewProfilePayload {
                display_name: name.to_string(),
                email: email.to_string(),
                role,
            },
        )
        .await
        .unwrap()
        .id
    }

    /// Booker with `funds`, provider with `rate`, and one open
    /// 14:00-18:00 slot on 2025-09-10.
    async fn seed_marketplace(pool: &PgPool, rate: f64, funds: f64) -> (Uuid, Uuid) {
        let booker = seed_profile(pool, "Ada", "ada@example.com", ProfileRole::Booker).await;
        let provider = seed_profile(pool, "Femi", "femi@example.com", ProfileRole::Provider).await;

        if rate > 0.0 {
            ProfileRepository::upsert_pricing(pool, provider, rate)
                .await
                .unwrap();
        }
        if funds > 0.0 {
            WalletRepository::credit_idempotent(
                pool,
                booker,
                &CreditWalletPayload {
                    amount: funds,
                    payment_ref: "seed_txn_1".to_string(),
                },
            )
            .await
            .unwrap();
        }

        let window = SlotWindow::parse("14:00", "18:00").unwrap();
        let added = AvailabilityRepository::add_slot(pool, provider, slot_day(), window)
            .await
            .unwrap();
        assert!(matches!(added, AddSlotOutcome::Created(_)));

        (booker, provider)
    }

    fn slot_day() -> time::Date {
        date!(2025 - 09 - 10)
    }

    fn booking_payload(booker: Uuid, provider: Uuid) -> NewBookingPayload {
        NewBookingPayload {
            booker_id: booker,
            provider_id: provider,
            date: slot_day(),
            start: "14:00".to_string(),
            end: "18:00".to_string(),
        }
    }

    fn window() -> SlotWindow {
        SlotWindow::parse("14:00", "18:00").unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn confirm_holds_funds_and_creates_booking_atomically(pool: PgPool) {
        let (booker, provider) = seed_marketplace(&pool, 150.0, 600.0).await;

        let confirmed =
            BookingRepository::confirm(&pool, &booking_payload(booker, provider), window())
                .await
                .unwrap();

        assert_eq!(confirmed.booking.total_amount, 600.0);
        assert_eq!(confirmed.booking.status, BookingStatus::PaymentHeld);
        assert_eq!(confirmed.escrow.status, EscrowStatus::Held);
        assert_eq!(confirmed.escrow.amount, 600.0);

        let wallet = WalletRepository::get(&pool, booker).await.unwrap();
        assert_eq!(wallet.balance, 0.0);

        let slots = AvailabilityRepository::slots_for_date(&pool, provider, slot_day())
            .await
            .unwrap();
        assert!(slots[0].is_booked);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn insufficient_funds_roll_the_whole_confirmation_back(pool: PgPool) {
        let (booker, provider) = seed_marketplace(&pool, 150.0, 100.0).await;

        let err = BookingRepository::confirm(&pool, &booking_payload(booker, provider), window())
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::InsufficientFunds));

        let bookings = BookingRepository::list(
            &pool,
            &BookingListQuery {
                booker_id: Some(booker),
                provider_id: None,
            },
        )
        .await
        .unwrap();
        assert!(bookings.is_empty());

        let wallet = WalletRepository::get(&pool, booker).await.unwrap();
        assert_eq!(wallet.balance, 100.0);

        let slots = AvailabilityRepository::slots_for_date(&pool, provider, slot_day())
            .await
            .unwrap();
        assert!(!slots[0].is_booked);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn unpriced_provider_is_rejected_without_touching_the_wallet(pool: PgPool) {
        let (booker, provider) = seed_marketplace(&pool, 0.0, 600.0).await;

        let err = BookingRepository::confirm(&pool, &booking_payload(booker, provider), window())
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidInput(_)));

        let wallet = WalletRepository::get(&pool, booker).await.unwrap();
        assert_eq!(wallet.balance, 600.0);

        // Only the seeding credit is in the ledger; no zero-amount rows.
        let ledger = WalletRepository::transactions(&pool, booker).await.unwrap();
        assert_eq!(ledger.len(), 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn check_in_releases_escrow_to_the_provider(pool: PgPool) {
        let (booker, provider) = seed_marketplace(&pool, 150.0, 600.0).await;

        let confirmed =
            BookingRepository::confirm(&pool, &booking_payload(booker, provider), window())
                .await
                .unwrap();
        BookingRepository::accept(&pool, confirmed.booking.id)
            .await
            .unwrap();
        let completed = BookingRepository::check_in(&pool, confirmed.booking.id)
            .await
            .unwrap();

        assert_eq!(completed.status, BookingStatus::Completed);
        let provider_wallet = WalletRepository::get(&pool, provider).await.unwrap();
        assert_eq!(provider_wallet.balance, 600.0);

        let detail = BookingRepository::detail(&pool, confirmed.booking.id)
            .await
            .unwrap();
        assert_eq!(detail.escrow.unwrap().status, EscrowStatus::Released);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn decline_refunds_the_payer_and_frees_the_slot(pool: PgPool) {
        let (booker, provider) = seed_marketplace(&pool, 150.0, 600.0).await;

        let confirmed =
            BookingRepository::confirm(&pool, &booking_payload(booker, provider), window())
                .await
                .unwrap();
        let declined = BookingRepository::decline(&pool, confirmed.booking.id)
            .await
            .unwrap();

        assert_eq!(declined.status, BookingStatus::Cancelled);
        let wallet = WalletRepository::get(&pool, booker).await.unwrap();
        assert_eq!(wallet.balance, 600.0);

        let slots = AvailabilityRepository::slots_for_date(&pool, provider, slot_day())
            .await
            .unwrap();
        assert!(!slots[0].is_booked);
    }
}
