use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use sqlx::types::Uuid;
use validator::Validate;

use crate::{
    app_state::AppState,
    db::models::{
        duration_in_hours, price_for, Booking, BookingListQuery, NewBookingPayload, Quote,
        QuotePayload, SelectHotelPayload, SlotWindow,
    },
    db::repositories::{BookingDetail, BookingRepository, ConfirmedBooking, ProfileRepository},
    error::{AppError, AppResult},
};

/// Prices a window at the provider's current rate without writing anything.
pub async fn quote(
    State(state): State<AppState>,
    Json(payload): Json<QuotePayload>,
) -> AppResult<Json<Quote>> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let window = SlotWindow::parse(&payload.start, &payload.end)
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let pricing = ProfileRepository::pricing(&state.db, payload.provider_id).await?;

    Ok(Json(Quote {
        provider_id: payload.provider_id,
        rate_per_hour: pricing.rate_per_hour,
        duration_hours: duration_in_hours(window.start, window.end),
        total_amount: price_for(pricing.rate_per_hour, window.start, window.end),
    }))
}

/// Confirms a booking: slot claim, wallet debit, booking and escrow rows,
/// all in one transaction.
pub async fn create_booking(
    State(state): State<AppState>,
    Json(payload): Json<NewBookingPayload>,
) -> AppResult<(StatusCode, Json<ConfirmedBooking>)> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let window = SlotWindow::parse(&payload.start, &payload.end)
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let confirmed = BookingRepository::confirm(&state.db, &payload, window).await?;
    Ok((StatusCode::CREATED, Json(confirmed)))
}

pub async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<BookingDetail>> {
    let detail = BookingRepository::detail(&state.db, id).await?;
    Ok(Json(detail))
}

pub async fn list_bookings(
    State(state): State<AppState>,
    Query(query): Query<BookingListQuery>,
) -> AppResult<Json<Vec<Booking>>> {
    let bookings = BookingRepository::list(&state.db, &query).await?;
    Ok(Json(bookings))
}

pub async fn accept_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Booking>> {
    let booking = BookingRepository::accept(&state.db, id).await?;
    Ok(Json(booking))
}

pub async fn decline_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Booking>> {
    let booking = BookingRepository::decline(&state.db, id).await?;
    Ok(Json(booking))
}

pub async fn select_hotel(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SelectHotelPayload>,
) -> AppResult<Json<Booking>> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let booking = BookingRepository::select_hotel(&state.db, id, &payload).await?;
    Ok(Json(booking))
}

/// "I've arrived": completes the booking and releases the held funds to
/// the provider.
pub async fn check_in(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Booking>> {
    let booking = BookingRepository::check_in(&state.db, id).await?;
    Ok(Json(booking))
}
