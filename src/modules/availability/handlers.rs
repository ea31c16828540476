use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use sqlx::types::Uuid;
use time::Date;
use validator::Validate;

use crate::{
    app_state::AppState,
    db::models::{
        group_by_date, AvailabilitySlotSet, NewSlotPayload, PricingSettings, ProfileRole,
        RemoveSlotPayload, SlotWindow, UpdatePricingPayload,
    },
    db::repositories::{AddSlotOutcome, AvailabilityRepository, ProfileRepository},
    error::{AppError, AppResult},
};

/// All slot sets for a provider, ordered by date ascending.
pub async fn list_availability(
    State(state): State<AppState>,
    Path(provider_id): Path<Uuid>,
) -> AppResult<Json<Vec<AvailabilitySlotSet>>> {
    let rows = AvailabilityRepository::list_for_provider(&state.db, provider_id).await?;
    Ok(Json(group_by_date(rows)))
}

pub async fn add_slot(
    State(state): State<AppState>,
    Path(provider_id): Path<Uuid>,
    Json(payload): Json<NewSlotPayload>,
) -> AppResult<(StatusCode, Json<Value>)> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let window = SlotWindow::parse(&payload.start, &payload.end)
        .map_err(|e| AppError::Validation(e.to_string()))?;

    match AvailabilityRepository::add_slot(&state.db, provider_id, payload.date, window).await? {
        AddSlotOutcome::Created(slot) => Ok((
            StatusCode::CREATED,
            Json(json!({ "created": true, "slot": slot })),
        )),
        AddSlotOutcome::Unchanged => Ok((
            StatusCode::OK,
            Json(json!({ "created": false, "reason": "identical slot already present" })),
        )),
    }
}

pub async fn remove_slot(
    State(state): State<AppState>,
    Path(provider_id): Path<Uuid>,
    Json(payload): Json<RemoveSlotPayload>,
) -> AppResult<Json<Value>> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let window = SlotWindow::parse(&payload.start, &payload.end)
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let removed =
        AvailabilityRepository::remove_slot(&state.db, provider_id, payload.date, window).await?;
    Ok(Json(json!({ "removed": removed })))
}

pub async fn remove_date(
    State(state): State<AppState>,
    Path((provider_id, date)): Path<(Uuid, Date)>,
) -> AppResult<Json<Value>> {
    let removed = AvailabilityRepository::remove_date(&state.db, provider_id, date).await?;
    Ok(Json(json!({ "removed_slots": removed })))
}

pub async fn get_pricing(
    State(state): State<AppState>,
    Path(provider_id): Path<Uuid>,
) -> AppResult<Json<PricingSettings>> {
    let pricing = ProfileRepository::pricing(&state.db, provider_id).await?;
    Ok(Json(pricing))
}

pub async fn update_pricing(
    State(state): State<AppState>,
    Path(provider_id): Path<Uuid>,
    Json(payload): Json<UpdatePricingPayload>,
) -> AppResult<Json<PricingSettings>> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let profile = ProfileRepository::get(&state.db, provider_id).await?;
    if profile.role != ProfileRole::Provider {
        return Err(AppError::BadRequest("Profile is not a provider".to_string()));
    }

    let pricing =
        ProfileRepository::upsert_pricing(&state.db, provider_id, payload.rate_per_hour).await?;
    Ok(Json(pricing))
}
