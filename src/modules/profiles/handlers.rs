use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use sqlx::types::Uuid;
use validator::Validate;

use crate::{
    app_state::AppState,
    db::models::{NewProfilePayload, Profile},
    db::repositories::ProfileRepository,
    error::{AppError, AppResult},
};

pub async fn create_profile(
    State(state): State<AppState>,
    Json(payload): Json<NewProfilePayload>,
) -> AppResult<(StatusCode, Json<Profile>)> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let profile = ProfileRepository::create(&state.db, &payload).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

pub async fn get_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Profile>> {
    let profile = ProfileRepository::get(&state.db, id).await?;
    Ok(Json(profile))
}
