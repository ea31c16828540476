use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use sqlx::types::Uuid;
use validator::Validate;

use crate::{
    app_state::AppState,
    db::models::{CreditWalletPayload, Wallet, WalletTransaction},
    db::repositories::{CreditOutcome, WalletRepository},
    error::{AppError, AppResult},
};

pub async fn get_wallet(
    State(state): State<AppState>,
    Path(profile_id): Path<Uuid>,
) -> AppResult<Json<Wallet>> {
    let wallet = WalletRepository::get(&state.db, profile_id).await?;
    Ok(Json(wallet))
}

pub async fn list_transactions(
    State(state): State<AppState>,
    Path(profile_id): Path<Uuid>,
) -> AppResult<Json<Vec<WalletTransaction>>> {
    let entries = WalletRepository::transactions(&state.db, profile_id).await?;
    Ok(Json(entries))
}

/// Gateway credit webhook target. Safe to redeliver: the payment reference
/// is only ever applied once.
pub async fn credit_wallet(
    State(state): State<AppState>,
    Path(profile_id): Path<Uuid>,
    Json(payload): Json<CreditWalletPayload>,
) -> AppResult<(StatusCode, Json<Wallet>)> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    match WalletRepository::credit_idempotent(&state.db, profile_id, &payload).await? {
        CreditOutcome::Applied(wallet) => Ok((StatusCode::CREATED, Json(wallet))),
        CreditOutcome::AlreadyApplied(wallet) => Ok((StatusCode::OK, Json(wallet))),
    }
}
