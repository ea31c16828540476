use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{credit_wallet, get_wallet, list_transactions};
use crate::app_state::AppState;

pub fn wallet_routes() -> Router<AppState> {
    Router::new()
        .route("/:profile_id", get(get_wallet))
        .route("/:profile_id/credits", post(credit_wallet))
        .route("/:profile_id/transactions", get(list_transactions))
}
