use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{create_profile, get_profile};
use crate::app_state::AppState;

pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_profile))
        .route("/:id", get(get_profile))
}
