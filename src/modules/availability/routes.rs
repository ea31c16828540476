use axum::{
    routing::{delete, get, post},
    Router,
};

use super::handlers::{
    add_slot, get_pricing, list_availability, remove_date, remove_slot, update_pricing,
};
use crate::app_state::AppState;

pub fn provider_routes() -> Router<AppState> {
    Router::new()
        .route("/:provider_id/availability", get(list_availability))
        .route(
            "/:provider_id/availability/slots",
            post(add_slot).delete(remove_slot),
        )
        .route("/:provider_id/availability/:date", delete(remove_date))
        .route("/:provider_id/pricing", get(get_pricing).put(update_pricing))
}
