use axum::{
    routing::{get, post, put},
    Router,
};

use super::handlers::{
    accept_booking, check_in, create_booking, decline_booking, get_booking, list_bookings, quote,
    select_hotel,
};
use crate::app_state::AppState;

pub fn booking_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_booking).get(list_bookings))
        .route("/quote", post(quote))
        .route("/:id", get(get_booking))
        .route("/:id/accept", post(accept_booking))
        .route("/:id/decline", post(decline_booking))
        .route("/:id/hotel", put(select_hotel))
        .route("/:id/check-in", post(check_in))
}
