// libs/doctor-cell/src/router.rs
use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, patch, post},
    Router,
};

use shared_utils::identity::identity_middleware;
use shared_utils::state::AppState;

use crate::handlers;

pub fn doctor_routes(state: Arc<AppState>) -> Router {
    // All schedule management requires a verified identity
    let protected_routes = Router::new()
        .route("/availability", post(handlers::create_availability))
        .route("/availability/{availability_id}", patch(handlers::update_availability))
        .route("/availability/{availability_id}", delete(handlers::delete_availability))
        .route("/timeslots", post(handlers::create_time_slot))
        .route("/timeslots/{timeslot_id}", patch(handlers::update_time_slot))
        .route("/timeslots/{timeslot_id}", delete(handlers::delete_time_slot))
        .route("/{doctor_id}/timeslots/available", get(handlers::list_available_time_slots))
        .route("/schedule-type", patch(handlers::update_schedule_type))
        .layer(middleware::from_fn(identity_middleware));

    Router::new().merge(protected_routes).with_state(state)
}
