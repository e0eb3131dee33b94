// libs/doctor-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::auth::{AuthUser, UserRole};
use shared_models::error::AppError;
use shared_utils::state::AppState;

use crate::models::{
    AvailableSlotsQuery, CreateAvailabilityRequest, CreateTimeSlotRequest, ScheduleError,
    UpdateAvailabilityRequest, UpdateScheduleTypeRequest, UpdateTimeSlotRequest,
};
use crate::services::{AvailabilityService, DoctorService, TimeSlotService};

// ==============================================================================
// AVAILABILITY HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn create_availability(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CreateAvailabilityRequest>,
) -> Result<Json<Value>, AppError> {
    let doctor_id = require_doctor(&user)?;

    let service = AvailabilityService::new(&state);
    let response = service
        .create_availability(doctor_id, request)
        .await
        .map_err(map_schedule_error)?;

    Ok(Json(json!({
        "success": true,
        "message": "Availability created",
        "data": response
    })))
}

#[axum::debug_handler]
pub async fn update_availability(
    State(state): State<Arc<AppState>>,
    Path(availability_id): Path<Uuid>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<UpdateAvailabilityRequest>,
) -> Result<Json<Value>, AppError> {
    let doctor_id = require_doctor(&user)?;

    let service = AvailabilityService::new(&state);
    let availability = service
        .update_availability(doctor_id, availability_id, request)
        .await
        .map_err(map_schedule_error)?;

    Ok(Json(json!({
        "success": true,
        "message": "Availability updated",
        "data": availability
    })))
}

#[axum::debug_handler]
pub async fn delete_availability(
    State(state): State<Arc<AppState>>,
    Path(availability_id): Path<Uuid>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    let doctor_id = require_doctor(&user)?;

    let service = AvailabilityService::new(&state);
    let deleted = service
        .soft_delete_availability(doctor_id, availability_id)
        .await
        .map_err(map_schedule_error)?;

    Ok(Json(json!({
        "success": true,
        "message": "Availability deleted",
        "availability_id": deleted
    })))
}

// ==============================================================================
// TIME SLOT HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn create_time_slot(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CreateTimeSlotRequest>,
) -> Result<Json<Value>, AppError> {
    let doctor_id = require_doctor(&user)?;

    let service = TimeSlotService::new(&state);
    let slot = service
        .create_time_slot(doctor_id, request)
        .await
        .map_err(map_schedule_error)?;

    Ok(Json(json!({
        "success": true,
        "message": "Time slot created successfully",
        "data": slot
    })))
}

#[axum::debug_handler]
pub async fn update_time_slot(
    State(state): State<Arc<AppState>>,
    Path(timeslot_id): Path<Uuid>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<UpdateTimeSlotRequest>,
) -> Result<Json<Value>, AppError> {
    let doctor_id = require_doctor(&user)?;

    let service = TimeSlotService::new(&state);
    let slot = service
        .update_time_slot(doctor_id, timeslot_id, request)
        .await
        .map_err(map_schedule_error)?;

    Ok(Json(json!({
        "success": true,
        "message": "Time slot updated successfully",
        "data": slot
    })))
}

#[axum::debug_handler]
pub async fn delete_time_slot(
    State(state): State<Arc<AppState>>,
    Path(timeslot_id): Path<Uuid>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    let doctor_id = require_doctor(&user)?;

    let service = TimeSlotService::new(&state);
    let deleted = service
        .soft_delete_time_slot(doctor_id, timeslot_id)
        .await
        .map_err(map_schedule_error)?;

    Ok(Json(json!({
        "success": true,
        "message": "Time slot deleted successfully",
        "timeslot_id": deleted
    })))
}

/// Patients browse a doctor's open slots; no role restriction beyond a
/// verified identity.
#[axum::debug_handler]
pub async fn list_available_time_slots(
    State(state): State<Arc<AppState>>,
    Path(doctor_id): Path<Uuid>,
    Query(query): Query<AvailableSlotsQuery>,
    Extension(_user): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    let service = TimeSlotService::new(&state);
    let slots = service
        .list_available_time_slots(
            doctor_id,
            query.page.unwrap_or(1),
            query.limit.unwrap_or(10),
        )
        .await;

    Ok(Json(json!({
        "success": true,
        "data": slots
    })))
}

// ==============================================================================
// DOCTOR HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn update_schedule_type(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<UpdateScheduleTypeRequest>,
) -> Result<Json<Value>, AppError> {
    let doctor_id = require_doctor(&user)?;

    let service = DoctorService::new(&state);
    let doctor = service
        .update_schedule_type(doctor_id, request.schedule_type)
        .await;

    Ok(Json(json!({
        "success": true,
        "message": format!("Doctor schedule type updated to {}", doctor.schedule_type),
        "data": doctor
    })))
}

// ==============================================================================
// HELPERS
// ==============================================================================

fn require_doctor(user: &AuthUser) -> Result<Uuid, AppError> {
    if user.role != UserRole::Doctor {
        return Err(AppError::Auth(
            "Only doctors can manage schedules".to_string(),
        ));
    }
    Ok(user.id)
}

fn map_schedule_error(err: ScheduleError) -> AppError {
    match err {
        ScheduleError::AvailabilityNotFound | ScheduleError::TimeSlotNotFound => {
            AppError::NotFound(err.to_string())
        }
        ScheduleError::InvalidTimeFormat(_) | ScheduleError::Validation(_) => {
            AppError::BadRequest(err.to_string())
        }
        ScheduleError::DuplicateAvailability(_)
        | ScheduleError::SlotOverlap { .. }
        | ScheduleError::ActiveDependents(_)
        | ScheduleError::NotOwner => AppError::Conflict(err.to_string()),
    }
}
