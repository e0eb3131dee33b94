// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::auth::{AuthUser, UserRole};
use shared_models::domain::AppointmentStatus;
use shared_models::error::AppError;
use shared_utils::state::AppState;

use crate::models::{
    AppointmentListQuery, BookAppointmentRequest, BookingError, RescheduleAppointmentsRequest,
};
use crate::services::{AppointmentViewService, BookingService};

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    if user.role != UserRole::Patient {
        return Err(AppError::Auth(
            "Only patients can book appointments".to_string(),
        ));
    }

    let service = BookingService::new(&state);
    let appointment = service
        .book(user.id, request)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!({
        "success": true,
        "message": "Appointment booked successfully",
        "data": appointment
    })))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<AppState>>,
    Path(appointment_id): Path<Uuid>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);
    service
        .cancel(appointment_id, user.id, user.role)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!({
        "success": true,
        "message": "Appointment cancelled successfully"
    })))
}

#[axum::debug_handler]
pub async fn reschedule_appointments(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<RescheduleAppointmentsRequest>,
) -> Result<Json<Value>, AppError> {
    if user.role != UserRole::Doctor {
        return Err(AppError::Auth(
            "Only doctors can reschedule their appointments".to_string(),
        ));
    }

    let service = BookingService::new(&state);
    let response = service
        .reschedule(user.id, request)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!({
        "success": true,
        "message": "Appointments rescheduled successfully",
        "data": response
    })))
}

#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AppointmentListQuery>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentViewService::new(&state);
    let appointments = service.list_appointments(&user, query.status).await;

    let message = match query.status {
        Some(AppointmentStatus::Scheduled) => "Your upcoming appointments",
        Some(AppointmentStatus::Completed) => "Your completed appointments",
        Some(AppointmentStatus::Cancelled) => "Your cancelled appointments",
        None => "Your appointments",
    };

    Ok(Json(json!({
        "success": true,
        "message": message,
        "total": appointments.len(),
        "data": appointments
    })))
}

fn map_booking_error(err: BookingError) -> AppError {
    match err {
        BookingError::TimeSlotNotFound
        | BookingError::AppointmentNotFound
        | BookingError::NoAppointmentsSelected => AppError::NotFound(err.to_string()),
        BookingError::DoctorMismatch => AppError::BadRequest(err.to_string()),
        BookingError::SlotUnavailable
        | BookingError::BookingWindowNotOpen
        | BookingError::BookingWindowClosed
        | BookingError::DuplicateSessionBooking
        | BookingError::SlotFull
        | BookingError::NotParticipant
        | BookingError::AlreadyConcluded
        | BookingError::ConsultationStarted
        | BookingError::ShiftOutOfWindow(_)
        | BookingError::ShiftOverlapsSlot(_) => AppError::Conflict(err.to_string()),
    }
}
