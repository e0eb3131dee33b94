// libs/appointment-cell/src/models.rs
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::domain::{AppointmentStatus, Session};

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub doctor_id: Uuid,
    pub timeslot_id: Uuid,
    pub reason: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftDirection {
    Earlier,
    Later,
}

/// Batch shift of a doctor's same-day schedule. Selects all of today's
/// scheduled appointments, or the listed subset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleAppointmentsRequest {
    pub appointment_ids: Option<Vec<Uuid>>,
    pub shift_minutes: u32,
    pub direction: ShiftDirection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppointmentListQuery {
    pub status: Option<AppointmentStatus>,
}

// ==============================================================================
// RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookedAppointment {
    pub appointment_id: Uuid,
    pub doctor_id: Uuid,
    pub timeslot_id: Uuid,
    pub status: AppointmentStatus,
    pub scheduled_on: DateTime<Utc>,
    pub reporting_time: String,
    pub date: NaiveDate,
    pub session: Session,
    pub start_time: String,
    pub end_time: String,
    pub reason: Option<String>,
    pub notes: Option<String>,
}

/// One listing row, shaped for the caller: patients see the doctor's
/// identity, doctors see the patient's, nobody sees their own echoed back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentListItem {
    pub appointment_id: Uuid,
    pub status: AppointmentStatus,
    pub scheduled_on: DateTime<Utc>,
    pub reporting_time: String,
    pub date: NaiveDate,
    pub session: Session,
    pub start_time: String,
    pub end_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<Uuid>,
    pub reason: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduledAppointment {
    pub appointment_id: Uuid,
    pub patient_id: Uuid,
    pub reporting_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleResponse {
    pub rescheduled: Vec<RescheduledAppointment>,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BookingError {
    #[error("Time slot not found")]
    TimeSlotNotFound,

    #[error("Appointment not found")]
    AppointmentNotFound,

    #[error("No appointments found")]
    NoAppointmentsSelected,

    #[error("Time slot is no longer available")]
    SlotUnavailable,

    #[error("Booking window not opened yet")]
    BookingWindowNotOpen,

    #[error("Booking window closed")]
    BookingWindowClosed,

    #[error("Time slot does not belong to this doctor")]
    DoctorMismatch,

    #[error("You already have an appointment with this doctor in this session")]
    DuplicateSessionBooking,

    #[error("This time slot is already full")]
    SlotFull,

    #[error("You can only cancel your own appointments")]
    NotParticipant,

    #[error("Appointment already cancelled or completed")]
    AlreadyConcluded,

    #[error("You can only cancel appointments before the consultation starts")]
    ConsultationStarted,

    #[error("Shifted time for appointment {0} falls outside the consulting window")]
    ShiftOutOfWindow(Uuid),

    #[error("Shifted time for appointment {0} lands inside another time slot")]
    ShiftOverlapsSlot(Uuid),
}
