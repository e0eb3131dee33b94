// libs/doctor-cell/src/models.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::domain::{DayOfWeek, ScheduleType, Session, TimeSlotStatus};
use shared_utils::timecalc::TimeError;

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAvailabilityRequest {
    /// Concrete consulting date. When present, `weekdays` is ignored.
    pub date: Option<NaiveDate>,
    /// Recurring pattern, expanded over the configured horizon.
    pub weekdays: Option<Vec<DayOfWeek>>,
    pub session: Session,
    pub consulting_start_time: String,
    pub consulting_end_time: String,
    pub booking_start_date: NaiveDate,
    pub booking_start_time: String,
    pub booking_end_date: NaiveDate,
    pub booking_end_time: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAvailabilityRequest {
    pub date: Option<NaiveDate>,
    pub session: Option<Session>,
    pub consulting_start_time: Option<String>,
    pub consulting_end_time: Option<String>,
    pub booking_start_date: Option<NaiveDate>,
    pub booking_start_time: Option<String>,
    pub booking_end_date: Option<NaiveDate>,
    pub booking_end_time: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTimeSlotRequest {
    pub availability_id: Uuid,
    pub start_time: String,
    pub end_time: String,
    /// Required for wave doctors, ignored for stream doctors.
    pub max_patients: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTimeSlotRequest {
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub max_patients: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateScheduleTypeRequest {
    pub schedule_type: ScheduleType,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AvailableSlotsQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

// ==============================================================================
// RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityView {
    pub availability_id: Uuid,
    pub date: NaiveDate,
    pub session: Session,
    pub consulting_start_time: String,
    pub consulting_end_time: String,
    pub booking_start_at: String,
    pub booking_end_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAvailabilityResponse {
    pub created: Vec<AvailabilityView>,
    /// Dates that already had an identical non-deleted window and were
    /// skipped (partial success is not an error).
    pub skipped_dates: Vec<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSlotView {
    pub timeslot_id: Uuid,
    pub availability_id: Uuid,
    pub date: NaiveDate,
    pub session: Session,
    pub start_time: String,
    pub end_time: String,
    pub max_patients: u32,
    pub status: TimeSlotStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailableSlotsPage {
    pub total: usize,
    pub page: u32,
    pub limit: u32,
    pub slots: Vec<TimeSlotView>,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum ScheduleError {
    #[error("Availability not found")]
    AvailabilityNotFound,

    #[error("Time slot not found")]
    TimeSlotNotFound,

    #[error("Invalid time format: {0}")]
    InvalidTimeFormat(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Availability already exists for the requested date(s): {0}")]
    DuplicateAvailability(String),

    #[error("Time slot ({requested}) overlaps with existing time slot ({existing})")]
    SlotOverlap { requested: String, existing: String },

    #[error("{0}")]
    ActiveDependents(String),

    #[error("You are not allowed to modify this availability")]
    NotOwner,
}

impl From<TimeError> for ScheduleError {
    fn from(err: TimeError) -> Self {
        match err {
            TimeError::InvalidTimeFormat(raw) => ScheduleError::InvalidTimeFormat(raw),
        }
    }
}
