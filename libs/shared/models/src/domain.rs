use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ==============================================================================
// SCHEDULING ENUMS
// ==============================================================================

/// How a doctor runs their consultations: one patient per slot, or a wave of
/// patients sharing a slot with staggered check-in times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleType {
    Stream,
    Wave,
}

impl fmt::Display for ScheduleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleType::Stream => write!(f, "stream"),
            ScheduleType::Wave => write!(f, "wave"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Session {
    Morning,
    Evening,
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Session::Morning => write!(f, "morning"),
            Session::Evening => write!(f, "evening"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeSlotStatus {
    Available,
    Booked,
}

impl fmt::Display for TimeSlotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeSlotStatus::Available => write!(f, "available"),
            TimeSlotStatus::Booked => write!(f, "booked"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Cancelled,
    Completed,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
            AppointmentStatus::Completed => write!(f, "completed"),
        }
    }
}

/// Weekday selector for recurring availabilities. Kept separate from
/// `chrono::Weekday` so the wire format stays under our control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayOfWeek {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl DayOfWeek {
    pub fn to_chrono(self) -> Weekday {
        match self {
            DayOfWeek::Sunday => Weekday::Sun,
            DayOfWeek::Monday => Weekday::Mon,
            DayOfWeek::Tuesday => Weekday::Tue,
            DayOfWeek::Wednesday => Weekday::Wed,
            DayOfWeek::Thursday => Weekday::Thu,
            DayOfWeek::Friday => Weekday::Fri,
            DayOfWeek::Saturday => Weekday::Sat,
        }
    }
}

// ==============================================================================
// ENTITIES
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub doctor_id: Uuid,
    pub schedule_type: ScheduleType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One doctor's consulting window for one concrete date and session.
/// Weekday-recurring requests are expanded into one row per resolved date
/// at creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Availability {
    pub availability_id: Uuid,
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    pub session: Session,
    pub consulting_start: NaiveTime,
    pub consulting_end: NaiveTime,
    pub booking_start_at: DateTime<Utc>,
    pub booking_end_at: DateTime<Utc>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSlot {
    pub timeslot_id: Uuid,
    pub availability_id: Uuid,
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    pub session: Session,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub max_patients: u32,
    pub status: TimeSlotStatus,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TimeSlot {
    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub appointment_id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub timeslot_id: Uuid,
    pub status: AppointmentStatus,
    pub scheduled_on: DateTime<Utc>,
    /// Check-in time assigned at booking; the only thing a batch
    /// reschedule moves.
    pub reporting_time: NaiveTime,
    pub reason: Option<String>,
    pub notes: Option<String>,
}

impl Appointment {
    /// Live appointments count against slot capacity and block
    /// destructive schedule edits.
    pub fn is_live(&self) -> bool {
        self.status == AppointmentStatus::Scheduled
    }
}
