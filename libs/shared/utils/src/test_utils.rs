//! Shared fixtures for cell tests: a state wired to a frozen clock plus
//! row seeders for scenarios the public operations cannot produce on
//! their own (e.g. completed appointments).

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::domain::{
    Appointment, AppointmentStatus, Availability, Doctor, ScheduleType, Session, TimeSlot,
    TimeSlotStatus,
};

use crate::clock::FixedClock;
use crate::state::AppState;
use crate::timecalc;

pub fn ts(rfc3339: &str) -> DateTime<Utc> {
    rfc3339
        .parse()
        .unwrap_or_else(|_| panic!("bad test timestamp {rfc3339}"))
}

pub fn date(ymd: &str) -> NaiveDate {
    ymd.parse().unwrap_or_else(|_| panic!("bad test date {ymd}"))
}

pub fn fixed_clock(now: &str) -> Arc<FixedClock> {
    Arc::new(FixedClock::at(ts(now)))
}

pub fn test_state(clock: Arc<FixedClock>) -> Arc<AppState> {
    AppState::with_clock(AppConfig::default(), clock)
}

pub async fn seed_doctor(state: &AppState, doctor_id: Uuid, schedule_type: ScheduleType) {
    let now = state.clock.now();
    let mut tables = state.store.write().await;
    tables.doctors.insert(
        doctor_id,
        Doctor {
            doctor_id,
            schedule_type,
            created_at: now,
            updated_at: now,
        },
    );
}

#[allow(clippy::too_many_arguments)]
pub async fn seed_availability(
    state: &AppState,
    doctor_id: Uuid,
    on: &str,
    session: Session,
    consulting: (&str, &str),
    booking: (&str, &str),
) -> Uuid {
    let now = state.clock.now();
    let availability_id = Uuid::new_v4();
    let mut tables = state.store.write().await;
    tables.availabilities.insert(
        availability_id,
        Availability {
            availability_id,
            doctor_id,
            date: date(on),
            session,
            consulting_start: timecalc::parse_time(consulting.0).expect("consulting start"),
            consulting_end: timecalc::parse_time(consulting.1).expect("consulting end"),
            booking_start_at: ts(booking.0),
            booking_end_at: ts(booking.1),
            is_deleted: false,
            created_at: now,
            updated_at: now,
        },
    );
    availability_id
}

pub async fn seed_time_slot(
    state: &AppState,
    availability_id: Uuid,
    start: &str,
    end: &str,
    max_patients: u32,
) -> Uuid {
    let now = state.clock.now();
    let timeslot_id = Uuid::new_v4();
    let mut tables = state.store.write().await;
    let availability = tables
        .availabilities
        .get(&availability_id)
        .expect("seed slot against a seeded availability")
        .clone();
    tables.time_slots.insert(
        timeslot_id,
        TimeSlot {
            timeslot_id,
            availability_id,
            doctor_id: availability.doctor_id,
            date: availability.date,
            session: availability.session,
            start_time: timecalc::parse_time(start).expect("slot start"),
            end_time: timecalc::parse_time(end).expect("slot end"),
            max_patients,
            status: TimeSlotStatus::Available,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        },
    );
    timeslot_id
}

pub async fn seed_appointment(
    state: &AppState,
    patient_id: Uuid,
    timeslot_id: Uuid,
    status: AppointmentStatus,
) -> Uuid {
    let now = state.clock.now();
    let appointment_id = Uuid::new_v4();
    let mut tables = state.store.write().await;
    let slot = tables
        .time_slots
        .get(&timeslot_id)
        .expect("seed appointment against a seeded slot")
        .clone();
    tables.appointments.insert(
        appointment_id,
        Appointment {
            appointment_id,
            patient_id,
            doctor_id: slot.doctor_id,
            timeslot_id,
            status,
            scheduled_on: now,
            reporting_time: slot.start_time,
            reason: None,
            notes: None,
        },
    );
    appointment_id
}
