use std::sync::Arc;

use uuid::Uuid;

use appointment_cell::models::BookAppointmentRequest;
use appointment_cell::services::{AppointmentViewService, BookingService};
use shared_models::auth::{AuthUser, UserRole};
use shared_models::domain::{AppointmentStatus, ScheduleType, Session};
use shared_utils::state::AppState;
use shared_utils::test_utils::{
    fixed_clock, seed_appointment, seed_availability, seed_doctor, seed_time_slot, test_state, ts,
};

const NOW: &str = "2025-06-01T08:00:00Z";
const BOOKING_WINDOW: (&str, &str) = ("2025-05-25T09:00:00Z", "2025-06-01T09:00:00Z");

async fn doctor_with_slot(state: &Arc<AppState>, start: &str, end: &str) -> (Uuid, Uuid) {
    let doctor_id = Uuid::new_v4();
    seed_doctor(state, doctor_id, ScheduleType::Stream).await;
    let availability_id = seed_availability(
        state,
        doctor_id,
        "2025-06-01",
        Session::Morning,
        ("09:00", "12:00"),
        BOOKING_WINDOW,
    )
    .await;
    let timeslot_id = seed_time_slot(state, availability_id, start, end, 1).await;
    (doctor_id, timeslot_id)
}

#[tokio::test]
async fn rows_embed_the_counterpart_only() {
    let clock = fixed_clock(NOW);
    let state = test_state(clock);
    let (doctor_id, timeslot_id) = doctor_with_slot(&state, "09:00", "09:30").await;

    let patient_id = Uuid::new_v4();
    BookingService::new(&state)
        .book(
            patient_id,
            BookAppointmentRequest {
                doctor_id,
                timeslot_id,
                reason: Some("Follow-up".to_string()),
                notes: None,
            },
        )
        .await
        .unwrap();

    let view = AppointmentViewService::new(&state);

    let patient_rows = view
        .list_appointments(
            &AuthUser {
                id: patient_id,
                role: UserRole::Patient,
            },
            None,
        )
        .await;
    assert_eq!(patient_rows.len(), 1);
    assert_eq!(patient_rows[0].doctor_id, Some(doctor_id));
    assert_eq!(patient_rows[0].patient_id, None);
    assert_eq!(patient_rows[0].session, Session::Morning);
    assert_eq!(patient_rows[0].reporting_time, "09:00");

    let doctor_rows = view
        .list_appointments(
            &AuthUser {
                id: doctor_id,
                role: UserRole::Doctor,
            },
            None,
        )
        .await;
    assert_eq!(doctor_rows.len(), 1);
    assert_eq!(doctor_rows[0].patient_id, Some(patient_id));
    assert_eq!(doctor_rows[0].doctor_id, None);

    // A stranger sees nothing
    let stranger_rows = view
        .list_appointments(
            &AuthUser {
                id: Uuid::new_v4(),
                role: UserRole::Patient,
            },
            None,
        )
        .await;
    assert!(stranger_rows.is_empty());
}

#[tokio::test]
async fn scheduled_listings_read_soonest_booked_first() {
    let clock = fixed_clock(NOW);
    let state = test_state(clock.clone());
    let patient_id = Uuid::new_v4();
    let booking = BookingService::new(&state);

    // Three bookings with distinct doctors, spaced a minute apart
    let mut order = Vec::new();
    for (minute, slot_range) in [(10u32, ("09:00", "09:30")), (11, ("09:30", "10:00")), (12, ("10:00", "10:30"))] {
        clock.set(ts(&format!("2025-06-01T08:{minute}:00Z")));
        let (doctor_id, timeslot_id) = doctor_with_slot(&state, slot_range.0, slot_range.1).await;
        let booked = booking
            .book(
                patient_id,
                BookAppointmentRequest {
                    doctor_id,
                    timeslot_id,
                    reason: None,
                    notes: None,
                },
            )
            .await
            .unwrap();
        order.push(booked.appointment_id);
    }

    let view = AppointmentViewService::new(&state);
    let caller = AuthUser {
        id: patient_id,
        role: UserRole::Patient,
    };

    let upcoming = view
        .list_appointments(&caller, Some(AppointmentStatus::Scheduled))
        .await;
    let upcoming_ids: Vec<_> = upcoming.iter().map(|r| r.appointment_id).collect();
    assert_eq!(upcoming_ids, order);

    // The unfiltered listing is newest first
    let all = view.list_appointments(&caller, None).await;
    let all_ids: Vec<_> = all.iter().map(|r| r.appointment_id).collect();
    let mut reversed = order.clone();
    reversed.reverse();
    assert_eq!(all_ids, reversed);
}

#[tokio::test]
async fn status_filter_narrows_the_listing() {
    let clock = fixed_clock(NOW);
    let state = test_state(clock);
    let (doctor_id, timeslot_id) = doctor_with_slot(&state, "09:00", "09:30").await;
    let other_availability = seed_availability(
        &state,
        doctor_id,
        "2025-06-01",
        Session::Evening,
        ("14:00", "18:00"),
        BOOKING_WINDOW,
    )
    .await;
    let evening_slot = seed_time_slot(&state, other_availability, "14:00", "14:30", 1).await;

    let patient_id = Uuid::new_v4();
    seed_appointment(&state, patient_id, timeslot_id, AppointmentStatus::Completed).await;
    seed_appointment(&state, patient_id, evening_slot, AppointmentStatus::Scheduled).await;

    let view = AppointmentViewService::new(&state);
    let caller = AuthUser {
        id: patient_id,
        role: UserRole::Patient,
    };

    let completed = view
        .list_appointments(&caller, Some(AppointmentStatus::Completed))
        .await;
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].status, AppointmentStatus::Completed);

    let cancelled = view
        .list_appointments(&caller, Some(AppointmentStatus::Cancelled))
        .await;
    assert!(cancelled.is_empty());

    assert_eq!(view.list_appointments(&caller, None).await.len(), 2);
}
