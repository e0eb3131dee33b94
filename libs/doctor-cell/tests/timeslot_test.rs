use assert_matches::assert_matches;
use std::sync::Arc;
use uuid::Uuid;

use doctor_cell::models::{CreateTimeSlotRequest, ScheduleError, UpdateTimeSlotRequest};
use doctor_cell::services::{DoctorService, TimeSlotService};
use shared_models::domain::{AppointmentStatus, ScheduleType, Session, TimeSlotStatus};
use shared_utils::state::AppState;
use shared_utils::test_utils::{
    fixed_clock, seed_appointment, seed_availability, seed_doctor, seed_time_slot, test_state,
};

const NOW: &str = "2025-06-01T08:00:00Z";

async fn setup(schedule_type: ScheduleType) -> (Arc<AppState>, Uuid, Uuid) {
    let state = test_state(fixed_clock(NOW));
    let doctor_id = Uuid::new_v4();
    seed_doctor(&state, doctor_id, schedule_type).await;
    let availability_id = seed_availability(
        &state,
        doctor_id,
        "2025-06-10",
        Session::Morning,
        ("09:00", "12:00"),
        ("2025-06-01T09:00:00Z", "2025-06-09T18:00:00Z"),
    )
    .await;
    (state, doctor_id, availability_id)
}

fn slot_request(availability_id: Uuid, start: &str, end: &str) -> CreateTimeSlotRequest {
    CreateTimeSlotRequest {
        availability_id,
        start_time: start.to_string(),
        end_time: end.to_string(),
        max_patients: None,
    }
}

#[tokio::test]
async fn stream_doctors_always_get_single_patient_slots() {
    let (state, doctor_id, availability_id) = setup(ScheduleType::Stream).await;
    let service = TimeSlotService::new(&state);

    let mut request = slot_request(availability_id, "09:00", "09:30");
    request.max_patients = Some(5);

    let slot = service.create_time_slot(doctor_id, request).await.unwrap();
    assert_eq!(slot.max_patients, 1);
    assert_eq!(slot.status, TimeSlotStatus::Available);
    assert_eq!(slot.session, Session::Morning);
}

#[tokio::test]
async fn wave_doctors_must_state_a_capacity() {
    let (state, doctor_id, availability_id) = setup(ScheduleType::Wave).await;
    let service = TimeSlotService::new(&state);

    let err = service
        .create_time_slot(doctor_id, slot_request(availability_id, "09:00", "10:00"))
        .await
        .unwrap_err();
    assert_matches!(err, ScheduleError::Validation(_));

    let mut request = slot_request(availability_id, "09:00", "10:00");
    request.max_patients = Some(3);
    let slot = service.create_time_slot(doctor_id, request).await.unwrap();
    assert_eq!(slot.max_patients, 3);
}

#[tokio::test]
async fn rejects_slots_outside_the_consulting_window() {
    let (state, doctor_id, availability_id) = setup(ScheduleType::Stream).await;
    let service = TimeSlotService::new(&state);

    assert_matches!(
        service
            .create_time_slot(doctor_id, slot_request(availability_id, "08:30", "09:30"))
            .await,
        Err(ScheduleError::Validation(_))
    );
    assert_matches!(
        service
            .create_time_slot(doctor_id, slot_request(availability_id, "11:30", "12:30"))
            .await,
        Err(ScheduleError::Validation(_))
    );
    assert_matches!(
        service
            .create_time_slot(doctor_id, slot_request(availability_id, "10:00", "10:00"))
            .await,
        Err(ScheduleError::Validation(_))
    );
}

#[tokio::test]
async fn overlapping_slots_conflict_and_name_the_existing_slot() {
    let (state, doctor_id, availability_id) = setup(ScheduleType::Stream).await;
    let service = TimeSlotService::new(&state);

    service
        .create_time_slot(doctor_id, slot_request(availability_id, "09:00", "10:00"))
        .await
        .unwrap();

    let err = service
        .create_time_slot(doctor_id, slot_request(availability_id, "09:30", "10:30"))
        .await
        .unwrap_err();
    assert_matches!(
        err,
        ScheduleError::SlotOverlap { ref existing, .. } if existing == "09:00-10:00"
    );

    // Touching edges are not an overlap
    assert!(service
        .create_time_slot(doctor_id, slot_request(availability_id, "10:00", "11:00"))
        .await
        .is_ok());
}

#[tokio::test]
async fn unknown_or_foreign_availability_is_not_found() {
    let (state, doctor_id, _availability_id) = setup(ScheduleType::Stream).await;
    let service = TimeSlotService::new(&state);

    assert_matches!(
        service
            .create_time_slot(doctor_id, slot_request(Uuid::new_v4(), "09:00", "09:30"))
            .await,
        Err(ScheduleError::AvailabilityNotFound)
    );

    // Another doctor's window
    let other_doctor = Uuid::new_v4();
    seed_doctor(&state, other_doctor, ScheduleType::Stream).await;
    let foreign_availability = seed_availability(
        &state,
        other_doctor,
        "2025-06-10",
        Session::Evening,
        ("14:00", "18:00"),
        ("2025-06-01T09:00:00Z", "2025-06-09T18:00:00Z"),
    )
    .await;
    assert_matches!(
        service
            .create_time_slot(doctor_id, slot_request(foreign_availability, "14:00", "14:30"))
            .await,
        Err(ScheduleError::AvailabilityNotFound)
    );
}

#[tokio::test]
async fn update_revalidates_against_siblings_but_not_itself() {
    let (state, doctor_id, availability_id) = setup(ScheduleType::Stream).await;
    let service = TimeSlotService::new(&state);

    let first = service
        .create_time_slot(doctor_id, slot_request(availability_id, "09:00", "10:00"))
        .await
        .unwrap();
    service
        .create_time_slot(doctor_id, slot_request(availability_id, "10:00", "11:00"))
        .await
        .unwrap();

    // Shrinking within its own range is fine
    let updated = service
        .update_time_slot(
            doctor_id,
            first.timeslot_id,
            UpdateTimeSlotRequest {
                end_time: Some("09:45".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.end_time, "09:45");

    // Stretching into the sibling is not
    let err = service
        .update_time_slot(
            doctor_id,
            first.timeslot_id,
            UpdateTimeSlotRequest {
                end_time: Some("10:30".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ScheduleError::SlotOverlap { .. });
}

#[tokio::test]
async fn a_live_appointment_anywhere_in_the_availability_freezes_its_slots() {
    let (state, doctor_id, availability_id) = setup(ScheduleType::Stream).await;
    let service = TimeSlotService::new(&state);

    let target = seed_time_slot(&state, availability_id, "09:00", "09:30", 1).await;
    let sibling = seed_time_slot(&state, availability_id, "10:00", "10:30", 1).await;
    seed_appointment(&state, Uuid::new_v4(), sibling, AppointmentStatus::Scheduled).await;

    // The booked appointment sits on the sibling, yet the whole layout is frozen
    let err = service
        .update_time_slot(
            doctor_id,
            target,
            UpdateTimeSlotRequest {
                start_time: Some("09:15".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ScheduleError::ActiveDependents(_));

    let err = service.soft_delete_time_slot(doctor_id, target).await.unwrap_err();
    assert_matches!(err, ScheduleError::ActiveDependents(_));
}

#[tokio::test]
async fn deleting_a_slot_without_live_appointments_succeeds() {
    let (state, doctor_id, availability_id) = setup(ScheduleType::Stream).await;
    let service = TimeSlotService::new(&state);

    let timeslot_id = seed_time_slot(&state, availability_id, "09:00", "09:30", 1).await;
    seed_appointment(&state, Uuid::new_v4(), timeslot_id, AppointmentStatus::Cancelled).await;

    service.soft_delete_time_slot(doctor_id, timeslot_id).await.unwrap();
    assert_matches!(
        service.soft_delete_time_slot(doctor_id, timeslot_id).await,
        Err(ScheduleError::TimeSlotNotFound)
    );
}

#[tokio::test]
async fn available_listing_pages_in_schedule_order() {
    let (state, doctor_id, availability_id) = setup(ScheduleType::Stream).await;
    let service = TimeSlotService::new(&state);

    let evening = seed_availability(
        &state,
        doctor_id,
        "2025-06-10",
        Session::Evening,
        ("14:00", "18:00"),
        ("2025-06-01T09:00:00Z", "2025-06-09T18:00:00Z"),
    )
    .await;

    let late = seed_time_slot(&state, evening, "14:00", "14:30", 1).await;
    seed_time_slot(&state, availability_id, "10:00", "10:30", 1).await;
    seed_time_slot(&state, availability_id, "09:00", "09:30", 1).await;

    // Booked and deleted slots never show up
    seed_appointment(&state, Uuid::new_v4(), late, AppointmentStatus::Scheduled).await;
    {
        let mut tables = state.store.write().await;
        if let Some(slot) = tables.time_slots.get_mut(&late) {
            slot.status = TimeSlotStatus::Booked;
        }
    }

    let page = service.list_available_time_slots(doctor_id, 1, 10).await;
    assert_eq!(page.total, 2);
    let starts: Vec<_> = page.slots.iter().map(|s| s.start_time.clone()).collect();
    assert_eq!(starts, vec!["09:00", "10:00"]);

    let second_page = service.list_available_time_slots(doctor_id, 2, 1).await;
    assert_eq!(second_page.total, 2);
    assert_eq!(second_page.slots.len(), 1);
    assert_eq!(second_page.slots[0].start_time, "10:00");
}

#[tokio::test]
async fn schedule_type_update_upserts_the_doctor() {
    let state = test_state(fixed_clock(NOW));
    let service = DoctorService::new(&state);
    let doctor_id = Uuid::new_v4();

    let doctor = service.update_schedule_type(doctor_id, ScheduleType::Wave).await;
    assert_eq!(doctor.schedule_type, ScheduleType::Wave);

    let doctor = service.update_schedule_type(doctor_id, ScheduleType::Stream).await;
    assert_eq!(doctor.schedule_type, ScheduleType::Stream);
}
