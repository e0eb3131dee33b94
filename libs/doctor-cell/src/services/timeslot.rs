// libs/doctor-cell/src/services/timeslot.rs
use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use shared_models::domain::{ScheduleType, Session, TimeSlot, TimeSlotStatus};
use shared_store::ClinicStore;
use shared_utils::clock::Clock;
use shared_utils::state::AppState;
use shared_utils::timecalc;

use crate::models::{
    AvailableSlotsPage, CreateTimeSlotRequest, ScheduleError, TimeSlotView, UpdateTimeSlotRequest,
};
use crate::services::doctor::ensure_doctor;

pub struct TimeSlotService {
    store: Arc<ClinicStore>,
    clock: Arc<dyn Clock>,
}

impl TimeSlotService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
            clock: state.clock.clone(),
        }
    }

    /// Carve a bookable slot out of an availability window. Capacity comes
    /// from the doctor's scheduling mode: stream slots always hold one
    /// patient, wave slots hold the requested number.
    pub async fn create_time_slot(
        &self,
        doctor_id: Uuid,
        request: CreateTimeSlotRequest,
    ) -> Result<TimeSlotView, ScheduleError> {
        debug!(
            "Creating time slot in availability {} for doctor {}",
            request.availability_id, doctor_id
        );

        let now = self.clock.now();
        let start = timecalc::parse_time(&request.start_time)?;
        let end = timecalc::parse_time(&request.end_time)?;

        let mut tables = self.store.write().await;
        let schedule_type = ensure_doctor(&mut tables, doctor_id, now);

        let availability = tables
            .availability(request.availability_id)
            .filter(|a| a.doctor_id == doctor_id)
            .cloned()
            .ok_or(ScheduleError::AvailabilityNotFound)?;

        validate_slot_window(
            start,
            end,
            availability.consulting_start,
            availability.consulting_end,
        )?;

        let max_patients = match schedule_type {
            ScheduleType::Wave => {
                let requested = request.max_patients.ok_or_else(|| {
                    ScheduleError::Validation(
                        "max_patients is required for wave scheduling".to_string(),
                    )
                })?;
                if requested == 0 {
                    return Err(ScheduleError::Validation(
                        "max_patients must be at least 1".to_string(),
                    ));
                }
                requested
            }
            ScheduleType::Stream => 1,
        };

        check_no_overlap(
            tables.slots_of(availability.availability_id),
            None,
            start,
            end,
        )?;

        let slot = TimeSlot {
            timeslot_id: Uuid::new_v4(),
            availability_id: availability.availability_id,
            doctor_id,
            date: availability.date,
            session: availability.session,
            start_time: start,
            end_time: end,
            max_patients,
            status: TimeSlotStatus::Available,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        };
        let view = time_slot_view(&slot);
        tables.time_slots.insert(slot.timeslot_id, slot);

        info!("Time slot {} created", view.timeslot_id);
        Ok(view)
    }

    /// Partial update. Blocked while any slot of the same availability has a
    /// live appointment; shifting one slot would invalidate the check-in
    /// math of its siblings.
    pub async fn update_time_slot(
        &self,
        doctor_id: Uuid,
        timeslot_id: Uuid,
        request: UpdateTimeSlotRequest,
    ) -> Result<TimeSlotView, ScheduleError> {
        debug!("Updating time slot {}", timeslot_id);

        let now = self.clock.now();
        let mut tables = self.store.write().await;

        let slot = tables
            .time_slot(timeslot_id)
            .filter(|s| s.doctor_id == doctor_id)
            .cloned()
            .ok_or(ScheduleError::TimeSlotNotFound)?;

        if tables.availability_has_live_appointments(slot.availability_id) {
            return Err(ScheduleError::ActiveDependents(
                "Cannot update a time slot of an availability with booked appointments".to_string(),
            ));
        }

        let availability = tables
            .availability(slot.availability_id)
            .cloned()
            .ok_or(ScheduleError::AvailabilityNotFound)?;

        let start = match &request.start_time {
            Some(t) => timecalc::parse_time(t)?,
            None => slot.start_time,
        };
        let end = match &request.end_time {
            Some(t) => timecalc::parse_time(t)?,
            None => slot.end_time,
        };
        validate_slot_window(
            start,
            end,
            availability.consulting_start,
            availability.consulting_end,
        )?;

        let schedule_type = tables
            .doctors
            .get(&doctor_id)
            .map_or(ScheduleType::Stream, |d| d.schedule_type);
        let max_patients = match schedule_type {
            ScheduleType::Wave => {
                let requested = request.max_patients.unwrap_or(slot.max_patients);
                if requested == 0 {
                    return Err(ScheduleError::Validation(
                        "max_patients must be at least 1".to_string(),
                    ));
                }
                requested
            }
            ScheduleType::Stream => 1,
        };

        check_no_overlap(
            tables.slots_of(slot.availability_id),
            Some(timeslot_id),
            start,
            end,
        )?;

        let Some(entry) = tables.time_slots.get_mut(&timeslot_id) else {
            return Err(ScheduleError::TimeSlotNotFound);
        };
        entry.start_time = start;
        entry.end_time = end;
        entry.max_patients = max_patients;
        entry.updated_at = now;

        Ok(time_slot_view(entry))
    }

    /// Soft delete, under the same sibling-appointment guard as update.
    pub async fn soft_delete_time_slot(
        &self,
        doctor_id: Uuid,
        timeslot_id: Uuid,
    ) -> Result<Uuid, ScheduleError> {
        debug!("Deleting time slot {}", timeslot_id);

        let now = self.clock.now();
        let mut tables = self.store.write().await;

        let slot = tables
            .time_slot(timeslot_id)
            .filter(|s| s.doctor_id == doctor_id)
            .cloned()
            .ok_or(ScheduleError::TimeSlotNotFound)?;

        if tables.availability_has_live_appointments(slot.availability_id) {
            return Err(ScheduleError::ActiveDependents(
                "Cannot delete a time slot of an availability with booked appointments".to_string(),
            ));
        }

        if let Some(entry) = tables.time_slots.get_mut(&timeslot_id) {
            entry.is_deleted = true;
            entry.updated_at = now;
        }

        info!("Time slot {} deleted", timeslot_id);
        Ok(timeslot_id)
    }

    /// Open slots of a doctor, ordered by date, session and start time.
    pub async fn list_available_time_slots(
        &self,
        doctor_id: Uuid,
        page: u32,
        limit: u32,
    ) -> AvailableSlotsPage {
        let page = page.max(1);
        let limit = limit.clamp(1, 100);

        let tables = self.store.read().await;

        let mut slots: Vec<TimeSlot> = tables
            .time_slots
            .values()
            .filter(|s| {
                s.doctor_id == doctor_id && !s.is_deleted && s.status == TimeSlotStatus::Available
            })
            .cloned()
            .collect();
        slots.sort_by_key(|s| (s.date, session_rank(s.session), s.start_time));

        let total = slots.len();
        let slots = slots
            .into_iter()
            .skip(((page - 1) * limit) as usize)
            .take(limit as usize)
            .map(|s| time_slot_view(&s))
            .collect();

        AvailableSlotsPage {
            total,
            page,
            limit,
            slots,
        }
    }
}

fn validate_slot_window(
    start: chrono::NaiveTime,
    end: chrono::NaiveTime,
    consulting_start: chrono::NaiveTime,
    consulting_end: chrono::NaiveTime,
) -> Result<(), ScheduleError> {
    if start >= end {
        return Err(ScheduleError::Validation(
            "Start time must be before end time".to_string(),
        ));
    }
    if start < consulting_start || end > consulting_end {
        return Err(ScheduleError::Validation(
            "Time slot must lie within the consulting window".to_string(),
        ));
    }
    Ok(())
}

/// Overlap check against sibling slots, naming the first conflict found.
fn check_no_overlap(
    siblings: Vec<&TimeSlot>,
    exclude: Option<Uuid>,
    start: chrono::NaiveTime,
    end: chrono::NaiveTime,
) -> Result<(), ScheduleError> {
    let conflicting = siblings.into_iter().find(|s| {
        Some(s.timeslot_id) != exclude && timecalc::ranges_overlap(start, end, s.start_time, s.end_time)
    });

    match conflicting {
        Some(existing) => Err(ScheduleError::SlotOverlap {
            requested: render_range(start, end),
            existing: render_range(existing.start_time, existing.end_time),
        }),
        None => Ok(()),
    }
}

fn render_range(start: chrono::NaiveTime, end: chrono::NaiveTime) -> String {
    format!(
        "{}-{}",
        timecalc::format_minutes(timecalc::minutes_of(start)),
        timecalc::format_minutes(timecalc::minutes_of(end))
    )
}

pub(crate) fn session_rank(session: Session) -> u8 {
    match session {
        Session::Morning => 0,
        Session::Evening => 1,
    }
}

pub(crate) fn time_slot_view(slot: &TimeSlot) -> TimeSlotView {
    TimeSlotView {
        timeslot_id: slot.timeslot_id,
        availability_id: slot.availability_id,
        date: slot.date,
        session: slot.session,
        start_time: timecalc::format_minutes(timecalc::minutes_of(slot.start_time)),
        end_time: timecalc::format_minutes(timecalc::minutes_of(slot.end_time)),
        max_patients: slot.max_patients,
        status: slot.status,
    }
}
