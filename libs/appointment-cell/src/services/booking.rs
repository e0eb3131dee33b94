// libs/appointment-cell/src/services/booking.rs
use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveTime;
use tracing::{debug, info};
use uuid::Uuid;

use shared_models::auth::UserRole;
use shared_models::domain::{Appointment, AppointmentStatus, TimeSlot, TimeSlotStatus};
use shared_store::ClinicStore;
use shared_utils::clock::Clock;
use shared_utils::state::AppState;
use shared_utils::timecalc;

use crate::models::{
    BookAppointmentRequest, BookedAppointment, BookingError, RescheduleAppointmentsRequest,
    RescheduleResponse, RescheduledAppointment, ShiftDirection,
};

pub struct BookingService {
    store: Arc<ClinicStore>,
    clock: Arc<dyn Clock>,
}

impl BookingService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
            clock: state.clock.clone(),
        }
    }

    /// Book a seat in a time slot. The whole sequence from eligibility
    /// checks through the capacity count, insert and status flip runs under
    /// one store write guard, so two concurrent bookers for the last seat
    /// cannot both succeed.
    pub async fn book(
        &self,
        patient_id: Uuid,
        request: BookAppointmentRequest,
    ) -> Result<BookedAppointment, BookingError> {
        debug!(
            "Booking time slot {} for patient {}",
            request.timeslot_id, patient_id
        );

        let now = self.clock.now();
        let mut tables = self.store.write().await;

        let slot = tables
            .time_slot(request.timeslot_id)
            .cloned()
            .ok_or(BookingError::TimeSlotNotFound)?;
        let availability = tables
            .availability(slot.availability_id)
            .cloned()
            .ok_or(BookingError::TimeSlotNotFound)?;

        if slot.status != TimeSlotStatus::Available {
            return Err(BookingError::SlotUnavailable);
        }
        if now < availability.booking_start_at {
            return Err(BookingError::BookingWindowNotOpen);
        }
        if now > availability.booking_end_at {
            return Err(BookingError::BookingWindowClosed);
        }
        if slot.doctor_id != request.doctor_id {
            return Err(BookingError::DoctorMismatch);
        }
        if tables.has_scheduled_in_session(patient_id, slot.doctor_id, slot.date, slot.session) {
            return Err(BookingError::DuplicateSessionBooking);
        }

        let live = tables.live_count_for_slot(slot.timeslot_id);
        if live >= slot.max_patients {
            return Err(BookingError::SlotFull);
        }

        let reporting_time = reporting_time(&slot, live);

        let appointment = Appointment {
            appointment_id: Uuid::new_v4(),
            patient_id,
            doctor_id: slot.doctor_id,
            timeslot_id: slot.timeslot_id,
            status: AppointmentStatus::Scheduled,
            scheduled_on: now,
            reporting_time,
            reason: request.reason,
            notes: request.notes,
        };
        let booked = booked_view(&appointment, &slot);
        tables
            .appointments
            .insert(appointment.appointment_id, appointment);

        if live + 1 == slot.max_patients {
            if let Some(entry) = tables.time_slots.get_mut(&slot.timeslot_id) {
                entry.status = TimeSlotStatus::Booked;
                entry.updated_at = now;
            }
        }

        info!(
            "Appointment {} booked (seat {}/{})",
            booked.appointment_id,
            live + 1,
            slot.max_patients
        );
        Ok(booked)
    }

    /// Cancel a scheduled appointment, strictly before the consultation
    /// starts. A seat freed from a full slot reopens it.
    pub async fn cancel(
        &self,
        appointment_id: Uuid,
        caller_id: Uuid,
        caller_role: UserRole,
    ) -> Result<(), BookingError> {
        debug!("Cancelling appointment {}", appointment_id);

        let now = self.clock.now();
        let mut tables = self.store.write().await;

        let appointment = tables
            .appointments
            .get(&appointment_id)
            .cloned()
            .ok_or(BookingError::AppointmentNotFound)?;

        let is_participant = match caller_role {
            UserRole::Patient => appointment.patient_id == caller_id,
            UserRole::Doctor => appointment.doctor_id == caller_id,
        };
        if !is_participant {
            return Err(BookingError::NotParticipant);
        }

        if appointment.status != AppointmentStatus::Scheduled {
            return Err(BookingError::AlreadyConcluded);
        }

        let slot = tables
            .time_slots
            .get(&appointment.timeslot_id)
            .cloned()
            .ok_or(BookingError::TimeSlotNotFound)?;
        let availability = tables
            .availabilities
            .get(&slot.availability_id)
            .cloned()
            .ok_or(BookingError::TimeSlotNotFound)?;

        let consultation_start = timecalc::combine_time(availability.date, slot.start_time);
        if now >= consultation_start {
            return Err(BookingError::ConsultationStarted);
        }

        if let Some(entry) = tables.appointments.get_mut(&appointment_id) {
            entry.status = AppointmentStatus::Cancelled;
        }

        // The freed seat reopens a slot that was only full because of this
        // appointment.
        if tables.live_count_for_slot(slot.timeslot_id) < slot.max_patients {
            if let Some(entry) = tables.time_slots.get_mut(&slot.timeslot_id) {
                if entry.status == TimeSlotStatus::Booked {
                    entry.status = TimeSlotStatus::Available;
                    entry.updated_at = now;
                }
            }
        }

        info!("Appointment {} cancelled", appointment_id);
        Ok(())
    }

    /// Shift today's scheduled appointments of a doctor by a number of
    /// minutes. Slot boundaries stay put; only the check-in times move.
    /// The batch commits atomically or not at all.
    pub async fn reschedule(
        &self,
        doctor_id: Uuid,
        request: RescheduleAppointmentsRequest,
    ) -> Result<RescheduleResponse, BookingError> {
        debug!("Rescheduling today's appointments for doctor {}", doctor_id);

        let now = self.clock.now();
        let today = now.date_naive();
        let mut tables = self.store.write().await;

        let mut selected: Vec<Appointment> = tables
            .appointments
            .values()
            .filter(|a| {
                a.doctor_id == doctor_id
                    && a.is_live()
                    && tables
                        .time_slots
                        .get(&a.timeslot_id)
                        .is_some_and(|s| s.date == today)
            })
            .cloned()
            .collect();

        if let Some(ids) = &request.appointment_ids {
            let wanted: HashSet<Uuid> = ids.iter().copied().collect();
            selected.retain(|a| wanted.contains(&a.appointment_id));
        }
        if selected.is_empty() {
            return Err(BookingError::NoAppointmentsSelected);
        }
        selected.sort_by_key(|a| a.scheduled_on);

        let shift = match request.direction {
            ShiftDirection::Earlier => -(request.shift_minutes as i32),
            ShiftDirection::Later => request.shift_minutes as i32,
        };

        // Validate the full batch before touching anything.
        let mut updates = Vec::new();
        for appointment in &selected {
            let slot = tables
                .time_slots
                .get(&appointment.timeslot_id)
                .cloned()
                .ok_or(BookingError::TimeSlotNotFound)?;
            let availability = tables
                .availabilities
                .get(&slot.availability_id)
                .cloned()
                .ok_or(BookingError::TimeSlotNotFound)?;

            let shifted = timecalc::minutes_of(appointment.reporting_time) + shift;
            let window_start = timecalc::minutes_of(availability.consulting_start);
            let window_end = timecalc::minutes_of(availability.consulting_end);
            if shifted < window_start || shifted >= window_end {
                return Err(BookingError::ShiftOutOfWindow(appointment.appointment_id));
            }

            let lands_in_sibling = tables.slots_of(slot.availability_id).iter().any(|sibling| {
                sibling.timeslot_id != slot.timeslot_id
                    && shifted >= timecalc::minutes_of(sibling.start_time)
                    && shifted < timecalc::minutes_of(sibling.end_time)
            });
            if lands_in_sibling {
                return Err(BookingError::ShiftOverlapsSlot(appointment.appointment_id));
            }

            updates.push((
                appointment.appointment_id,
                appointment.patient_id,
                timecalc::time_of_minutes(shifted),
            ));
        }

        let mut rescheduled = Vec::with_capacity(updates.len());
        for (appointment_id, patient_id, reporting_time) in updates {
            if let Some(entry) = tables.appointments.get_mut(&appointment_id) {
                entry.reporting_time = reporting_time;
            }
            rescheduled.push(RescheduledAppointment {
                appointment_id,
                patient_id,
                reporting_time: render_time(reporting_time),
            });
        }

        info!(
            "Rescheduled {} appointment(s) for doctor {} by {} minute(s)",
            rescheduled.len(),
            doctor_id,
            shift
        );
        Ok(RescheduleResponse { rescheduled })
    }
}

/// Check-in time for the n-th booking of a slot: patients are spread
/// evenly across the slot, floored to whole minutes.
fn reporting_time(slot: &TimeSlot, index: u32) -> NaiveTime {
    let start = timecalc::minutes_of(slot.start_time);
    let duration = slot.duration_minutes() as i32;
    let offset = duration * index as i32 / slot.max_patients as i32;
    timecalc::time_of_minutes(start + offset)
}

pub(crate) fn render_time(time: NaiveTime) -> String {
    timecalc::format_minutes(timecalc::minutes_of(time))
}

fn booked_view(appointment: &Appointment, slot: &TimeSlot) -> BookedAppointment {
    BookedAppointment {
        appointment_id: appointment.appointment_id,
        doctor_id: appointment.doctor_id,
        timeslot_id: appointment.timeslot_id,
        status: appointment.status,
        scheduled_on: appointment.scheduled_on,
        reporting_time: render_time(appointment.reporting_time),
        date: slot.date,
        session: slot.session,
        start_time: render_time(slot.start_time),
        end_time: render_time(slot.end_time),
        reason: appointment.reason.clone(),
        notes: appointment.notes.clone(),
    }
}
