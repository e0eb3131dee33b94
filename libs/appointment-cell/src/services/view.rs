// libs/appointment-cell/src/services/view.rs
use std::sync::Arc;

use uuid::Uuid;

use shared_models::auth::{AuthUser, UserRole};
use shared_models::domain::{Appointment, AppointmentStatus, TimeSlot};
use shared_store::ClinicStore;
use shared_utils::state::AppState;

use crate::models::AppointmentListItem;
use crate::services::booking::render_time;

pub struct AppointmentViewService {
    store: Arc<ClinicStore>,
}

impl AppointmentViewService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
        }
    }

    /// Appointments of the caller, optionally filtered by status. Upcoming
    /// (scheduled) listings read soonest-booked first; everything else is
    /// newest first.
    pub async fn list_appointments(
        &self,
        caller: &AuthUser,
        status: Option<AppointmentStatus>,
    ) -> Vec<AppointmentListItem> {
        let tables = self.store.read().await;

        let mut rows: Vec<(Appointment, TimeSlot)> = tables
            .appointments
            .values()
            .filter(|a| match caller.role {
                UserRole::Patient => a.patient_id == caller.id,
                UserRole::Doctor => a.doctor_id == caller.id,
            })
            .filter(|a| status.map_or(true, |s| a.status == s))
            .filter_map(|a| {
                tables
                    .time_slots
                    .get(&a.timeslot_id)
                    .map(|s| (a.clone(), s.clone()))
            })
            .collect();

        let ascending = matches!(status, Some(AppointmentStatus::Scheduled));
        rows.sort_by(|(a, _), (b, _)| {
            if ascending {
                a.scheduled_on.cmp(&b.scheduled_on)
            } else {
                b.scheduled_on.cmp(&a.scheduled_on)
            }
        });

        rows.into_iter()
            .map(|(appointment, slot)| list_item(&appointment, &slot, caller.role))
            .collect()
    }
}

fn list_item(appointment: &Appointment, slot: &TimeSlot, role: UserRole) -> AppointmentListItem {
    // Embed the counterpart's identity, never the caller's own.
    let (doctor_id, patient_id): (Option<Uuid>, Option<Uuid>) = match role {
        UserRole::Patient => (Some(appointment.doctor_id), None),
        UserRole::Doctor => (None, Some(appointment.patient_id)),
    };

    AppointmentListItem {
        appointment_id: appointment.appointment_id,
        status: appointment.status,
        scheduled_on: appointment.scheduled_on,
        reporting_time: render_time(appointment.reporting_time),
        date: slot.date,
        session: slot.session,
        start_time: render_time(slot.start_time),
        end_time: render_time(slot.end_time),
        doctor_id,
        patient_id,
        reason: appointment.reason.clone(),
        notes: appointment.notes.clone(),
    }
}
