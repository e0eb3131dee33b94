//! In-process persistence for the booking core.
//!
//! One `RwLock` guards the whole table set. Services take the write guard for
//! the full span of a read-modify-write (capacity check, insert, status flip)
//! and never await while holding it, so every mutation is linearizable and
//! the "no live appointments" guards cannot race a concurrent booking.

use std::collections::HashMap;

use chrono::NaiveDate;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use shared_models::domain::{Appointment, Availability, Doctor, Session, TimeSlot};

#[derive(Debug, Default)]
pub struct Tables {
    pub doctors: HashMap<Uuid, Doctor>,
    pub availabilities: HashMap<Uuid, Availability>,
    pub time_slots: HashMap<Uuid, TimeSlot>,
    pub appointments: HashMap<Uuid, Appointment>,
}

impl Tables {
    /// Non-deleted availability by id.
    pub fn availability(&self, id: Uuid) -> Option<&Availability> {
        self.availabilities.get(&id).filter(|a| !a.is_deleted)
    }

    /// Non-deleted time slot by id.
    pub fn time_slot(&self, id: Uuid) -> Option<&TimeSlot> {
        self.time_slots.get(&id).filter(|s| !s.is_deleted)
    }

    /// Non-deleted slots belonging to an availability.
    pub fn slots_of(&self, availability_id: Uuid) -> Vec<&TimeSlot> {
        let mut slots: Vec<&TimeSlot> = self
            .time_slots
            .values()
            .filter(|s| s.availability_id == availability_id && !s.is_deleted)
            .collect();
        slots.sort_by_key(|s| s.start_time);
        slots
    }

    /// Count of appointments holding a seat in the slot.
    pub fn live_count_for_slot(&self, timeslot_id: Uuid) -> u32 {
        self.appointments
            .values()
            .filter(|a| a.timeslot_id == timeslot_id && a.is_live())
            .count() as u32
    }

    /// Whether any non-deleted slot under the availability has a live
    /// appointment.
    pub fn availability_has_live_appointments(&self, availability_id: Uuid) -> bool {
        self.slots_of(availability_id)
            .iter()
            .any(|slot| self.live_count_for_slot(slot.timeslot_id) > 0)
    }

    /// Session-level duplicate check: does the patient already hold a
    /// scheduled appointment with this doctor on this date and session,
    /// in any slot?
    pub fn has_scheduled_in_session(
        &self,
        patient_id: Uuid,
        doctor_id: Uuid,
        date: NaiveDate,
        session: Session,
    ) -> bool {
        self.appointments.values().any(|a| {
            a.patient_id == patient_id && a.doctor_id == doctor_id && a.is_live() && {
                self.time_slots
                    .get(&a.timeslot_id)
                    .is_some_and(|s| s.date == date && s.session == session)
            }
        })
    }

    /// Non-deleted availabilities of a doctor.
    pub fn availabilities_of(&self, doctor_id: Uuid) -> Vec<&Availability> {
        self.availabilities
            .values()
            .filter(|a| a.doctor_id == doctor_id && !a.is_deleted)
            .collect()
    }
}

#[derive(Debug, Default)]
pub struct ClinicStore {
    inner: RwLock<Tables>,
}

impl ClinicStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.inner.read().await
    }

    /// Exclusive access for one transactional unit. Do not await while
    /// holding the guard.
    pub async fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.inner.write().await
    }
}
