// libs/doctor-cell/src/services/availability.rs
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info};
use uuid::Uuid;

use shared_models::domain::Availability;
use shared_store::ClinicStore;
use shared_utils::clock::Clock;
use shared_utils::state::AppState;
use shared_utils::timecalc;

use crate::models::{
    AvailabilityView, CreateAvailabilityRequest, CreateAvailabilityResponse, ScheduleError,
    UpdateAvailabilityRequest,
};
use crate::services::doctor::ensure_doctor;

pub struct AvailabilityService {
    store: Arc<ClinicStore>,
    clock: Arc<dyn Clock>,
    horizon_weeks: u32,
}

impl AvailabilityService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
            clock: state.clock.clone(),
            horizon_weeks: state.config.booking_horizon_weeks,
        }
    }

    /// Create one availability window per resolved date. Dates that already
    /// carry an identical non-deleted window are skipped; the call only
    /// fails when nothing new could be created.
    pub async fn create_availability(
        &self,
        doctor_id: Uuid,
        request: CreateAvailabilityRequest,
    ) -> Result<CreateAvailabilityResponse, ScheduleError> {
        debug!("Creating availability for doctor {}", doctor_id);

        let now = self.clock.now();
        let today = now.date_naive();

        let consulting_start = timecalc::parse_time(&request.consulting_start_time)?;
        let consulting_end = timecalc::parse_time(&request.consulting_end_time)?;
        if consulting_start >= consulting_end {
            return Err(ScheduleError::Validation(
                "Consulting start time must be before consulting end time".to_string(),
            ));
        }

        let booking_start_at =
            timecalc::combine(request.booking_start_date, &request.booking_start_time)?;
        let booking_end_at =
            timecalc::combine(request.booking_end_date, &request.booking_end_time)?;
        if booking_start_at < now || booking_end_at < now {
            return Err(ScheduleError::Validation(
                "Booking start and end time cannot be in the past".to_string(),
            ));
        }
        if booking_start_at >= booking_end_at {
            return Err(ScheduleError::Validation(
                "Booking start time must be before booking end time".to_string(),
            ));
        }

        let target_dates: Vec<NaiveDate> = match request.date {
            Some(date) => {
                if date <= today {
                    return Err(ScheduleError::Validation(
                        "Consulting date must be in the future".to_string(),
                    ));
                }
                vec![date]
            }
            None => {
                let weekdays = request.weekdays.clone().unwrap_or_default();
                if weekdays.is_empty() {
                    return Err(ScheduleError::Validation(
                        "Either date or weekdays must be provided".to_string(),
                    ));
                }
                timecalc::future_dates_for_weekdays(today, &weekdays, self.horizon_weeks)
            }
        };

        // Booking must close no later than consultation begins, on every
        // governed date.
        for date in &target_dates {
            let consult_start_at = timecalc::combine_time(*date, consulting_start);
            if booking_end_at > consult_start_at {
                return Err(ScheduleError::Validation(format!(
                    "Booking window must close before consulting starts at {} {}",
                    date, request.consulting_start_time
                )));
            }
        }

        let mut tables = self.store.write().await;
        ensure_doctor(&mut tables, doctor_id, now);

        let mut fresh_dates = Vec::new();
        let mut skipped_dates = Vec::new();
        for date in target_dates {
            let duplicate = tables.availabilities.values().any(|a| {
                !a.is_deleted
                    && a.doctor_id == doctor_id
                    && a.date == date
                    && a.session == request.session
                    && a.consulting_start == consulting_start
                    && a.consulting_end == consulting_end
            });
            if duplicate {
                skipped_dates.push(date);
            } else {
                fresh_dates.push(date);
            }
        }

        if fresh_dates.is_empty() {
            let dates = skipped_dates
                .iter()
                .map(|d| d.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            return Err(ScheduleError::DuplicateAvailability(format!(
                "{} (session: {})",
                dates, request.session
            )));
        }

        let mut created = Vec::new();
        for date in fresh_dates {
            let row = Availability {
                availability_id: Uuid::new_v4(),
                doctor_id,
                date,
                session: request.session,
                consulting_start,
                consulting_end,
                booking_start_at,
                booking_end_at,
                is_deleted: false,
                created_at: now,
                updated_at: now,
            };
            created.push(availability_view(&row));
            tables.availabilities.insert(row.availability_id, row);
        }

        info!(
            "Created {} availability window(s) for doctor {} ({} skipped)",
            created.len(),
            doctor_id,
            skipped_dates.len()
        );

        Ok(CreateAvailabilityResponse {
            created,
            skipped_dates,
        })
    }

    /// Partial update. Only a window with no remaining time slots may change
    /// shape; the merged result is re-validated against the ordering and
    /// uniqueness invariants.
    pub async fn update_availability(
        &self,
        doctor_id: Uuid,
        availability_id: Uuid,
        request: UpdateAvailabilityRequest,
    ) -> Result<AvailabilityView, ScheduleError> {
        debug!("Updating availability {}", availability_id);

        let now = self.clock.now();
        let mut tables = self.store.write().await;

        let current = tables
            .availability(availability_id)
            .cloned()
            .ok_or(ScheduleError::AvailabilityNotFound)?;
        if current.doctor_id != doctor_id {
            return Err(ScheduleError::NotOwner);
        }

        if !tables.slots_of(availability_id).is_empty() {
            return Err(ScheduleError::ActiveDependents(
                "Cannot update an availability that still has time slots".to_string(),
            ));
        }

        let date = request.date.unwrap_or(current.date);
        let session = request.session.unwrap_or(current.session);
        let consulting_start = match &request.consulting_start_time {
            Some(t) => timecalc::parse_time(t)?,
            None => current.consulting_start,
        };
        let consulting_end = match &request.consulting_end_time {
            Some(t) => timecalc::parse_time(t)?,
            None => current.consulting_end,
        };
        if consulting_start >= consulting_end {
            return Err(ScheduleError::Validation(
                "Consulting start time must be before consulting end time".to_string(),
            ));
        }

        let booking_start_at = match (&request.booking_start_date, &request.booking_start_time) {
            (Some(date), Some(time)) => timecalc::combine(*date, time)?,
            _ => current.booking_start_at,
        };
        let booking_end_at = match (&request.booking_end_date, &request.booking_end_time) {
            (Some(date), Some(time)) => timecalc::combine(*date, time)?,
            _ => current.booking_end_at,
        };
        if booking_start_at >= booking_end_at {
            return Err(ScheduleError::Validation(
                "Booking start time must be before booking end time".to_string(),
            ));
        }
        if booking_end_at > timecalc::combine_time(date, consulting_start) {
            return Err(ScheduleError::Validation(
                "Booking window must close before consulting starts".to_string(),
            ));
        }

        let duplicate = tables.availabilities.values().any(|a| {
            a.availability_id != availability_id
                && !a.is_deleted
                && a.doctor_id == doctor_id
                && a.date == date
                && a.session == session
                && a.consulting_start == consulting_start
                && a.consulting_end == consulting_end
        });
        if duplicate {
            return Err(ScheduleError::DuplicateAvailability(format!(
                "{} (session: {})",
                date, session
            )));
        }

        let Some(entry) = tables.availabilities.get_mut(&availability_id) else {
            return Err(ScheduleError::AvailabilityNotFound);
        };
        entry.date = date;
        entry.session = session;
        entry.consulting_start = consulting_start;
        entry.consulting_end = consulting_end;
        entry.booking_start_at = booking_start_at;
        entry.booking_end_at = booking_end_at;
        entry.updated_at = now;

        Ok(availability_view(entry))
    }

    /// Soft delete, cascading to the window's time slots. Blocked while any
    /// live appointment exists anywhere under the window.
    pub async fn soft_delete_availability(
        &self,
        doctor_id: Uuid,
        availability_id: Uuid,
    ) -> Result<Uuid, ScheduleError> {
        debug!("Deleting availability {}", availability_id);

        let now = self.clock.now();
        let mut tables = self.store.write().await;

        let current = tables
            .availability(availability_id)
            .cloned()
            .ok_or(ScheduleError::AvailabilityNotFound)?;
        if current.doctor_id != doctor_id {
            return Err(ScheduleError::NotOwner);
        }

        if tables.availability_has_live_appointments(availability_id) {
            return Err(ScheduleError::ActiveDependents(
                "Cannot delete availability with booked appointments".to_string(),
            ));
        }

        for slot in tables
            .time_slots
            .values_mut()
            .filter(|s| s.availability_id == availability_id && !s.is_deleted)
        {
            slot.is_deleted = true;
            slot.updated_at = now;
        }
        if let Some(entry) = tables.availabilities.get_mut(&availability_id) {
            entry.is_deleted = true;
            entry.updated_at = now;
        }

        info!("Availability {} deleted", availability_id);
        Ok(availability_id)
    }
}

pub(crate) fn availability_view(availability: &Availability) -> AvailabilityView {
    AvailabilityView {
        availability_id: availability.availability_id,
        date: availability.date,
        session: availability.session,
        consulting_start_time: timecalc::format_minutes(timecalc::minutes_of(
            availability.consulting_start,
        )),
        consulting_end_time: timecalc::format_minutes(timecalc::minutes_of(
            availability.consulting_end,
        )),
        booking_start_at: availability
            .booking_start_at
            .format("%Y-%m-%d %H:%M")
            .to_string(),
        booking_end_at: availability
            .booking_end_at
            .format("%Y-%m-%d %H:%M")
            .to_string(),
    }
}
