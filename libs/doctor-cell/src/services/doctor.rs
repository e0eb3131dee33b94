// libs/doctor-cell/src/services/doctor.rs
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use shared_models::domain::{Doctor, ScheduleType};
use shared_store::{ClinicStore, Tables};
use shared_utils::clock::Clock;
use shared_utils::state::AppState;

pub struct DoctorService {
    store: Arc<ClinicStore>,
    clock: Arc<dyn Clock>,
}

impl DoctorService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
            clock: state.clock.clone(),
        }
    }

    /// Switch a doctor between stream and wave scheduling. Profile
    /// provisioning is external, so this upserts the row.
    pub async fn update_schedule_type(&self, doctor_id: Uuid, schedule_type: ScheduleType) -> Doctor {
        let now = self.clock.now();
        let mut tables = self.store.write().await;
        let doctor = tables
            .doctors
            .entry(doctor_id)
            .and_modify(|d| {
                d.schedule_type = schedule_type;
                d.updated_at = now;
            })
            .or_insert_with(|| Doctor {
                doctor_id,
                schedule_type,
                created_at: now,
                updated_at: now,
            })
            .clone();

        info!("Doctor {} schedule type set to {}", doctor_id, schedule_type);
        doctor
    }
}

/// Doctors are provisioned externally; the first schedule write
/// materializes the row with the stream default.
pub(crate) fn ensure_doctor(
    tables: &mut Tables,
    doctor_id: Uuid,
    now: DateTime<Utc>,
) -> ScheduleType {
    tables
        .doctors
        .entry(doctor_id)
        .or_insert_with(|| Doctor {
            doctor_id,
            schedule_type: ScheduleType::Stream,
            created_at: now,
            updated_at: now,
        })
        .schedule_type
}
