use std::sync::Arc;

use shared_config::AppConfig;
use shared_store::ClinicStore;

use crate::clock::{Clock, SystemClock};

/// Shared application state handed to every cell router.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<ClinicStore>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Arc<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: AppConfig, clock: Arc<dyn Clock>) -> Arc<Self> {
        Arc::new(Self {
            config,
            store: Arc::new(ClinicStore::new()),
            clock,
        })
    }
}
