use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// How many weeks ahead a weekday-recurring availability is expanded.
    pub booking_horizon_weeks: u32,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("API_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or_else(|| {
                    warn!("API_PORT not set or invalid, using 3000");
                    3000
                }),
            booking_horizon_weeks: env::var("BOOKING_HORIZON_WEEKS")
                .ok()
                .and_then(|w| w.parse().ok())
                .unwrap_or_else(|| {
                    warn!("BOOKING_HORIZON_WEEKS not set or invalid, using 4");
                    4
                }),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            booking_horizon_weeks: 4,
        }
    }
}
