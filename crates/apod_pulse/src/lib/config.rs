use std::{path::PathBuf, time::Duration};

use chrono_tz::Tz;

use crate::window::FetchWindow;

/// Everything a run needs, gathered from flags and environment by the binary
#[derive(Clone)]
pub struct ApodConfig {
    pub api_key: String,
    pub endpoint: String,
    /// Server URL; `None` leaves the relational store unavailable
    pub database_url: Option<String>,
    pub database_name: String,
    pub data_dir: PathBuf,
    pub lookback_days: u32,
    pub time_zone: Tz,
    pub http_timeout: Duration,
}

impl ApodConfig {
    pub const DEFAULT_DATABASE_NAME: &str = "apod_database";

    pub fn window(&self) -> FetchWindow {
        FetchWindow::ending_today(self.time_zone, self.lookback_days)
    }
}

impl std::fmt::Debug for ApodConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApodConfig")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("database_url", &self.database_url.as_ref().map(|_| "<redacted>"))
            .field("database_name", &self.database_name)
            .field("data_dir", &self.data_dir)
            .field("lookback_days", &self.lookback_days)
            .field("time_zone", &self.time_zone)
            .field("http_timeout", &self.http_timeout)
            .finish()
    }
}
