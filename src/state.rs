//! Application state shared by all request handlers.

use std::sync::Arc;

use crate::config::Settings;
use crate::crontab::ScheduleStore;
use crate::error::AppResult;
use crate::services::Services;

/// Cheap to clone; everything inside is reference counted.
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(settings: Settings, store: Arc<dyn ScheduleStore>) -> AppResult<Self> {
        let services = Services::new(&settings, store)?;
        Ok(Self {
            services,
            settings: Arc::new(settings),
        })
    }
}
