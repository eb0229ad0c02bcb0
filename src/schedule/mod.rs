//! Schedule presets, validation and human-readable descriptions.

pub mod describe;
pub mod field;
pub mod presets;

use std::borrow::Cow;

use validator::ValidationError;

pub use describe::{Locale, describe};
pub use field::{CronSchedule, ScheduleError};
pub use presets::{Preset, presets};

/// `validator` hook rejecting anything that is not a five-field schedule.
pub fn validate_schedule(expression: &str) -> Result<(), ValidationError> {
    CronSchedule::parse(expression).map(|_| ()).map_err(|e| {
        ValidationError::new("cron_schedule").with_message(Cow::Owned(e.to_string()))
    })
}
