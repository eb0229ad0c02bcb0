//! `describe` and `presets` commands. Neither touches the crontab.

use crate::error::AppResult;
use crate::schedule::{CronSchedule, Locale, Preset, describe, presets};

pub struct DescribeCommandHandler;

impl DescribeCommandHandler {
    /// Prints the description; an invalid expression prints the locale's
    /// fallback text and fails.
    pub fn execute(expression: &str, locale: Locale) -> AppResult<()> {
        println!("{}", describe(expression, locale));

        CronSchedule::parse(expression).map_err(|e| crate::error::AppError::Validation {
            field: "expression".to_string(),
            reason: e.to_string(),
        })?;
        Ok(())
    }
}

pub struct PresetsCommandHandler;

impl PresetsCommandHandler {
    pub fn execute(json: bool) -> AppResult<()> {
        if json {
            println!(
                "{}",
                serde_json::to_string_pretty(presets()).map_err(anyhow::Error::from)?
            );
        } else {
            print!("{}", render_presets(presets()));
        }
        Ok(())
    }
}

fn render_presets(presets: &[Preset]) -> String {
    let width = presets
        .iter()
        .map(|preset| preset.label.len())
        .max()
        .unwrap_or_default();

    presets
        .iter()
        .map(|preset| format!("{:<width$}  {}\n", preset.label, preset.expression))
        .collect()
}
