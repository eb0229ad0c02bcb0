use serde::Serialize;
use utoipa::ToSchema;

/// A labelled schedule offered as a shortcut when creating tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct Preset {
    #[schema(value_type = String, example = "Every 5 minutes")]
    pub label: &'static str,
    #[schema(value_type = String, example = "*/5 * * * *")]
    pub expression: &'static str,
}

const fn preset(label: &'static str, expression: &'static str) -> Preset {
    Preset { label, expression }
}

static PRESETS: [Preset; 12] = [
    preset("Every minute", "* * * * *"),
    preset("Every 5 minutes", "*/5 * * * *"),
    preset("Every 15 minutes", "*/15 * * * *"),
    preset("Every 30 minutes", "*/30 * * * *"),
    preset("Every hour", "0 * * * *"),
    preset("Every 6 hours", "0 */6 * * *"),
    preset("Every day at midnight", "0 0 * * *"),
    preset("Every day at 6 AM", "0 6 * * *"),
    preset("Weekdays at 9 AM", "0 9 * * 1-5"),
    preset("Every Sunday at midnight", "0 0 * * 0"),
    preset("First day of every month", "0 0 1 * *"),
    preset("Every year on January 1st", "0 0 1 1 *"),
];

/// The catalog, in display order.
pub fn presets() -> &'static [Preset] {
    &PRESETS
}

pub fn find(label: &str) -> Option<&'static Preset> {
    PRESETS
        .iter()
        .find(|preset| preset.label.eq_ignore_ascii_case(label))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::field::CronSchedule;

    #[test]
    fn test_presets_are_valid_schedules() {
        for preset in presets() {
            assert!(
                CronSchedule::parse(preset.expression).is_ok(),
                "{} has invalid expression {}",
                preset.label,
                preset.expression
            );
        }
    }

    #[test]
    fn test_labels_are_unique() {
        let mut labels: Vec<_> = presets().iter().map(|p| p.label).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), presets().len());
    }

    #[test]
    fn test_find() {
        assert_eq!(find("every hour").map(|p| p.expression), Some("0 * * * *"));
        assert!(find("never").is_none());
    }
}
