//! Five-field crontab expression parser.
//!
//! Follows crontab(5): minute, hour, day of month, month, day of week;
//! `*`, numbers, `a-b` ranges, `/n` steps, comma lists, and three-letter
//! month/day names. Day of week accepts both 0 and 7 for Sunday.

use std::fmt;

use thiserror::Error;

use crate::crontab::line::SCHEDULE_FIELDS;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("Expected {SCHEDULE_FIELDS} fields, found {found}")]
    FieldCount { found: usize },

    /// Only spaces and tabs may separate fields; anything else could split
    /// the installed line.
    #[error("Fields must be separated by spaces or tabs, found {found:?}")]
    Separator { found: char },

    #[error("Invalid {field} field `{value}`: {reason}")]
    InvalidField {
        field: FieldKind,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Minute,
    Hour,
    DayOfMonth,
    Month,
    DayOfWeek,
}

const MONTH_NAMES: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];
const DAY_NAMES: [&str; 7] = ["sun", "mon", "tue", "wed", "thu", "fri", "sat"];

impl FieldKind {
    pub const ALL: [FieldKind; SCHEDULE_FIELDS] = [
        FieldKind::Minute,
        FieldKind::Hour,
        FieldKind::DayOfMonth,
        FieldKind::Month,
        FieldKind::DayOfWeek,
    ];

    /// Inclusive bounds of the field.
    pub fn bounds(&self) -> (u32, u32) {
        match self {
            FieldKind::Minute => (0, 59),
            FieldKind::Hour => (0, 23),
            FieldKind::DayOfMonth => (1, 31),
            FieldKind::Month => (1, 12),
            FieldKind::DayOfWeek => (0, 7),
        }
    }

    fn name_value(&self, token: &str) -> Option<u32> {
        let token = token.to_ascii_lowercase();
        let names: &[&str] = match self {
            FieldKind::Month => &MONTH_NAMES,
            FieldKind::DayOfWeek => &DAY_NAMES,
            _ => return None,
        };
        let offset = if *self == FieldKind::Month { 1 } else { 0 };
        names
            .iter()
            .position(|name| *name == token)
            .map(|position| position as u32 + offset)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::Minute => "minute",
            FieldKind::Hour => "hour",
            FieldKind::DayOfMonth => "day-of-month",
            FieldKind::Month => "month",
            FieldKind::DayOfWeek => "day-of-week",
        };
        f.write_str(name)
    }
}

/// One comma-separated element of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Part {
    Value(u32),
    Range(u32, u32),
    Step { start: u32, end: u32, step: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    /// `*`
    Every,
    /// `*/n`
    Interval(u32),
    List(Vec<Part>),
}

impl Field {
    /// Single values only, in written order.
    pub fn single_values(&self) -> Option<Vec<u32>> {
        match self {
            Field::List(parts) => parts
                .iter()
                .map(|part| match part {
                    Part::Value(value) => Some(*value),
                    _ => None,
                })
                .collect(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronSchedule {
    pub minute: Field,
    pub hour: Field,
    pub day_of_month: Field,
    pub month: Field,
    pub day_of_week: Field,
}

impl CronSchedule {
    pub fn parse(expression: &str) -> Result<Self, ScheduleError> {
        if let Some(found) = expression
            .chars()
            .find(|c| c.is_whitespace() && *c != ' ' && *c != '\t')
        {
            return Err(ScheduleError::Separator { found });
        }

        let tokens: Vec<&str> = expression.split_whitespace().collect();
        if tokens.len() != SCHEDULE_FIELDS {
            return Err(ScheduleError::FieldCount {
                found: tokens.len(),
            });
        }

        let fields = FieldKind::ALL
            .iter()
            .zip(&tokens)
            .map(|(kind, token)| parse_field(*kind, token))
            .collect::<Result<Vec<_>, _>>()?;
        let [minute, hour, day_of_month, month, day_of_week] =
            <[Field; SCHEDULE_FIELDS]>::try_from(fields).map_err(|fields| {
                ScheduleError::FieldCount {
                    found: fields.len(),
                }
            })?;

        Ok(Self {
            minute,
            hour,
            day_of_month,
            month,
            day_of_week,
        })
    }
}

fn parse_field(kind: FieldKind, token: &str) -> Result<Field, ScheduleError> {
    let invalid = |reason: &str| ScheduleError::InvalidField {
        field: kind,
        value: token.to_string(),
        reason: reason.to_string(),
    };

    if token == "*" {
        return Ok(Field::Every);
    }
    if let Some(step) = token.strip_prefix("*/") {
        return parse_step(step).map(Field::Interval).map_err(|r| invalid(&r));
    }

    token
        .split(',')
        .map(|part| parse_part(kind, part))
        .collect::<Result<Vec<_>, String>>()
        .map(Field::List)
        .map_err(|reason| invalid(&reason))
}

fn parse_part(kind: FieldKind, part: &str) -> Result<Part, String> {
    if part.is_empty() {
        return Err("empty list element".to_string());
    }

    let (range, step) = match part.split_once('/') {
        Some((range, step)) => (range, Some(parse_step(step)?)),
        None => (part, None),
    };

    let (start, end) = match range.split_once('-') {
        Some((start, end)) => {
            let (start, end) = (parse_value(kind, start)?, parse_value(kind, end)?);
            if start > end {
                return Err(format!("range {start}-{end} is reversed"));
            }
            (start, Some(end))
        }
        None if range == "*" => (kind.bounds().0, Some(kind.bounds().1)),
        None => (parse_value(kind, range)?, None),
    };

    Ok(match (end, step) {
        (None, None) => Part::Value(start),
        (Some(end), None) => Part::Range(start, end),
        // `a/n` runs from `a` to the top of the field.
        (end, Some(step)) => Part::Step {
            start,
            end: end.unwrap_or(kind.bounds().1),
            step,
        },
    })
}

fn parse_step(step: &str) -> Result<u32, String> {
    match step.parse::<u32>() {
        Ok(0) => Err("step must be positive".to_string()),
        Ok(step) => Ok(step),
        Err(_) => Err(format!("`{step}` is not a valid step")),
    }
}

fn parse_value(kind: FieldKind, token: &str) -> Result<u32, String> {
    let value = match token.parse::<u32>() {
        Ok(value) => value,
        Err(_) => kind
            .name_value(token)
            .ok_or_else(|| format!("`{token}` is not a number or known name"))?,
    };

    let (min, max) = kind.bounds();
    if value < min || value > max {
        return Err(format!("{value} is outside {min}-{max}"));
    }
    Ok(value)
}
