//! Human-readable rendering of crontab schedules in English and Chinese.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::schedule::field::{CronSchedule, Field, Part};

const MONTHS_EN: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];
const DAYS_EN: [&str; 7] = [
    "Sunday", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday",
];
const DAYS_ZH: [&str; 7] = [
    "星期日", "星期一", "星期二", "星期三", "星期四", "星期五", "星期六",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Zh,
}

impl Locale {
    /// Maps a language tag such as `zh_CN` or `en-US` to a locale; anything
    /// unrecognized falls back to English.
    pub fn from_tag(tag: &str) -> Self {
        let language = tag
            .split(['_', '-'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match language.as_str() {
            "zh" => Locale::Zh,
            _ => Locale::En,
        }
    }

    /// Text returned when an expression cannot be described.
    pub fn fallback(&self) -> &'static str {
        match self {
            Locale::En => "Invalid expression",
            Locale::Zh => "无效的表达式",
        }
    }
}

impl FromStr for Locale {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Locale::from_tag(s))
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locale::En => f.write_str("en"),
            Locale::Zh => f.write_str("zh"),
        }
    }
}

/// Describes `expression`, or returns the locale's fallback text.
pub fn describe(expression: &str, locale: Locale) -> String {
    match CronSchedule::parse(expression) {
        Ok(schedule) => match locale {
            Locale::En => english(&schedule),
            Locale::Zh => chinese(&schedule),
        },
        Err(e) => {
            tracing::debug!(expression, error = %e, "Cannot describe expression");
            locale.fallback().to_string()
        }
    }
}

fn english(schedule: &CronSchedule) -> String {
    let mut sentence = english_time(&schedule.minute, &schedule.hour);

    let day_of_month = match &schedule.day_of_month {
        Field::Every => None,
        Field::Interval(n) => Some(format!("every {n} days")),
        Field::List(parts) => Some(format!(
            "on day {} of the month",
            join_en(parts, &|v: u32| v.to_string())
        )),
    };
    let day_of_week = match &schedule.day_of_week {
        Field::Every => None,
        Field::Interval(n) => Some(format!("every {n} days of the week")),
        Field::List(parts) => Some(format!("on {}", join_en(parts, &day_en))),
    };
    // crontab runs when either day field matches if both are restricted.
    let days = match (day_of_month, day_of_week) {
        (Some(dom), Some(dow)) => Some(format!("{dom} or {dow}")),
        (dom, dow) => dom.or(dow),
    };
    if let Some(days) = days {
        sentence.push_str(", ");
        sentence.push_str(&days);
    }

    match &schedule.month {
        Field::Every => {}
        Field::Interval(n) => sentence.push_str(&format!(", every {n} months")),
        Field::List(parts) => sentence.push_str(&format!(", in {}", join_en(parts, &month_en))),
    }

    sentence
}

fn english_time(minute: &Field, hour: &Field) -> String {
    if let (Some([at]), Some(hours)) = (minute.single_values().as_deref(), hour.single_values()) {
        let times: Vec<String> = hours.iter().map(|h| clock(*h, *at)).collect();
        return format!("At {}", join_words(&times, ", ", " and "));
    }

    let minute_phrase = match minute {
        Field::Every => "Every minute".to_string(),
        Field::Interval(n) => format!("Every {n} minutes"),
        Field::List(parts) => format!("At minute {}", join_en(parts, &|v: u32| v.to_string())),
    };
    let hour_phrase = match hour {
        Field::Every if matches!(minute, Field::List(_)) => Some("of every hour".to_string()),
        Field::Every => None,
        Field::Interval(n) => Some(format!("every {n} hours")),
        Field::List(parts) => Some(format!("during hour {}", join_en(parts, &|v: u32| v.to_string()))),
    };

    match hour_phrase {
        Some(hour_phrase) if matches!(hour, Field::Every) => format!("{minute_phrase} {hour_phrase}"),
        Some(hour_phrase) => format!("{minute_phrase}, {hour_phrase}"),
        None => minute_phrase,
    }
}

fn chinese(schedule: &CronSchedule) -> String {
    let mut clauses = Vec::new();

    match &schedule.month {
        Field::Every => {}
        Field::Interval(n) => clauses.push(format!("每 {n} 个月")),
        Field::List(parts) => clauses.push(format!("{} 月", join_zh(parts, &|v: u32| v.to_string()))),
    }

    let day_of_month = match &schedule.day_of_month {
        Field::Every => None,
        Field::Interval(n) => Some(format!("每 {n} 天")),
        Field::List(parts) => Some(format!("每月 {} 日", join_zh(parts, &|v: u32| v.to_string()))),
    };
    let day_of_week = match &schedule.day_of_week {
        Field::Every => None,
        Field::Interval(n) => Some(format!("每周每隔 {n} 天")),
        Field::List(parts) => Some(join_zh(parts, &day_zh)),
    };
    match (day_of_month, day_of_week) {
        (Some(dom), Some(dow)) => clauses.push(format!("{dom}或{dow}")),
        (dom, dow) => clauses.extend(dom.or(dow)),
    }

    clauses.push(chinese_time(&schedule.minute, &schedule.hour));
    clauses.join("，")
}

fn chinese_time(minute: &Field, hour: &Field) -> String {
    if let (Some([at]), Some(hours)) = (minute.single_values().as_deref(), hour.single_values()) {
        let times: Vec<String> = hours.iter().map(|h| clock(*h, *at)).collect();
        return format!("在 {}", join_words(&times, "、", " 和 "));
    }

    let hour_phrase = match hour {
        Field::Every => None,
        Field::Interval(n) => Some(format!("每 {n} 小时")),
        Field::List(parts) => Some(format!("在 {} 点", join_zh(parts, &|v: u32| v.to_string()))),
    };
    let minute_phrase = match minute {
        Field::Every => "每分钟".to_string(),
        Field::Interval(n) => format!("每 {n} 分钟"),
        Field::List(parts) if matches!(hour, Field::Every) => {
            format!("在每小时的第 {} 分钟", join_zh(parts, &|v: u32| v.to_string()))
        }
        Field::List(parts) => format!("第 {} 分钟", join_zh(parts, &|v: u32| v.to_string())),
    };

    match hour_phrase {
        Some(hour_phrase) => format!("{hour_phrase}，{minute_phrase}"),
        None => minute_phrase,
    }
}

fn clock(hour: u32, minute: u32) -> String {
    format!("{hour:02}:{minute:02}")
}

fn month_en(value: u32) -> String {
    MONTHS_EN[(value as usize).saturating_sub(1) % 12].to_string()
}

fn day_en(value: u32) -> String {
    DAYS_EN[value as usize % 7].to_string()
}

fn day_zh(value: u32) -> String {
    DAYS_ZH[value as usize % 7].to_string()
}

fn join_en(parts: &[Part], name: &dyn Fn(u32) -> String) -> String {
    let items: Vec<String> = parts
        .iter()
        .map(|part| match part {
            Part::Value(v) => name(*v),
            Part::Range(a, b) => format!("{} through {}", name(*a), name(*b)),
            Part::Step { start, end, step } => {
                format!("every {step} from {} through {}", name(*start), name(*end))
            }
        })
        .collect();
    join_words(&items, ", ", " and ")
}

fn join_zh(parts: &[Part], name: &dyn Fn(u32) -> String) -> String {
    let items: Vec<String> = parts
        .iter()
        .map(|part| match part {
            Part::Value(v) => name(*v),
            Part::Range(a, b) => format!("{}至{}", name(*a), name(*b)),
            Part::Step { start, end, step } => {
                format!("{}至{}每隔 {step}", name(*start), name(*end))
            }
        })
        .collect();
    join_words(&items, "、", "和")
}

/// `a`, `a and b`, `a, b and c`
fn join_words(items: &[String], separator: &str, last_separator: &str) -> String {
    match items {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{}{last_separator}{last}", init.join(separator)),
    }
}
