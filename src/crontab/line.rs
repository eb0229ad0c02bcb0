//! Cron line parsing and serialization.
//!
//! A crontab snapshot is an ordered list of raw lines. Every position in the
//! snapshot becomes exactly one [`CronEntry`] whose `index` is that position,
//! so the index a client sees always addresses the same raw line it was
//! derived from. Lines this system cannot represent as a schedule + command
//! pair are kept as [`LineKind::Unmanaged`] and written back verbatim.

use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use utoipa::ToSchema;

use crate::crontab::error::LineError;

/// Number of whitespace-separated time fields in a cron schedule.
pub const SCHEDULE_FIELDS: usize = 5;

static ENV_ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*\s*=").expect("environment assignment pattern is valid")
});

/// A schedule + command pair reconstructed from one cron line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Task {
    /// The five schedule fields joined by single spaces.
    pub schedule: String,
    /// Everything after the schedule; absent for schedule-only lines.
    pub command: Option<String>,
    /// Derived log file of a managed script, filled in by the registry.
    #[schema(value_type = Option<String>)]
    pub log_path: Option<PathBuf>,
}

impl Task {
    pub fn new(schedule: impl Into<String>, command: Option<String>) -> Self {
        Self {
            schedule: schedule.into(),
            command,
            log_path: None,
        }
    }

    /// Script path by convention: the second token of `<interpreter> <path>`.
    pub fn script_path(&self) -> Option<&str> {
        self.command
            .as_deref()
            .and_then(|command| command.split_whitespace().nth(1))
    }
}

/// Why a line was left out of the task shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UnmanagedReason {
    Blank,
    Comment,
    NamedSchedule,
    Environment,
    TooFewFields,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LineKind {
    Task(Task),
    Unmanaged { reason: UnmanagedReason },
}

/// One position of a crontab snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CronEntry {
    pub index: usize,
    pub raw: String,
    #[serde(flatten)]
    pub kind: LineKind,
}

impl CronEntry {
    pub fn task(&self) -> Option<&Task> {
        match &self.kind {
            LineKind::Task(task) => Some(task),
            LineKind::Unmanaged { .. } => None,
        }
    }

    pub fn task_mut(&mut self) -> Option<&mut Task> {
        match &mut self.kind {
            LineKind::Task(task) => Some(task),
            LineKind::Unmanaged { .. } => None,
        }
    }
}

/// Splits a line into its schedule and command.
///
/// Returns `None` when the line has fewer than five tokens. The command keeps
/// its internal spacing; only the surrounding whitespace is trimmed.
pub fn split_line(line: &str) -> Option<(String, Option<String>)> {
    let mut rest = line.trim();
    let mut fields = Vec::with_capacity(SCHEDULE_FIELDS);

    for _ in 0..SCHEDULE_FIELDS {
        rest = rest.trim_start();
        if rest.is_empty() {
            return None;
        }
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        fields.push(&rest[..end]);
        rest = &rest[end..];
    }

    let command = rest.trim();
    let command = (!command.is_empty()).then(|| command.to_string());
    Some((fields.join(" "), command))
}

/// Classifies a raw line as a task or an unmanaged line.
pub fn classify(line: &str) -> LineKind {
    let trimmed = line.trim();

    let reason = if trimmed.is_empty() {
        Some(UnmanagedReason::Blank)
    } else if trimmed.starts_with('#') {
        Some(UnmanagedReason::Comment)
    } else if trimmed.starts_with('@') {
        Some(UnmanagedReason::NamedSchedule)
    } else if ENV_ASSIGNMENT.is_match(trimmed) {
        Some(UnmanagedReason::Environment)
    } else {
        None
    };

    if let Some(reason) = reason {
        return LineKind::Unmanaged { reason };
    }

    match split_line(trimmed) {
        Some((schedule, command)) => LineKind::Task(Task::new(schedule, command)),
        None => LineKind::Unmanaged {
            reason: UnmanagedReason::TooFewFields,
        },
    }
}

/// Parses the line at `index` of a snapshot.
pub fn parse(index: usize, line: &str) -> CronEntry {
    CronEntry {
        index,
        raw: line.to_string(),
        kind: classify(line),
    }
}

/// Parses a whole snapshot, one entry per line.
pub fn parse_all(lines: &[String]) -> Vec<CronEntry> {
    lines
        .iter()
        .enumerate()
        .map(|(index, line)| parse(index, line))
        .collect()
}

/// Collapses the separators of a five-field schedule to single spaces.
pub fn normalize_schedule(schedule: &str) -> Result<String, LineError> {
    if schedule.contains(['\r', '\n']) {
        return Err(LineError::LineBreak { part: "schedule" });
    }
    let fields: Vec<&str> = schedule.split_whitespace().collect();
    if fields.len() != SCHEDULE_FIELDS {
        return Err(LineError::FieldCount {
            found: fields.len(),
        });
    }
    Ok(fields.join(" "))
}

/// Builds the cron line for a schedule and command. The result is always
/// exactly one line.
pub fn serialize(schedule: &str, command: &str) -> Result<String, LineError> {
    let schedule = normalize_schedule(schedule)?;
    let command = command.trim();
    if command.contains(['\r', '\n']) {
        return Err(LineError::LineBreak { part: "command" });
    }
    Ok(format!("{schedule} {command}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_managed_line() {
        let entry = parse(0, "0 6 * * * python /scripts/task_1.py");
        assert_eq!(entry.index, 0);
        let task = entry.task().unwrap();
        assert_eq!(task.schedule, "0 6 * * *");
        assert_eq!(task.command.as_deref(), Some("python /scripts/task_1.py"));
        assert_eq!(task.script_path(), Some("/scripts/task_1.py"));
    }

    #[test]
    fn test_schedule_only_line_has_no_command() {
        let entry = parse(3, "*/5 * * * *");
        let task = entry.task().unwrap();
        assert_eq!(task.schedule, "*/5 * * * *");
        assert!(task.command.is_none());
        assert!(task.script_path().is_none());
    }

    #[test]
    fn test_command_spacing_is_preserved() {
        let (schedule, command) = split_line("1  2 3 4 5   echo  'a  b'  ").unwrap();
        assert_eq!(schedule, "1 2 3 4 5");
        assert_eq!(command.as_deref(), Some("echo  'a  b'"));
    }

    #[test]
    fn test_unmanaged_lines() {
        let cases = [
            ("", UnmanagedReason::Blank),
            ("# nightly backup", UnmanagedReason::Comment),
            ("@reboot /usr/bin/start a b c d", UnmanagedReason::NamedSchedule),
            ("MAILTO=ops@example.com", UnmanagedReason::Environment),
            ("PATH = /usr/bin:/bin", UnmanagedReason::Environment),
            ("0 6 * *", UnmanagedReason::TooFewFields),
        ];

        for (line, expected) in cases {
            match classify(line) {
                LineKind::Unmanaged { reason } => assert_eq!(reason, expected, "line {line:?}"),
                other => panic!("expected unmanaged for {line:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_parse_all_keeps_positions() {
        let lines = vec![
            "# header".to_string(),
            "0 6 * * * sh /tmp/a.sh".to_string(),
            "bogus".to_string(),
            "15 * * * * python /tmp/b.py".to_string(),
        ];

        let entries = parse_all(&lines);
        assert_eq!(entries.len(), lines.len());
        for (i, entry) in entries.iter().enumerate() {
            assert_eq!(entry.index, i);
            assert_eq!(entry.raw, lines[i]);
        }
        assert!(entries[0].task().is_none());
        assert!(entries[1].task().is_some());
        assert!(entries[2].task().is_none());
        assert!(entries[3].task().is_some());
    }

    #[test]
    fn test_serialize() {
        assert_eq!(
            serialize("*/5 * * * *", "sh /srv/scripts/task_1.sh").unwrap(),
            "*/5 * * * * sh /srv/scripts/task_1.sh"
        );
        assert_eq!(
            serialize(" 0\t6  * * * ", "sh /a.sh").unwrap(),
            "0 6 * * * sh /a.sh"
        );
    }

    #[test]
    fn test_serialize_never_produces_two_lines() {
        assert_eq!(
            serialize("0 0 * *\n*", "sh /a.sh"),
            Err(LineError::LineBreak { part: "schedule" })
        );
        assert_eq!(
            serialize("0 0 * * *", "sh /a.sh\n* * * * * rm -rf /"),
            Err(LineError::LineBreak { part: "command" })
        );
        assert_eq!(
            serialize("0 0 * *", "sh /a.sh"),
            Err(LineError::FieldCount { found: 4 })
        );
    }

    #[test]
    fn test_entry_serializes_with_kind_tag() {
        let entry = parse(1, "0 0 * * * sh /x.sh");
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], "task");
        assert_eq!(json["index"], 1);
        assert_eq!(json["schedule"], "0 0 * * *");

        let entry = parse(2, "# note");
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], "unmanaged");
        assert_eq!(json["reason"], "comment");
    }

    fn schedule_field() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("*".to_string()),
            (0u8..60).prop_map(|n| n.to_string()),
            (1u8..30).prop_map(|n| format!("*/{n}")),
            (0u8..10, 10u8..20).prop_map(|(a, b)| format!("{a}-{b}")),
            (0u8..10, 10u8..20).prop_map(|(a, b)| format!("{a},{b}")),
        ]
    }

    proptest! {
        #[test]
        fn prop_parse_inverts_serialize(
            fields in proptest::collection::vec(schedule_field(), SCHEDULE_FIELDS),
            interpreter in prop_oneof![Just("python"), Just("sh")],
            path in "/[a-z]{1,8}/task_[0-9]{1,13}\\.(py|sh)",
            extra in proptest::option::of("[a-z0-9>&/ ]{0,12}[a-z0-9]"),
        ) {
            let schedule = fields.join(" ");
            let mut command = format!("{interpreter} {path}");
            if let Some(extra) = extra {
                command.push(' ');
                command.push_str(extra.trim());
            }
            let command = command.trim().to_string();

            let line = serialize(&schedule, &command).unwrap();
            let entry = parse(0, &line);
            let task = entry.task().expect("serialized line parses as a task");
            prop_assert_eq!(&task.schedule, &schedule);
            prop_assert_eq!(task.command.as_deref(), Some(command.as_str()));
        }
    }
}
