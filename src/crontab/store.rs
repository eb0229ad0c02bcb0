//! Whole-table access to the per-user crontab.
//!
//! The OS tool only supports reading the full table and replacing the full
//! table, so the store exposes exactly those two primitives.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::config::settings::CrontabConfig;
use crate::crontab::error::StoreError;

/// Read/replace access to an ordered list of cron lines.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// Returns the current table, one trimmed string per line.
    async fn read_lines(&self) -> Result<Vec<String>, StoreError>;

    /// Installs `lines` as the complete new table in a single replace.
    async fn write_lines(&self, lines: &[String]) -> Result<(), StoreError>;
}

/// Joins lines into the text handed to the crontab writer.
pub fn render_table(lines: &[String]) -> String {
    if lines.is_empty() {
        String::new()
    } else {
        let mut table = lines.join("\n");
        table.push('\n');
        table
    }
}

/// Splits crontab output into lines.
///
/// Blank output yields an empty list rather than a single empty line.
pub fn split_table(output: &str) -> Vec<String> {
    let output = output.trim();
    if output.is_empty() {
        return Vec::new();
    }
    output.split('\n').map(|line| line.trim().to_string()).collect()
}

/// [`ScheduleStore`] backed by the `crontab` command.
#[derive(Debug, Clone)]
pub struct CrontabCommandStore {
    program: String,
    user: Option<String>,
    timeout: Duration,
}

impl CrontabCommandStore {
    pub fn new(program: impl Into<String>, user: Option<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            user,
            timeout,
        }
    }

    pub fn from_config(config: &CrontabConfig) -> Self {
        Self::new(
            config.program.clone(),
            config.user.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn command(&self, flag: &str) -> Command {
        let mut command = Command::new(&self.program);
        if let Some(user) = &self.user {
            command.args(["-u", user]);
        }
        command.arg(flag).kill_on_drop(true);
        command
    }

    fn timeout_error(&self) -> StoreError {
        StoreError::Timeout {
            program: self.program.clone(),
            timeout_secs: self.timeout.as_secs(),
        }
    }
}

#[async_trait]
impl ScheduleStore for CrontabCommandStore {
    async fn read_lines(&self) -> Result<Vec<String>, StoreError> {
        let mut command = self.command("-l");
        command.stdin(Stdio::null());

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| self.timeout_error())?
            .map_err(|source| StoreError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.contains("no crontab for") {
                tracing::debug!(program = %self.program, "No crontab installed, treating as empty");
            } else {
                tracing::warn!(
                    program = %self.program,
                    status = %output.status,
                    stderr = %stderr.trim(),
                    "Crontab reader failed, treating table as empty"
                );
            }
            return Ok(Vec::new());
        }

        let lines = split_table(&String::from_utf8_lossy(&output.stdout));
        tracing::debug!(count = lines.len(), "Crontab snapshot read");
        Ok(lines)
    }

    async fn write_lines(&self, lines: &[String]) -> Result<(), StoreError> {
        let table = render_table(lines);

        let mut command = self.command("-");
        command
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        let mut child = command.spawn().map_err(|source| StoreError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        let io_error = |source| StoreError::Io {
            program: self.program.clone(),
            source,
        };

        let install = async {
            if let Some(mut stdin) = child.stdin.take() {
                stdin.write_all(table.as_bytes()).await.map_err(io_error)?;
                // Dropping stdin closes the pipe so crontab sees EOF.
            }
            child.wait_with_output().await.map_err(io_error)
        };

        let output = tokio::time::timeout(self.timeout, install)
            .await
            .map_err(|_| self.timeout_error())??;

        if !output.status.success() {
            return Err(StoreError::NonZeroExit {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        tracing::info!(count = lines.len(), "Crontab replaced");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_table() {
        assert_eq!(render_table(&[]), "");
        assert_eq!(
            render_table(&["a".to_string(), "b".to_string()]),
            "a\nb\n"
        );
    }

    #[test]
    fn test_split_table_suppresses_blank_output() {
        assert!(split_table("").is_empty());
        assert!(split_table("  \n\n ").is_empty());
    }

    #[test]
    fn test_split_table_trims_lines() {
        let lines = split_table("  0 6 * * * sh /a.sh  \n\n# c\n");
        assert_eq!(lines, vec!["0 6 * * * sh /a.sh", "", "# c"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let store = CrontabCommandStore::new(
            "/nonexistent/crontab-binary",
            None,
            Duration::from_secs(2),
        );

        assert!(matches!(
            store.read_lines().await,
            Err(StoreError::Spawn { .. })
        ));
        assert!(matches!(
            store.write_lines(&["* * * * * true".to_string()]).await,
            Err(StoreError::Spawn { .. })
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_program_reads_empty_and_fails_writes() {
        // `false` ignores its arguments and exits 1.
        let store = CrontabCommandStore::new("false", None, Duration::from_secs(2));

        assert!(store.read_lines().await.unwrap().is_empty());
        // Depending on timing this is a broken pipe or the exit status.
        assert!(store.write_lines(&["* * * * * true".to_string()]).await.is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_hanging_program_times_out() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let program = dir.path().join("slow-crontab");
        std::fs::write(&program, "#!/bin/sh\nsleep 5\n").unwrap();
        std::fs::set_permissions(&program, std::fs::Permissions::from_mode(0o755)).unwrap();

        let store = CrontabCommandStore::new(
            program.display().to_string(),
            None,
            Duration::from_secs(1),
        );

        let started = std::time::Instant::now();
        assert!(matches!(
            store.read_lines().await,
            Err(StoreError::Timeout { timeout_secs: 1, .. })
        ));
        assert!(matches!(
            store.write_lines(&["* * * * * true".to_string()]).await,
            Err(StoreError::Timeout { timeout_secs: 1, .. })
        ));
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
