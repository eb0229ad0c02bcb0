//! Generated script files backing cron tasks.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::settings::ScriptsConfig;
use crate::crontab::error::ScriptError;
use crate::crontab::metadata::{self, ScriptMetadata};

/// First line written into shell scripts.
pub const SHEBANG: &str = "#!/bin/bash";

const SCRIPT_PREFIX: &str = "task_";
const LOG_EXTENSION: &str = "log";
const MAX_NAME_ATTEMPTS: u32 = 8;

/// Kind of script a task runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ScriptType {
    Python,
    Shell,
}

impl ScriptType {
    pub fn interpreter(&self) -> &'static str {
        match self {
            ScriptType::Python => "python",
            ScriptType::Shell => "sh",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ScriptType::Python => "py",
            ScriptType::Shell => "sh",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScriptType::Python => "python",
            ScriptType::Shell => "shell",
        }
    }
}

impl fmt::Display for ScriptType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScriptType {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "python" | "py" => Ok(ScriptType::Python),
            "shell" | "sh" | "bash" => Ok(ScriptType::Shell),
            _ => Err(ScriptError::UnknownType(s.to_string())),
        }
    }
}

/// Result of [`ScriptManager::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedScript {
    pub path: PathBuf,
    pub script_type: ScriptType,
    /// Command line to embed after the schedule.
    pub command: String,
    pub log_path: PathBuf,
}

/// Creates, reads and removes scripts inside one directory.
#[derive(Debug, Clone)]
pub struct ScriptManager {
    dir: PathBuf,
    log_dir: PathBuf,
    capture_output: bool,
}

impl ScriptManager {
    /// Creates the directories if needed and resolves them to absolute paths.
    pub fn new(
        dir: impl AsRef<Path>,
        log_dir: Option<&Path>,
        capture_output: bool,
    ) -> Result<Self, ScriptError> {
        let dir = prepare_dir(dir.as_ref())?;
        let log_dir = match log_dir {
            Some(log_dir) => prepare_dir(log_dir)?,
            None => dir.clone(),
        };

        Ok(Self {
            dir,
            log_dir,
            capture_output,
        })
    }

    pub fn from_config(config: &ScriptsConfig) -> Result<Self, ScriptError> {
        Self::new(
            &config.directory,
            config.log_directory.as_deref().map(Path::new),
            config.capture_output,
        )
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Writes a new script and returns its path and invocation command.
    pub fn create(&self, script_type: ScriptType, content: &str) -> Result<CreatedScript, ScriptError> {
        let (path, mut file) = self.allocate(script_type)?;

        let body = match script_type {
            ScriptType::Shell => format!("{SHEBANG}\n{content}"),
            ScriptType::Python => content.to_string(),
        };

        if let Err(source) = write_body(&mut file, body.as_bytes(), script_type) {
            drop(file);
            let _ = std::fs::remove_file(&path);
            return Err(ScriptError::Create { path, source });
        }

        if let Err(e) = metadata::write(&path, &ScriptMetadata::new(script_type)) {
            tracing::warn!(script = %path.display(), error = %e, "Failed to write script metadata");
        }

        let log_path = self.log_path_for(&path);
        let command = self.invocation(script_type, &path, &log_path);

        tracing::info!(script = %path.display(), script_type = %script_type, "Script created");

        Ok(CreatedScript {
            path,
            script_type,
            command,
            log_path,
        })
    }

    /// Reads a script body with any leading shebang line removed.
    ///
    /// Read failures are reported inside the returned text instead of as an
    /// error; callers show it as degraded content.
    pub fn read_content(&self, path: &Path) -> String {
        let path = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        match std::fs::read_to_string(&path) {
            Ok(content) => strip_shebang(&content).to_string(),
            Err(e) => {
                tracing::warn!(script = %path.display(), error = %e, "Failed to read script");
                format!("# Failed to read script {}: {}", path.display(), e)
            }
        }
    }

    /// Removes a managed script together with its log file and metadata.
    ///
    /// Never fails; anything that could not be removed is returned as a
    /// warning message. Paths outside the scripts directory are left alone.
    pub fn delete(&self, path: &Path) -> Vec<String> {
        let mut warnings = Vec::new();

        if !self.is_managed(path) {
            let warning = format!(
                "{} is not a generated script; left in place",
                path.display()
            );
            tracing::warn!(script = %path.display(), "Skipping removal of unmanaged script");
            warnings.push(warning);
            return warnings;
        }

        if let Err(e) = std::fs::remove_file(path) {
            tracing::warn!(script = %path.display(), error = %e, "Failed to remove script");
            warnings.push(format!("Failed to remove script {}: {}", path.display(), e));
        } else {
            tracing::info!(script = %path.display(), "Script removed");
        }

        let log_path = self.log_path_for(path);
        match std::fs::remove_file(&log_path) {
            Ok(()) => tracing::debug!(log = %log_path.display(), "Log file removed"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(log = %log_path.display(), error = %e, "Failed to remove log file");
                warnings.push(format!("Failed to remove log {}: {}", log_path.display(), e));
            }
        }

        if let Err(e) = metadata::remove(path) {
            tracing::warn!(script = %path.display(), error = %e, "Failed to remove script metadata");
            warnings.push(format!("Failed to remove metadata for {}: {}", path.display(), e));
        }

        warnings
    }

    /// Whether `path` names a script generated in this manager's directory.
    pub fn is_managed(&self, path: &Path) -> bool {
        let in_dir = path.parent() == Some(self.dir.as_path());
        let named = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with(SCRIPT_PREFIX));
        let typed = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == "py" || ext == "sh");
        in_dir && named && typed
    }

    /// `<log_dir>/<script stem>.log`
    pub fn log_path_for(&self, script: &Path) -> PathBuf {
        let stem = script.file_stem().unwrap_or_default().to_string_lossy();
        self.log_dir.join(format!("{stem}.{LOG_EXTENSION}"))
    }

    fn invocation(&self, script_type: ScriptType, path: &Path, log_path: &Path) -> String {
        let command = format!("{} {}", script_type.interpreter(), path.display());
        if self.capture_output {
            format!("{command} >> {} 2>&1", log_path.display())
        } else {
            command
        }
    }

    /// Opens a fresh `task_<millis>[_<hex>].<ext>` file.
    ///
    /// `create_new` makes the existence check and creation one step, so two
    /// creations in the same millisecond never share a file.
    fn allocate(&self, script_type: ScriptType) -> Result<(PathBuf, File), ScriptError> {
        let millis = Timestamp::now().as_millisecond();

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let name = if attempt == 0 {
                format!("{SCRIPT_PREFIX}{millis}.{}", script_type.extension())
            } else {
                let suffix = rand::random::<u32>() & 0x00ff_ffff;
                format!("{SCRIPT_PREFIX}{millis}_{suffix:06x}.{}", script_type.extension())
            };
            let path = self.dir.join(name);

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    tracing::debug!(script = %path.display(), "Script name taken, retrying");
                }
                Err(source) => return Err(ScriptError::Create { path, source }),
            }
        }

        Err(ScriptError::NameExhausted {
            dir: self.dir.clone(),
            attempts: MAX_NAME_ATTEMPTS,
        })
    }
}

/// Removes a leading `#!` line and its newline.
pub fn strip_shebang(content: &str) -> &str {
    if !content.starts_with("#!") {
        return content;
    }
    match content.find('\n') {
        Some(end) => &content[end + 1..],
        None => "",
    }
}

fn prepare_dir(dir: &Path) -> Result<PathBuf, ScriptError> {
    std::fs::create_dir_all(dir)
        .and_then(|_| dir.canonicalize())
        .map_err(|source| ScriptError::Directory {
            path: dir.to_path_buf(),
            source,
        })
}

fn write_body(file: &mut File, body: &[u8], script_type: ScriptType) -> io::Result<()> {
    file.write_all(body)?;
    file.flush()?;
    if script_type == ScriptType::Shell {
        mark_executable(file)?;
    }
    Ok(())
}

#[cfg(unix)]
fn mark_executable(file: &File) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(std::fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn mark_executable(_file: &File) -> io::Result<()> {
    Ok(())
}
