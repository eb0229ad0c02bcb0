//! Sidecar records stored next to generated scripts.
//!
//! The script type is persisted here so edit views do not have to guess it
//! from the command text.

use std::io;
use std::path::{Path, PathBuf};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::crontab::script::ScriptType;

const SIDECAR_SUFFIX: &str = ".meta.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptMetadata {
    pub script_type: ScriptType,
    pub created_at: Timestamp,
}

impl ScriptMetadata {
    pub fn new(script_type: ScriptType) -> Self {
        Self {
            script_type,
            created_at: Timestamp::now(),
        }
    }
}

/// `task_1.py` -> `task_1.py.meta.json`
pub fn sidecar_path(script: &Path) -> PathBuf {
    let mut name = script.file_name().unwrap_or_default().to_os_string();
    name.push(SIDECAR_SUFFIX);
    script.with_file_name(name)
}

pub fn write(script: &Path, metadata: &ScriptMetadata) -> io::Result<()> {
    let json = serde_json::to_vec_pretty(metadata).map_err(io::Error::other)?;
    std::fs::write(sidecar_path(script), json)
}

/// Reads the sidecar; a missing or unreadable record yields `None`.
pub fn read(script: &Path) -> Option<ScriptMetadata> {
    let bytes = std::fs::read(sidecar_path(script)).ok()?;
    match serde_json::from_slice(&bytes) {
        Ok(metadata) => Some(metadata),
        Err(e) => {
            tracing::warn!(script = %script.display(), error = %e, "Ignoring malformed script metadata");
            None
        }
    }
}

pub fn remove(script: &Path) -> io::Result<()> {
    match std::fs::remove_file(sidecar_path(script)) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sidecar_path() {
        assert_eq!(
            sidecar_path(Path::new("/srv/scripts/task_1.py")),
            PathBuf::from("/srv/scripts/task_1.py.meta.json")
        );
    }

    #[test]
    fn test_write_read_remove() {
        let dir = TempDir::new().unwrap();
        let script = dir.path().join("task_42.sh");

        assert!(read(&script).is_none());

        let metadata = ScriptMetadata::new(ScriptType::Shell);
        write(&script, &metadata).unwrap();
        assert_eq!(read(&script), Some(metadata));

        remove(&script).unwrap();
        assert!(read(&script).is_none());
        // Removing twice is fine.
        remove(&script).unwrap();
    }

    #[test]
    fn test_malformed_sidecar_is_ignored() {
        let dir = TempDir::new().unwrap();
        let script = dir.path().join("task_7.py");
        std::fs::write(sidecar_path(&script), b"not json").unwrap();
        assert!(read(&script).is_none());
    }
}
