//! Size-based rotation of the log file.

use std::fs;
use std::path::{Path, PathBuf};

use jiff::Zoned;

use crate::logger::config::RotationConfig;
use crate::logger::error::LoggerError;

pub struct RotationManager {
    config: RotationConfig,
}

impl RotationManager {
    pub fn new(config: RotationConfig) -> Self {
        Self { config }
    }

    pub fn should_rotate(&self, current_size: u64) -> bool {
        current_size >= self.config.max_size
    }

    /// Moves the active file aside and prunes old rotations.
    pub fn rotate(&self, current_path: &Path) -> Result<(), LoggerError> {
        if current_path.exists() {
            let rotated = rotated_path(current_path);
            fs::rename(current_path, &rotated).map_err(|e| {
                LoggerError::rotation(format!(
                    "Failed to rename {} to {}: {e}",
                    current_path.display(),
                    rotated.display()
                ))
            })?;
        }

        self.cleanup(current_path)
    }

    /// Keeps at most `max_files` rotated files, oldest removed first.
    fn cleanup(&self, base_path: &Path) -> Result<(), LoggerError> {
        let mut rotated = rotated_files(base_path)?;
        // Timestamped names sort chronologically.
        rotated.sort();

        let excess = rotated.len().saturating_sub(self.config.max_files);
        for old in rotated.into_iter().take(excess) {
            fs::remove_file(&old)?;
        }
        Ok(())
    }
}

/// `app.log` -> `app.20250101_120000.log`, with a counter on collision.
fn rotated_path(base_path: &Path) -> PathBuf {
    let timestamp = Zoned::now().strftime("%Y%m%d_%H%M%S").to_string();
    let stem = base_path.file_stem().unwrap_or_default().to_string_lossy();
    let ext = base_path.extension().map(|e| e.to_string_lossy());

    let name = |counter: usize| {
        let mark = if counter == 0 {
            timestamp.clone()
        } else {
            format!("{timestamp}_{counter}")
        };
        match &ext {
            Some(ext) => format!("{stem}.{mark}.{ext}"),
            None => format!("{stem}.{mark}"),
        }
    };

    let mut counter = 0;
    loop {
        let candidate = base_path.with_file_name(name(counter));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

fn rotated_files(base_path: &Path) -> Result<Vec<PathBuf>, LoggerError> {
    let parent = match base_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let prefix = format!(
        "{}.",
        base_path.file_stem().unwrap_or_default().to_string_lossy()
    );
    let active = base_path.file_name();

    Ok(fs::read_dir(parent)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name() != active
                && path
                    .file_name()
                    .is_some_and(|name| name.to_string_lossy().starts_with(&prefix))
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::tempdir;

    fn manager(max_size: u64, max_files: usize) -> RotationManager {
        RotationManager::new(RotationConfig {
            max_size,
            max_files,
        })
    }

    proptest! {
        #[test]
        fn prop_rotates_at_or_above_max_size(
            current_size in 0u64..10_000_000u64,
            max_size in 1u64..10_000_000u64,
        ) {
            prop_assert_eq!(
                manager(max_size, 5).should_rotate(current_size),
                current_size >= max_size
            );
        }
    }

    #[test]
    fn test_rotate_moves_active_file() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("app.log");
        fs::write(&base, "line\n").unwrap();

        manager(1, 5).rotate(&base).unwrap();

        assert!(!base.exists());
        let rotated = rotated_files(&base).unwrap();
        assert_eq!(rotated.len(), 1);
        assert_eq!(fs::read_to_string(&rotated[0]).unwrap(), "line\n");
    }

    #[test]
    fn test_rotate_keeps_max_files() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("app.log");
        for i in 0..6 {
            fs::write(dir.path().join(format!("app.2020010{i}_000000.log")), "old").unwrap();
        }
        fs::write(&base, "current").unwrap();

        manager(1, 3).rotate(&base).unwrap();

        let mut remaining = rotated_files(&base).unwrap();
        remaining.sort();
        assert_eq!(remaining.len(), 3);
        // The oldest files went first; the fresh rotation survived.
        assert!(
            remaining
                .iter()
                .any(|p| fs::read_to_string(p).unwrap() == "current")
        );
        assert!(!dir.path().join("app.20200100_000000.log").exists());
    }

    #[test]
    fn test_rotated_path_avoids_collisions() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("app.log");
        let first = rotated_path(&base);
        fs::write(&first, "").unwrap();
        let second = rotated_path(&base);
        assert_ne!(first, second);
    }

    #[test]
    fn test_unrelated_files_are_ignored() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("app.log");
        fs::write(dir.path().join("other.log"), "").unwrap();
        fs::write(dir.path().join("application.log"), "").unwrap();
        assert!(rotated_files(&base).unwrap().is_empty());
    }
}
