//! In-memory [`ScheduleStore`] used by tests and `serve --in-memory`.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::crontab::error::StoreError;
use crate::crontab::store::{ScheduleStore, split_table};

#[derive(Debug, Default)]
pub struct MemoryScheduleStore {
    lines: Mutex<Vec<String>>,
    fail_writes: Mutex<Option<String>>,
    writes: AtomicUsize,
}

impl MemoryScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with a table, exactly as `crontab -l` would print it.
    pub fn with_table(table: &str) -> Self {
        let store = Self::new();
        *store.lines.lock().unwrap_or_else(|e| e.into_inner()) = split_table(table);
        store
    }

    /// Makes every subsequent write fail with `message` until cleared.
    pub fn fail_writes_with(&self, message: impl Into<String>) {
        *self.fail_writes.lock().unwrap_or_else(|e| e.into_inner()) = Some(message.into());
    }

    pub fn clear_write_failure(&self) {
        *self.fail_writes.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }

    /// Number of successful whole-table writes.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.lines.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl ScheduleStore for MemoryScheduleStore {
    async fn read_lines(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.snapshot())
    }

    async fn write_lines(&self, lines: &[String]) -> Result<(), StoreError> {
        if let Some(message) = self
            .fail_writes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
        {
            return Err(StoreError::Injected(message));
        }

        *self.lines.lock().unwrap_or_else(|e| e.into_inner()) = lines.to_vec();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_round_trips_lines() {
        let store = MemoryScheduleStore::with_table("0 6 * * * sh /a.sh\n");
        assert_eq!(store.read_lines().await.unwrap(), vec!["0 6 * * * sh /a.sh"]);

        store.write_lines(&[]).await.unwrap();
        assert!(store.read_lines().await.unwrap().is_empty());
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn test_injected_failure_leaves_table_untouched() {
        let store = MemoryScheduleStore::with_table("0 6 * * * sh /a.sh");
        store.fail_writes_with("exit status 1");

        let result = store.write_lines(&[]).await;
        assert!(matches!(result, Err(StoreError::Injected(_))));
        assert_eq!(store.snapshot().len(), 1);
        assert_eq!(store.write_count(), 0);

        store.clear_write_failure();
        store.write_lines(&[]).await.unwrap();
        assert!(store.snapshot().is_empty());
    }
}
