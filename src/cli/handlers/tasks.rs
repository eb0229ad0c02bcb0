//! `list` command: the installed crontab as the API indexes it.

use std::sync::Arc;

use crate::api::dto::TaskEntryResponse;
use crate::config::Settings;
use crate::crontab::{CronEntry, LineKind, ScheduleStore};
use crate::error::AppResult;
use crate::schedule::{Locale, describe};
use crate::services::Services;

pub struct ListCommandHandler {
    services: Services,
}

impl ListCommandHandler {
    pub fn new(settings: &Settings, store: Arc<dyn ScheduleStore>) -> AppResult<Self> {
        Ok(Self {
            services: Services::new(settings, store)?,
        })
    }

    pub async fn execute(&self, locale: Locale, json: bool) -> AppResult<()> {
        let entries = self.services.tasks.list_tasks().await?;

        if json {
            let body: Vec<TaskEntryResponse> = entries
                .into_iter()
                .map(|entry| TaskEntryResponse::new(entry, locale))
                .collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&body).map_err(anyhow::Error::from)?
            );
        } else {
            print!("{}", render_table(&entries, locale));
        }
        Ok(())
    }
}

/// One row per line. Unmanaged lines show their raw text so indices stay
/// contiguous.
fn render_table(entries: &[CronEntry], locale: Locale) -> String {
    if entries.is_empty() {
        return "No crontab entries installed\n".to_string();
    }

    let mut out = String::new();
    for entry in entries {
        match &entry.kind {
            LineKind::Task(task) => {
                out.push_str(&format!(
                    "{:>3}  {:<15}  {}\n     {}\n",
                    entry.index,
                    task.schedule,
                    task.command.as_deref().unwrap_or("-"),
                    describe(&task.schedule, locale),
                ));
            }
            LineKind::Unmanaged { .. } => {
                out.push_str(&format!("{:>3}  {}\n", entry.index, entry.raw));
            }
        }
    }
    out
}
