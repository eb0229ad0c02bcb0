//! Serve command handler: dry-run validation.
//!
//! Starting the server itself is left to `main`, which owns the runtime.

use std::path::Path;

use crate::config::Settings;
use crate::error::AppResult;

pub struct ServeCommandHandler {
    config: Settings,
}

impl ServeCommandHandler {
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    /// Validates the configuration and prints what the server would use.
    ///
    /// # Errors
    /// Configuration validation errors
    pub fn validate_only(&self) -> AppResult<()> {
        self.config.validate()?;

        println!("✓ Configuration is valid");
        println!("✓ Server would bind to: {}", self.config.server.address());
        println!(
            "✓ Crontab program: {}{}",
            self.config.crontab.program,
            self.config
                .crontab
                .user
                .as_deref()
                .map(|user| format!(" (user {user})"))
                .unwrap_or_default()
        );
        println!("✓ {}", self.scripts_directory_status());
        println!("✓ Logger configuration is valid");

        println!("Dry run completed successfully - configuration is ready for deployment");
        Ok(())
    }

    /// The scripts directory is created on startup, so a missing one is fine.
    fn scripts_directory_status(&self) -> String {
        let directory = &self.config.scripts.directory;
        if Path::new(directory).is_dir() {
            format!("Scripts directory: {directory}")
        } else {
            format!("Scripts directory: {directory} (created on startup)")
        }
    }

    pub fn config(&self) -> &Settings {
        &self.config
    }
}
