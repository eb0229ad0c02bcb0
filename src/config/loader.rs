//! Layered configuration loading.

use std::path::{Path, PathBuf};

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};

use crate::config::environment::Environment as AppEnvironment;
use crate::config::error::ConfigError;
use crate::config::settings::Settings;

const CONFIG_DIR_ENV: &str = "CRONDECK_CONFIG_DIR";

const CONFIG_FILE_ENV: &str = "CRONDECK_CONFIG_FILE";

const DEFAULT_CONFIG_DIR: &str = "config";

const ENV_PREFIX: &str = "CRONDECK";

/// Separator for nested keys: `CRONDECK_SERVER__PORT` -> `server.port`
const ENV_SEPARATOR: &str = "__";

/// Loads [`Settings`] from, lowest priority first:
/// 1. `default.toml` (required)
/// 2. `{environment}.toml`
/// 3. `local.toml`
/// 4. `CRONDECK_*` environment variables
///
/// With a single config file set, only that file and the environment
/// variables are used.
#[derive(Debug)]
pub struct ConfigLoader {
    config_dir: PathBuf,
    config_file: Option<PathBuf>,
    environment: AppEnvironment,
}

impl ConfigLoader {
    /// Reads `CRONDECK_CONFIG_DIR`, `CRONDECK_CONFIG_FILE` and
    /// `CRONDECK_APP_ENV`.
    ///
    /// # Errors
    ///
    /// Fails when both the directory and the file variables are set.
    pub fn new() -> Result<Self, ConfigError> {
        let config_dir = std::env::var(CONFIG_DIR_ENV).ok().map(PathBuf::from);
        let config_file = std::env::var(CONFIG_FILE_ENV).ok().map(PathBuf::from);

        if config_file.is_some() && config_dir.is_some() {
            return Err(ConfigError::mutual_exclusivity(
                "CRONDECK_CONFIG_DIR and CRONDECK_CONFIG_FILE cannot both be set. \
                 Use CRONDECK_CONFIG_DIR for layered configuration or \
                 CRONDECK_CONFIG_FILE for a single configuration file.",
            ));
        }

        Ok(Self {
            config_dir: config_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_DIR)),
            config_file,
            environment: AppEnvironment::from_env(),
        })
    }

    /// Switches to single-file mode, e.g. for `--config`.
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Overrides the environment overlay, e.g. for `--env`.
    pub fn with_environment(mut self, environment: AppEnvironment) -> Self {
        self.environment = environment;
        self
    }

    pub fn environment(&self) -> AppEnvironment {
        self.environment
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Builds, deserializes and validates the settings.
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let config = self.build_config()?;
        let settings: Settings = config.try_deserialize().map_err(|e| {
            ConfigError::ParseError(format!("Failed to deserialize configuration: {e}"))
        })?;

        settings.validate()?;
        Ok(settings)
    }

    fn build_config(&self) -> Result<Config, ConfigError> {
        let builder = Config::builder();

        let builder = match &self.config_file {
            Some(config_file) => add_file_source(builder, config_file, true)?,
            None => self.build_layered_config(builder)?,
        };

        add_env_source(builder).build().map_err(ConfigError::from)
    }

    fn build_layered_config(
        &self,
        builder: ConfigBuilder<DefaultState>,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let default_path = self.config_dir.join("default.toml");
        let builder = add_file_source(builder, &default_path, true)?;

        let env_path = self
            .config_dir
            .join(format!("{}.toml", self.environment.as_str()));
        let builder = add_file_source(builder, &env_path, false)?;

        let local_path = self.config_dir.join("local.toml");
        add_file_source(builder, &local_path, false)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new().unwrap_or_else(|_| Self {
            config_dir: PathBuf::from(DEFAULT_CONFIG_DIR),
            config_file: None,
            environment: AppEnvironment::default(),
        })
    }
}

fn add_file_source(
    builder: ConfigBuilder<DefaultState>,
    path: &Path,
    required: bool,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    if required && !path.exists() {
        return Err(ConfigError::file_not_found(format!(
            "Required configuration file not found: {}",
            path.display()
        )));
    }

    Ok(builder.add_source(
        File::new(&path.to_string_lossy(), FileFormat::Toml).required(required),
    ))
}

fn add_env_source(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator(ENV_SEPARATOR)
            .ignore_empty(true)
            .try_parsing(true),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // Tests mutate process-wide environment variables.
    static TEST_MUTEX: Mutex<()> = Mutex::new(());

    const DEFAULT_CONFIG: &str = r#"
[application]
name = "crondeck-test"

[server]
host = "127.0.0.1"
port = 3000

[crontab]
program = "crontab"
timeout_secs = 10

[scripts]
directory = "scripts"
"#;

    fn setup_config_dir(files: &[(&str, &str)]) -> TempDir {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        for (name, content) in files {
            fs::write(temp_dir.path().join(name), content).expect("Failed to write config file");
        }
        temp_dir
    }

    /// Restores touched variables on drop.
    struct EnvGuard {
        vars_to_restore: Vec<(String, Option<String>)>,
    }

    impl EnvGuard {
        fn new() -> Self {
            let mut guard = Self {
                vars_to_restore: Vec::new(),
            };
            for key in [CONFIG_DIR_ENV, CONFIG_FILE_ENV, AppEnvironment::ENV_VAR] {
                guard.remove(key);
            }
            guard
        }

        fn set(&mut self, key: &str, value: &str) {
            self.vars_to_restore
                .push((key.to_string(), std::env::var(key).ok()));
            unsafe {
                std::env::set_var(key, value);
            }
        }

        fn remove(&mut self, key: &str) {
            self.vars_to_restore
                .push((key.to_string(), std::env::var(key).ok()));
            unsafe {
                std::env::remove_var(key);
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (key, original) in self.vars_to_restore.iter().rev() {
                unsafe {
                    match original {
                        Some(value) => std::env::set_var(key, value),
                        None => std::env::remove_var(key),
                    }
                }
            }
        }
    }

    #[test]
    fn test_config_loader_new_default() {
        let _lock = TEST_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let _env = EnvGuard::new();

        let loader = ConfigLoader::new().expect("Should create loader");
        assert_eq!(loader.config_dir(), Path::new("config"));
        assert!(loader.config_file.is_none());
        assert_eq!(loader.environment(), AppEnvironment::Development);
    }

    #[test]
    fn test_config_loader_mutual_exclusivity_error() {
        let _lock = TEST_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let mut env = EnvGuard::new();
        env.set(CONFIG_DIR_ENV, "/custom/config");
        env.set(CONFIG_FILE_ENV, "/path/to/config.toml");

        match ConfigLoader::new() {
            Err(ConfigError::MutualExclusivityError(msg)) => {
                assert!(msg.contains("CRONDECK_CONFIG_DIR"));
                assert!(msg.contains("CRONDECK_CONFIG_FILE"));
            }
            other => panic!("Expected MutualExclusivityError, got {other:?}"),
        }
    }

    #[test]
    fn test_load_missing_default_toml() {
        let _lock = TEST_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let mut env = EnvGuard::new();
        let temp_dir = setup_config_dir(&[]);
        env.set(CONFIG_DIR_ENV, temp_dir.path().to_str().unwrap());

        let result = ConfigLoader::new().unwrap().load();
        match result {
            Err(ConfigError::FileNotFound(msg)) => assert!(msg.contains("default.toml")),
            other => panic!("Expected FileNotFound error, got {other:?}"),
        }
    }

    #[test]
    fn test_load_full_precedence_chain() {
        let _lock = TEST_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let mut env = EnvGuard::new();

        let development = r#"
[application]
name = "dev-app"

[server]
port = 3001

[crontab]
user = "dev"
"#;
        let local = r#"
[server]
port = 3002

[scripts]
directory = "/srv/crondeck/scripts"
"#;
        let temp_dir = setup_config_dir(&[
            ("default.toml", DEFAULT_CONFIG),
            ("development.toml", development),
            ("local.toml", local),
        ]);
        env.set(CONFIG_DIR_ENV, temp_dir.path().to_str().unwrap());
        env.set("CRONDECK_SERVER__PORT", "3003");
        env.set("CRONDECK_TASKS__RETAIN_PREVIOUS_SCRIPT_ON_EDIT", "false");

        let settings = ConfigLoader::new().unwrap().load().expect("Should load settings");

        assert_eq!(settings.server.port, 3003);
        assert!(!settings.tasks.retain_previous_script_on_edit);
        assert_eq!(settings.scripts.directory, "/srv/crondeck/scripts");
        assert_eq!(settings.crontab.user.as_deref(), Some("dev"));
        assert_eq!(settings.application.name, "dev-app");
        assert_eq!(settings.server.host, "127.0.0.1");
    }

    #[test]
    fn test_environment_overlay_selection() {
        let _lock = TEST_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let mut env = EnvGuard::new();

        let production = r#"
[server]
host = "0.0.0.0"
"#;
        let temp_dir = setup_config_dir(&[
            ("default.toml", DEFAULT_CONFIG),
            ("production.toml", production),
        ]);
        env.set(CONFIG_DIR_ENV, temp_dir.path().to_str().unwrap());

        let development = ConfigLoader::new().unwrap().load().unwrap();
        assert_eq!(development.server.host, "127.0.0.1");

        let production = ConfigLoader::new()
            .unwrap()
            .with_environment(AppEnvironment::Production)
            .load()
            .unwrap();
        assert_eq!(production.server.host, "0.0.0.0");
    }

    #[test]
    fn test_load_single_file_mode() {
        let _lock = TEST_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let _env = EnvGuard::new();

        let single = r#"
[server]
port = 5050

[crontab]
program = "/usr/bin/crontab"
"#;
        let temp_dir = setup_config_dir(&[("single.toml", single)]);

        let settings = ConfigLoader::new()
            .unwrap()
            .with_config_file(temp_dir.path().join("single.toml"))
            .load()
            .expect("Should load settings");

        assert_eq!(settings.server.port, 5050);
        assert_eq!(settings.crontab.program, "/usr/bin/crontab");
        assert_eq!(settings.scripts.directory, "scripts");
    }

    #[test]
    fn test_invalid_settings_are_rejected() {
        let _lock = TEST_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let mut env = EnvGuard::new();
        let temp_dir = setup_config_dir(&[("default.toml", DEFAULT_CONFIG)]);
        env.set(CONFIG_DIR_ENV, temp_dir.path().to_str().unwrap());
        env.set("CRONDECK_CRONTAB__TIMEOUT_SECS", "0");

        let result = ConfigLoader::new().unwrap().load();
        assert!(
            matches!(result, Err(ConfigError::ValidationError { field, .. }) if field == "crontab.timeout_secs")
        );
    }
}
