//! Configuration loader for gcm-push
//!
//! `ConfigLoader` loads configuration from files and environment variables
//! with proper precedence.

use std::path::{Path, PathBuf};

use config::{Config, ConfigBuilder, Environment, File, FileFormat, builder::DefaultState};

use crate::config::environment::Environment as AppEnvironment;
use crate::config::error::ConfigError;
use crate::config::settings::Settings;

/// Environment variable for configuration directory
pub const CONFIG_DIR_ENV: &str = "GCM_PUSH_CONFIG_DIR";

/// Environment variable for a single configuration file
pub const CONFIG_FILE_ENV: &str = "GCM_PUSH_CONFIG_FILE";

const DEFAULT_CONFIG_DIR: &str = "config";

/// Prefix for configuration overrides from the environment
const ENV_PREFIX: &str = "GCM_PUSH";

/// Separator for nested keys, `GCM_PUSH_GCM__API_KEY` -> `gcm.api_key`
const ENV_SEPARATOR: &str = "__";

/// Layered configuration loader
///
/// Sources, in order of priority:
/// 1. `default.toml` (required)
/// 2. `{environment}.toml` (optional)
/// 3. `local.toml` (optional)
/// 4. `GCM_PUSH_*` environment variables (highest priority)
///
/// When a single configuration file is set, steps 1-3 are replaced by that
/// file.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config_dir: PathBuf,
    config_file: Option<PathBuf>,
    environment: AppEnvironment,
}

impl ConfigLoader {
    /// Create a loader from `GCM_PUSH_CONFIG_DIR`, `GCM_PUSH_CONFIG_FILE`
    /// and `GCM_PUSH_APP_ENV`.
    ///
    /// # Errors
    ///
    /// Returns an error if both `GCM_PUSH_CONFIG_DIR` and
    /// `GCM_PUSH_CONFIG_FILE` are set.
    pub fn new() -> Result<Self, ConfigError> {
        let config_dir_var = std::env::var(CONFIG_DIR_ENV).ok();
        let config_file = std::env::var(CONFIG_FILE_ENV).ok().map(PathBuf::from);

        if config_file.is_some() && config_dir_var.is_some() {
            return Err(ConfigError::mutual_exclusivity(
                "GCM_PUSH_CONFIG_DIR and GCM_PUSH_CONFIG_FILE cannot both be set. \
                 Use GCM_PUSH_CONFIG_DIR for layered configuration or \
                 GCM_PUSH_CONFIG_FILE for a single configuration file.",
            ));
        }

        Ok(Self {
            config_dir: config_dir_var
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_DIR)),
            config_file,
            environment: AppEnvironment::from_env(),
        })
    }

    /// Load from a single file, skipping the layered directory lookup
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Override the environment picked up from `GCM_PUSH_APP_ENV`
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

    /// Load and validate configuration from all sources
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `default.toml` is not found (when using layered loading)
    /// - Configuration parsing fails
    /// - Configuration validation fails
    /// - No API key is configured for production
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let config = self.build_config()?;
        let settings: Settings = config.try_deserialize().map_err(|e| {
            ConfigError::ParseError(format!("Failed to deserialize configuration: {}", e))
        })?;

        settings.validate()?;
        if self.environment.is_production() {
            settings.gcm.require_credentials()?;
        }

        Ok(settings)
    }

    fn build_config(&self) -> Result<Config, ConfigError> {
        let builder = Config::builder();

        let builder = match self.config_file {
            Some(ref config_file) => Self::add_file_source(builder, config_file, true)?,
            None => self.build_layered_config(builder)?,
        };

        Self::add_env_source(builder)
            .build()
            .map_err(ConfigError::from)
    }

    fn build_layered_config(
        &self,
        builder: ConfigBuilder<DefaultState>,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let default_path = self.config_dir.join("default.toml");
        let builder = Self::add_file_source(builder, &default_path, true)?;

        let env_path = self
            .config_dir
            .join(format!("{}.toml", self.environment.as_str()));
        let builder = Self::add_file_source(builder, &env_path, false)?;

        let local_path = self.config_dir.join("local.toml");
        Self::add_file_source(builder, &local_path, false)
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
            File::new(path.to_str().unwrap_or_default(), FileFormat::Toml).required(required),
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // Tests touching process environment run one at a time
    static TEST_MUTEX: Mutex<()> = Mutex::new(());

    fn setup_config_dir(files: &[(&str, &str)]) -> TempDir {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        for (name, content) in files {
            fs::write(temp_dir.path().join(name), content).expect("Failed to write config file");
        }
        temp_dir
    }

    /// Restores touched environment variables on drop
    struct EnvGuard {
        vars_to_restore: Vec<(String, Option<String>)>,
    }

    impl EnvGuard {
        fn new() -> Self {
            Self {
                vars_to_restore: Vec::new(),
            }
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

        fn clear_all(&mut self) {
            self.remove(CONFIG_DIR_ENV);
            self.remove(CONFIG_FILE_ENV);
            self.remove(AppEnvironment::ENV_VAR);
            self.remove("GCM_PUSH_GCM__API_KEY");
            self.remove("GCM_PUSH_GCM__DEFAULT_RETRIES");
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (key, original_value) in self.vars_to_restore.iter().rev() {
                unsafe {
                    match original_value {
                        Some(value) => std::env::set_var(key, value),
                        None => std::env::remove_var(key),
                    }
                }
            }
        }
    }

    const DEFAULT_TOML: &str = r#"
[application]
name = "gcm-push-test"
version = "1.0.0"

[gcm]
api_key = "default-key"
endpoint = "https://fcm.googleapis.com/fcm/send"
request_timeout = 30
default_retries = 1

[logger]
level = "info"

[logger.console]
enabled = true
colored = false
"#;

    #[test]
    fn test_config_loader_new_default() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let mut env = EnvGuard::new();
        env.clear_all();

        let loader = ConfigLoader::new().expect("Should create loader");
        assert_eq!(loader.config_dir(), Path::new("config"));
        assert!(loader.config_file.is_none());
        assert_eq!(loader.environment(), AppEnvironment::Development);
    }

    #[test]
    fn test_config_loader_mutual_exclusivity_error() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let mut env = EnvGuard::new();
        env.clear_all();
        env.set(CONFIG_DIR_ENV, "/custom/config");
        env.set(CONFIG_FILE_ENV, "/path/to/config.toml");

        match ConfigLoader::new() {
            Err(ConfigError::MutualExclusivityError(msg)) => {
                assert!(msg.contains(CONFIG_DIR_ENV));
                assert!(msg.contains(CONFIG_FILE_ENV));
            }
            other => panic!("Expected MutualExclusivityError, got {:?}", other),
        }
    }

    #[test]
    fn test_load_missing_default_toml() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let mut env = EnvGuard::new();
        env.clear_all();

        let temp_dir = setup_config_dir(&[]);
        env.set(CONFIG_DIR_ENV, temp_dir.path().to_str().unwrap());

        let result = ConfigLoader::new().unwrap().load();
        match result {
            Err(ConfigError::FileNotFound(msg)) => assert!(msg.contains("default.toml")),
            other => panic!("Expected FileNotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_default_toml_only() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let mut env = EnvGuard::new();
        env.clear_all();

        let temp_dir = setup_config_dir(&[("default.toml", DEFAULT_TOML)]);
        env.set(CONFIG_DIR_ENV, temp_dir.path().to_str().unwrap());

        let settings = ConfigLoader::new().unwrap().load().expect("Should load settings");
        assert_eq!(settings.application.name, "gcm-push-test");
        assert_eq!(settings.gcm.api_key, "default-key");
        assert_eq!(settings.gcm.default_retries, 1);
        assert_eq!(settings.gcm.chunk_timeout, 120);
        assert!(!settings.logger.console.colored);
    }

    #[test]
    fn test_full_precedence_chain() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let mut env = EnvGuard::new();
        env.clear_all();

        let production = r#"
[gcm]
api_key = "production-key"
request_timeout = 10
"#;
        let local = r#"
[gcm]
default_retries = 3
"#;
        let temp_dir = setup_config_dir(&[
            ("default.toml", DEFAULT_TOML),
            ("production.toml", production),
            ("local.toml", local),
        ]);
        env.set(CONFIG_DIR_ENV, temp_dir.path().to_str().unwrap());
        env.set(AppEnvironment::ENV_VAR, "production");
        env.set("GCM_PUSH_GCM__API_KEY", "env-key");

        let settings = ConfigLoader::new().unwrap().load().expect("Should load settings");

        // environment variable beats production.toml
        assert_eq!(settings.gcm.api_key, "env-key");
        // production.toml beats default.toml
        assert_eq!(settings.gcm.request_timeout, 10);
        // local.toml beats default.toml
        assert_eq!(settings.gcm.default_retries, 3);
        assert_eq!(settings.application.version, "1.0.0");
    }

    #[test]
    fn test_with_environment_overrides_env_var() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let mut env = EnvGuard::new();
        env.clear_all();

        let staging = r#"
[gcm]
api_key = "staging-key"
"#;
        let temp_dir = setup_config_dir(&[("default.toml", DEFAULT_TOML), ("staging.toml", staging)]);
        env.set(CONFIG_DIR_ENV, temp_dir.path().to_str().unwrap());
        env.set(AppEnvironment::ENV_VAR, "production");

        let settings = ConfigLoader::new()
            .unwrap()
            .with_environment(AppEnvironment::Staging)
            .load()
            .unwrap();
        assert_eq!(settings.gcm.api_key, "staging-key");
    }

    #[test]
    fn test_single_file_mode() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let mut env = EnvGuard::new();
        env.clear_all();

        let temp_dir = setup_config_dir(&[("custom.toml", DEFAULT_TOML)]);
        let settings = ConfigLoader::new()
            .unwrap()
            .with_file(temp_dir.path().join("custom.toml"))
            .load()
            .unwrap();
        assert_eq!(settings.gcm.api_key, "default-key");
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let mut env = EnvGuard::new();
        env.clear_all();

        let broken = r#"
[gcm]
endpoint = "not a url"
"#;
        let temp_dir = setup_config_dir(&[("default.toml", broken)]);
        env.set(CONFIG_DIR_ENV, temp_dir.path().to_str().unwrap());

        let err = ConfigLoader::new().unwrap().load().unwrap_err();
        assert!(
            matches!(err, ConfigError::ValidationError { field, .. } if field == "gcm.endpoint")
        );
    }

    #[test]
    fn test_production_requires_api_key() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let mut env = EnvGuard::new();
        env.clear_all();

        let keyless = r#"
[gcm]
api_key = ""
"#;
        let temp_dir = setup_config_dir(&[("default.toml", keyless)]);
        env.set(CONFIG_DIR_ENV, temp_dir.path().to_str().unwrap());

        let loader = ConfigLoader::new().unwrap();
        assert!(loader.load().is_ok());

        let err = loader
            .with_environment(AppEnvironment::Production)
            .load()
            .unwrap_err();
        assert!(
            matches!(err, ConfigError::ValidationError { field, .. } if field == "gcm.api_key")
        );
    }
}
