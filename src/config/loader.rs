//! Configuration Loader
//!
//! Environment-aware configuration loading. Handles YAML file discovery,
//! environment detection, and merging of per-environment override sections
//! into the base configuration.

use super::error::{ConfigResult, ConfigurationError};
use super::CheckpointConfig;
use serde_yaml::Value as YamlValue;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

const CONFIG_FILE_NAME: &str = "checkpoint-config.yaml";

/// Loaded configuration plus the context it was resolved in
pub struct ConfigManager {
    config: CheckpointConfig,
    environment: String,
    config_directory: PathBuf,
}

impl ConfigManager {
    /// Load configuration with environment auto-detection
    pub fn load() -> ConfigResult<Arc<ConfigManager>> {
        Self::load_from_directory(None)
    }

    /// Load configuration from a specific directory
    pub fn load_from_directory(config_dir: Option<PathBuf>) -> ConfigResult<Arc<ConfigManager>> {
        let environment = Self::detect_environment();
        Self::load_from_directory_with_env(config_dir, &environment)
    }

    /// Load configuration from a specific directory with explicit environment
    ///
    /// Useful for testing without modifying global environment variables.
    pub fn load_from_directory_with_env(
        config_dir: Option<PathBuf>,
        environment: &str,
    ) -> ConfigResult<Arc<ConfigManager>> {
        let config_directory = config_dir.unwrap_or_else(Self::default_config_directory);

        debug!(
            environment = %environment,
            directory = %config_directory.display(),
            "Loading checkpoint configuration"
        );

        let config = Self::load_and_merge_config(&config_directory, environment)?;
        config.validate()?;

        let sanitized_config = Self::sanitize_config_for_logging(&config);
        debug!(
            "Configuration loaded successfully: {}",
            serde_json::to_string_pretty(&sanitized_config)
                .unwrap_or_else(|_| "[serialization error]".to_string())
        );

        Ok(Arc::new(ConfigManager {
            config,
            environment: environment.to_string(),
            config_directory,
        }))
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &CheckpointConfig {
        &self.config
    }

    /// Get the detected environment
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Get the directory the configuration was loaded from
    pub fn config_directory(&self) -> &Path {
        &self.config_directory
    }

    /// Get sanitized configuration for debugging that masks sensitive fields
    pub fn debug_config(&self) -> serde_json::Value {
        Self::sanitize_config_for_logging(&self.config)
    }

    /// Detect the current environment from environment variables
    fn detect_environment() -> String {
        env::var("CHECKPOINT_ENV")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string())
            .to_lowercase()
    }

    /// Get default configuration directory relative to the working directory
    fn default_config_directory() -> PathBuf {
        let possible_dirs = vec![
            PathBuf::from("config"),
            PathBuf::from("../config"),
            PathBuf::from("../../config"),
        ];

        for dir in possible_dirs {
            if dir.join(CONFIG_FILE_NAME).exists() {
                debug!("Found config directory: {}", dir.display());
                return dir;
            }
        }

        PathBuf::from("config")
    }

    /// Locate the configuration file inside the config directory
    fn find_config_file(config_directory: &Path) -> ConfigResult<PathBuf> {
        let config_path = config_directory.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            debug!("Found configuration file: {}", config_path.display());
            return Ok(config_path);
        }

        Err(ConfigurationError::config_file_not_found(vec![config_path]))
    }

    /// Load and merge configuration with environment-specific overrides
    fn load_and_merge_config(
        config_directory: &Path,
        environment: &str,
    ) -> ConfigResult<CheckpointConfig> {
        let config_file = Self::find_config_file(config_directory)?;

        let yaml_content = std::fs::read_to_string(&config_file)
            .map_err(|e| ConfigurationError::file_read_error(config_file.display().to_string(), e))?;

        let mut yaml_data: YamlValue = serde_yaml::from_str(&yaml_content)
            .map_err(|e| ConfigurationError::invalid_yaml(config_file.display().to_string(), e))?;

        // Apply environment-specific overrides
        if let Some(env_overrides) = yaml_data
            .get(YamlValue::String(environment.to_string()))
            .cloned()
        {
            debug!("Applying environment-specific overrides for: {environment}");
            Self::merge_yaml_values(&mut yaml_data, env_overrides)?;
        }

        // Remove environment sections so they never deserialize as config fields
        if let YamlValue::Mapping(ref mut map) = yaml_data {
            map.remove(YamlValue::String("development".to_string()));
            map.remove(YamlValue::String("test".to_string()));
            map.remove(YamlValue::String("production".to_string()));
        }

        let config: CheckpointConfig = serde_yaml::from_value(yaml_data).map_err(|e| {
            ConfigurationError::invalid_yaml(
                config_file.display().to_string(),
                format!("Failed to deserialize configuration: {e}"),
            )
        })?;

        Ok(config)
    }

    /// Recursively merge YAML values (environment overrides into base config)
    fn merge_yaml_values(base: &mut YamlValue, override_value: YamlValue) -> ConfigResult<()> {
        match (&mut *base, override_value) {
            (YamlValue::Mapping(base_map), YamlValue::Mapping(override_map)) => {
                for (key, value) in override_map {
                    if let Some(existing_value) = base_map.get_mut(&key) {
                        Self::merge_yaml_values(existing_value, value)?;
                    } else {
                        base_map.insert(key, value);
                    }
                }
            }
            (base_ref, override_val) => {
                *base_ref = override_val;
            }
        }
        Ok(())
    }

    /// Mask sensitive fields so configuration can be logged safely
    fn sanitize_config_for_logging(config: &CheckpointConfig) -> serde_json::Value {
        use serde_json::json;

        let mut config_json = json!(config);
        let sensitive_patterns = ["password", "secret", "key", "token", "credential"];
        Self::sanitize_json_recursive(&mut config_json, &sensitive_patterns);
        config_json
    }

    /// Recursively sanitize sensitive fields in JSON configuration
    fn sanitize_json_recursive(value: &mut serde_json::Value, sensitive_patterns: &[&str]) {
        match value {
            serde_json::Value::Object(map) => {
                for (key, val) in map.iter_mut() {
                    let key_lower = key.to_lowercase();
                    let is_sensitive = sensitive_patterns
                        .iter()
                        .any(|pattern| key_lower.contains(pattern));

                    if is_sensitive {
                        match val {
                            serde_json::Value::String(s) if s.is_empty() => {
                                *val = serde_json::Value::String("[EMPTY]".to_string());
                            }
                            _ => {
                                *val = serde_json::Value::String("[MASKED]".to_string());
                            }
                        }
                    } else {
                        Self::sanitize_json_recursive(val, sensitive_patterns);
                    }
                }
            }
            serde_json::Value::Array(arr) => {
                for item in arr.iter_mut() {
                    Self::sanitize_json_recursive(item, sensitive_patterns);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(dir: &Path, contents: &str) {
        let mut file = std::fs::File::create(dir.join(CONFIG_FILE_NAME)).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
    }

    const BASE_CONFIG: &str = r#"
database:
  url: null
  host: localhost
  username: checkpoints
  password: supersecret
  database: null
  pool: 10
  checkout_timeout_seconds: 10
  idle_timeout_seconds: 300

web:
  bind_address: "0.0.0.0:8080"
  request_timeout_ms: 30000
  cors:
    enabled: true
    allowed_origins: ["http://localhost:5173"]
    allowed_methods: ["GET", "POST", "PUT", "DELETE", "OPTIONS"]
    allowed_headers: ["Content-Type", "Authorization"]
  auth:
    enabled: false
    session_public_key: ""
    session_private_key: ""
    token_expiry_hours: 24
    issuer: checkpoint-service
    audience: checkpoint-players
    admin_role: game_admin

test:
  database:
    pool: 2
  web:
    bind_address: "127.0.0.1:0"
"#;

    #[test]
    fn test_load_base_configuration() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), BASE_CONFIG);

        let manager = ConfigManager::load_from_directory_with_env(
            Some(dir.path().to_path_buf()),
            "development",
        )
        .unwrap();

        assert_eq!(manager.environment(), "development");
        assert_eq!(manager.config().database.pool, 10);
        assert_eq!(manager.config().web.bind_address, "0.0.0.0:8080");
    }

    #[test]
    fn test_environment_overlay_merges_over_base() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), BASE_CONFIG);

        let manager =
            ConfigManager::load_from_directory_with_env(Some(dir.path().to_path_buf()), "test")
                .unwrap();

        // Overridden by the test section
        assert_eq!(manager.config().database.pool, 2);
        assert_eq!(manager.config().web.bind_address, "127.0.0.1:0");
        // Untouched base values survive the merge
        assert_eq!(manager.config().database.host, "localhost");
        assert_eq!(manager.config().web.auth.admin_role, "game_admin");
    }

    #[test]
    fn test_missing_config_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let result = ConfigManager::load_from_directory_with_env(
            Some(dir.path().to_path_buf()),
            "development",
        );
        assert!(matches!(
            result,
            Err(ConfigurationError::ConfigFileNotFound { .. })
        ));
    }

    #[test]
    fn test_sensitive_fields_masked_in_debug_output() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), BASE_CONFIG);

        let manager = ConfigManager::load_from_directory_with_env(
            Some(dir.path().to_path_buf()),
            "development",
        )
        .unwrap();

        let debug_json = manager.debug_config();
        let password = debug_json["database"]["password"].as_str().unwrap();
        assert_eq!(password, "[MASKED]");
        assert!(!debug_json.to_string().contains("supersecret"));
    }
}
