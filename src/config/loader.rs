//! Configuration Loader
//!
//! Environment-aware configuration loading. Handles YAML file discovery,
//! environment detection, and merging of environment-specific overrides.

use super::error::{ConfigResult, ConfigurationError};
use super::BatchConfig;
use crate::constants::{env as env_vars, files};
use serde_yaml::Value as YamlValue;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Loaded configuration together with where it came from
#[derive(Debug)]
pub struct ConfigManager {
    config: BatchConfig,
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
    /// This is useful for testing without modifying global environment variables
    pub fn load_from_directory_with_env(
        config_dir: Option<PathBuf>,
        environment: &str,
    ) -> ConfigResult<Arc<ConfigManager>> {
        let config_directory = config_dir.unwrap_or_else(|| PathBuf::from("config"));

        debug!(
            "Loading configuration for environment '{}' from directory: {}",
            environment,
            config_directory.display()
        );

        let config = Self::load_and_merge_config(&config_directory, environment)?;

        config.validate()?;

        debug!(
            "Configuration loaded successfully: {}",
            serde_json::to_string(&config).unwrap_or_else(|_| "[serialization error]".to_string())
        );

        Ok(Arc::new(ConfigManager {
            config,
            environment: environment.to_string(),
            config_directory,
        }))
    }

    /// Wrap an already-built configuration (defaults, CLI overrides, tests)
    pub fn from_config(config: BatchConfig) -> ConfigResult<Arc<ConfigManager>> {
        config.validate()?;
        Ok(Arc::new(ConfigManager {
            config,
            environment: Self::detect_environment(),
            config_directory: PathBuf::from("config"),
        }))
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Get the current environment
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Get the configuration directory
    pub fn config_directory(&self) -> &Path {
        &self.config_directory
    }

    /// Configuration rendered as JSON for display
    pub fn debug_config(&self) -> serde_json::Value {
        serde_json::to_value(&self.config).unwrap_or(serde_json::Value::Null)
    }

    /// Detect current environment from environment variables
    fn detect_environment() -> String {
        env::var(env_vars::ENVIRONMENT)
            .or_else(|_| env::var(env_vars::ENVIRONMENT_FALLBACK))
            .unwrap_or_else(|_| env_vars::DEFAULT_ENVIRONMENT.to_string())
            .to_lowercase()
    }

    /// Safely read a configuration file with resource management and size limits
    fn read_config_file_safely(path: &Path) -> ConfigResult<String> {
        const MAX_CONFIG_FILE_SIZE: u64 = 10 * 1024 * 1024; // 10MB limit

        let metadata = std::fs::metadata(path)
            .map_err(|e| ConfigurationError::file_read_error(path.display().to_string(), e))?;

        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigurationError::invalid_value(
                "file_size",
                metadata.len().to_string(),
                format!(
                    "Configuration file too large ({}MB > {}MB limit)",
                    metadata.len() / (1024 * 1024),
                    MAX_CONFIG_FILE_SIZE / (1024 * 1024)
                ),
            ));
        }

        if !metadata.is_file() {
            return Err(ConfigurationError::invalid_value(
                "file_type",
                "directory or special file".to_string(),
                "Configuration path must point to a regular file",
            ));
        }

        std::fs::read_to_string(path)
            .map_err(|e| ConfigurationError::file_read_error(path.display().to_string(), e))
    }

    /// Find the configuration file
    fn find_config_file(config_directory: &Path) -> ConfigResult<PathBuf> {
        let mut searched_paths = Vec::new();

        for name in files::CONFIG_FILE_NAMES {
            let config_path = config_directory.join(name);
            searched_paths.push(config_path.clone());

            if config_path.exists() {
                debug!("Found configuration file: {}", config_path.display());
                return Ok(config_path);
            }
        }

        Err(ConfigurationError::config_file_not_found(searched_paths))
    }

    /// Load and merge configuration with environment-specific overrides
    fn load_and_merge_config(
        config_directory: &Path,
        environment: &str,
    ) -> ConfigResult<BatchConfig> {
        let config_file = Self::find_config_file(config_directory)?;

        let yaml_content = Self::read_config_file_safely(&config_file)?;

        let mut yaml_data: YamlValue = serde_yaml::from_str(&yaml_content)
            .map_err(|e| ConfigurationError::invalid_yaml(config_file.display().to_string(), e))?;

        // An empty file is a valid "all defaults" configuration
        if yaml_data.is_null() {
            yaml_data = YamlValue::Mapping(serde_yaml::Mapping::new());
        }

        if let Some(env_overrides) = yaml_data
            .get(YamlValue::String(environment.to_string()))
            .cloned()
        {
            debug!(
                "Applying environment-specific overrides for: {}",
                environment
            );
            Self::merge_yaml_values(&mut yaml_data, env_overrides)?;
        }

        if let YamlValue::Mapping(ref mut map) = yaml_data {
            for known in env_vars::KNOWN_ENVIRONMENTS {
                map.remove(YamlValue::String(known.to_string()));
            }
            map.remove(YamlValue::String(environment.to_string()));
        }

        serde_yaml::from_value(yaml_data).map_err(|e| {
            ConfigurationError::invalid_yaml(
                config_file.display().to_string(),
                format!("Failed to deserialize configuration: {e}"),
            )
        })
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
            (YamlValue::Mapping(_), other) => {
                return Err(ConfigurationError::ConfigMergeError {
                    error: format!("Environment section must be a mapping, got {other:?}"),
                });
            }
            (base_ref, override_val) => {
                *base_ref = override_val;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use tracing::level_filters::LevelFilter;

    fn create_test_config_yaml() -> &'static str {
        r#"
extraction:
  measured_prefix: original
logging:
  file_level: info
  console_level: error
output:
  directory: /tmp/radiomics-out
projection:
  dimensions: 2
  scale_variance: true

test:
  logging:
    file_level: debug
  projection:
    dimensions: 3

production:
  extraction:
    available_cpus: 16
"#
    }

    fn setup_test_config_dir(contents: &str) -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("radiomics-batch.yaml"), contents).unwrap();
        temp_dir
    }

    #[test]
    fn test_basic_config_loading() {
        let dir = setup_test_config_dir(create_test_config_yaml());
        let manager = ConfigManager::load_from_directory_with_env(
            Some(dir.path().to_path_buf()),
            "development",
        )
        .unwrap();

        let config = manager.config();
        assert_eq!(config.logging.file_level, LevelFilter::INFO);
        assert_eq!(config.projection.dimensions, 2);
        assert_eq!(config.extraction.available_cpus, None);
        assert_eq!(manager.environment(), "development");
    }

    #[test]
    fn test_environment_specific_overrides() {
        let dir = setup_test_config_dir(create_test_config_yaml());

        let test_manager =
            ConfigManager::load_from_directory_with_env(Some(dir.path().to_path_buf()), "test")
                .unwrap();
        assert_eq!(test_manager.config().logging.file_level, LevelFilter::DEBUG);
        assert_eq!(
            test_manager.config().logging.console_level,
            LevelFilter::ERROR
        );
        assert_eq!(test_manager.config().projection.dimensions, 3);

        let prod_manager = ConfigManager::load_from_directory_with_env(
            Some(dir.path().to_path_buf()),
            "production",
        )
        .unwrap();
        assert_eq!(prod_manager.config().extraction.available_cpus, Some(16));
        assert_eq!(prod_manager.config().projection.dimensions, 2);
    }

    #[test]
    fn test_config_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let result = ConfigManager::load_from_directory_with_env(
            Some(temp_dir.path().to_path_buf()),
            "test",
        );
        assert!(matches!(
            result,
            Err(ConfigurationError::ConfigFileNotFound { .. })
        ));
    }

    #[test]
    fn test_empty_file_yields_defaults() {
        let dir = setup_test_config_dir("");
        let manager =
            ConfigManager::load_from_directory_with_env(Some(dir.path().to_path_buf()), "test")
                .unwrap();
        assert_eq!(manager.config().projection.dimensions, 2);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let dir = setup_test_config_dir("projection:\n  dimensions: 0\n");
        let result =
            ConfigManager::load_from_directory_with_env(Some(dir.path().to_path_buf()), "test");
        assert!(matches!(
            result,
            Err(ConfigurationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_invalid_yaml_is_reported_with_path() {
        let dir = setup_test_config_dir("logging: [unclosed");
        let err =
            ConfigManager::load_from_directory_with_env(Some(dir.path().to_path_buf()), "test")
                .unwrap_err();
        assert!(err.to_string().contains("radiomics-batch.yaml"));
    }
}
