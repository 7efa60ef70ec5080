//! Configuration Loader
//!
//! Environment-aware configuration loading built on the `config` crate.
//! Sources are layered lowest to highest priority:
//!
//! 1. [`SitewatchConfig::default`]
//! 2. `<dir>/sitewatch.toml`
//! 3. `<dir>/sitewatch.<environment>.toml`
//! 4. `SITEWATCH__SECTION__KEY` environment variables

use super::error::{ConfigResult, ConfigurationError};
use super::SitewatchConfig;
use config::{Config, Environment, File};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

const BASE_FILE: &str = "sitewatch.toml";
const ENV_PREFIX: &str = "SITEWATCH";
const ENV_SEPARATOR: &str = "__";

/// Loaded, validated configuration plus where it came from
#[derive(Debug)]
pub struct ConfigManager {
    config: SitewatchConfig,
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

    /// Load configuration from a specific directory with explicit environment.
    ///
    /// A missing directory is only an error when it was requested explicitly;
    /// the default `config/` directory may be absent, in which case defaults
    /// and environment variables apply.
    pub fn load_from_directory_with_env(
        config_dir: Option<PathBuf>,
        environment: &str,
    ) -> ConfigResult<Arc<ConfigManager>> {
        let explicit = config_dir.is_some();
        let config_directory = config_dir.unwrap_or_else(Self::default_config_directory);

        if explicit && !config_directory.is_dir() {
            return Err(ConfigurationError::directory_not_found(config_directory));
        }

        debug!(
            "Loading configuration for environment '{}' from directory: {}",
            environment,
            config_directory.display()
        );

        let config = Self::load_layers(&config_directory, environment)?;
        config.validate()?;

        debug!(
            "Configuration loaded: {}",
            serde_json::to_string_pretty(&config.sanitized())
                .unwrap_or_else(|_| "[serialization error]".to_string())
        );

        info!(
            environment = environment,
            sites = config.sites.len(),
            timezone = %config.schedule.timezone,
            cron = %config.schedule.cron,
            mail_enabled = config.mail.enabled,
            "✅ CONFIG: Configuration loaded successfully"
        );

        Ok(Arc::new(ConfigManager {
            config,
            environment: environment.to_string(),
            config_directory,
        }))
    }

    /// Merge every source into a [`SitewatchConfig`] without validating it
    pub fn load_layers(config_directory: &Path, environment: &str) -> ConfigResult<SitewatchConfig> {
        let defaults = Config::try_from(&SitewatchConfig::default())
            .map_err(|e| ConfigurationError::load_error(environment, e))?;

        let base_file = config_directory.join(BASE_FILE);
        let env_file = config_directory.join(format!("sitewatch.{environment}.toml"));

        Config::builder()
            .add_source(defaults)
            .add_source(File::from(base_file).required(false))
            .add_source(File::from(env_file).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR)
                    .list_separator(",")
                    .with_list_parse_key("mail.recipients")
                    .try_parsing(true),
            )
            .build()
            .and_then(|built| built.try_deserialize::<SitewatchConfig>())
            .map_err(|e| ConfigurationError::load_error(environment, e))
    }

    /// Build a manager around an already constructed configuration
    pub fn from_config(config: SitewatchConfig, environment: &str) -> ConfigResult<Arc<Self>> {
        config.validate()?;
        Ok(Arc::new(Self {
            config,
            environment: environment.to_string(),
            config_directory: Self::default_config_directory(),
        }))
    }

    pub fn config(&self) -> &SitewatchConfig {
        &self.config
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn config_directory(&self) -> &Path {
        &self.config_directory
    }

    /// Sanitized configuration for logging and the validator binary
    pub fn debug_config(&self) -> serde_json::Value {
        self.config.sanitized()
    }

    /// `SITEWATCH_ENV || APP_ENV || development`
    pub fn detect_environment() -> String {
        env::var("SITEWATCH_ENV")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string())
            .to_lowercase()
    }

    /// `SITEWATCH_CONFIG_DIR` if set, otherwise `./config`
    fn default_config_directory() -> PathBuf {
        env::var("SITEWATCH_CONFIG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config"))
    }
}
