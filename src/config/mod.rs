//! # Sitewatch Configuration System
//!
//! Static configuration loaded once at startup: the site roster, probe
//! timeout, daily schedule, report destination, mail transport and the HTTP
//! bind address.
//!
//! ## Architecture
//!
//! - **Layered Sources**: built-in defaults, `sitewatch.toml`, an optional
//!   per-environment override file, then `SITEWATCH__*` environment variables
//! - **Presence Validation**: [`SitewatchConfig::validate`] checks that required
//!   values exist; schedule parsing is owned by the scheduler
//! - **Safe Logging**: [`SitewatchConfig::sanitized`] masks credentials
//!
//! ## Usage
//!
//! ```rust,no_run
//! use sitewatch::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//! let timeout = manager.config().probe.timeout();
//! let sites = &manager.config().sites;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::constants;
use crate::models::Site;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

/// Root configuration structure mirroring `config/sitewatch.toml`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SitewatchConfig {
    /// Ordered roster; report rows follow this order
    pub sites: Vec<Site>,
    pub probe: ProbeConfig,
    pub schedule: ScheduleConfig,
    pub report: ReportConfig,
    pub mail: MailConfig,
    pub web: WebConfig,
}

/// Probe settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Bound on the single GET attempt per site
    pub timeout_ms: u64,
    pub user_agent: String,
}

/// Daily schedule settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Seconds-first cron expression
    pub cron: String,
    /// IANA timezone the cron expression is evaluated in
    pub timezone: String,
    /// Fire one run as soon as the scheduler starts
    pub run_on_startup: bool,
}

/// Report output settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Base directory for startup and scheduled runs
    pub output_dir: PathBuf,
    pub file_prefix: String,
    pub title: String,
}

/// Mail transport settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MailConfig {
    /// When false the notify stage logs and succeeds without sending
    pub enabled: bool,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
    pub recipients: Vec<String>,
    pub subject: String,
    pub body: String,
    /// Transport timeout; `None` keeps the transport's own default
    pub timeout_secs: Option<u64>,
}

/// HTTP trigger surface settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WebConfig {
    pub bind_address: String,
}

impl Default for SitewatchConfig {
    fn default() -> Self {
        Self {
            sites: Site::roster_from_pairs(constants::DEFAULT_SITES),
            probe: ProbeConfig::default(),
            schedule: ScheduleConfig::default(),
            report: ReportConfig::default(),
            mail: MailConfig::default(),
            web: WebConfig::default(),
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_ms: constants::probe::DEFAULT_TIMEOUT_MS,
            user_agent: constants::probe::USER_AGENT.to_string(),
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            cron: constants::schedule::DEFAULT_CRON.to_string(),
            timezone: constants::schedule::DEFAULT_TIMEZONE.to_string(),
            run_on_startup: true,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(constants::report::DEFAULT_OUTPUT_DIR),
            file_prefix: constants::report::DEFAULT_FILE_PREFIX.to_string(),
            title: constants::report::DEFAULT_TITLE.to_string(),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            smtp_host: constants::mail::DEFAULT_SMTP_HOST.to_string(),
            smtp_port: constants::mail::DEFAULT_SMTP_PORT,
            username: String::new(),
            password: String::new(),
            from: String::new(),
            recipients: Vec::new(),
            subject: constants::mail::DEFAULT_SUBJECT.to_string(),
            body: constants::mail::DEFAULT_BODY.to_string(),
            timeout_secs: None,
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind_address: constants::web::DEFAULT_BIND_ADDRESS.to_string(),
        }
    }
}

impl ProbeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl MailConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl SitewatchConfig {
    /// Presence checks only. Schedule syntax is validated by the scheduler.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.sites.is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "sites",
                "roster",
            ));
        }

        for (index, site) in self.sites.iter().enumerate() {
            if site.name.trim().is_empty() {
                return Err(ConfigurationError::missing_required_field(
                    format!("sites[{index}].name"),
                    "roster",
                ));
            }
            if !(site.url.starts_with("http://") || site.url.starts_with("https://")) {
                return Err(ConfigurationError::invalid_value(
                    format!("sites[{index}].url"),
                    site.url.clone(),
                    "must be an absolute http or https URL",
                ));
            }
        }

        if self.probe.timeout_ms == 0 {
            return Err(ConfigurationError::invalid_value(
                "probe.timeout_ms",
                "0",
                "timeout must be greater than zero",
            ));
        }

        if self.report.file_prefix.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "report.file_prefix",
                "report",
            ));
        }

        if self.web.bind_address.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "web.bind_address",
                "web",
            ));
        }

        if self.mail.enabled {
            if self.mail.smtp_host.trim().is_empty() {
                return Err(ConfigurationError::missing_required_field(
                    "mail.smtp_host",
                    "mail",
                ));
            }
            if self.mail.from.trim().is_empty() {
                return Err(ConfigurationError::missing_required_field(
                    "mail.from",
                    "mail",
                ));
            }
            if self.mail.recipients.is_empty() {
                return Err(ConfigurationError::missing_required_field(
                    "mail.recipients",
                    "mail",
                ));
            }
        }

        Ok(())
    }

    /// JSON view of the configuration with credentials masked
    pub fn sanitized(&self) -> serde_json::Value {
        let mut value = serde_json::json!(self);
        sanitize_json_recursive(&mut value, SENSITIVE_PATTERNS);
        value
    }
}

const SENSITIVE_PATTERNS: &[&str] = &["password", "secret", "key", "token", "credential", "auth"];

fn sanitize_json_recursive(value: &mut serde_json::Value, sensitive_patterns: &[&str]) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, val) in map.iter_mut() {
                let key_lower = key.to_lowercase();
                let is_sensitive = sensitive_patterns
                    .iter()
                    .any(|pattern| key_lower.contains(pattern));

                if is_sensitive {
                    *val = mask_value(val);
                } else {
                    sanitize_json_recursive(val, sensitive_patterns);
                }
            }
        }
        serde_json::Value::Array(items) => {
            for item in items.iter_mut() {
                sanitize_json_recursive(item, sensitive_patterns);
            }
        }
        _ => {}
    }
}

fn mask_value(value: &serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::String(s) if s.is_empty() => {
            serde_json::Value::String("[EMPTY]".to_string())
        }
        serde_json::Value::String(s) => {
            let chars: Vec<char> = s.chars().collect();
            let masked = if chars.len() > 4 {
                let head: String = chars[..2].iter().collect();
                let tail: String = chars[chars.len() - 2..].iter().collect();
                format!("{head}***{tail}")
            } else {
                "***".to_string()
            };
            serde_json::Value::String(format!("[MASKED: {masked}]"))
        }
        _ => serde_json::Value::String("[MASKED]".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mail_ready() -> SitewatchConfig {
        let mut config = SitewatchConfig::default();
        config.mail.from = "reports@example.com".to_string();
        config.mail.recipients = vec!["ops@example.com".to_string()];
        config
    }

    #[test]
    fn test_defaults_match_reference_deployment() {
        let config = SitewatchConfig::default();
        assert_eq!(config.sites.len(), 5);
        assert_eq!(config.sites[0], Site::new("SCPL", "https://scpl.biz/"));
        assert_eq!(config.sites[4].name, "CETL");
        assert_eq!(config.probe.timeout(), Duration::from_millis(5000));
        assert_eq!(config.schedule.cron, "0 0 12 * * *");
        assert_eq!(config.schedule.timezone, "Asia/Kolkata");
        assert_eq!(config.report.file_prefix, "Website_Status_Report");
        assert_eq!(config.web.bind_address, "0.0.0.0:3000");
    }

    #[test]
    fn test_validate_requires_mail_fields_only_when_enabled() {
        let config = SitewatchConfig::default();
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::MissingRequiredField { ref field, .. } if field == "mail.from"
        ));

        let mut disabled = SitewatchConfig::default();
        disabled.mail.enabled = false;
        assert!(disabled.validate().is_ok());

        assert!(mail_ready().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_roster() {
        let mut config = mail_ready();
        config.sites.clear();
        assert!(config.validate().is_err());

        let mut config = mail_ready();
        config.sites.push(Site::new("ftp", "ftp://files.example.com/"));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("sites[5].url"));

        let mut config = mail_ready();
        config.probe.timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_sanitized_masks_credentials() {
        let mut config = mail_ready();
        config.mail.username = "tech.support@example.com".to_string();
        config.mail.password = "tzbh kngd yfaz dbwt".to_string();

        let view = config.sanitized();
        assert_eq!(view["mail"]["password"], "[MASKED: tz***wt]");
        // Non-sensitive values survive untouched
        assert_eq!(view["mail"]["username"], "tech.support@example.com");
        assert_eq!(view["sites"][0]["name"], "SCPL");
        assert!(!view.to_string().contains("kngd"));
    }
}
