//! Settings file and environment secrets.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use farewatch_core::{EmailConfig, SchedulerOptions, TelegramConfig, Template};
use farewatch_provider::ClientConfig;
use serde::{Deserialize, Serialize};

/// Environment variable holding the provider API key.
pub const PROVIDER_KEY_VAR: &str = "FAREWATCH_PROVIDER_KEY";
/// Environment variable holding the email API key.
pub const EMAIL_KEY_VAR: &str = "FAREWATCH_EMAIL_KEY";
/// Environment variable holding the Telegram bot token.
pub const TELEGRAM_TOKEN_VAR: &str = "FAREWATCH_TELEGRAM_TOKEN";

/// Application settings loaded from `settings.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// `SQLite` database file. Defaults to the data directory.
    pub database_path: Option<PathBuf>,
    /// Where the latest raw provider payload is written.
    pub snapshot_path: Option<PathBuf>,
    /// Extra airport data merged over the embedded list.
    pub airports_path: Option<PathBuf>,
    /// Flight-pricing provider.
    pub provider: ClientConfig,
    /// Email delivery.
    pub email: EmailConfig,
    /// Telegram delivery.
    pub telegram: TelegramConfig,
    /// Run cadence and tuning.
    pub scheduler: ScheduleSettings,
    /// Notification templates.
    pub templates: Template,
}

/// Daemon cadence plus scheduler tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleSettings {
    /// Cron expression with seconds, evaluated in local time.
    pub cron: String,
    /// Scheduler tuning.
    #[serde(flatten)]
    pub options: SchedulerOptions,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            cron: "0 0 8 * * *".to_string(),
            options: SchedulerOptions::default(),
        }
    }
}

impl Settings {
    /// Loads settings from `path`, or from the default location.
    ///
    /// A missing file at the default location yields defaults; a missing
    /// explicit path is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (default_settings_path(), false),
        };

        if !explicit && !path.exists() {
            tracing::debug!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        let settings = serde_json::from_str(&contents)
            .with_context(|| format!("Invalid settings in {}", path.display()))?;
        tracing::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Database path, defaulting to the data directory.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| data_dir().join("farewatch.db"))
    }

    /// Snapshot path, defaulting to the data directory.
    #[must_use]
    pub fn snapshot_path(&self) -> PathBuf {
        self.snapshot_path
            .clone()
            .unwrap_or_else(|| data_dir().join("latest_snapshot.json"))
    }
}

/// Secrets read from the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Secrets {
    /// Provider API key.
    pub provider_key: Option<String>,
    /// Email API key.
    pub email_key: Option<String>,
    /// Telegram bot token.
    pub telegram_token: Option<String>,
}

impl Secrets {
    /// Reads secrets from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads secrets through `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Self {
            provider_key: get(PROVIDER_KEY_VAR),
            email_key: get(EMAIL_KEY_VAR),
            telegram_token: get(TELEGRAM_TOKEN_VAR),
        }
    }
}

fn default_settings_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("farewatch")
        .join("settings.json")
}

/// Application data directory.
pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("farewatch")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_settings_fill_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "database_path": "/tmp/fw.db",
                "provider": {{ "location": "PL" }},
                "scheduler": {{ "cron": "0 30 7 * * *", "retention_days": null }}
            }}"#
        )
        .unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.database_path(), PathBuf::from("/tmp/fw.db"));
        assert_eq!(settings.provider.location.as_deref(), Some("PL"));
        assert_eq!(settings.scheduler.cron, "0 30 7 * * *");
        assert_eq!(settings.scheduler.options.retention_days, None);
        assert_eq!(settings.scheduler.options.dispatch_pacing_secs, 2);
        assert_eq!(settings.telegram, TelegramConfig::default());
    }

    #[test]
    fn test_missing_explicit_path_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Settings::load(Some(&dir.path().join("nope.json"))).is_err());
    }

    #[test]
    fn test_invalid_json_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = Settings::load(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("Invalid settings"));
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.scheduler.cron, "0 0 8 * * *");
        assert!(settings.database_path().ends_with("farewatch/farewatch.db"));
        assert!(settings.snapshot_path().ends_with("farewatch/latest_snapshot.json"));
    }

    #[test]
    fn test_blank_secrets_are_unset() {
        let secrets = Secrets::from_lookup(|name| match name {
            PROVIDER_KEY_VAR => Some(" abc ".into()),
            EMAIL_KEY_VAR => Some("   ".into()),
            _ => None,
        });
        assert_eq!(secrets.provider_key.as_deref(), Some("abc"));
        assert_eq!(secrets.email_key, None);
        assert_eq!(secrets.telegram_token, None);
    }
}
