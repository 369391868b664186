//! Wiring of collaborators from settings and secrets.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use farewatch_core::{
    AirportDirectory, Dispatcher, HttpEmailTransport, ProviderSource, Scheduler, SqliteStore,
    TelegramTransport,
};
use farewatch_provider::Client;
use tracing::{info, warn};

use crate::settings::{PROVIDER_KEY_VAR, Secrets, Settings};

/// Opens the preference database, creating its directory.
pub async fn open_store(settings: &Settings) -> Result<Arc<SqliteStore>> {
    let path = settings.database_path();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let path_str = path
        .to_str()
        .with_context(|| format!("Database path is not UTF-8: {}", path.display()))?;
    let store = SqliteStore::new(path_str)
        .await
        .with_context(|| format!("Failed to open database {}", path.display()))?;
    Ok(Arc::new(store))
}

/// Embedded airports, extended with the configured airport file.
pub fn load_airports(settings: &Settings) -> Result<AirportDirectory> {
    let mut directory = AirportDirectory::embedded().context("Embedded airport data is invalid")?;
    if let Some(path) = &settings.airports_path {
        let count = directory
            .load_file(path)
            .with_context(|| format!("Failed to load airports from {}", path.display()))?;
        info!("Loaded {count} extra airports");
    }
    Ok(directory)
}

/// Registers a transport for every channel that has credentials.
pub fn build_dispatcher(settings: &Settings, secrets: &Secrets) -> Result<Dispatcher> {
    let mut dispatcher = Dispatcher::new();

    match &secrets.email_key {
        Some(key) if settings.email.is_configured() => {
            let transport = HttpEmailTransport::new(&settings.email, key.clone())
                .context("Invalid email settings")?;
            dispatcher.register(Arc::new(transport));
        }
        Some(_) => warn!("Email key set but email endpoint or sender missing, email disabled"),
        None => {}
    }

    if let Some(token) = &secrets.telegram_token {
        let transport =
            TelegramTransport::new(&settings.telegram, token).context("Invalid telegram settings")?;
        dispatcher.register(Arc::new(transport));
    }

    Ok(dispatcher)
}

/// Builds the scheduler with the provider source and configured transports.
pub fn build_scheduler(
    settings: &Settings,
    secrets: &Secrets,
    store: Arc<SqliteStore>,
) -> Result<Scheduler> {
    let Some(provider_key) = &secrets.provider_key else {
        bail!("{PROVIDER_KEY_VAR} is not set");
    };

    let client = Client::new(settings.provider.clone(), provider_key.clone())
        .context("Invalid provider settings")?;
    let source = ProviderSource::new(client).with_snapshot_path(settings.snapshot_path());

    let dispatcher = build_dispatcher(settings, secrets)?;
    if !dispatcher.supports(farewatch_core::ChannelMethod::Email)
        && !dispatcher.supports(farewatch_core::ChannelMethod::Telegram)
    {
        warn!("No notification transport configured, matches will be kept until one is");
    }

    Ok(Scheduler::new(
        store,
        Arc::new(source),
        dispatcher,
        settings.templates.clone(),
        settings.scheduler.options.clone(),
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use farewatch_core::ChannelMethod;

    #[test]
    fn test_dispatcher_only_has_configured_channels() {
        let mut settings = Settings::default();
        let secrets = Secrets {
            provider_key: None,
            email_key: Some("key".into()),
            telegram_token: Some("123:abc".into()),
        };

        let dispatcher = build_dispatcher(&settings, &secrets).unwrap();
        assert!(!dispatcher.supports(ChannelMethod::Email));
        assert!(dispatcher.supports(ChannelMethod::Telegram));

        settings.email.endpoint = "https://mail.example.com/emails:send".into();
        settings.email.sender = "DoNotReply@example.com".into();
        let dispatcher = build_dispatcher(&settings, &secrets).unwrap();
        assert!(dispatcher.supports(ChannelMethod::Email));
    }

    #[tokio::test]
    async fn test_scheduler_requires_provider_key() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            database_path: Some(dir.path().join("db").join("farewatch.db")),
            ..Settings::default()
        };
        let store = open_store(&settings).await.unwrap();

        let err = build_scheduler(&settings, &Secrets::default(), store.clone())
            .err()
            .unwrap();
        assert!(err.to_string().contains(PROVIDER_KEY_VAR));

        let secrets = Secrets {
            provider_key: Some("key".into()),
            ..Secrets::default()
        };
        assert!(build_scheduler(&settings, &secrets, store).is_ok());
    }

    #[test]
    fn test_missing_airport_file_is_error() {
        let settings = Settings {
            airports_path: Some("/nonexistent/airports.json".into()),
            ..Settings::default()
        };
        assert!(load_airports(&settings).is_err());
        assert!(load_airports(&Settings::default()).unwrap().len() > 50);
    }
}
