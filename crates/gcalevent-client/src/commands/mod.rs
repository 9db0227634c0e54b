//! Subcommand implementations.
//!
//! Event and recording commands return the text to print so they can be
//! exercised against the in-memory backends.

pub mod config;
pub mod events;
pub mod recordings;

use std::sync::Arc;

use gcalevent_providers::{EventManager, MemoryCalendar, MemoryFileStore};
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::ClientResult;

/// Builds a manager over the in-memory backends.
pub fn dry_run_manager(config: &ClientConfig) -> EventManager {
    debug!("Using in-memory backends");
    EventManager::new(Arc::new(MemoryCalendar::new()))
        .with_file_store(Arc::new(MemoryFileStore::new()))
        .with_options(config.defaults.normalize_options())
        .with_default_calendar(&config.defaults.calendar_id)
}

/// Builds a manager over the Google Calendar and Drive APIs.
///
/// Drive is only attached when the configured scopes grant read access.
#[cfg(feature = "google")]
pub fn google_manager(
    config: &ClientConfig,
    access_token: Option<&str>,
) -> ClientResult<EventManager> {
    use gcalevent_core::config::DRIVE_READONLY_SCOPE;
    use gcalevent_providers::google::{GoogleCalendarService, GoogleConfig, GoogleDriveStore};
    use gcalevent_providers::{AccessTokenSource, StaticToken};

    let spec = config.google.to_config_spec()?;
    let token = config.google.resolve_access_token(access_token)?;
    let tokens: Arc<dyn AccessTokenSource> = Arc::new(StaticToken::new(token));

    let google = GoogleConfig::from_spec(&spec);
    google.validate()?;

    let mut manager = EventManager::new(Arc::new(GoogleCalendarService::new(
        &google,
        tokens.clone(),
    )?))
    .with_options(config.defaults.normalize_options())
    .with_default_calendar(&config.defaults.calendar_id);

    if spec.has_scope(DRIVE_READONLY_SCOPE) {
        manager = manager.with_file_store(Arc::new(GoogleDriveStore::new(&google, tokens)?));
    } else {
        debug!("Drive scope not configured, recordings are unavailable");
    }

    debug!(app_name = spec.app_name(), "Using Google backends");
    Ok(manager)
}

#[cfg(not(feature = "google"))]
pub fn google_manager(
    _config: &ClientConfig,
    _access_token: Option<&str>,
) -> ClientResult<EventManager> {
    Err(crate::error::ClientError::Config(
        "built without Google support; use --dry-run".to_string(),
    ))
}

/// Picks the backends for this invocation.
pub fn manager(
    config: &ClientConfig,
    dry_run: bool,
    access_token: Option<&str>,
) -> ClientResult<EventManager> {
    if dry_run {
        Ok(dry_run_manager(config))
    } else {
        google_manager(config, access_token)
    }
}
