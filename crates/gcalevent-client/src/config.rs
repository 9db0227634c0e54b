//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/gcalevent/config.toml` by default.
//!
//! Credential values (`client_id`, `client_secret`, `access_token`) support
//! secret references:
//! - `pass::path/in/store`: resolved via `pass show`
//! - `env::VAR_NAME`: resolved from the environment
//! - plain text: used as-is

use std::path::{Path, PathBuf};

use gcalevent_core::query::DEFAULT_MAX_RESULTS;
use gcalevent_core::recording::{DEFAULT_RECORDING_MIME, DEFAULT_RECORDINGS_FOLDER};
use gcalevent_core::time::DEFAULT_TIMEZONE;
use gcalevent_core::{
    ConfigInput, ConfigSpec, NormalizeOptions, RecordingQuery, DEFAULT_CALENDAR_ID,
};
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

// ---------------------------------------------------------------------------
// ClientConfig (config.toml)
// ---------------------------------------------------------------------------

/// Configuration for the gcalevent client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Google API settings.
    pub google: GoogleSettings,

    /// Defaults applied to event operations.
    pub defaults: DefaultSettings,

    /// Recording lookup settings.
    pub recordings: RecordingSettings,

    /// Debug mode.
    pub debug: bool,
}

/// Defaults applied when a command does not say otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultSettings {
    /// Calendar used when `--calendar` is not given.
    pub calendar_id: String,

    /// IANA zone for drafts that do not name one.
    pub timezone: String,

    /// Page size for listings.
    pub max_results: u32,
}

impl Default for DefaultSettings {
    fn default() -> Self {
        Self {
            calendar_id: DEFAULT_CALENDAR_ID.to_string(),
            timezone: DEFAULT_TIMEZONE.to_string(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

impl DefaultSettings {
    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions::new(&self.timezone)
    }
}

/// Where Meet recordings are looked up.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingSettings {
    /// Drive folder holding recordings.
    pub folder: String,

    /// MIME type of recording files.
    pub mime_type: String,
}

impl Default for RecordingSettings {
    fn default() -> Self {
        Self {
            folder: DEFAULT_RECORDINGS_FOLDER.to_string(),
            mime_type: DEFAULT_RECORDING_MIME.to_string(),
        }
    }
}

impl RecordingSettings {
    /// Builds the lookup, letting command-line values win.
    pub fn to_query(&self, folder: Option<&str>, mime_type: Option<&str>) -> RecordingQuery {
        RecordingQuery::new(
            folder.unwrap_or(self.folder.as_str()),
            mime_type.unwrap_or(self.mime_type.as_str()),
        )
    }
}

impl ClientConfig {
    /// Loads configuration from the default path.
    pub fn load() -> Result<Self, String> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content =
            std::fs::read_to_string(path).map_err(|e| format!("failed to read config: {}", e))?;
        toml::from_str(&content).map_err(|e| format!("failed to parse config: {}", e))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gcalevent")
    }

    /// Returns a copy safe to print: literal secrets are masked, secret
    /// references are kept.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        for value in [
            &mut copy.google.client_secret,
            &mut copy.google.access_token,
        ] {
            if let Some(secret) = value.as_mut() {
                if !crate::secret::is_reference(secret) {
                    *secret = "<redacted>".to_string();
                }
            }
        }
        copy
    }
}

// ---------------------------------------------------------------------------
// GoogleSettings (in config.toml, including credentials)
// ---------------------------------------------------------------------------

/// Google API settings.
///
/// Credentials are stored inline and support secret references
/// (`pass::…`, `env::…`).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GoogleSettings {
    /// Application name sent with every request.
    pub app_name: Option<String>,

    /// Downloaded OAuth client credentials file.
    pub credentials_file: Option<PathBuf>,

    /// OAuth client ID (supports `pass::` and `env::` prefixes).
    pub client_id: Option<String>,

    /// OAuth client secret (supports `pass::` and `env::` prefixes).
    pub client_secret: Option<String>,

    /// OAuth redirect URI.
    pub redirect_uri: Option<String>,

    /// OAuth access type, `offline` by default.
    pub access_type: Option<String>,

    /// OAuth scopes; the Calendar scope when empty.
    pub scopes: Option<Vec<String>>,

    /// Where an external authorizer keeps its tokens.
    pub token_path: Option<PathBuf>,

    /// Access token (supports `pass::` and `env::` prefixes).
    pub access_token: Option<String>,
}

impl GoogleSettings {
    /// Converts to the unvalidated core configuration, resolving secret
    /// references.
    pub fn to_config_input(&self) -> Result<ConfigInput, String> {
        let resolve = |name: &str, value: &Option<String>| -> Result<Option<String>, String> {
            value
                .as_deref()
                .map(|raw| {
                    crate::secret::resolve(raw)
                        .map_err(|e| format!("failed to resolve {}: {}", name, e))
                })
                .transpose()
        };

        Ok(ConfigInput {
            app_name: self.app_name.clone(),
            credentials_path: self.credentials_file.clone(),
            client_id: resolve("client_id", &self.client_id)?,
            client_secret: resolve("client_secret", &self.client_secret)?,
            redirect_uri: self.redirect_uri.clone(),
            access_type: self.access_type.clone(),
            scopes: self.scopes.clone(),
            token_path: self.token_path.clone(),
        })
    }

    /// Validates the settings into a [`ConfigSpec`].
    pub fn to_config_spec(&self) -> ClientResult<ConfigSpec> {
        let input = self.to_config_input().map_err(ClientError::Config)?;
        ConfigSpec::new(input).map_err(|e| ClientError::Config(e.to_string()))
    }

    /// Resolves the access token, preferring `flag` over the configured value.
    pub fn resolve_access_token(&self, flag: Option<&str>) -> ClientResult<String> {
        let raw = flag
            .filter(|t| !t.trim().is_empty())
            .or(self.access_token.as_deref())
            .ok_or_else(|| {
                ClientError::AuthRequired(format!(
                    "no access token. Pass --access-token, set GCALEVENT_ACCESS_TOKEN, \
                     or add to {}:\n  \
                     [google]\n  \
                     access_token = \"env::MY_TOKEN_VAR\"",
                    ClientConfig::default_path().display()
                ))
            })?;
        crate::secret::resolve(raw)
            .map_err(|e| ClientError::Config(format!("failed to resolve access_token: {}", e)))
    }
}
