//! Validated application configuration for the calendar service.
//!
//! [`ConfigSpec::new`] checks everything eagerly, so a missing application
//! name or incomplete credential material fails before any client is built.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, ValidationResult};

/// Full read/write access to calendars.
pub const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";

/// Read-only access to stored files, enough to find recordings.
pub const DRIVE_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/drive.readonly";

/// Access type requested when none is configured.
pub const DEFAULT_ACCESS_TYPE: &str = "offline";

/// Unvalidated configuration, as read from a file or built by hand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigInput {
    pub app_name: Option<String>,
    pub credentials_path: Option<PathBuf>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,
    pub access_type: Option<String>,
    pub scopes: Option<Vec<String>>,
    pub token_path: Option<PathBuf>,
}

/// Where OAuth client credentials come from.
#[derive(Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// A downloaded client credentials file.
    File(PathBuf),
    /// Credentials given inline.
    Client {
        client_id: String,
        client_secret: String,
        redirect_uri: String,
    },
}

impl fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => f.debug_tuple("File").field(path).finish(),
            Self::Client {
                client_id,
                redirect_uri,
                ..
            } => f
                .debug_struct("Client")
                .field("client_id", client_id)
                .field("client_secret", &"<redacted>")
                .field("redirect_uri", redirect_uri)
                .finish(),
        }
    }
}

/// Validated configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSpec {
    app_name: String,
    credentials: CredentialSource,
    access_type: String,
    scopes: Vec<String>,
    token_path: Option<PathBuf>,
}

impl ConfigSpec {
    /// Validates `input`.
    ///
    /// A credentials file takes precedence over inline client values. Without
    /// a file, all three of client id, secret and redirect URI are required.
    pub fn new(input: ConfigInput) -> ValidationResult<Self> {
        let app_name =
            non_blank(input.app_name).ok_or(ValidationError::MissingConfig("app_name"))?;

        let credentials = match input.credentials_path.filter(|p| !p.as_os_str().is_empty()) {
            Some(path) => CredentialSource::File(path),
            None => CredentialSource::Client {
                client_id: non_blank(input.client_id)
                    .ok_or(ValidationError::MissingConfig("client_id"))?,
                client_secret: non_blank(input.client_secret)
                    .ok_or(ValidationError::MissingConfig("client_secret"))?,
                redirect_uri: non_blank(input.redirect_uri)
                    .ok_or(ValidationError::MissingConfig("redirect_uri"))?,
            },
        };

        let scopes = input
            .scopes
            .map(|scopes| {
                scopes
                    .into_iter()
                    .filter_map(|s| non_blank(Some(s)))
                    .collect::<Vec<_>>()
            })
            .filter(|scopes| !scopes.is_empty())
            .unwrap_or_else(|| vec![CALENDAR_SCOPE.to_string()]);

        Ok(Self {
            app_name,
            credentials,
            access_type: non_blank(input.access_type)
                .unwrap_or_else(|| DEFAULT_ACCESS_TYPE.to_string()),
            scopes,
            token_path: input.token_path,
        })
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn credentials(&self) -> &CredentialSource {
        &self.credentials
    }

    pub fn access_type(&self) -> &str {
        &self.access_type
    }

    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    pub fn token_path(&self) -> Option<&PathBuf> {
        self.token_path.as_ref()
    }

    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.iter().any(|s| s == scope)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
