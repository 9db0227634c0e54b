//! Google backend configuration.

use std::time::Duration;

use gcalevent_core::ConfigSpec;
use url::Url;

use crate::error::{ProviderError, ProviderResult};

/// Base URL for Google Calendar API v3.
pub const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Base URL for Google Drive API v3.
pub const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";

/// Settings shared by the Calendar and Drive backends.
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    /// Application name, sent in the user agent.
    pub app_name: String,
    pub calendar_base_url: String,
    pub drive_base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl GoogleConfig {
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    pub fn new(app_name: impl Into<String>) -> Self {
        let app_name = app_name.into();
        Self {
            user_agent: format!("{app_name} gcalevent/{}", env!("CARGO_PKG_VERSION")),
            app_name,
            calendar_base_url: CALENDAR_API_BASE.to_string(),
            drive_base_url: DRIVE_API_BASE.to_string(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Builds the configuration from a validated [`ConfigSpec`].
    pub fn from_spec(spec: &ConfigSpec) -> Self {
        Self::new(spec.app_name())
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Points both backends at other hosts, e.g. a local test server.
    #[must_use]
    pub fn with_base_urls(
        mut self,
        calendar: impl Into<String>,
        drive: impl Into<String>,
    ) -> Self {
        self.calendar_base_url = calendar.into();
        self.drive_base_url = drive.into();
        self
    }

    /// Checks that both base URLs are absolute http(s) URLs.
    pub fn validate(&self) -> ProviderResult<()> {
        for (name, raw) in [
            ("calendar", &self.calendar_base_url),
            ("drive", &self.drive_base_url),
        ] {
            let url = Url::parse(raw).map_err(|e| {
                ProviderError::configuration(format!("invalid {name} base URL {raw:?}: {e}"))
            })?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(ProviderError::configuration(format!(
                    "{name} base URL must be http or https, got {}",
                    url.scheme()
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn http_client(&self) -> ProviderResult<reqwest::Client> {
        self.validate()?;
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .build()
            .map_err(|e| {
                ProviderError::configuration(format!("failed to create HTTP client: {e}"))
                    .with_source(e)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gcalevent_core::ConfigInput;

    #[test]
    fn config_from_spec() {
        let spec = ConfigSpec::new(ConfigInput {
            app_name: Some("Team Scheduler".into()),
            credentials_path: Some("/tmp/creds.json".into()),
            ..ConfigInput::default()
        })
        .unwrap();
        let config = GoogleConfig::from_spec(&spec);
        assert_eq!(config.app_name, "Team Scheduler");
        assert!(config.user_agent.starts_with("Team Scheduler gcalevent/"));
        assert_eq!(config.calendar_base_url, CALENDAR_API_BASE);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn base_urls_are_validated() {
        let config = GoogleConfig::new("app");
        assert!(config.validate().is_ok());

        let bad = GoogleConfig::new("app").with_base_urls("not a url", DRIVE_API_BASE);
        assert!(bad.validate().is_err());

        let ftp = GoogleConfig::new("app").with_base_urls("ftp://example.com", DRIVE_API_BASE);
        assert!(ftp.validate().is_err());
    }
}
