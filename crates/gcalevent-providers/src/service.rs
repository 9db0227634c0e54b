//! The narrow interfaces the event manager talks to.
//!
//! [`CalendarService`] covers the five event calls plus calendar listing;
//! [`FileStore`] covers the file lookups needed to find recordings. Both
//! are object-safe so the manager can hold `Arc<dyn ...>` and tests can
//! swap in the in-memory backends from [`crate::memory`].

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use gcalevent_core::{DriveQuery, EventListQuery, EventWire, FileRecord, RemoteEvent, WriteOptions};

use crate::error::{ProviderError, ProviderResult};

/// A boxed future for async trait methods.
///
/// Boxing keeps the traits object-safe.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A calendar visible to the authenticated account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarInfo {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub is_primary: bool,
    /// IANA zone identifier.
    pub timezone: Option<String>,
    /// `owner`, `writer`, `reader` or `freeBusyReader`.
    pub access_role: Option<String>,
}

impl CalendarInfo {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            is_primary: false,
            timezone: None,
            access_role: None,
        }
    }

    pub fn with_primary(mut self, is_primary: bool) -> Self {
        self.is_primary = is_primary;
        self
    }

    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }

    pub fn with_access_role(mut self, role: impl Into<String>) -> Self {
        self.access_role = Some(role.into());
        self
    }

    /// Whether events on this calendar can be created or changed.
    pub fn is_writable(&self) -> bool {
        matches!(self.access_role.as_deref(), Some("owner" | "writer"))
    }
}

/// Event operations of a remote calendar.
///
/// Implementations report failures as [`ProviderError`]s and never retry.
pub trait CalendarService: Send + Sync {
    /// Backend name used in error context (e.g. "google-calendar").
    fn name(&self) -> &str;

    /// Creates an event.
    fn insert_event<'a>(
        &'a self,
        calendar_id: &'a str,
        event: &'a EventWire,
        options: WriteOptions,
    ) -> BoxFuture<'a, ProviderResult<RemoteEvent>>;

    fn get_event<'a>(
        &'a self,
        calendar_id: &'a str,
        event_id: &'a str,
    ) -> BoxFuture<'a, ProviderResult<RemoteEvent>>;

    /// Replaces an event with `event`, which should be a fetched record
    /// with changes merged in.
    fn update_event<'a>(
        &'a self,
        calendar_id: &'a str,
        event_id: &'a str,
        event: &'a RemoteEvent,
        options: WriteOptions,
    ) -> BoxFuture<'a, ProviderResult<RemoteEvent>>;

    fn delete_event<'a>(
        &'a self,
        calendar_id: &'a str,
        event_id: &'a str,
        send_updates: bool,
    ) -> BoxFuture<'a, ProviderResult<()>>;

    /// Lists events matching `query`, at most `query.max_results` of them.
    fn list_events<'a>(
        &'a self,
        query: &'a EventListQuery,
    ) -> BoxFuture<'a, ProviderResult<Vec<RemoteEvent>>>;

    fn list_calendars(&self) -> BoxFuture<'_, ProviderResult<Vec<CalendarInfo>>>;
}

/// File lookups on a remote storage service.
pub trait FileStore: Send + Sync {
    fn name(&self) -> &str;

    /// Lists files matching every clause of `query`.
    fn search_files<'a>(
        &'a self,
        query: &'a DriveQuery,
    ) -> BoxFuture<'a, ProviderResult<Vec<FileRecord>>>;

    /// Fetches the content of a file.
    fn download<'a>(&'a self, file_id: &'a str) -> BoxFuture<'a, ProviderResult<Vec<u8>>>;

    /// Finds a folder by exact name. The first match wins.
    fn find_folder<'a>(&'a self, name: &'a str) -> BoxFuture<'a, ProviderResult<Option<FileRecord>>> {
        Box::pin(async move {
            let query = DriveQuery::folder(name);
            Ok(self.search_files(&query).await?.into_iter().next())
        })
    }
}

/// Supplies bearer tokens to the HTTP backends.
///
/// Obtaining and refreshing tokens is the job of an external identity
/// provider; this crate only consumes them.
pub trait AccessTokenSource: Send + Sync {
    fn access_token(&self) -> BoxFuture<'_, ProviderResult<String>>;
}

/// A token fixed at construction time.
#[derive(Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StaticToken(<redacted>)")
    }
}

impl AccessTokenSource for StaticToken {
    fn access_token(&self) -> BoxFuture<'_, ProviderResult<String>> {
        let token = self.0.trim().to_string();
        Box::pin(async move {
            if token.is_empty() {
                return Err(ProviderError::authentication("no access token configured"));
            }
            Ok(token)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorCode;

    #[test]
    fn calendar_info_builder() {
        let info = CalendarInfo::new("team@x.com", "Team")
            .with_primary(false)
            .with_timezone("Europe/Paris")
            .with_access_role("writer");

        assert_eq!(info.id, "team@x.com");
        assert_eq!(info.timezone.as_deref(), Some("Europe/Paris"));
        assert!(info.is_writable());
        assert!(!CalendarInfo::new("x", "x").with_access_role("reader").is_writable());
    }

    #[tokio::test]
    async fn static_token_yields_trimmed_value() {
        let token = StaticToken::new(" ya29.token \n");
        assert_eq!(token.access_token().await.unwrap(), "ya29.token");
        assert_eq!(format!("{token:?}"), "StaticToken(<redacted>)");
    }

    #[tokio::test]
    async fn empty_token_is_an_auth_error() {
        let err = StaticToken::new("").access_token().await.unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::AuthenticationFailed);
    }
}
