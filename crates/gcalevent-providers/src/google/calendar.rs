//! Google Calendar API v3 backend.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, warn};

use gcalevent_core::{EventListQuery, EventWire, RemoteEvent, WriteOptions};

use super::config::GoogleConfig;
use super::http::ApiClient;
use crate::error::{ProviderError, ProviderResult};
use crate::service::{AccessTokenSource, BoxFuture, CalendarInfo, CalendarService};

const PROVIDER_NAME: &str = "google-calendar";

/// Largest page the events endpoint accepts.
const MAX_PAGE_SIZE: u32 = 2500;

/// [`CalendarService`] over the Google Calendar REST API.
#[derive(Clone)]
pub struct GoogleCalendarService {
    api: ApiClient,
    base_url: String,
}

impl fmt::Debug for GoogleCalendarService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleCalendarService")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GoogleCalendarService {
    pub fn new(config: &GoogleConfig, tokens: Arc<dyn AccessTokenSource>) -> ProviderResult<Self> {
        Ok(Self {
            api: ApiClient::new(config.http_client()?, tokens, PROVIDER_NAME),
            base_url: config.calendar_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn events_url(&self, calendar_id: &str) -> String {
        format!(
            "{}/calendars/{}/events",
            self.base_url,
            urlencoding::encode(calendar_id)
        )
    }

    fn event_url(&self, calendar_id: &str, event_id: &str) -> String {
        format!(
            "{}/{}",
            self.events_url(calendar_id),
            urlencoding::encode(event_id)
        )
    }

    fn calendar_list_url(&self) -> String {
        format!("{}/users/me/calendarList", self.base_url)
    }
}

/// Response from the events.list endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventListResponse {
    #[serde(default)]
    items: Vec<RemoteEvent>,
    next_page_token: Option<String>,
}

/// Response from the calendarList.list endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CalendarListResponse {
    #[serde(default)]
    items: Vec<CalendarListEntry>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CalendarListEntry {
    id: String,
    #[serde(default)]
    summary: Option<String>,
    /// Name the user gave the calendar, shadowing `summary`.
    #[serde(default)]
    summary_override: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    primary: bool,
    #[serde(default)]
    time_zone: Option<String>,
    #[serde(default)]
    access_role: Option<String>,
}

impl From<CalendarListEntry> for CalendarInfo {
    fn from(entry: CalendarListEntry) -> Self {
        let name = entry
            .summary_override
            .or(entry.summary)
            .unwrap_or_else(|| entry.id.clone());
        Self {
            id: entry.id,
            name,
            description: entry.description,
            is_primary: entry.primary,
            timezone: entry.time_zone,
            access_role: entry.access_role,
        }
    }
}

impl CalendarService for GoogleCalendarService {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn insert_event<'a>(
        &'a self,
        calendar_id: &'a str,
        event: &'a EventWire,
        options: WriteOptions,
    ) -> BoxFuture<'a, ProviderResult<RemoteEvent>> {
        Box::pin(async move {
            let request = self
                .api
                .http()
                .post(self.events_url(calendar_id))
                .query(&options.to_params())
                .json(event);
            self.api.json(request).await
        })
    }

    fn get_event<'a>(
        &'a self,
        calendar_id: &'a str,
        event_id: &'a str,
    ) -> BoxFuture<'a, ProviderResult<RemoteEvent>> {
        Box::pin(async move {
            let request = self.api.http().get(self.event_url(calendar_id, event_id));
            self.api.json(request).await
        })
    }

    fn update_event<'a>(
        &'a self,
        calendar_id: &'a str,
        event_id: &'a str,
        event: &'a RemoteEvent,
        options: WriteOptions,
    ) -> BoxFuture<'a, ProviderResult<RemoteEvent>> {
        Box::pin(async move {
            let request = self
                .api
                .http()
                .put(self.event_url(calendar_id, event_id))
                .query(&options.to_params())
                .json(event);
            self.api.json(request).await
        })
    }

    fn delete_event<'a>(
        &'a self,
        calendar_id: &'a str,
        event_id: &'a str,
        send_updates: bool,
    ) -> BoxFuture<'a, ProviderResult<()>> {
        Box::pin(async move {
            let options = WriteOptions {
                send_updates,
                conference_data_version: None,
            };
            let request = self
                .api
                .http()
                .delete(self.event_url(calendar_id, event_id))
                .query(&options.to_params());
            self.api.send(request).await?;
            Ok(())
        })
    }

    fn list_events<'a>(
        &'a self,
        query: &'a EventListQuery,
    ) -> BoxFuture<'a, ProviderResult<Vec<RemoteEvent>>> {
        Box::pin(async move {
            let mut params = query.to_params(Utc::now()).map_err(|e| {
                ProviderError::bad_request(e.to_string()).with_provider(PROVIDER_NAME)
            })?;
            if let Some(entry) = params.iter_mut().find(|(k, _)| *k == "maxResults") {
                entry.1 = query.max_results.min(MAX_PAGE_SIZE).to_string();
            }

            let limit = query.max_results as usize;
            let mut events = Vec::new();
            let mut page_token: Option<String> = None;

            loop {
                let mut request = self
                    .api
                    .http()
                    .get(self.events_url(&query.calendar_id))
                    .query(&params);
                if let Some(ref token) = page_token {
                    request = request.query(&[("pageToken", token)]);
                }

                let page: EventListResponse = self.api.json(request).await?;
                for event in page.items {
                    if event.id.is_none() {
                        warn!("Skipping event without id");
                        continue;
                    }
                    events.push(event);
                }

                if events.len() >= limit {
                    events.truncate(limit);
                    break;
                }
                match page.next_page_token {
                    Some(token) => page_token = Some(token),
                    None => break,
                }
            }

            debug!(
                count = events.len(),
                calendar_id = %query.calendar_id,
                "Listed events"
            );
            Ok(events)
        })
    }

    fn list_calendars(&self) -> BoxFuture<'_, ProviderResult<Vec<CalendarInfo>>> {
        Box::pin(async move {
            let mut calendars = Vec::new();
            let mut page_token: Option<String> = None;
            loop {
                let mut request = self.api.http().get(self.calendar_list_url());
                if let Some(ref token) = page_token {
                    request = request.query(&[("pageToken", token)]);
                }
                let page: CalendarListResponse = self.api.json(request).await?;
                calendars.extend(page.items.into_iter().map(CalendarInfo::from));
                match page.next_page_token {
                    Some(token) => page_token = Some(token),
                    None => break,
                }
            }
            Ok(calendars)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::StaticToken;

    fn service() -> GoogleCalendarService {
        let config = GoogleConfig::new("test").with_base_urls(
            "https://calendar.test/v3/",
            "https://drive.test/v3",
        );
        GoogleCalendarService::new(&config, Arc::new(StaticToken::new("token"))).unwrap()
    }

    #[test]
    fn urls_encode_ids() {
        let service = service();
        assert_eq!(
            service.events_url("team@group.calendar.google.com"),
            "https://calendar.test/v3/calendars/team%40group.calendar.google.com/events"
        );
        assert_eq!(
            service.event_url("primary", "abc/def"),
            "https://calendar.test/v3/calendars/primary/events/abc%2Fdef"
        );
        assert_eq!(
            service.calendar_list_url(),
            "https://calendar.test/v3/users/me/calendarList"
        );
    }

    #[test]
    fn parse_event_list_response() {
        let json = r#"{
            "kind": "calendar#events",
            "items": [
                {
                    "id": "evt1",
                    "summary": "Standup",
                    "start": {"dateTime": "2025-06-01T10:00:00-04:00"},
                    "end": {"dateTime": "2025-06-01T10:15:00-04:00"},
                    "hangoutLink": "https://meet.google.com/abc-defg-hij"
                }
            ],
            "nextPageToken": "page2"
        }"#;
        let response: EventListResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.items.len(), 1);
        assert_eq!(response.next_page_token.as_deref(), Some("page2"));
        assert!(response.items[0].hangout_link.is_some());
    }

    #[test]
    fn calendar_entry_prefers_override_name() {
        let json = r#"{
            "items": [
                {"id": "me@x.com", "summary": "me@x.com", "primary": true, "timeZone": "Europe/Paris", "accessRole": "owner"},
                {"id": "team@x.com", "summary": "Team", "summaryOverride": "My team", "accessRole": "reader"}
            ]
        }"#;
        let response: CalendarListResponse = serde_json::from_str(json).unwrap();
        let calendars: Vec<CalendarInfo> =
            response.items.into_iter().map(CalendarInfo::from).collect();

        assert!(calendars[0].is_primary);
        assert_eq!(calendars[0].timezone.as_deref(), Some("Europe/Paris"));
        assert!(calendars[0].is_writable());
        assert_eq!(calendars[1].name, "My team");
        assert!(!calendars[1].is_writable());
    }
}
