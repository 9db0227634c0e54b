//! In-memory backends.
//!
//! [`MemoryCalendar`] and [`MemoryFileStore`] behave like the remote
//! services closely enough for the manager's tests and the CLI's
//! `--dry-run` mode: inserted events get ids and, when a conference is
//! requested with `conferenceDataVersion=1`, a meeting link. Failures can
//! be injected per operation.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::debug;

use gcalevent_core::{
    DriveQuery, EventListQuery, EventWire, FileRecord, OrderBy, RemoteDateTime, RemoteEvent,
    WriteOptions,
};

use crate::error::{ProviderError, ProviderResult};
use crate::service::{BoxFuture, CalendarInfo, CalendarService, FileStore};

const CALENDAR_NAME: &str = "memory-calendar";
const STORE_NAME: &str = "memory-files";

/// A write received by [`MemoryCalendar`], kept for inspection.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedWrite {
    Insert {
        calendar_id: String,
        event: EventWire,
        options: WriteOptions,
    },
    Update {
        calendar_id: String,
        event_id: String,
        event: RemoteEvent,
        options: WriteOptions,
    },
    Delete {
        calendar_id: String,
        event_id: String,
        send_updates: bool,
    },
}

#[derive(Debug, Default)]
struct CalendarState {
    events: Vec<(String, RemoteEvent)>,
    writes: Vec<RecordedWrite>,
    failures: HashMap<&'static str, ProviderError>,
    next_id: u64,
}

impl CalendarState {
    fn take_failure(&mut self, operation: &'static str) -> ProviderResult<()> {
        match self.failures.remove(operation) {
            Some(err) => Err(err.with_provider(CALENDAR_NAME)),
            None => Ok(()),
        }
    }

    fn position(&self, calendar_id: &str, event_id: &str) -> Option<usize> {
        self.events
            .iter()
            .position(|(cal, e)| cal == calendar_id && e.id.as_deref() == Some(event_id))
    }
}

/// A calendar kept in process memory.
#[derive(Debug, Clone)]
pub struct MemoryCalendar {
    state: Arc<Mutex<CalendarState>>,
    calendars: Vec<CalendarInfo>,
    now: Option<DateTime<Utc>>,
}

impl Default for MemoryCalendar {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCalendar {
    /// An empty calendar store exposing a single primary calendar.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(CalendarState::default())),
            calendars: vec![
                CalendarInfo::new("primary", "Primary")
                    .with_primary(true)
                    .with_access_role("owner"),
            ],
            now: None,
        }
    }

    /// Pins the clock used to default a listing's lower bound.
    #[must_use]
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    #[must_use]
    pub fn with_calendar(mut self, info: CalendarInfo) -> Self {
        self.calendars.push(info);
        self
    }

    /// Stores an event as if it already existed remotely.
    pub async fn seed(&self, calendar_id: &str, event: RemoteEvent) {
        self.state
            .lock()
            .await
            .events
            .push((calendar_id.to_string(), event));
    }

    /// Makes the next call of `operation` fail with `error`.
    ///
    /// Operation names match the trait methods: `insert_event`,
    /// `get_event`, `update_event`, `delete_event`, `list_events`,
    /// `list_calendars`.
    pub async fn fail_next(&self, operation: &'static str, error: ProviderError) {
        self.state.lock().await.failures.insert(operation, error);
    }

    /// Writes received so far, oldest first.
    pub async fn writes(&self) -> Vec<RecordedWrite> {
        self.state.lock().await.writes.clone()
    }

    /// Number of events currently stored across all calendars.
    pub async fn len(&self) -> usize {
        self.state.lock().await.events.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn now(&self) -> DateTime<Utc> {
        self.now.unwrap_or_else(Utc::now)
    }
}

fn not_found(calendar_id: &str, event_id: &str) -> ProviderError {
    ProviderError::not_found(format!("event {event_id} not found in {calendar_id}"))
        .with_provider(CALENDAR_NAME)
        .with_status(404)
}

/// Earliest instant of a boundary; all-day dates count from UTC midnight.
fn instant(boundary: &RemoteDateTime) -> Option<DateTime<Utc>> {
    boundary
        .parsed()
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|| {
            boundary
                .parsed_date()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc())
        })
}

fn matches_text(event: &RemoteEvent, text: &str) -> bool {
    let needle = text.to_lowercase();
    [
        event.summary.as_deref(),
        event.description.as_deref(),
        event.location.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(&needle))
        || event
            .attendees
            .iter()
            .any(|a| a.email.to_lowercase().contains(&needle))
}

impl CalendarService for MemoryCalendar {
    fn name(&self) -> &str {
        CALENDAR_NAME
    }

    fn insert_event<'a>(
        &'a self,
        calendar_id: &'a str,
        event: &'a EventWire,
        options: WriteOptions,
    ) -> BoxFuture<'a, ProviderResult<RemoteEvent>> {
        Box::pin(async move {
            let mut state = self.state.lock().await;
            state.take_failure("insert_event")?;

            state.next_id += 1;
            let id = format!("mem{:04}", state.next_id);
            let mut stored = RemoteEvent::from_wire(&id, event);
            stored.html_link = Some(format!("https://calendar.example/event?eid={id}"));
            if options.conference_data_version == Some(1) && event.conference_data.is_some() {
                stored.hangout_link = Some(format!("https://meet.example/{id}"));
            } else {
                stored.extra.remove("conferenceData");
            }

            debug!(calendar_id, event_id = %id, "Stored event in memory");
            state.events.push((calendar_id.to_string(), stored.clone()));
            state.writes.push(RecordedWrite::Insert {
                calendar_id: calendar_id.to_string(),
                event: event.clone(),
                options,
            });
            Ok(stored)
        })
    }

    fn get_event<'a>(
        &'a self,
        calendar_id: &'a str,
        event_id: &'a str,
    ) -> BoxFuture<'a, ProviderResult<RemoteEvent>> {
        Box::pin(async move {
            let mut state = self.state.lock().await;
            state.take_failure("get_event")?;
            let index = state
                .position(calendar_id, event_id)
                .ok_or_else(|| not_found(calendar_id, event_id))?;
            Ok(state.events[index].1.clone())
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
            let mut state = self.state.lock().await;
            state.take_failure("update_event")?;
            let index = state
                .position(calendar_id, event_id)
                .ok_or_else(|| not_found(calendar_id, event_id))?;

            let mut stored = event.clone();
            stored.id = Some(event_id.to_string());
            state.events[index].1 = stored.clone();
            state.writes.push(RecordedWrite::Update {
                calendar_id: calendar_id.to_string(),
                event_id: event_id.to_string(),
                event: event.clone(),
                options,
            });
            Ok(stored)
        })
    }

    fn delete_event<'a>(
        &'a self,
        calendar_id: &'a str,
        event_id: &'a str,
        send_updates: bool,
    ) -> BoxFuture<'a, ProviderResult<()>> {
        Box::pin(async move {
            let mut state = self.state.lock().await;
            state.take_failure("delete_event")?;
            let index = state
                .position(calendar_id, event_id)
                .ok_or_else(|| not_found(calendar_id, event_id))?;
            state.events.remove(index);
            state.writes.push(RecordedWrite::Delete {
                calendar_id: calendar_id.to_string(),
                event_id: event_id.to_string(),
                send_updates,
            });
            Ok(())
        })
    }

    fn list_events<'a>(
        &'a self,
        query: &'a EventListQuery,
    ) -> BoxFuture<'a, ProviderResult<Vec<RemoteEvent>>> {
        Box::pin(async move {
            let now = self.now();
            query
                .validate(now)
                .map_err(|e| ProviderError::bad_request(e.to_string()).with_provider(CALENDAR_NAME))?;

            let mut state = self.state.lock().await;
            state.take_failure("list_events")?;

            let time_min = query.effective_time_min(now).with_timezone(&Utc);
            let time_max = query.time_max.map(|t| t.with_timezone(&Utc));
            let text = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty());

            let mut events: Vec<RemoteEvent> = state
                .events
                .iter()
                .filter(|(cal, e)| *cal == query.calendar_id && !e.is_cancelled())
                .filter(|(_, e)| instant(&e.end).is_none_or(|end| end > time_min))
                .filter(|(_, e)| {
                    time_max.is_none_or(|max| instant(&e.start).is_none_or(|start| start < max))
                })
                .filter(|(_, e)| text.is_none_or(|t| matches_text(e, t)))
                .map(|(_, e)| e.clone())
                .collect();

            if query.order_by == OrderBy::StartTime {
                events.sort_by_key(|e| instant(&e.start));
            }
            events.truncate(query.max_results as usize);
            Ok(events)
        })
    }

    fn list_calendars(&self) -> BoxFuture<'_, ProviderResult<Vec<CalendarInfo>>> {
        Box::pin(async move {
            self.state.lock().await.take_failure("list_calendars")?;
            Ok(self.calendars.clone())
        })
    }
}

#[derive(Debug, Default)]
struct StoreState {
    files: Vec<FileRecord>,
    contents: HashMap<String, Vec<u8>>,
    failures: HashMap<&'static str, ProviderError>,
}

/// A file store kept in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileStore {
    state: Arc<Mutex<StoreState>>,
}

impl MemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file and, optionally, its content.
    pub async fn add(&self, record: FileRecord, content: Option<Vec<u8>>) {
        let mut state = self.state.lock().await;
        if let Some(content) = content {
            state.contents.insert(record.id.clone(), content);
        }
        state.files.push(record);
    }

    /// Makes the next call of `operation` (`search_files` or `download`)
    /// fail with `error`.
    pub async fn fail_next(&self, operation: &'static str, error: ProviderError) {
        self.state.lock().await.failures.insert(operation, error);
    }
}

impl FileStore for MemoryFileStore {
    fn name(&self) -> &str {
        STORE_NAME
    }

    fn search_files<'a>(
        &'a self,
        query: &'a DriveQuery,
    ) -> BoxFuture<'a, ProviderResult<Vec<FileRecord>>> {
        Box::pin(async move {
            let mut state = self.state.lock().await;
            if let Some(err) = state.failures.remove("search_files") {
                return Err(err.with_provider(STORE_NAME));
            }
            debug!(q = %query.build(), "Searching memory store");
            Ok(state
                .files
                .iter()
                .filter(|f| query.matches(f))
                .cloned()
                .collect())
        })
    }

    fn download<'a>(&'a self, file_id: &'a str) -> BoxFuture<'a, ProviderResult<Vec<u8>>> {
        Box::pin(async move {
            let mut state = self.state.lock().await;
            if let Some(err) = state.failures.remove("download") {
                return Err(err.with_provider(STORE_NAME));
            }
            state.contents.get(file_id).cloned().ok_or_else(|| {
                ProviderError::not_found(format!("file {file_id} has no content"))
                    .with_provider(STORE_NAME)
                    .with_status(404)
            })
        })
    }
}
