//! The event manager: normalization in front of every outbound call.
//!
//! [`EventManager`] validates drafts before anything leaves the process,
//! so a [`ManagerError::Validation`] guarantees nothing was written
//! remotely. Updates validate twice: the draft before the fetch, and the
//! merged record before the write.
//! Remote failures come back as [`ManagerError::Transport`] tagged with
//! the operation that was being attempted. Nothing is retried here.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate};
use thiserror::Error;
use tracing::{debug, info, warn};

use gcalevent_core::time::resolve_timezone;
use gcalevent_core::{
    apply_update, match_recordings, normalize, normalize_patch, serialize, validate_merged,
    EventDraft, EventListQuery, EventSpec, EventWire, FileRecord, NormalizeOptions,
    RecordingQuery, RemoteEvent, RequestIdSource, UuidRequestIds, ValidationError, WriteOptions,
    DEFAULT_CALENDAR_ID,
};

use crate::error::ProviderError;
use crate::service::{CalendarInfo, CalendarService, FileStore};

/// Why a manager operation failed.
#[derive(Debug, Error)]
pub enum ManagerError {
    /// The input was rejected before any remote call.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The remote service failed while performing `operation`.
    #[error("{operation} failed: {source}")]
    Transport {
        operation: &'static str,
        #[source]
        source: ProviderError,
    },
}

impl ManagerError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// The operation that failed remotely, if this is a transport error.
    pub fn operation(&self) -> Option<&'static str> {
        match self {
            Self::Transport { operation, .. } => Some(operation),
            Self::Validation(_) => None,
        }
    }

    /// Whether retrying the same call could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { source, .. } => source.is_retryable(),
            Self::Validation(_) => false,
        }
    }
}

pub type ManagerResult<T> = Result<T, ManagerError>;

fn transport(operation: &'static str) -> impl FnOnce(ProviderError) -> ManagerError {
    move |source| ManagerError::Transport { operation, source }
}

/// A creation request after normalization, ready to send.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedInsert {
    pub calendar_id: String,
    pub spec: EventSpec,
    pub wire: EventWire,
    pub options: WriteOptions,
}

/// Facade over a calendar service and an optional file store.
#[derive(Clone)]
pub struct EventManager {
    calendar: Arc<dyn CalendarService>,
    files: Option<Arc<dyn FileStore>>,
    ids: Arc<dyn RequestIdSource + Send + Sync>,
    options: NormalizeOptions,
    default_calendar: String,
}

impl std::fmt::Debug for EventManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventManager")
            .field("calendar", &self.calendar.name())
            .field("files", &self.files.as_ref().map(|s| s.name().to_string()))
            .field("options", &self.options)
            .field("default_calendar", &self.default_calendar)
            .finish()
    }
}

impl EventManager {
    pub fn new(calendar: Arc<dyn CalendarService>) -> Self {
        Self {
            calendar,
            files: None,
            ids: Arc::new(UuidRequestIds),
            options: NormalizeOptions::default(),
            default_calendar: DEFAULT_CALENDAR_ID.to_string(),
        }
    }

    #[must_use]
    pub fn with_file_store(mut self, files: Arc<dyn FileStore>) -> Self {
        self.files = Some(files);
        self
    }

    /// Replaces the source of conference request ids.
    #[must_use]
    pub fn with_request_ids(mut self, ids: Arc<dyn RequestIdSource + Send + Sync>) -> Self {
        self.ids = ids;
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: NormalizeOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_default_calendar(mut self, calendar_id: impl Into<String>) -> Self {
        self.default_calendar = calendar_id.into();
        self
    }

    pub fn default_calendar(&self) -> &str {
        &self.default_calendar
    }

    pub fn options(&self) -> &NormalizeOptions {
        &self.options
    }

    fn calendar_or_default<'a>(&'a self, calendar_id: Option<&'a str>) -> &'a str {
        calendar_id
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(&self.default_calendar)
    }

    /// Normalizes and serializes a draft without sending it.
    pub fn prepare_insert(&self, draft: &EventDraft) -> ManagerResult<PreparedInsert> {
        let spec = normalize(draft, &self.options)?;
        let wire = serialize(&spec, self.ids.as_ref());
        Ok(PreparedInsert {
            calendar_id: spec.calendar_id_or(&self.default_calendar).to_string(),
            options: spec.write_options(),
            spec,
            wire,
        })
    }

    /// Creates an event from a draft.
    pub async fn create_event(&self, draft: &EventDraft) -> ManagerResult<RemoteEvent> {
        let prepared = self.prepare_insert(draft)?;
        if prepared.spec.record_meet() {
            debug!("Recording is requested; it depends on the account's meeting entitlements");
        }
        debug!(
            calendar_id = %prepared.calendar_id,
            body = %serde_json::to_string(&prepared.wire).unwrap_or_default(),
            "Inserting event"
        );

        let created = self
            .calendar
            .insert_event(&prepared.calendar_id, &prepared.wire, prepared.options)
            .await
            .map_err(transport("create_event"))?;

        info!(
            event_id = created.id.as_deref().unwrap_or_default(),
            calendar_id = %prepared.calendar_id,
            "Created event"
        );
        if prepared.spec.create_meet() && created.hangout_link.is_none() {
            warn!("Conference was requested but the service returned no meeting link");
        }
        Ok(created)
    }

    pub async fn get_event(
        &self,
        calendar_id: Option<&str>,
        event_id: &str,
    ) -> ManagerResult<RemoteEvent> {
        let calendar_id = self.calendar_or_default(calendar_id);
        self.calendar
            .get_event(calendar_id, event_id)
            .await
            .map_err(transport("get_event"))
    }

    /// Applies a draft to an existing event.
    ///
    /// Only fields the draft supplies are changed; see
    /// [`normalize_patch`] for the clearing rules. The event is fetched,
    /// merged and sent back whole, so fields this crate does not model
    /// survive the round trip.
    pub async fn update_event(
        &self,
        event_id: &str,
        draft: &EventDraft,
    ) -> ManagerResult<RemoteEvent> {
        let patch = normalize_patch(draft, &self.options)?;
        let calendar_id = self.calendar_or_default(patch.calendar_id.as_deref());

        let existing = self
            .calendar
            .get_event(calendar_id, event_id)
            .await
            .map_err(transport("update_event"))?;

        if patch.is_noop() {
            debug!(event_id, "Update changes nothing, skipping write");
            return Ok(existing);
        }

        let merged = apply_update(&existing, &patch);
        validate_merged(&merged)?;

        let options = WriteOptions {
            send_updates: patch.send_notifications,
            conference_data_version: None,
        };
        let updated = self
            .calendar
            .update_event(calendar_id, event_id, &merged, options)
            .await
            .map_err(transport("update_event"))?;

        info!(event_id, calendar_id, "Updated event");
        Ok(updated)
    }

    pub async fn delete_event(
        &self,
        calendar_id: Option<&str>,
        event_id: &str,
        send_updates: bool,
    ) -> ManagerResult<()> {
        let calendar_id = self.calendar_or_default(calendar_id);
        self.calendar
            .delete_event(calendar_id, event_id, send_updates)
            .await
            .map_err(transport("delete_event"))?;
        info!(event_id, calendar_id, "Deleted event");
        Ok(())
    }

    pub async fn list_events(&self, query: &EventListQuery) -> ManagerResult<Vec<RemoteEvent>> {
        query.validate(chrono::Utc::now())?;
        self.calendar
            .list_events(query)
            .await
            .map_err(transport("list_events"))
    }

    /// Upcoming events whose text matches `text`.
    pub async fn search_events(
        &self,
        text: &str,
        calendar_id: Option<&str>,
        max_results: Option<u32>,
    ) -> ManagerResult<Vec<RemoteEvent>> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::MissingField("query").into());
        }
        let mut query = EventListQuery::search(self.calendar_or_default(calendar_id), text);
        if let Some(max) = max_results {
            query = query.with_max_results(max);
        }
        self.calendar
            .list_events(&query)
            .await
            .map_err(transport("search_events"))
    }

    /// Events between two instants.
    pub async fn events_between(
        &self,
        time_min: DateTime<FixedOffset>,
        time_max: DateTime<FixedOffset>,
        calendar_id: Option<&str>,
        max_results: Option<u32>,
    ) -> ManagerResult<Vec<RemoteEvent>> {
        let mut query =
            EventListQuery::between(self.calendar_or_default(calendar_id), time_min, time_max);
        if let Some(max) = max_results {
            query = query.with_max_results(max);
        }
        query.validate(chrono::Utc::now())?;
        self.calendar
            .list_events(&query)
            .await
            .map_err(transport("events_between"))
    }

    /// Events from the start of `first` to the end of `last`, in the
    /// fallback timezone.
    pub async fn events_between_dates(
        &self,
        first: NaiveDate,
        last: NaiveDate,
        calendar_id: Option<&str>,
        max_results: Option<u32>,
    ) -> ManagerResult<Vec<RemoteEvent>> {
        let tz = resolve_timezone(&self.options.fallback_timezone)?;
        let mut query =
            EventListQuery::between_dates(self.calendar_or_default(calendar_id), first, last, tz)?;
        if let Some(max) = max_results {
            query = query.with_max_results(max);
        }
        self.calendar
            .list_events(&query)
            .await
            .map_err(transport("events_between"))
    }

    pub async fn list_calendars(&self) -> ManagerResult<Vec<CalendarInfo>> {
        self.calendar
            .list_calendars()
            .await
            .map_err(transport("list_calendars"))
    }

    fn file_store(&self, operation: &'static str) -> ManagerResult<&Arc<dyn FileStore>> {
        self.files.as_ref().ok_or_else(|| {
            transport(operation)(ProviderError::configuration("no file store configured"))
        })
    }

    /// Finds stored recordings that plausibly belong to an event.
    ///
    /// Uses the title and same-day heuristic of [`match_recordings`]. A
    /// missing folder or an event without a timed start yields an empty
    /// list, not an error.
    pub async fn find_recordings(
        &self,
        calendar_id: Option<&str>,
        event_id: &str,
        recordings: &RecordingQuery,
    ) -> ManagerResult<Vec<FileRecord>> {
        let files = self.file_store("find_recordings")?;
        let event = self
            .calendar
            .get_event(self.calendar_or_default(calendar_id), event_id)
            .await
            .map_err(transport("find_recordings"))?;

        let Some(start) = event.start.parsed() else {
            warn!(event_id, "Event has no timed start, cannot match recordings");
            return Ok(Vec::new());
        };

        let Some(folder) = files
            .search_files(&recordings.folder_query())
            .await
            .map_err(transport("find_recordings"))?
            .into_iter()
            .next()
        else {
            debug!(folder = %recordings.folder, "Recordings folder not found");
            return Ok(Vec::new());
        };

        let candidates = files
            .search_files(&recordings.files_query(&folder.id))
            .await
            .map_err(transport("find_recordings"))?;
        let matches = match_recordings(event.title(), &start, &candidates);
        debug!(
            candidates = candidates.len(),
            matches = matches.len(),
            "Matched recordings"
        );
        Ok(matches)
    }

    /// Downloads a stored file.
    pub async fn download_file(&self, file_id: &str) -> ManagerResult<Vec<u8>> {
        self.file_store("download_file")?
            .download(file_id)
            .await
            .map_err(transport("download_file"))
    }
}
