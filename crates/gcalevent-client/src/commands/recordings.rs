//! Recording lookup.

use gcalevent_core::RecordingQuery;
use gcalevent_providers::EventManager;

use crate::error::ClientResult;
use crate::render;

/// Lists stored recordings that look like they belong to `event_id`.
pub async fn find(
    manager: &EventManager,
    calendar: Option<&str>,
    event_id: &str,
    query: &RecordingQuery,
) -> ClientResult<String> {
    let files = manager.find_recordings(calendar, event_id, query).await?;
    Ok(render::recording_listing(&files))
}
