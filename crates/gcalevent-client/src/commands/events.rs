//! Event commands.

use chrono::{NaiveDate, Utc};
use gcalevent_core::{EventField, EventListQuery};
use gcalevent_providers::EventManager;
use serde_json::{json, Map, Value};
use tracing::info;

use crate::cli::EventArgs;
use crate::error::{ClientError, ClientResult};
use crate::render;

pub async fn create(
    manager: &EventManager,
    args: &EventArgs,
    calendar: Option<&str>,
) -> ClientResult<String> {
    let draft = with_calendar(args.to_draft()?, calendar);
    let event = manager.create_event(&draft).await?;
    Ok(format!(
        "Event created successfully\n{}",
        render::event_summary(&event)
    ))
}

pub async fn get(
    manager: &EventManager,
    calendar: Option<&str>,
    event_id: &str,
    open_in_browser: bool,
) -> ClientResult<String> {
    let event = manager.get_event(calendar, event_id).await?;
    if open_in_browser {
        let link = event
            .html_link
            .as_deref()
            .ok_or_else(|| ClientError::Action("event has no calendar link".into()))?;
        info!(url = %link, "opening event in browser");
        open::that(link).map_err(|e| ClientError::Action(format!("failed to open URL: {}", e)))?;
    }
    Ok(render::event_details(&event))
}

pub async fn update(
    manager: &EventManager,
    calendar: Option<&str>,
    event_id: &str,
    args: &EventArgs,
    clear: &[EventField],
) -> ClientResult<String> {
    let draft = clear
        .iter()
        .fold(args.to_draft()?, |draft, field| draft.clearing(*field));
    let draft = with_calendar(draft, calendar);
    let event = manager.update_event(event_id, &draft).await?;
    Ok(format!(
        "Event updated successfully\n{}",
        render::event_summary(&event)
    ))
}

pub async fn delete(
    manager: &EventManager,
    calendar: Option<&str>,
    event_id: &str,
    notify: bool,
) -> ClientResult<String> {
    manager.delete_event(calendar, event_id, notify).await?;
    Ok("Event deleted successfully\n".to_string())
}

pub async fn list(
    manager: &EventManager,
    calendar: Option<&str>,
    max: u32,
    days: Option<u32>,
) -> ClientResult<String> {
    let mut query = EventListQuery::upcoming(calendar.unwrap_or(manager.default_calendar()))
        .with_max_results(max);
    if let Some(days) = days {
        query = query.within_days(Utc::now(), days)?;
    }
    let events = manager.list_events(&query).await?;
    Ok(render::event_listing(&events, "No upcoming events scheduled."))
}

pub async fn search(
    manager: &EventManager,
    calendar: Option<&str>,
    text: &str,
    max: u32,
) -> ClientResult<String> {
    let events = manager.search_events(text, calendar, Some(max)).await?;
    Ok(render::event_listing(
        &events,
        &format!("No events found matching '{}'.", text.trim()),
    ))
}

pub async fn between(
    manager: &EventManager,
    calendar: Option<&str>,
    first: NaiveDate,
    last: NaiveDate,
    max: u32,
) -> ClientResult<String> {
    let events = manager
        .events_between_dates(first, last, calendar, Some(max))
        .await?;
    Ok(render::event_listing(
        &events,
        &format!("No events found between {} and {}.", first, last),
    ))
}

pub async fn calendars(manager: &EventManager) -> ClientResult<String> {
    let calendars = manager.list_calendars().await?;
    Ok(render::calendar_listing(&calendars))
}

/// The insert request a `create` with the same flags would send.
pub fn preview(
    manager: &EventManager,
    args: &EventArgs,
    calendar: Option<&str>,
) -> ClientResult<String> {
    let draft = with_calendar(args.to_draft()?, calendar);
    let prepared = manager.prepare_insert(&draft)?;

    let params: Map<String, Value> = prepared
        .options
        .to_params()
        .into_iter()
        .map(|(key, value)| (key.to_string(), Value::String(value)))
        .collect();
    let request = json!({
        "calendarId": prepared.calendar_id,
        "params": params,
        "event": prepared.wire,
    });
    serde_json::to_string_pretty(&request)
        .map(|mut out| {
            out.push('\n');
            out
        })
        .map_err(|e| ClientError::Action(format!("failed to serialize request: {}", e)))
}

fn with_calendar(
    mut draft: gcalevent_core::EventDraft,
    calendar: Option<&str>,
) -> gcalevent_core::EventDraft {
    if let Some(calendar) = calendar {
        draft.calendar_id = Some(calendar.to_string());
    }
    draft
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use crate::commands::dry_run_manager;
    use crate::config::ClientConfig;

    fn standup() -> EventArgs {
        EventArgs {
            title: Some("Standup".into()),
            start: Some("2030-06-01T10:00:00-04:00".into()),
            duration: Some(15),
            ..Default::default()
        }
    }

    fn event_id(output: &str) -> String {
        output
            .lines()
            .find_map(|line| line.strip_prefix("ID: "))
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn create_then_get() {
        let manager = dry_run_manager(&ClientConfig::default());

        let out = create(&manager, &standup(), None).await.unwrap();
        assert!(out.starts_with("Event created successfully\nID: "));
        assert!(out.contains("Title: Standup\n"));
        assert!(out.contains("End: 2030-06-01T10:15:00-04:00\n"));

        let details = get(&manager, None, &event_id(&out), false).await.unwrap();
        assert!(details.contains("Title: Standup\n"));
    }

    #[tokio::test]
    async fn create_rejects_invalid_draft() {
        let manager = dry_run_manager(&ClientConfig::default());
        let args = EventArgs {
            title: Some("No times".into()),
            ..Default::default()
        };
        let err = create(&manager, &args, None).await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }

    #[tokio::test]
    async fn update_clears_location() {
        let manager = dry_run_manager(&ClientConfig::default());
        let args = EventArgs {
            location: Some("Room 1".into()),
            ..standup()
        };
        let out = create(&manager, &args, None).await.unwrap();
        let id = event_id(&out);

        let rename = EventArgs {
            title: Some("Daily".into()),
            ..Default::default()
        };
        let out = update(&manager, None, &id, &rename, &[EventField::Location])
            .await
            .unwrap();
        assert!(out.contains("Title: Daily\n"));

        let details = get(&manager, None, &id, false).await.unwrap();
        assert!(!details.contains("Location:"));
        assert!(details.contains("Start: 2030-06-01T10:00:00-04:00\n"));
    }

    #[tokio::test]
    async fn delete_then_get_fails() {
        let manager = dry_run_manager(&ClientConfig::default());
        let id = event_id(&create(&manager, &standup(), None).await.unwrap());

        let out = delete(&manager, None, &id, false).await.unwrap();
        assert_eq!(out, "Event deleted successfully\n");

        let err = get(&manager, None, &id, false).await.unwrap_err();
        assert!(matches!(err, ClientError::Manager(_)));
    }

    #[tokio::test]
    async fn between_lists_created_events() {
        let manager = dry_run_manager(&ClientConfig::default());
        create(&manager, &standup(), None).await.unwrap();

        let day = NaiveDate::from_ymd_opt(2030, 6, 1).unwrap();
        let out = between(&manager, None, day, day, 10).await.unwrap();
        assert!(out.starts_with("Found 1 events:"));
        assert!(out.contains("1. Standup\n"));
        assert!(out.contains("   Date: 06/01/2030 10:00\n"));

        let next = day.succ_opt().unwrap();
        let out = between(&manager, None, next, next, 10).await.unwrap();
        assert_eq!(out, "No events found between 2030-06-02 and 2030-06-02.\n");
    }

    #[test]
    fn calendar_flag_wins_over_input_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"title": "Standup", "start": "2030-06-01T10:00:00-04:00", "end": "2030-06-01T10:15:00-04:00", "calendar_id": "file@example.com"}}"#
        )
        .unwrap();
        let args = EventArgs {
            input: Some(file.path().to_path_buf()),
            ..Default::default()
        };

        let mut config = ClientConfig::default();
        config.defaults.calendar_id = "defaults@example.com".into();
        let manager = dry_run_manager(&config);

        let flagged = preview(&manager, &args, Some("flag@example.com")).unwrap();
        let value: Value = serde_json::from_str(&flagged).unwrap();
        assert_eq!(value["calendarId"], "flag@example.com");

        let unflagged = preview(&manager, &args, None).unwrap();
        let value: Value = serde_json::from_str(&unflagged).unwrap();
        assert_eq!(value["calendarId"], "file@example.com");
    }

    #[tokio::test]
    async fn search_requires_text() {
        let manager = dry_run_manager(&ClientConfig::default());
        let err = search(&manager, None, "   ", 10).await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }

    #[tokio::test]
    async fn calendars_lists_primary() {
        let manager = dry_run_manager(&ClientConfig::default());
        let out = calendars(&manager).await.unwrap();
        assert!(out.starts_with("* Primary (primary)"));
    }

    #[test]
    fn preview_renders_request() {
        let manager = dry_run_manager(&ClientConfig::default());
        let args = EventArgs {
            meet: true,
            notify: true,
            ..standup()
        };
        let out = preview(&manager, &args, Some("team@example.com")).unwrap();
        let value: Value = serde_json::from_str(&out).unwrap();

        assert_eq!(value["calendarId"], "team@example.com");
        assert_eq!(value["params"]["sendUpdates"], "all");
        assert_eq!(value["params"]["conferenceDataVersion"], "1");
        assert_eq!(value["event"]["summary"], "Standup");
        assert_eq!(
            value["event"]["conferenceData"]["createRequest"]["conferenceSolutionKey"]["type"],
            "hangoutsMeet"
        );
    }
}
