//! Plain-text rendering of command results.

use std::fmt::Write;

use gcalevent_core::{FileRecord, RemoteDateTime, RemoteEvent};
use gcalevent_providers::CalendarInfo;

const LIST_DATE_FORMAT: &str = "%m/%d/%Y %H:%M";

/// The "ID / Title / Start / End" block shown after a write.
pub fn event_summary(event: &RemoteEvent) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "ID: {}", event.id.as_deref().unwrap_or_default());
    let _ = writeln!(out, "Title: {}", event.title());
    let _ = writeln!(out, "Start: {}", boundary(&event.start));
    let _ = writeln!(out, "End: {}", boundary(&event.end));
    if let Some(link) = &event.hangout_link {
        let _ = writeln!(out, "Meet: {}", link);
    }
    out
}

/// Everything `get` shows about a single event.
pub fn event_details(event: &RemoteEvent) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "ID: {}", event.id.as_deref().unwrap_or_default());
    let _ = writeln!(out, "Title: {}", event.title());
    let _ = writeln!(
        out,
        "Description: {}",
        event.description.as_deref().unwrap_or_default()
    );
    let _ = writeln!(out, "Start: {}", boundary(&event.start));
    let _ = writeln!(out, "End: {}", boundary(&event.end));
    if let Some(location) = event.location.as_deref().filter(|l| !l.is_empty()) {
        let _ = writeln!(out, "Location: {}", location);
    }
    if !event.attendees.is_empty() {
        let _ = writeln!(out, "Attendees:");
        for attendee in &event.attendees {
            let _ = write!(out, "  - {}", attendee.email);
            if attendee.is_optional() {
                let _ = write!(out, " (optional)");
            }
            let _ = writeln!(out);
        }
    }
    if let Some(link) = &event.hangout_link {
        let _ = writeln!(out, "Meet: {}", link);
    }
    if let Some(link) = &event.html_link {
        let _ = writeln!(out, "Link: {}", link);
    }
    out
}

/// A numbered listing; `empty` is shown when there is nothing to list.
pub fn event_listing(events: &[RemoteEvent], empty: &str) -> String {
    if events.is_empty() {
        return format!("{}\n", empty);
    }

    let mut out = format!("Found {} events:\n\n", events.len());
    for (index, event) in events.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", index + 1, event.title());
        let _ = writeln!(out, "   ID: {}", event.id.as_deref().unwrap_or_default());
        let _ = writeln!(out, "   Date: {}", list_date(&event.start));
        if let Some(description) = event.description.as_deref().filter(|d| !d.is_empty()) {
            let _ = writeln!(out, "   Description: {}", description);
        }
        if let Some(location) = event.location.as_deref().filter(|l| !l.is_empty()) {
            let _ = writeln!(out, "   Location: {}", location);
        }
        let _ = writeln!(out);
    }
    out
}

pub fn calendar_listing(calendars: &[CalendarInfo]) -> String {
    if calendars.is_empty() {
        return "No calendars found.\n".to_string();
    }

    let mut out = String::new();
    for calendar in calendars {
        let marker = if calendar.is_primary { "*" } else { " " };
        let _ = write!(out, "{} {} ({})", marker, calendar.name, calendar.id);
        if let Some(role) = &calendar.access_role {
            let _ = write!(out, " [{}]", role);
        }
        let _ = writeln!(out);
    }
    out
}

pub fn recording_listing(files: &[FileRecord]) -> String {
    if files.is_empty() {
        return "No recordings found for this event.\n".to_string();
    }

    let mut out = format!("Found {} recordings:\n\n", files.len());
    for (index, file) in files.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", index + 1, file.name);
        let _ = writeln!(out, "   ID: {}", file.id);
        if let Some(created) = file.created_time {
            let _ = writeln!(out, "   Created: {}", created.format(LIST_DATE_FORMAT));
        }
        if let Some(size) = file.size {
            let _ = writeln!(out, "   Size: {} bytes", size);
        }
        if let Some(link) = &file.web_view_link {
            let _ = writeln!(out, "   Link: {}", link);
        }
        let _ = writeln!(out);
    }
    out
}

/// A boundary as the service sent it: the timestamp, or the date of an
/// all-day event.
fn boundary(value: &RemoteDateTime) -> &str {
    value
        .date_time
        .as_deref()
        .or(value.date.as_deref())
        .unwrap_or_default()
}

/// Start date for listings, in the event's own offset.
fn list_date(start: &RemoteDateTime) -> String {
    start
        .parsed()
        .map(|dt| dt.format(LIST_DATE_FORMAT).to_string())
        .unwrap_or_else(|| "All day".to_string())
}
