//! The event representation returned by the calendar service.
//!
//! Fields this crate does not interpret (recurrence rules, reminders,
//! conference details, ...) are kept in `extra` so that a fetched event
//! can be merged and sent back without losing them.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::wire::EventWire;

/// Start or end of a remote event: either timed or all-day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteDateTime {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl RemoteDateTime {
    /// Parses the timed value, if this is a timed boundary.
    pub fn parsed(&self) -> Option<DateTime<FixedOffset>> {
        self.date_time
            .as_deref()
            .and_then(|dt| DateTime::parse_from_rfc3339(dt).ok())
    }

    /// Parses the all-day date, if this is an all-day boundary.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        self.date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
    }

    pub fn is_all_day(&self) -> bool {
        self.date_time.is_none() && self.date.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteAttendee {
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optional: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RemoteAttendee {
    pub fn is_optional(&self) -> bool {
        self.optional.unwrap_or(false)
    }
}

/// A calendar event as stored by the remote service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub start: RemoteDateTime,
    #[serde(default)]
    pub end: RemoteDateTime,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attendees: Vec<RemoteAttendee>,
    /// Present only when a Meet conference exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hangout_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_link: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RemoteEvent {
    /// Title, or the empty string when the event has none.
    pub fn title(&self) -> &str {
        self.summary.as_deref().unwrap_or_default()
    }

    pub fn is_cancelled(&self) -> bool {
        self.status.as_deref() == Some("cancelled")
    }

    pub fn has_conference(&self) -> bool {
        self.hangout_link.is_some() || self.extra.contains_key("conferenceData")
    }

    /// Builds the representation a service would store for `wire`.
    ///
    /// Conference data is carried over verbatim in `extra`; generating a
    /// meeting link is left to the service.
    pub fn from_wire(id: impl Into<String>, wire: &EventWire) -> Self {
        let mut extra = Map::new();
        if let Some(ref conference) = wire.conference_data {
            if let Ok(value) = serde_json::to_value(conference) {
                extra.insert("conferenceData".to_string(), value);
            }
        }

        Self {
            id: Some(id.into()),
            status: Some("confirmed".to_string()),
            summary: Some(wire.summary.clone()),
            description: Some(wire.description.clone()),
            location: wire.location.clone(),
            start: RemoteDateTime {
                date_time: Some(wire.start.date_time.clone()),
                date: None,
                time_zone: Some(wire.start.time_zone.clone()),
            },
            end: RemoteDateTime {
                date_time: Some(wire.end.date_time.clone()),
                date: None,
                time_zone: Some(wire.end.time_zone.clone()),
            },
            attendees: wire
                .attendees
                .iter()
                .map(|a| RemoteAttendee {
                    email: a.email.clone(),
                    optional: Some(a.optional),
                    ..Default::default()
                })
                .collect(),
            hangout_link: None,
            html_link: None,
            extra,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "kind": "calendar#event",
        "id": "evt1",
        "status": "confirmed",
        "summary": "Planning",
        "start": {"dateTime": "2025-06-01T10:00:00-04:00", "timeZone": "America/New_York"},
        "end": {"dateTime": "2025-06-01T11:00:00-04:00", "timeZone": "America/New_York"},
        "attendees": [
            {"email": "a@x.com", "responseStatus": "accepted", "self": true},
            {"email": "b@x.com", "optional": true}
        ],
        "hangoutLink": "https://meet.google.com/abc-defg-hij",
        "recurrence": ["RRULE:FREQ=WEEKLY"],
        "reminders": {"useDefault": true}
    }"#;

    #[test]
    fn parse_keeps_unknown_fields() {
        let event: RemoteEvent = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(event.id.as_deref(), Some("evt1"));
        assert_eq!(event.title(), "Planning");
        assert!(event.extra.contains_key("recurrence"));
        assert!(event.extra.contains_key("reminders"));
        assert_eq!(event.attendees[0].extra.get("self"), Some(&Value::Bool(true)));
        assert!(event.attendees[1].is_optional());
        assert!(event.has_conference());

        let back = serde_json::to_value(&event).unwrap();
        assert_eq!(back["recurrence"][0], "RRULE:FREQ=WEEKLY");
        assert_eq!(back["kind"], "calendar#event");
    }

    #[test]
    fn parse_all_day_boundaries() {
        let event: RemoteEvent = serde_json::from_str(
            r#"{"id": "d", "start": {"date": "2025-06-01"}, "end": {"date": "2025-06-02"}}"#,
        )
        .unwrap();
        assert!(event.start.is_all_day());
        assert!(event.start.parsed().is_none());
        assert_eq!(
            event.start.parsed_date(),
            NaiveDate::from_ymd_opt(2025, 6, 1)
        );
    }

    #[test]
    fn minimal_event_defaults() {
        let event: RemoteEvent = serde_json::from_str(r#"{"status": "cancelled"}"#).unwrap();
        assert!(event.is_cancelled());
        assert_eq!(event.title(), "");
        assert!(!event.has_conference());
    }
}
