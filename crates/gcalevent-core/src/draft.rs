//! The partial event specification supplied by callers.
//!
//! Every field of [`EventDraft`] is an explicit `Option`, so "absent",
//! "empty" and "false" stay distinguishable until the normalizer decides
//! what each one means. Drafts deserialize from JSON or TOML using
//! snake_case keys.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A field that an update may explicitly clear on the remote event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventField {
    Description,
    Location,
    Attendees,
}

impl EventField {
    /// Returns the field name as used in drafts.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Description => "description",
            Self::Location => "location",
            Self::Attendees => "attendees",
        }
    }
}

impl fmt::Display for EventField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "description" => Ok(Self::Description),
            "location" => Ok(Self::Location),
            "attendees" => Ok(Self::Attendees),
            other => Err(format!(
                "unknown field '{other}' (expected description, location or attendees)"
            )),
        }
    }
}

/// An attendee as supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttendeeDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optional: Option<bool>,
}

impl AttendeeDraft {
    /// Creates a required attendee.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            optional: None,
        }
    }

    /// Creates an optional attendee.
    pub fn optional(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            optional: Some(true),
        }
    }
}

/// A loosely specified event, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// RFC 3339 timestamp with offset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    /// RFC 3339 timestamp with offset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    /// IANA zone identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendees: Option<Vec<AttendeeDraft>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub send_notifications: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_meet: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_meet: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_to_storage: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calendar_id: Option<String>,
    /// Fields an update should clear remotely. Ignored on creation.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub clear: Vec<EventField>,
}

impl EventDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_start(mut self, start: impl Into<String>) -> Self {
        self.start = Some(start.into());
        self
    }

    pub fn with_end(mut self, end: impl Into<String>) -> Self {
        self.end = Some(end.into());
        self
    }

    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Appends an attendee, keeping insertion order.
    pub fn with_attendee(mut self, attendee: AttendeeDraft) -> Self {
        self.attendees.get_or_insert_with(Vec::new).push(attendee);
        self
    }

    pub fn with_send_notifications(mut self, send: bool) -> Self {
        self.send_notifications = Some(send);
        self
    }

    pub fn with_create_meet(mut self, create: bool) -> Self {
        self.create_meet = Some(create);
        self
    }

    pub fn with_record_meet(mut self, record: bool) -> Self {
        self.record_meet = Some(record);
        self
    }

    pub fn with_save_to_storage(mut self, save: bool) -> Self {
        self.save_to_storage = Some(save);
        self
    }

    pub fn with_calendar_id(mut self, calendar_id: impl Into<String>) -> Self {
        self.calendar_id = Some(calendar_id.into());
        self
    }

    /// Marks a field to be cleared by an update.
    pub fn clearing(mut self, field: EventField) -> Self {
        if !self.clear.contains(&field) {
            self.clear.push(field);
        }
        self
    }

    /// Overlays `other` on top of `self`: every field `other` sets wins.
    ///
    /// Attendee lists are replaced, not concatenated. Clear lists are
    /// unioned.
    pub fn overlay(mut self, other: EventDraft) -> Self {
        fn take<T>(base: &mut Option<T>, top: Option<T>) {
            if top.is_some() {
                *base = top;
            }
        }

        take(&mut self.title, other.title);
        take(&mut self.description, other.description);
        take(&mut self.start, other.start);
        take(&mut self.end, other.end);
        take(&mut self.timezone, other.timezone);
        take(&mut self.location, other.location);
        take(&mut self.attendees, other.attendees);
        take(&mut self.send_notifications, other.send_notifications);
        take(&mut self.create_meet, other.create_meet);
        take(&mut self.record_meet, other.record_meet);
        take(&mut self.save_to_storage, other.save_to_storage);
        take(&mut self.calendar_id, other.calendar_id);
        for field in other.clear {
            self = self.clearing(field);
        }
        self
    }
}
