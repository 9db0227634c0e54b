//! Sparse updates to an existing remote event.
//!
//! An [`EventPatch`] is what patch-mode normalization produces. Unlike an
//! [`EventSpec`] it carries no defaults: a field the caller left absent or
//! empty is [`FieldUpdate::Keep`], and only fields named in the draft's
//! `clear` list become [`FieldUpdate::Clear`].

use chrono::{DateTime, FixedOffset};

use crate::event::{Attendee, EventSpec};

/// What an update does to a single field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldUpdate<T> {
    /// Leave the remote value untouched.
    #[default]
    Keep,
    /// Overwrite the remote value.
    Set(T),
    /// Remove the remote value.
    Clear,
}

impl<T> FieldUpdate<T> {
    /// `Set` for a value that passes `non_empty`, `Keep` otherwise.
    pub fn non_empty(value: Option<T>, is_empty: impl FnOnce(&T) -> bool) -> Self {
        match value {
            Some(v) if !is_empty(&v) => Self::Set(v),
            _ => Self::Keep,
        }
    }

    pub fn is_keep(&self) -> bool {
        matches!(self, Self::Keep)
    }

    pub fn as_set(&self) -> Option<&T> {
        match self {
            Self::Set(v) => Some(v),
            _ => None,
        }
    }
}

/// The validated changes of a partial update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventPatch {
    pub title: FieldUpdate<String>,
    pub description: FieldUpdate<String>,
    pub start: Option<DateTime<FixedOffset>>,
    pub end: Option<DateTime<FixedOffset>>,
    /// Zone applied to new or existing timed boundaries.
    pub timezone: Option<String>,
    pub location: FieldUpdate<String>,
    pub attendees: FieldUpdate<Vec<Attendee>>,
    pub send_notifications: bool,
    pub calendar_id: Option<String>,
    /// Zone used for a new boundary when neither the patch nor the remote
    /// event names one.
    pub fallback_timezone: String,
}

impl EventPatch {
    /// A patch that changes nothing.
    pub fn empty(fallback_timezone: impl Into<String>) -> Self {
        Self {
            title: FieldUpdate::Keep,
            description: FieldUpdate::Keep,
            start: None,
            end: None,
            timezone: None,
            location: FieldUpdate::Keep,
            attendees: FieldUpdate::Keep,
            send_notifications: false,
            calendar_id: None,
            fallback_timezone: fallback_timezone.into(),
        }
    }

    /// Whether applying this patch would leave the event as it is.
    pub fn is_noop(&self) -> bool {
        self.title.is_keep()
            && self.description.is_keep()
            && self.start.is_none()
            && self.end.is_none()
            && self.timezone.is_none()
            && self.location.is_keep()
            && self.attendees.is_keep()
    }
}

impl From<&EventSpec> for EventPatch {
    /// Overwrites every non-empty field of `spec`; empty ones are kept.
    fn from(spec: &EventSpec) -> Self {
        Self {
            title: FieldUpdate::non_empty(Some(spec.title().to_string()), |t| t.trim().is_empty()),
            description: FieldUpdate::non_empty(Some(spec.description().to_string()), |d| {
                d.trim().is_empty()
            }),
            start: Some(*spec.start()),
            end: Some(*spec.end()),
            timezone: Some(spec.timezone().to_string()),
            location: FieldUpdate::non_empty(spec.location().map(str::to_string), |l| {
                l.trim().is_empty()
            }),
            attendees: FieldUpdate::non_empty(Some(spec.attendees().to_vec()), Vec::is_empty),
            send_notifications: spec.send_notifications(),
            calendar_id: spec.calendar_id().map(str::to_string),
            fallback_timezone: spec.timezone().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_maps_blank_to_keep() {
        let blank: FieldUpdate<String> = FieldUpdate::non_empty(Some("  ".into()), |s| s.trim().is_empty());
        assert!(blank.is_keep());
        let absent: FieldUpdate<String> = FieldUpdate::non_empty(None, |s| s.is_empty());
        assert!(absent.is_keep());
        let set = FieldUpdate::non_empty(Some("x".to_string()), |s| s.is_empty());
        assert_eq!(set.as_set().map(String::as_str), Some("x"));
    }

    #[test]
    fn empty_patch_is_noop() {
        let patch = EventPatch::empty("UTC");
        assert!(patch.is_noop());
        assert_eq!(patch.fallback_timezone, "UTC");
    }
}
