//! The complete, internally consistent event specification.
//!
//! An [`EventSpec`] is only produced by [`normalize`](crate::normalize::normalize),
//! and its fields are private so the invariants established there keep
//! holding afterwards:
//!
//! - `end` is strictly after `start`
//! - `timezone` is a known IANA zone
//! - the meeting flags satisfy `save_to_storage ⇒ record_meet ⇒ create_meet`
//! - attendee entries are never edited in place, only replaced as a list

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::draft::{AttendeeDraft, EventDraft};
use crate::error::{ValidationError, ValidationResult};
use crate::time::{format_timestamp, resolve_timezone};
use crate::wire::WriteOptions;

/// Placeholder title for drafts that do not carry one.
pub const UNTITLED: &str = "Untitled";

/// Calendar used when neither the draft nor the caller names one.
pub const DEFAULT_CALENDAR_ID: &str = "primary";

/// A resolved event attendee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attendee {
    email: String,
    optional: bool,
}

impl Attendee {
    /// Creates an attendee. Email validation happens during normalization.
    pub fn new(email: impl Into<String>, optional: bool) -> Self {
        Self {
            email: email.into(),
            optional,
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }
}

/// Conference capabilities requested for an event.
///
/// Setting a higher flag forces every flag beneath it on; clearing a lower
/// flag never touches the flags above it, so the chain is re-derived and
/// the lower flag comes back on if something above still needs it.
///
/// `record_meet` has no wire representation. It only gates conference
/// creation: whether the meeting is actually recorded depends on an
/// account-level entitlement on the calendar provider's side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MeetFlags {
    create_meet: bool,
    record_meet: bool,
    save_to_storage: bool,
}

impl MeetFlags {
    /// Builds flags from raw values and derives the implied ones.
    pub fn new(create_meet: bool, record_meet: bool, save_to_storage: bool) -> Self {
        Self {
            create_meet,
            record_meet,
            save_to_storage,
        }
        .derive()
    }

    /// Applies the implication chain, lowest rule first.
    fn derive(mut self) -> Self {
        if self.record_meet {
            self.create_meet = true;
        }
        if self.save_to_storage {
            self.record_meet = true;
            self.create_meet = true;
        }
        self
    }

    pub fn create_meet(&self) -> bool {
        self.create_meet
    }

    pub fn record_meet(&self) -> bool {
        self.record_meet
    }

    pub fn save_to_storage(&self) -> bool {
        self.save_to_storage
    }

    #[must_use]
    pub fn with_create_meet(mut self, value: bool) -> Self {
        self.create_meet = value;
        self.derive()
    }

    #[must_use]
    pub fn with_record_meet(mut self, value: bool) -> Self {
        self.record_meet = value;
        self.derive()
    }

    #[must_use]
    pub fn with_save_to_storage(mut self, value: bool) -> Self {
        self.save_to_storage = value;
        self.derive()
    }
}

/// A fully resolved event, ready to be serialized for transmission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventSpec {
    title: String,
    description: String,
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
    timezone: String,
    location: Option<String>,
    attendees: Vec<Attendee>,
    send_notifications: bool,
    flags: MeetFlags,
    calendar_id: Option<String>,
}

/// Raw parts of an [`EventSpec`], already validated individually.
pub(crate) struct SpecParts {
    pub title: String,
    pub description: String,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    pub timezone: String,
    pub location: Option<String>,
    pub attendees: Vec<Attendee>,
    pub send_notifications: bool,
    pub flags: MeetFlags,
    pub calendar_id: Option<String>,
}

impl EventSpec {
    pub(crate) fn from_parts(parts: SpecParts) -> ValidationResult<Self> {
        check_order(&parts.start, &parts.end)?;
        Ok(Self {
            title: parts.title,
            description: parts.description,
            start: parts.start,
            end: parts.end,
            timezone: parts.timezone,
            location: parts.location,
            attendees: parts.attendees,
            send_notifications: parts.send_notifications,
            flags: parts.flags,
            calendar_id: parts.calendar_id,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn start(&self) -> &DateTime<FixedOffset> {
        &self.start
    }

    pub fn end(&self) -> &DateTime<FixedOffset> {
        &self.end
    }

    pub fn timezone(&self) -> &str {
        &self.timezone
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn attendees(&self) -> &[Attendee] {
        &self.attendees
    }

    pub fn send_notifications(&self) -> bool {
        self.send_notifications
    }

    pub fn flags(&self) -> MeetFlags {
        self.flags
    }

    pub fn create_meet(&self) -> bool {
        self.flags.create_meet()
    }

    pub fn record_meet(&self) -> bool {
        self.flags.record_meet()
    }

    pub fn save_to_storage(&self) -> bool {
        self.flags.save_to_storage()
    }

    /// The calendar named by the draft, if any.
    pub fn calendar_id(&self) -> Option<&str> {
        self.calendar_id.as_deref()
    }

    /// The calendar named by the draft, or `default` when it named none.
    pub fn calendar_id_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.calendar_id.as_deref().unwrap_or(default)
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Sets the location; an empty value removes it.
    pub fn set_location(&mut self, location: Option<String>) {
        self.location = location.filter(|l| !l.trim().is_empty());
    }

    /// Replaces the whole attendee list.
    pub fn replace_attendees(&mut self, attendees: Vec<Attendee>) {
        self.attendees = attendees;
    }

    /// Moves the event to a new time range.
    pub fn set_times(
        &mut self,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> ValidationResult<()> {
        check_order(&start, &end)?;
        self.start = start;
        self.end = end;
        Ok(())
    }

    pub fn set_timezone(&mut self, timezone: &str) -> ValidationResult<()> {
        resolve_timezone(timezone)?;
        self.timezone = timezone.trim().to_string();
        Ok(())
    }

    pub fn set_send_notifications(&mut self, send: bool) {
        self.send_notifications = send;
    }

    pub fn set_create_meet(&mut self, value: bool) {
        self.flags = self.flags.with_create_meet(value);
    }

    pub fn set_record_meet(&mut self, value: bool) {
        self.flags = self.flags.with_record_meet(value);
    }

    pub fn set_save_to_storage(&mut self, value: bool) {
        self.flags = self.flags.with_save_to_storage(value);
    }

    /// Options the calendar service needs alongside the wire record.
    pub fn write_options(&self) -> WriteOptions {
        WriteOptions {
            send_updates: self.send_notifications,
            conference_data_version: self.create_meet().then_some(1),
        }
    }

    /// Re-expresses the spec as a fully populated draft.
    pub fn to_draft(&self) -> EventDraft {
        EventDraft {
            title: Some(self.title.clone()),
            description: Some(self.description.clone()),
            start: Some(format_timestamp(&self.start)),
            end: Some(format_timestamp(&self.end)),
            timezone: Some(self.timezone.clone()),
            location: self.location.clone(),
            attendees: (!self.attendees.is_empty()).then(|| {
                self.attendees
                    .iter()
                    .map(|a| AttendeeDraft {
                        email: Some(a.email.clone()),
                        optional: Some(a.optional),
                    })
                    .collect()
            }),
            send_notifications: Some(self.send_notifications),
            create_meet: Some(self.flags.create_meet),
            record_meet: Some(self.flags.record_meet),
            save_to_storage: Some(self.flags.save_to_storage),
            calendar_id: self.calendar_id.clone(),
            clear: Vec::new(),
        }
    }
}

pub(crate) fn check_order(
    start: &DateTime<FixedOffset>,
    end: &DateTime<FixedOffset>,
) -> ValidationResult<()> {
    if end <= start {
        return Err(ValidationError::EndNotAfterStart {
            start: format_timestamp(start),
            end: format_timestamp(end),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::parse_timestamp;

    fn spec() -> EventSpec {
        EventSpec::from_parts(SpecParts {
            title: "Review".into(),
            description: String::new(),
            start: parse_timestamp("start", "2025-06-01T10:00:00-04:00").unwrap(),
            end: parse_timestamp("end", "2025-06-01T11:00:00-04:00").unwrap(),
            timezone: "America/New_York".into(),
            location: None,
            attendees: Vec::new(),
            send_notifications: false,
            flags: MeetFlags::default(),
            calendar_id: None,
        })
        .unwrap()
    }

    #[test]
    fn record_implies_meet() {
        let flags = MeetFlags::new(false, true, false);
        assert!(flags.create_meet());
        assert!(flags.record_meet());
        assert!(!flags.save_to_storage());
    }

    #[test]
    fn save_implies_whole_chain() {
        let flags = MeetFlags::new(false, false, true);
        assert!(flags.create_meet());
        assert!(flags.record_meet());
        assert!(flags.save_to_storage());
    }

    #[test]
    fn meet_alone_implies_nothing_above() {
        let flags = MeetFlags::new(true, false, false);
        assert!(flags.create_meet());
        assert!(!flags.record_meet());
        assert!(!flags.save_to_storage());
    }

    #[test]
    fn clearing_lower_flag_keeps_upper_flags() {
        let flags = MeetFlags::new(false, false, true).with_create_meet(false);
        assert!(flags.save_to_storage());
        assert!(flags.record_meet());
        assert!(flags.create_meet());

        let flags = MeetFlags::new(false, true, false).with_record_meet(false);
        assert!(!flags.record_meet());
        assert!(flags.create_meet());
    }

    #[test]
    fn setters_enforce_chain() {
        let mut spec = spec();
        assert!(!spec.create_meet());

        spec.set_save_to_storage(true);
        assert!(spec.create_meet() && spec.record_meet() && spec.save_to_storage());

        spec.set_record_meet(false);
        assert!(spec.record_meet(), "save_to_storage still requires recording");
    }

    #[test]
    fn set_times_rejects_inverted_range() {
        let mut spec = spec();
        let start = parse_timestamp("start", "2025-06-01T12:00:00-04:00").unwrap();
        let end = parse_timestamp("end", "2025-06-01T12:00:00-04:00").unwrap();
        assert!(matches!(
            spec.set_times(start, end),
            Err(ValidationError::EndNotAfterStart { .. })
        ));
        assert_eq!(format_timestamp(spec.start()), "2025-06-01T10:00:00-04:00");
    }

    #[test]
    fn set_location_drops_blank_values() {
        let mut spec = spec();
        spec.set_location(Some("   ".into()));
        assert_eq!(spec.location(), None);
        spec.set_location(Some("Room 4".into()));
        assert_eq!(spec.location(), Some("Room 4"));
    }

    #[test]
    fn set_timezone_rejects_unknown_zone() {
        let mut spec = spec();
        assert!(matches!(
            spec.set_timezone("Mars/Olympus"),
            Err(ValidationError::UnknownTimezone(_))
        ));
        assert_eq!(spec.timezone(), "America/New_York");

        spec.set_timezone(" Europe/Paris ").unwrap();
        assert_eq!(spec.timezone(), "Europe/Paris");
    }

    #[test]
    fn text_setters_replace_values() {
        let mut spec = spec();
        spec.set_title("Retro");
        spec.set_description("Sprint 12");
        assert_eq!(spec.title(), "Retro");
        assert_eq!(spec.description(), "Sprint 12");
    }

    #[test]
    fn replace_attendees_drops_previous_list() {
        let mut spec = spec();
        spec.replace_attendees(vec![
            Attendee::new("a@example.com", false),
            Attendee::new("b@example.com", true),
        ]);
        spec.replace_attendees(vec![Attendee::new("c@example.com", true)]);
        assert_eq!(spec.attendees(), &[Attendee::new("c@example.com", true)]);
        assert!(spec.attendees()[0].is_optional());

        spec.replace_attendees(Vec::new());
        assert!(spec.attendees().is_empty());
    }

    #[test]
    fn calendar_id_falls_back_to_caller_default() {
        let spec = spec();
        assert_eq!(spec.calendar_id(), None);
        assert_eq!(spec.calendar_id_or(DEFAULT_CALENDAR_ID), "primary");
    }

    #[test]
    fn write_options_follow_flags() {
        let mut spec = spec();
        assert_eq!(spec.write_options().conference_data_version, None);
        spec.set_record_meet(true);
        spec.set_send_notifications(true);
        let options = spec.write_options();
        assert!(options.send_updates);
        assert_eq!(options.conference_data_version, Some(1));
    }
}
