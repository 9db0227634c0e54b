//! Turns drafts into event specifications and wire records.
//!
//! Creation and update follow different contracts. [`normalize`] fills
//! defaults and yields a complete [`EventSpec`] that [`serialize`] turns
//! into a full replacement record. [`normalize_patch`] fills nothing: it
//! yields an [`EventPatch`] that [`apply_update`] merges field by field
//! onto a previously fetched [`RemoteEvent`], so an omitted field is never
//! blanked remotely.
//!
//! Everything here is pure. The only non-determinism is the conference
//! request id, which comes from the caller's [`RequestIdSource`].

use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset};
use regex::Regex;
use tracing::debug;

use crate::draft::{AttendeeDraft, EventDraft, EventField};
use crate::error::{ValidationError, ValidationResult};
use crate::event::{check_order, Attendee, EventSpec, MeetFlags, SpecParts, UNTITLED};
use crate::patch::{EventPatch, FieldUpdate};
use crate::remote::{RemoteAttendee, RemoteDateTime, RemoteEvent};
use crate::time::{format_timestamp, parse_timestamp, resolve_timezone, DEFAULT_TIMEZONE};
use crate::wire::{ConferenceData, EventWire, RequestIdSource, WireAttendee, WireDateTime};

static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+$").expect("Invalid email regex"));

/// Settings the normalizer needs from its caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Zone used when a draft does not name one.
    pub fallback_timezone: String,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            fallback_timezone: DEFAULT_TIMEZONE.to_string(),
        }
    }
}

impl NormalizeOptions {
    pub fn new(fallback_timezone: impl Into<String>) -> Self {
        Self {
            fallback_timezone: fallback_timezone.into(),
        }
    }
}

/// Resolves a draft into a complete specification for event creation.
///
/// `start` and `end` are required; every other field has a default. The
/// draft's `clear` list has no meaning on creation and is ignored.
pub fn normalize(draft: &EventDraft, options: &NormalizeOptions) -> ValidationResult<EventSpec> {
    let start = required_timestamp("start", draft.start.as_deref())?;
    let end = required_timestamp("end", draft.end.as_deref())?;

    let timezone = match non_blank(draft.timezone.as_deref()) {
        Some(tz) => tz,
        None => options.fallback_timezone.trim(),
    };
    resolve_timezone(timezone)?;

    let attendees = match draft.attendees.as_deref() {
        Some(list) => resolve_attendees(list)?,
        None => Vec::new(),
    };

    let flags = MeetFlags::new(
        draft.create_meet.unwrap_or(false),
        draft.record_meet.unwrap_or(false),
        draft.save_to_storage.unwrap_or(false),
    );

    if !draft.clear.is_empty() {
        debug!(fields = ?draft.clear, "Ignoring clear list on creation");
    }

    EventSpec::from_parts(SpecParts {
        title: draft.title.clone().unwrap_or_else(|| UNTITLED.to_string()),
        description: draft.description.clone().unwrap_or_default(),
        start,
        end,
        timezone: timezone.to_string(),
        location: non_blank(draft.location.as_deref()).map(str::to_string),
        attendees,
        send_notifications: draft.send_notifications.unwrap_or(false),
        flags,
        calendar_id: non_blank(draft.calendar_id.as_deref()).map(str::to_string),
    })
}

/// Resolves a draft into a sparse update.
///
/// Absent or empty values keep the remote value. Only `description`,
/// `location` and `attendees` can be cleared, and only by naming them in
/// the draft's `clear` list; naming a field there while also giving it a
/// value is rejected.
pub fn normalize_patch(
    draft: &EventDraft,
    options: &NormalizeOptions,
) -> ValidationResult<EventPatch> {
    resolve_timezone(&options.fallback_timezone)?;

    let clears = |field: EventField| draft.clear.contains(&field);

    let description = text_update(
        EventField::Description,
        draft.description.as_deref(),
        clears(EventField::Description),
    )?;
    let location = text_update(
        EventField::Location,
        draft.location.as_deref(),
        clears(EventField::Location),
    )?;

    let supplied_attendees = draft.attendees.as_deref().filter(|list| !list.is_empty());
    let attendees = match (supplied_attendees, clears(EventField::Attendees)) {
        (Some(_), true) => {
            return Err(ValidationError::ConflictingClear(
                EventField::Attendees.as_str(),
            ));
        }
        (Some(list), false) => FieldUpdate::Set(resolve_attendees(list)?),
        (None, true) => FieldUpdate::Clear,
        (None, false) => FieldUpdate::Keep,
    };

    let start = optional_timestamp("start", draft.start.as_deref())?;
    let end = optional_timestamp("end", draft.end.as_deref())?;
    if let (Some(start), Some(end)) = (&start, &end) {
        check_order(start, end)?;
    }

    let timezone = match non_blank(draft.timezone.as_deref()) {
        Some(tz) => {
            resolve_timezone(tz)?;
            Some(tz.to_string())
        }
        None => None,
    };

    if draft.create_meet.is_some() || draft.record_meet.is_some() || draft.save_to_storage.is_some()
    {
        debug!("Ignoring meeting flags on update");
    }

    Ok(EventPatch {
        title: FieldUpdate::non_empty(draft.title.clone(), |t| t.trim().is_empty()),
        description,
        start,
        end,
        timezone,
        location,
        attendees,
        send_notifications: draft.send_notifications.unwrap_or(false),
        calendar_id: non_blank(draft.calendar_id.as_deref()).map(str::to_string),
        fallback_timezone: options.fallback_timezone.trim().to_string(),
    })
}

/// Renders a specification as the record sent to create an event.
///
/// A conference block is added only when a meeting link is requested,
/// under a request id drawn from `ids` on every call.
pub fn serialize(spec: &EventSpec, ids: &dyn RequestIdSource) -> EventWire {
    let boundary = |dt: &DateTime<FixedOffset>| WireDateTime {
        date_time: format_timestamp(dt),
        time_zone: spec.timezone().to_string(),
    };

    EventWire {
        summary: spec.title().to_string(),
        description: spec.description().to_string(),
        start: boundary(spec.start()),
        end: boundary(spec.end()),
        location: spec.location().map(str::to_string),
        attendees: spec
            .attendees()
            .iter()
            .map(|a| WireAttendee {
                email: a.email().to_string(),
                optional: a.is_optional(),
            })
            .collect(),
        conference_data: spec
            .create_meet()
            .then(|| ConferenceData::create_meet(ids.next_request_id())),
    }
}

/// Merges a patch onto a fetched remote event.
///
/// Fields the patch keeps are copied from `existing` untouched, including
/// everything this crate does not model. The result is not re-validated;
/// see [`validate_merged`].
pub fn apply_update(existing: &RemoteEvent, patch: &EventPatch) -> RemoteEvent {
    let mut merged = existing.clone();

    if let Some(title) = patch.title.as_set() {
        merged.summary = Some(title.clone());
    }
    apply_text(&mut merged.description, &patch.description);
    apply_text(&mut merged.location, &patch.location);

    match &patch.attendees {
        FieldUpdate::Keep => {}
        FieldUpdate::Clear => merged.attendees.clear(),
        FieldUpdate::Set(list) => merged.attendees = merge_attendees(&existing.attendees, list),
    }

    apply_boundary(&mut merged.start, patch.start.as_ref(), patch);
    apply_boundary(&mut merged.end, patch.end.as_ref(), patch);

    merged
}

/// Checks that a merged event still ends after it starts.
///
/// Boundaries that are missing, unparsable, or mix timed and all-day
/// values are left for the remote service to judge.
pub fn validate_merged(event: &RemoteEvent) -> ValidationResult<()> {
    if let (Some(start), Some(end)) = (event.start.parsed(), event.end.parsed()) {
        return check_order(&start, &end);
    }
    if let (Some(start), Some(end)) = (event.start.parsed_date(), event.end.parsed_date()) {
        if end <= start {
            return Err(ValidationError::EndNotAfterStart {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
    }
    Ok(())
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn required_timestamp(
    field: &'static str,
    raw: Option<&str>,
) -> ValidationResult<DateTime<FixedOffset>> {
    let raw = non_blank(raw).ok_or(ValidationError::MissingField(field))?;
    parse_timestamp(field, raw)
}

fn optional_timestamp(
    field: &'static str,
    raw: Option<&str>,
) -> ValidationResult<Option<DateTime<FixedOffset>>> {
    non_blank(raw)
        .map(|raw| parse_timestamp(field, raw))
        .transpose()
}

fn text_update(
    field: EventField,
    value: Option<&str>,
    clear: bool,
) -> ValidationResult<FieldUpdate<String>> {
    let value = non_blank(value);
    match (value, clear) {
        (Some(_), true) => Err(ValidationError::ConflictingClear(field.as_str())),
        (Some(v), false) => Ok(FieldUpdate::Set(v.to_string())),
        (None, true) => Ok(FieldUpdate::Clear),
        (None, false) => Ok(FieldUpdate::Keep),
    }
}

fn resolve_attendees(list: &[AttendeeDraft]) -> ValidationResult<Vec<Attendee>> {
    list.iter()
        .enumerate()
        .map(|(index, draft)| {
            let email = non_blank(draft.email.as_deref())
                .ok_or(ValidationError::MissingAttendeeEmail { index })?;
            if !EMAIL_REGEX.is_match(email) {
                return Err(ValidationError::InvalidAttendeeEmail {
                    index,
                    email: email.to_string(),
                });
            }
            Ok(Attendee::new(email, draft.optional.unwrap_or(false)))
        })
        .collect()
}

fn apply_text(target: &mut Option<String>, update: &FieldUpdate<String>) {
    match update {
        FieldUpdate::Keep => {}
        FieldUpdate::Set(value) => *target = Some(value.clone()),
        FieldUpdate::Clear => *target = None,
    }
}

/// Replaces the attendee list, keeping what the service recorded about
/// people who were already invited (response status, display name).
fn merge_attendees(existing: &[RemoteAttendee], list: &[Attendee]) -> Vec<RemoteAttendee> {
    list.iter()
        .map(|attendee| {
            let mut entry = existing
                .iter()
                .find(|e| e.email.eq_ignore_ascii_case(attendee.email()))
                .cloned()
                .unwrap_or_default();
            entry.email = attendee.email().to_string();
            entry.optional = Some(attendee.is_optional());
            entry
        })
        .collect()
}

fn apply_boundary(
    target: &mut RemoteDateTime,
    value: Option<&DateTime<FixedOffset>>,
    patch: &EventPatch,
) {
    match value {
        Some(dt) => {
            let zone = patch
                .timezone
                .clone()
                .or_else(|| target.time_zone.clone())
                .unwrap_or_else(|| patch.fallback_timezone.clone());
            *target = RemoteDateTime {
                date_time: Some(format_timestamp(dt)),
                date: None,
                time_zone: Some(zone),
            };
        }
        None => {
            if let Some(ref zone) = patch.timezone {
                if target.date_time.is_some() {
                    target.time_zone = Some(zone.clone());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::FixedRequestId;

    fn options() -> NormalizeOptions {
        NormalizeOptions::default()
    }

    fn standup() -> EventDraft {
        EventDraft::new()
            .with_title("Standup")
            .with_start("2025-06-01T10:00:00-04:00")
            .with_end("2025-06-01T10:15:00-04:00")
    }

    fn remote() -> RemoteEvent {
        serde_json::from_value(serde_json::json!({
            "id": "evt1",
            "summary": "Planning",
            "description": "Quarterly planning",
            "location": "Room 1",
            "start": {"dateTime": "2025-06-01T10:00:00-04:00", "timeZone": "America/New_York"},
            "end": {"dateTime": "2025-06-01T11:00:00-04:00", "timeZone": "America/New_York"},
            "attendees": [
                {"email": "a@x.com", "responseStatus": "accepted"},
                {"email": "b@x.com", "optional": true}
            ],
            "reminders": {"useDefault": true}
        }))
        .unwrap()
    }

    #[test]
    fn minimal_draft_gets_defaults() {
        let spec = normalize(&standup(), &options()).unwrap();
        assert_eq!(spec.title(), "Standup");
        assert_eq!(spec.description(), "");
        assert_eq!(spec.timezone(), DEFAULT_TIMEZONE);
        assert!(!spec.send_notifications());
        assert!(!spec.create_meet() && !spec.record_meet() && !spec.save_to_storage());

        let wire = serde_json::to_value(serialize(&spec, &FixedRequestId::new("r"))).unwrap();
        let keys: Vec<_> = wire.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys.len(), 4);
        assert!(wire.get("location").is_none());
        assert!(wire.get("attendees").is_none());
        assert!(wire.get("conferenceData").is_none());
    }

    #[test]
    fn missing_title_becomes_untitled() {
        let mut draft = standup();
        draft.title = None;
        let spec = normalize(&draft, &options()).unwrap();
        assert_eq!(serialize(&spec, &FixedRequestId::new("r")).summary, UNTITLED);
    }

    #[test]
    fn present_title_is_kept_verbatim() {
        let draft = standup().with_title("  Standup (daily)  ");
        let spec = normalize(&draft, &options()).unwrap();
        assert_eq!(
            serialize(&spec, &FixedRequestId::new("r")).summary,
            "  Standup (daily)  "
        );
    }

    #[test]
    fn blank_title_is_not_replaced() {
        let draft = standup().with_title("   ");
        let spec = normalize(&draft, &options()).unwrap();
        assert_eq!(spec.title(), "   ");
    }

    #[test]
    fn missing_start_or_end_is_rejected() {
        let mut draft = standup();
        draft.start = None;
        assert_eq!(
            normalize(&draft, &options()).unwrap_err(),
            ValidationError::MissingField("start")
        );

        let mut draft = standup();
        draft.end = Some("   ".into());
        assert_eq!(
            normalize(&draft, &options()).unwrap_err(),
            ValidationError::MissingField("end")
        );
    }

    #[test]
    fn end_must_follow_start() {
        let draft = standup().with_end("2025-06-01T09:00:00-04:00");
        assert!(matches!(
            normalize(&draft, &options()),
            Err(ValidationError::EndNotAfterStart { .. })
        ));
    }

    #[test]
    fn offsets_are_compared_as_instants() {
        // 15:30Z is 11:30 in New York, after the 10:00 start.
        let draft = standup().with_end("2025-06-01T15:30:00Z");
        assert!(normalize(&draft, &options()).is_ok());
    }

    #[test]
    fn unknown_timezone_is_rejected() {
        let draft = standup().with_timezone("Atlantis/Central");
        assert_eq!(
            normalize(&draft, &options()).unwrap_err(),
            ValidationError::UnknownTimezone("Atlantis/Central".into())
        );

        let bad_fallback = NormalizeOptions::new("Nowhere");
        assert!(normalize(&standup(), &bad_fallback).is_err());
    }

    #[test]
    fn fallback_timezone_comes_from_options() {
        let spec = normalize(&standup(), &NormalizeOptions::new("Europe/Paris")).unwrap();
        assert_eq!(spec.timezone(), "Europe/Paris");

        let spec = normalize(&standup().with_timezone("Asia/Tokyo"), &options()).unwrap();
        assert_eq!(spec.timezone(), "Asia/Tokyo");
    }

    #[test]
    fn blank_location_is_omitted() {
        let spec = normalize(&standup().with_location(""), &options()).unwrap();
        assert_eq!(spec.location(), None);

        let spec = normalize(&standup().with_location("Room 4"), &options()).unwrap();
        assert_eq!(spec.location(), Some("Room 4"));
    }

    #[test]
    fn attendees_keep_order_and_default_optional() {
        let draft = standup()
            .with_attendee(AttendeeDraft::new("a@x.com"))
            .with_attendee(AttendeeDraft::optional("b@x.com"))
            .with_attendee(AttendeeDraft::new("a@x.com"));
        let spec = normalize(&draft, &options()).unwrap();

        let attendees: Vec<_> = spec
            .attendees()
            .iter()
            .map(|a| (a.email(), a.is_optional()))
            .collect();
        assert_eq!(
            attendees,
            vec![("a@x.com", false), ("b@x.com", true), ("a@x.com", false)]
        );
    }

    #[test]
    fn attendee_without_email_is_rejected() {
        let draft = standup()
            .with_attendee(AttendeeDraft::new("a@x.com"))
            .with_attendee(AttendeeDraft::default());
        assert_eq!(
            normalize(&draft, &options()).unwrap_err(),
            ValidationError::MissingAttendeeEmail { index: 1 }
        );

        let draft = standup().with_attendee(AttendeeDraft::new("not an email"));
        assert!(matches!(
            normalize(&draft, &options()),
            Err(ValidationError::InvalidAttendeeEmail { index: 0, .. })
        ));
    }

    #[test]
    fn save_to_storage_forces_whole_chain() {
        let spec = normalize(&standup().with_save_to_storage(true), &options()).unwrap();
        assert!(spec.create_meet() && spec.record_meet() && spec.save_to_storage());

        let wire = serialize(&spec, &FixedRequestId::new("req-1"));
        assert_eq!(wire.request_id(), Some("req-1"));
        assert_eq!(spec.write_options().conference_data_version, Some(1));
    }

    #[test]
    fn record_implies_meet_but_not_converse() {
        let spec = normalize(&standup().with_record_meet(true), &options()).unwrap();
        assert!(spec.create_meet());
        assert!(!spec.save_to_storage());

        let spec = normalize(&standup().with_create_meet(true), &options()).unwrap();
        assert!(!spec.record_meet());
    }

    #[test]
    fn calendar_id_is_not_defaulted() {
        let spec = normalize(&standup(), &options()).unwrap();
        assert_eq!(spec.calendar_id(), None);

        let spec = normalize(&standup().with_calendar_id("team@x.com"), &options()).unwrap();
        assert_eq!(spec.calendar_id(), Some("team@x.com"));
    }

    #[test]
    fn normalization_is_idempotent() {
        let draft = standup()
            .with_description("Daily sync")
            .with_location("Room 4")
            .with_timezone("Europe/Paris")
            .with_attendee(AttendeeDraft::new("a@x.com"))
            .with_attendee(AttendeeDraft::optional("b@x.com"))
            .with_record_meet(true)
            .with_calendar_id("team@x.com");
        let once = normalize(&draft, &options()).unwrap();
        let twice = normalize(&once.to_draft(), &options()).unwrap();
        assert_eq!(once, twice);

        let bare = normalize(&standup(), &options()).unwrap();
        assert_eq!(normalize(&bare.to_draft(), &options()).unwrap(), bare);
    }

    #[test]
    fn serialize_draws_fresh_ids() {
        struct Counter(std::cell::Cell<u32>);
        impl RequestIdSource for Counter {
            fn next_request_id(&self) -> String {
                self.0.set(self.0.get() + 1);
                format!("req-{}", self.0.get())
            }
        }

        let spec = normalize(&standup().with_create_meet(true), &options()).unwrap();
        let ids = Counter(std::cell::Cell::new(0));
        let first = serialize(&spec, &ids);
        let second = serialize(&spec, &ids);
        assert_eq!(first.request_id(), Some("req-1"));
        assert_eq!(second.request_id(), Some("req-2"));

        let fixed = FixedRequestId::new("same");
        assert_eq!(serialize(&spec, &fixed), serialize(&spec, &fixed));
    }

    #[test]
    fn wire_shape_snapshot() {
        let draft = EventDraft::new()
            .with_title("Design review")
            .with_description("Walk through the draft")
            .with_start("2025-06-02T14:00:00+02:00")
            .with_end("2025-06-02T15:00:00+02:00")
            .with_timezone("Europe/Paris")
            .with_location("Room 4")
            .with_attendee(AttendeeDraft::new("a@x.com"))
            .with_attendee(AttendeeDraft::optional("b@x.com"))
            .with_create_meet(true);
        let spec = normalize(&draft, &options()).unwrap();
        let wire = serialize(&spec, &FixedRequestId::new("0f3c9a"));

        insta::assert_json_snapshot!(wire, @r#"
        {
          "summary": "Design review",
          "description": "Walk through the draft",
          "start": {
            "dateTime": "2025-06-02T14:00:00+02:00",
            "timeZone": "Europe/Paris"
          },
          "end": {
            "dateTime": "2025-06-02T15:00:00+02:00",
            "timeZone": "Europe/Paris"
          },
          "location": "Room 4",
          "attendees": [
            {
              "email": "a@x.com",
              "optional": false
            },
            {
              "email": "b@x.com",
              "optional": true
            }
          ],
          "conferenceData": {
            "createRequest": {
              "requestId": "0f3c9a",
              "conferenceSolutionKey": {
                "type": "hangoutsMeet"
              }
            }
          }
        }
        "#);
    }

    #[test]
    fn empty_patch_keeps_everything() {
        let existing = remote();
        let patch = normalize_patch(&EventDraft::new().with_location(""), &options()).unwrap();
        assert!(patch.is_noop());
        assert_eq!(apply_update(&existing, &patch), existing);
    }

    #[test]
    fn patch_overwrites_only_supplied_fields() {
        let existing = remote();
        let draft = EventDraft::new()
            .with_title("Planning (moved)")
            .with_description("")
            .with_start("2025-06-01T13:00:00-04:00")
            .with_end("2025-06-01T14:00:00-04:00");
        let patch = normalize_patch(&draft, &options()).unwrap();
        let merged = apply_update(&existing, &patch);

        assert_eq!(merged.summary.as_deref(), Some("Planning (moved)"));
        assert_eq!(merged.description.as_deref(), Some("Quarterly planning"));
        assert_eq!(merged.location.as_deref(), Some("Room 1"));
        assert_eq!(merged.attendees, existing.attendees);
        assert_eq!(
            merged.start.date_time.as_deref(),
            Some("2025-06-01T13:00:00-04:00")
        );
        assert_eq!(merged.start.time_zone.as_deref(), Some("America/New_York"));
        assert!(merged.extra.contains_key("reminders"));
        assert!(validate_merged(&merged).is_ok());
    }

    #[test]
    fn spec_with_empty_location_keeps_remote_location() {
        let existing = remote();
        let spec = normalize(&standup(), &options()).unwrap();
        let merged = apply_update(&existing, &EventPatch::from(&spec));
        assert_eq!(merged.location, existing.location);
        assert_eq!(merged.description, existing.description);
        assert_eq!(merged.attendees, existing.attendees);
        assert_eq!(merged.summary.as_deref(), Some("Standup"));
    }

    #[test]
    fn explicit_clear_removes_fields() {
        let draft = EventDraft::new()
            .clearing(EventField::Location)
            .clearing(EventField::Attendees)
            .clearing(EventField::Description);
        let patch = normalize_patch(&draft, &options()).unwrap();
        let merged = apply_update(&remote(), &patch);

        assert_eq!(merged.location, None);
        assert_eq!(merged.description, None);
        assert!(merged.attendees.is_empty());
        let body = serde_json::to_value(&merged).unwrap();
        assert!(body.get("location").is_none());
    }

    #[test]
    fn clear_with_value_conflicts() {
        let draft = EventDraft::new()
            .with_location("Room 9")
            .clearing(EventField::Location);
        assert_eq!(
            normalize_patch(&draft, &options()).unwrap_err(),
            ValidationError::ConflictingClear("location")
        );

        let draft = EventDraft::new()
            .with_attendee(AttendeeDraft::new("c@x.com"))
            .clearing(EventField::Attendees);
        assert_eq!(
            normalize_patch(&draft, &options()).unwrap_err(),
            ValidationError::ConflictingClear("attendees")
        );
    }

    #[test]
    fn attendee_replacement_keeps_response_status() {
        let draft = EventDraft::new()
            .with_attendee(AttendeeDraft::optional("A@x.com"))
            .with_attendee(AttendeeDraft::new("c@x.com"));
        let patch = normalize_patch(&draft, &options()).unwrap();
        let merged = apply_update(&remote(), &patch);

        assert_eq!(merged.attendees.len(), 2);
        assert_eq!(merged.attendees[0].email, "A@x.com");
        assert_eq!(merged.attendees[0].optional, Some(true));
        assert_eq!(
            merged.attendees[0].response_status.as_deref(),
            Some("accepted")
        );
        assert_eq!(merged.attendees[1].response_status, None);
    }

    #[test]
    fn patch_timezone_retargets_timed_boundaries() {
        let patch = normalize_patch(&EventDraft::new().with_timezone("Europe/Paris"), &options())
            .unwrap();
        let merged = apply_update(&remote(), &patch);
        assert_eq!(merged.start.time_zone.as_deref(), Some("Europe/Paris"));
        assert_eq!(merged.end.time_zone.as_deref(), Some("Europe/Paris"));
        assert_eq!(merged.start.date_time, remote().start.date_time);
    }

    #[test]
    fn moving_all_day_event_uses_fallback_zone() {
        let existing: RemoteEvent = serde_json::from_value(serde_json::json!({
            "id": "d",
            "start": {"date": "2025-06-01"},
            "end": {"date": "2025-06-02"}
        }))
        .unwrap();
        let draft = EventDraft::new()
            .with_start("2025-06-01T09:00:00-04:00")
            .with_end("2025-06-01T10:00:00-04:00");
        let merged = apply_update(&existing, &normalize_patch(&draft, &options()).unwrap());

        assert_eq!(merged.start.date, None);
        assert_eq!(merged.start.time_zone.as_deref(), Some(DEFAULT_TIMEZONE));
    }

    #[test]
    fn merged_times_are_validated() {
        let draft = EventDraft::new().with_start("2025-06-01T12:00:00-04:00");
        let merged = apply_update(&remote(), &normalize_patch(&draft, &options()).unwrap());
        assert!(matches!(
            validate_merged(&merged),
            Err(ValidationError::EndNotAfterStart { .. })
        ));
    }

    #[test]
    fn patch_rejects_inverted_pair() {
        let draft = EventDraft::new()
            .with_start("2025-06-01T12:00:00-04:00")
            .with_end("2025-06-01T11:00:00-04:00");
        assert!(normalize_patch(&draft, &options()).is_err());
    }
}
