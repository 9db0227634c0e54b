//! The outbound wire record and its transmission options.
//!
//! [`EventWire`] mirrors the request body of the calendar API's
//! `events.insert` call. Optional blocks are omitted from the JSON when
//! empty rather than sent as `null`.

use serde::{Deserialize, Serialize};

/// Conference solution requested when a meeting link is wanted.
pub const HANGOUTS_MEET: &str = "hangoutsMeet";

/// Start or end of an event on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireDateTime {
    pub date_time: String,
    pub time_zone: String,
}

/// An attendee on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireAttendee {
    pub email: String,
    pub optional: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConferenceSolutionKey {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConferenceRequest {
    /// Idempotency key: the provider deduplicates requests reusing it.
    pub request_id: String,
    pub conference_solution_key: ConferenceSolutionKey,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConferenceData {
    pub create_request: CreateConferenceRequest,
}

impl ConferenceData {
    /// Requests a new Meet conference under the given request id.
    pub fn create_meet(request_id: impl Into<String>) -> Self {
        Self {
            create_request: CreateConferenceRequest {
                request_id: request_id.into(),
                conference_solution_key: ConferenceSolutionKey {
                    kind: HANGOUTS_MEET.to_string(),
                },
            },
        }
    }
}

/// The request body sent to create an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventWire {
    pub summary: String,
    pub description: String,
    pub start: WireDateTime,
    pub end: WireDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attendees: Vec<WireAttendee>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conference_data: Option<ConferenceData>,
}

impl EventWire {
    /// The conference request id, when a conference was requested.
    pub fn request_id(&self) -> Option<&str> {
        self.conference_data
            .as_ref()
            .map(|cd| cd.create_request.request_id.as_str())
    }
}

/// Query options accompanying an insert or update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Whether the provider should email attendees about the change.
    pub send_updates: bool,
    /// Must be `Some(1)` for conference data in the body to be honoured.
    pub conference_data_version: Option<u8>,
}

impl WriteOptions {
    /// Renders the options as query parameters.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![(
            "sendUpdates",
            if self.send_updates { "all" } else { "none" }.to_string(),
        )];
        if let Some(version) = self.conference_data_version {
            params.push(("conferenceDataVersion", version.to_string()));
        }
        params
    }
}

/// Source of conference request ids.
///
/// Every call must return a fresh id unless the caller deliberately wants
/// the provider to deduplicate a resubmission, in which case it should
/// hold on to the id and use [`FixedRequestId`].
pub trait RequestIdSource {
    fn next_request_id(&self) -> String;
}

/// Random v4 UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestIds;

impl RequestIdSource for UuidRequestIds {
    fn next_request_id(&self) -> String {
        uuid::Uuid::new_v4().simple().to_string()
    }
}

/// Always returns the same id, for retry-safe resubmission and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedRequestId(pub String);

impl FixedRequestId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl RequestIdSource for FixedRequestId {
    fn next_request_id(&self) -> String {
        self.0.clone()
    }
}
