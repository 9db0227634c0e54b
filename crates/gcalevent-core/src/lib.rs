//! Core types: drafts, event specifications, wire records, queries

pub mod config;
pub mod draft;
pub mod error;
pub mod event;
pub mod normalize;
pub mod patch;
pub mod query;
pub mod recording;
pub mod remote;
pub mod time;
pub mod tracing;
pub mod wire;

pub use config::{ConfigInput, ConfigSpec, CredentialSource};
pub use draft::{AttendeeDraft, EventDraft, EventField};
pub use error::{ValidationError, ValidationResult};
pub use event::{Attendee, EventSpec, MeetFlags, DEFAULT_CALENDAR_ID, UNTITLED};
pub use normalize::{
    apply_update, normalize, normalize_patch, serialize, validate_merged, NormalizeOptions,
};
pub use patch::{EventPatch, FieldUpdate};
pub use query::{EventListQuery, OrderBy};
pub use recording::{match_recordings, DriveQuery, FileRecord, RecordingQuery};
pub use remote::{RemoteAttendee, RemoteDateTime, RemoteEvent};
pub use self::tracing::{init_tracing, TracingConfig, TracingError, TracingOutputFormat};
pub use wire::{EventWire, FixedRequestId, RequestIdSource, UuidRequestIds, WriteOptions};
