//! Validation errors raised before any remote call is attempted.
//!
//! A [`ValidationError`] always means the caller supplied something
//! incomplete or inconsistent. It is never produced by a transport
//! failure, so callers can react to it without inspecting remote error
//! bodies, and it is never worth retrying.

use thiserror::Error;

/// An input failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A field required for this operation was absent.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// A timestamp could not be parsed as RFC 3339 with an offset.
    #[error("invalid {field} timestamp {value:?}: {reason}")]
    InvalidTimestamp {
        field: &'static str,
        value: String,
        reason: String,
    },

    /// The event would end at or before the moment it starts.
    #[error("end ({end}) must be after start ({start})")]
    EndNotAfterStart { start: String, end: String },

    /// The timezone is not a known IANA zone identifier.
    #[error("unknown timezone {0:?}")]
    UnknownTimezone(String),

    /// An attendee entry has no email address.
    #[error("attendee #{index} has no email")]
    MissingAttendeeEmail { index: usize },

    /// An attendee email does not look like an address.
    #[error("attendee #{index} has an invalid email {email:?}")]
    InvalidAttendeeEmail { index: usize, email: String },

    /// A field was both given a value and asked to be cleared.
    #[error("{0} cannot be both set and cleared")]
    ConflictingClear(&'static str),

    /// A required configuration value was absent.
    #[error("configuration: {0} is required")]
    MissingConfig(&'static str),

    /// A list query is internally inconsistent.
    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

impl ValidationError {
    /// Returns the name of the offending field, when there is one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::MissingField(field)
            | Self::InvalidTimestamp { field, .. }
            | Self::ConflictingClear(field)
            | Self::MissingConfig(field) => Some(field),
            Self::EndNotAfterStart { .. } => Some("end"),
            Self::UnknownTimezone(_) => Some("timezone"),
            Self::MissingAttendeeEmail { .. } | Self::InvalidAttendeeEmail { .. } => {
                Some("attendees")
            }
            Self::InvalidQuery(_) => None,
        }
    }
}

/// A specialized Result type for validation.
pub type ValidationResult<T> = Result<T, ValidationError>;
