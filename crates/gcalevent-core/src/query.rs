//! Parameters for listing and searching events.

use std::fmt;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, ValidationResult};
use crate::event::DEFAULT_CALENDAR_ID;
use crate::time::{day_range, format_timestamp};

/// Page size used when the caller does not pick one.
pub const DEFAULT_MAX_RESULTS: u32 = 10;

/// Sort order of a listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OrderBy {
    /// Requires expanded recurring events.
    #[default]
    StartTime,
    Updated,
}

impl OrderBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StartTime => "startTime",
            Self::Updated => "updated",
        }
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A listing of events from one calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventListQuery {
    pub calendar_id: String,
    pub max_results: u32,
    pub order_by: OrderBy,
    /// Expand recurring events into their instances.
    pub single_events: bool,
    /// Lower bound on event end; defaults to the time of the request.
    pub time_min: Option<DateTime<FixedOffset>>,
    /// Upper bound on event start.
    pub time_max: Option<DateTime<FixedOffset>>,
    /// Free-text search over summary, description, location and attendees.
    pub q: Option<String>,
}

impl Default for EventListQuery {
    fn default() -> Self {
        Self {
            calendar_id: DEFAULT_CALENDAR_ID.to_string(),
            max_results: DEFAULT_MAX_RESULTS,
            order_by: OrderBy::StartTime,
            single_events: true,
            time_min: None,
            time_max: None,
            q: None,
        }
    }
}

impl EventListQuery {
    /// Upcoming events, starting now.
    pub fn upcoming(calendar_id: impl Into<String>) -> Self {
        Self::default().with_calendar_id(calendar_id)
    }

    /// Upcoming events matching `text`.
    pub fn search(calendar_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            q: Some(text.into()),
            ..Self::upcoming(calendar_id)
        }
    }

    /// Events between the start of `first` and the end of `last` in `tz`.
    pub fn between_dates(
        calendar_id: impl Into<String>,
        first: NaiveDate,
        last: NaiveDate,
        tz: Tz,
    ) -> ValidationResult<Self> {
        let (time_min, time_max) = day_range(first, last, tz)?;
        Ok(Self {
            time_min: Some(time_min),
            time_max: Some(time_max),
            ..Self::upcoming(calendar_id)
        })
    }

    /// Events between two instants.
    pub fn between(
        calendar_id: impl Into<String>,
        time_min: DateTime<FixedOffset>,
        time_max: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            time_min: Some(time_min),
            time_max: Some(time_max),
            ..Self::upcoming(calendar_id)
        }
    }

    #[must_use]
    pub fn with_calendar_id(mut self, calendar_id: impl Into<String>) -> Self {
        self.calendar_id = calendar_id.into();
        self
    }

    #[must_use]
    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }

    #[must_use]
    pub fn with_order_by(mut self, order_by: OrderBy) -> Self {
        self.order_by = order_by;
        self
    }

    #[must_use]
    pub fn with_single_events(mut self, single_events: bool) -> Self {
        self.single_events = single_events;
        self
    }

    /// Limits the listing to `days` days after `now`.
    pub fn within_days(mut self, now: DateTime<Utc>, days: u32) -> ValidationResult<Self> {
        let max = Duration::try_days(i64::from(days))
            .and_then(|window| now.checked_add_signed(window))
            .ok_or_else(|| ValidationError::InvalidQuery(format!("{days} days is out of range")))?;
        self.time_max = Some(max.fixed_offset());
        Ok(self)
    }

    /// Checks the query against `now`, the default lower bound.
    pub fn validate(&self, now: DateTime<Utc>) -> ValidationResult<()> {
        if self.calendar_id.trim().is_empty() {
            return Err(ValidationError::InvalidQuery(
                "calendar id must not be empty".into(),
            ));
        }
        if self.max_results == 0 {
            return Err(ValidationError::InvalidQuery(
                "max results must be at least 1".into(),
            ));
        }
        if self.order_by == OrderBy::StartTime && !self.single_events {
            return Err(ValidationError::InvalidQuery(
                "ordering by start time requires single events".into(),
            ));
        }
        let time_min = self.time_min.unwrap_or_else(|| now.fixed_offset());
        if let Some(time_max) = self.time_max {
            if time_max <= time_min {
                return Err(ValidationError::InvalidQuery(format!(
                    "time max {} is not after time min {}",
                    format_timestamp(&time_max),
                    format_timestamp(&time_min)
                )));
            }
        }
        Ok(())
    }

    /// The lower bound, defaulted to `now`.
    pub fn effective_time_min(&self, now: DateTime<Utc>) -> DateTime<FixedOffset> {
        self.time_min.unwrap_or_else(|| now.fixed_offset())
    }

    /// Renders the query parameters of an events listing.
    pub fn to_params(&self, now: DateTime<Utc>) -> ValidationResult<Vec<(&'static str, String)>> {
        self.validate(now)?;

        let mut params = vec![
            ("maxResults", self.max_results.to_string()),
            ("orderBy", self.order_by.as_str().to_string()),
            ("singleEvents", self.single_events.to_string()),
            ("timeMin", format_timestamp(&self.effective_time_min(now))),
        ];
        if let Some(ref time_max) = self.time_max {
            params.push(("timeMax", format_timestamp(time_max)));
        }
        if let Some(q) = self.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            params.push(("q", q.to_string()));
        }
        Ok(params)
    }
}
