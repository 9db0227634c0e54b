//! Timestamp and timezone helpers.
//!
//! Event boundaries are carried as [`DateTime<FixedOffset>`] so the
//! caller's original offset survives a round trip to the wire record.
//! Zone names are checked against the IANA database from `chrono-tz`.

use chrono::{
    DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeZone,
    Utc,
};
use chrono_tz::Tz;
use tracing::debug;

use crate::error::{ValidationError, ValidationResult};

/// Zone used when a draft does not name one.
pub const DEFAULT_TIMEZONE: &str = "America/New_York";

/// Parses an RFC 3339 timestamp carrying an explicit offset.
pub fn parse_timestamp(field: &'static str, raw: &str) -> ValidationResult<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(raw.trim()).map_err(|e| ValidationError::InvalidTimestamp {
        field,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

/// Formats a timestamp the way the calendar API expects it.
///
/// Fractional seconds appear only when non-zero; a zero offset is
/// written as `Z`.
pub fn format_timestamp(dt: &DateTime<FixedOffset>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Resolves an IANA zone identifier.
pub fn resolve_timezone(name: &str) -> ValidationResult<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| ValidationError::UnknownTimezone(name.to_string()))
}

/// Returns the whole-day range `[first 00:00:00, last 23:59:59]` in `tz`.
///
/// Ambiguous local times (DST fall-back) resolve to the earlier instant.
/// When a bound falls in a DST gap the range shrinks to the nearest local
/// time that exists on that day.
pub fn day_range(
    first: NaiveDate,
    last: NaiveDate,
    tz: Tz,
) -> ValidationResult<(DateTime<FixedOffset>, DateTime<FixedOffset>)> {
    if last < first {
        return Err(ValidationError::InvalidQuery(format!(
            "end date {last} is before start date {first}"
        )));
    }

    let midnight = NaiveTime::from_hms_opt(0, 0, 0).expect("valid time");
    let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).expect("valid time");
    let start = local_instant(first.and_time(midnight), 1, tz, "time_min")?;
    let end = local_instant(last.and_time(end_of_day), -1, tz, "time_max")?;
    Ok((start, end))
}

/// Resolves a local time in `tz`, stepping `step_minutes` at a time while
/// it falls in a gap. The search never leaves the starting day.
fn local_instant(
    naive: NaiveDateTime,
    step_minutes: i64,
    tz: Tz,
    field: &'static str,
) -> ValidationResult<DateTime<FixedOffset>> {
    let day = naive.date();
    let step = Duration::minutes(step_minutes);
    let mut candidate = naive;
    while candidate.date() == day {
        if let Some(dt) = tz.from_local_datetime(&candidate).earliest() {
            if candidate != naive {
                debug!(
                    field,
                    requested = %naive,
                    resolved = %candidate,
                    timezone = tz.name(),
                    "Local time skipped by DST, using nearest existing time"
                );
            }
            return Ok(dt.fixed_offset());
        }
        match candidate.checked_add_signed(step) {
            Some(next) => candidate = next,
            None => break,
        }
    }
    Err(ValidationError::InvalidTimestamp {
        field,
        value: naive.to_string(),
        reason: format!("does not exist in {}", tz.name()),
    })
}

/// Checks whether `instant` falls on the same calendar day as `reference`,
/// judged in the reference's own offset.
pub fn same_calendar_day(instant: DateTime<Utc>, reference: &DateTime<FixedOffset>) -> bool {
    instant.with_timezone(reference.offset()).date_naive() == reference.date_naive()
}
