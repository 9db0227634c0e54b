//! Command-line interface definition.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use gcalevent_core::{AttendeeDraft, EventDraft, EventField};

use crate::error::{ClientError, ClientResult};

/// gcalevent - Create and manage Google Calendar events
#[derive(Debug, Parser)]
#[command(name = "gcalevent")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "GCALEVENT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// Calendar to operate on (defaults to the configured calendar)
    #[arg(long)]
    pub calendar: Option<String>,

    /// OAuth access token for the Calendar and Drive APIs
    #[arg(long, env = "GCALEVENT_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Use in-memory backends; nothing leaves the process
    #[arg(long)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create an event
    Create(EventArgs),

    /// Show an event
    Get {
        event_id: String,

        /// Open the event in the browser
        #[arg(long)]
        open: bool,
    },

    /// Update fields of an existing event
    Update {
        event_id: String,

        #[command(flatten)]
        event: EventArgs,

        /// Clear a field remotely (description, location or attendees; can be repeated)
        #[arg(long, action = clap::ArgAction::Append)]
        clear: Vec<EventField>,
    },

    /// Delete an event
    Delete {
        event_id: String,

        /// Notify attendees of the cancellation
        #[arg(long)]
        notify: bool,
    },

    /// List upcoming events
    List {
        /// Maximum number of events
        #[arg(long)]
        max: Option<u32>,

        /// Only events starting within this many days
        #[arg(long)]
        days: Option<u32>,
    },

    /// Search upcoming events by text
    Search {
        query: String,

        /// Maximum number of events
        #[arg(long)]
        max: Option<u32>,
    },

    /// List events between two dates (YYYY-MM-DD, inclusive)
    Between {
        start_date: NaiveDate,
        end_date: NaiveDate,

        /// Maximum number of events
        #[arg(long)]
        max: Option<u32>,
    },

    /// List calendars visible to the account
    Calendars,

    /// Print the request an event would be created with, as JSON
    Preview(EventArgs),

    /// Find Meet recordings stored for an event
    Recordings {
        event_id: String,

        /// Storage folder holding recordings
        #[arg(long)]
        folder: Option<String>,

        /// MIME type of recording files
        #[arg(long)]
        mime_type: Option<String>,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}

/// Event fields shared by `create`, `update` and `preview`.
#[derive(Debug, Default, Args)]
pub struct EventArgs {
    /// JSON draft to start from; flags override its fields
    #[arg(long, short)]
    pub input: Option<PathBuf>,

    /// Event title
    #[arg(long)]
    pub title: Option<String>,

    /// Event description
    #[arg(long)]
    pub description: Option<String>,

    /// Start time (RFC 3339, e.g. 2030-06-01T10:00:00-04:00)
    #[arg(long)]
    pub start: Option<String>,

    /// End time (RFC 3339)
    #[arg(long, conflicts_with = "duration")]
    pub end: Option<String>,

    /// Duration in minutes, counted from the start
    #[arg(long)]
    pub duration: Option<i64>,

    /// IANA timezone, e.g. Europe/Paris
    #[arg(long)]
    pub timezone: Option<String>,

    /// Event location
    #[arg(long)]
    pub location: Option<String>,

    /// Required attendee email (can be repeated)
    #[arg(long, action = clap::ArgAction::Append)]
    pub attendee: Vec<String>,

    /// Optional attendee email (can be repeated)
    #[arg(long, action = clap::ArgAction::Append)]
    pub optional_attendee: Vec<String>,

    /// Email attendees about the change
    #[arg(long)]
    pub notify: bool,

    /// Attach a Google Meet conference
    #[arg(long)]
    pub meet: bool,

    /// Ask for the meeting to be recorded (implies --meet)
    #[arg(long)]
    pub record: bool,

    /// Keep the recording in Drive (implies --record)
    #[arg(long)]
    pub save_to_storage: bool,
}

impl EventArgs {
    /// Builds the draft these flags describe, on top of `--input` if given.
    pub fn to_draft(&self) -> ClientResult<EventDraft> {
        let base = match &self.input {
            Some(path) => read_draft(path)?,
            None => EventDraft::new(),
        };
        let mut draft = base.overlay(self.flag_draft());

        if let Some(minutes) = self.duration {
            draft.end = Some(end_after(draft.start.as_deref(), minutes)?);
        }
        Ok(draft)
    }

    /// Fields set on the command line only. Unset switches stay `None` so
    /// they do not override the input file.
    fn flag_draft(&self) -> EventDraft {
        let attendees: Vec<AttendeeDraft> = self
            .attendee
            .iter()
            .map(AttendeeDraft::new)
            .chain(self.optional_attendee.iter().map(AttendeeDraft::optional))
            .collect();

        EventDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            start: self.start.clone(),
            end: self.end.clone(),
            timezone: self.timezone.clone(),
            location: self.location.clone(),
            attendees: (!attendees.is_empty()).then_some(attendees),
            send_notifications: self.notify.then_some(true),
            create_meet: self.meet.then_some(true),
            record_meet: self.record.then_some(true),
            save_to_storage: self.save_to_storage.then_some(true),
            ..EventDraft::default()
        }
    }
}

fn read_draft(path: &Path) -> ClientResult<EventDraft> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| {
        ClientError::Usage(format!("invalid draft in {}: {}", path.display(), e))
    })
}

fn end_after(start: Option<&str>, minutes: i64) -> ClientResult<String> {
    if minutes <= 0 {
        return Err(ClientError::Usage("--duration must be positive".into()));
    }
    let start = start
        .ok_or_else(|| ClientError::Usage("--duration needs a start time".into()))?;
    let start = gcalevent_core::time::parse_timestamp("start", start)?;
    let end = chrono::TimeDelta::try_minutes(minutes)
        .and_then(|delta| start.checked_add_signed(delta))
        .ok_or_else(|| ClientError::Usage("--duration is too large".into()))?;
    Ok(gcalevent_core::time::format_timestamp(&end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_create_flags() {
        let cli = Cli::try_parse_from([
            "gcalevent",
            "create",
            "--title",
            "Standup",
            "--start",
            "2030-06-01T10:00:00-04:00",
            "--end",
            "2030-06-01T10:15:00-04:00",
            "--attendee",
            "a@example.com",
            "--optional-attendee",
            "b@example.com",
            "--meet",
        ])
        .unwrap();

        let Command::Create(args) = cli.command else {
            panic!("expected create");
        };
        let draft = args.to_draft().unwrap();
        assert_eq!(draft.title.as_deref(), Some("Standup"));
        assert_eq!(draft.create_meet, Some(true));
        assert_eq!(draft.record_meet, None);
        let attendees = draft.attendees.unwrap();
        assert_eq!(attendees.len(), 2);
        assert_eq!(attendees[0].optional, None);
        assert_eq!(attendees[1].optional, Some(true));
    }

    #[test]
    fn duration_sets_end() {
        let args = EventArgs {
            start: Some("2030-06-01T10:00:00-04:00".into()),
            duration: Some(45),
            ..Default::default()
        };
        let draft = args.to_draft().unwrap();
        assert_eq!(draft.end.as_deref(), Some("2030-06-01T10:45:00-04:00"));
    }

    #[test]
    fn duration_without_start_is_usage_error() {
        let args = EventArgs {
            duration: Some(30),
            ..Default::default()
        };
        assert!(matches!(args.to_draft(), Err(ClientError::Usage(_))));
    }

    #[test]
    fn duration_too_large_is_usage_error() {
        for minutes in [i64::MAX / 2, i64::MAX / 60_000] {
            let args = EventArgs {
                start: Some("2030-06-01T10:00:00-04:00".into()),
                duration: Some(minutes),
                ..Default::default()
            };
            assert!(matches!(args.to_draft(), Err(ClientError::Usage(_))));
        }
    }

    #[test]
    fn end_and_duration_conflict() {
        let result = Cli::try_parse_from([
            "gcalevent",
            "preview",
            "--end",
            "2030-06-01T10:15:00-04:00",
            "--duration",
            "15",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn flags_override_input_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"title": "From file", "location": "Room 1", "create_meet": true}}"#
        )
        .unwrap();

        let args = EventArgs {
            input: Some(file.path().to_path_buf()),
            title: Some("From flags".into()),
            ..Default::default()
        };
        let draft = args.to_draft().unwrap();
        assert_eq!(draft.title.as_deref(), Some("From flags"));
        assert_eq!(draft.location.as_deref(), Some("Room 1"));
        // An unset switch leaves the file's value alone.
        assert_eq!(draft.create_meet, Some(true));
    }

    #[test]
    fn update_accepts_clear_fields() {
        let cli = Cli::try_parse_from([
            "gcalevent",
            "update",
            "evt1",
            "--clear",
            "location",
            "--clear",
            "attendees",
        ])
        .unwrap();

        let Command::Update { clear, .. } = cli.command else {
            panic!("expected update");
        };
        assert_eq!(clear, vec![EventField::Location, EventField::Attendees]);
    }

    #[test]
    fn between_parses_dates() {
        let cli =
            Cli::try_parse_from(["gcalevent", "between", "2030-06-01", "2030-06-03"]).unwrap();
        let Command::Between {
            start_date,
            end_date,
            ..
        } = cli.command
        else {
            panic!("expected between");
        };
        assert_eq!(start_date, NaiveDate::from_ymd_opt(2030, 6, 1).unwrap());
        assert_eq!(end_date, NaiveDate::from_ymd_opt(2030, 6, 3).unwrap());
    }
}
