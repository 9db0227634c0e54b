//! Linking stored meeting recordings to calendar events.
//!
//! Recordings are plain files in a storage folder; nothing in the file
//! metadata points back at the event. [`match_recordings`] therefore uses
//! a heuristic: the file name must contain the event title and the file
//! must have been created on the same calendar day the event started.
//! It can miss renamed recordings and can match a same-titled meeting
//! held twice in one day. An empty result is a valid outcome, not an
//! error.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::time::same_calendar_day;

/// Folder the meeting service writes recordings into by default.
pub const DEFAULT_RECORDINGS_FOLDER: &str = "Meet Recordings";

/// MIME type of meeting recordings.
pub const DEFAULT_RECORDING_MIME: &str = "video/mp4";

/// MIME type of storage folders.
pub const FOLDER_MIME: &str = "application/vnd.google-apps.folder";

/// Metadata of a stored file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub created_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub modified_time: Option<DateTime<Utc>>,
    /// Size in bytes. The storage API sends it as a decimal string.
    #[serde(default, deserialize_with = "de_size")]
    pub size: Option<u64>,
    #[serde(default)]
    pub web_view_link: Option<String>,
    #[serde(default)]
    pub web_content_link: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<String>,
    #[serde(default)]
    pub trashed: bool,
}

fn de_size<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Size {
        Number(u64),
        Text(String),
    }

    match Option::<Size>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Size::Number(n)) => Ok(Some(n)),
        Some(Size::Text(s)) => s.trim().parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// One condition of a storage search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriveClause {
    NameEq(String),
    NameContains(String),
    MimeTypeEq(String),
    InParent(String),
    NotTrashed,
}

impl DriveClause {
    fn render(&self) -> String {
        match self {
            Self::NameEq(v) => format!("name = '{}'", escape(v)),
            Self::NameContains(v) => format!("name contains '{}'", escape(v)),
            Self::MimeTypeEq(v) => format!("mimeType = '{}'", escape(v)),
            Self::InParent(v) => format!("'{}' in parents", escape(v)),
            Self::NotTrashed => "trashed = false".to_string(),
        }
    }

    fn matches(&self, file: &FileRecord) -> bool {
        match self {
            Self::NameEq(v) => file.name == *v,
            Self::NameContains(v) => file.name.to_lowercase().contains(&v.to_lowercase()),
            Self::MimeTypeEq(v) => file.mime_type == *v,
            Self::InParent(v) => file.parents.iter().any(|p| p == v),
            Self::NotTrashed => !file.trashed,
        }
    }
}

/// A conjunction of storage search conditions.
///
/// Rendered with [`build`](Self::build) for the storage API's `q`
/// parameter, or evaluated locally with [`matches`](Self::matches).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriveQuery {
    clauses: Vec<DriveClause>,
}

impl DriveQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folders named exactly `name`.
    pub fn folder(name: &str) -> Self {
        Self::new().name_eq(name).mime_type_eq(FOLDER_MIME).not_trashed()
    }

    /// `name = 'value'`
    pub fn name_eq(mut self, value: &str) -> Self {
        self.clauses.push(DriveClause::NameEq(value.to_string()));
        self
    }

    /// `name contains 'value'`
    pub fn name_contains(mut self, value: &str) -> Self {
        self.clauses.push(DriveClause::NameContains(value.to_string()));
        self
    }

    /// `mimeType = 'value'`
    pub fn mime_type_eq(mut self, value: &str) -> Self {
        self.clauses.push(DriveClause::MimeTypeEq(value.to_string()));
        self
    }

    /// `'parent_id' in parents`
    pub fn in_parent(mut self, parent_id: &str) -> Self {
        self.clauses.push(DriveClause::InParent(parent_id.to_string()));
        self
    }

    /// `trashed = false`
    pub fn not_trashed(mut self) -> Self {
        self.clauses.push(DriveClause::NotTrashed);
        self
    }

    pub fn clauses(&self) -> &[DriveClause] {
        &self.clauses
    }

    /// Joins the clauses with `and`.
    pub fn build(&self) -> String {
        self.clauses
            .iter()
            .map(DriveClause::render)
            .collect::<Vec<_>>()
            .join(" and ")
    }

    /// Whether `file` satisfies every clause.
    pub fn matches(&self, file: &FileRecord) -> bool {
        self.clauses.iter().all(|clause| clause.matches(file))
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Where to look for recordings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingQuery {
    pub folder: String,
    pub mime_type: String,
}

impl Default for RecordingQuery {
    fn default() -> Self {
        Self {
            folder: DEFAULT_RECORDINGS_FOLDER.to_string(),
            mime_type: DEFAULT_RECORDING_MIME.to_string(),
        }
    }
}

impl RecordingQuery {
    pub fn new(folder: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Search locating the recordings folder by name.
    pub fn folder_query(&self) -> DriveQuery {
        DriveQuery::folder(&self.folder)
    }

    /// Search listing candidate recordings inside the folder.
    pub fn files_query(&self, folder_id: &str) -> DriveQuery {
        DriveQuery::new()
            .in_parent(folder_id)
            .mime_type_eq(&self.mime_type)
            .not_trashed()
    }
}

/// Picks the files that plausibly hold the recording of an event.
///
/// A file matches when its name contains `title` (case-insensitive) and
/// it was created on the same calendar day as `start`, judged in the
/// offset `start` carries. Files without a creation time never match.
/// Matches are returned oldest first.
pub fn match_recordings(
    title: &str,
    start: &DateTime<FixedOffset>,
    files: &[FileRecord],
) -> Vec<FileRecord> {
    let needle = title.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let mut matches: Vec<FileRecord> = files
        .iter()
        .filter(|file| file.name.to_lowercase().contains(&needle))
        .filter(|file| {
            file.created_time
                .is_some_and(|created| same_calendar_day(created, start))
        })
        .cloned()
        .collect();
    matches.sort_by_key(|file| file.created_time);
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::parse_timestamp;

    fn file(name: &str, created: Option<&str>) -> FileRecord {
        FileRecord {
            id: name.to_lowercase().replace(' ', "-"),
            name: name.to_string(),
            mime_type: DEFAULT_RECORDING_MIME.to_string(),
            created_time: created.map(|c| c.parse().unwrap()),
            ..FileRecord::default()
        }
    }

    fn start() -> DateTime<FixedOffset> {
        parse_timestamp("start", "2025-06-01T20:00:00-04:00").unwrap()
    }

    #[test]
    fn parses_drive_metadata() {
        let record: FileRecord = serde_json::from_str(
            r#"{
                "id": "f1",
                "name": "Standup (2025-06-01 10:02 GMT-4)",
                "mimeType": "video/mp4",
                "createdTime": "2025-06-01T14:32:10.000Z",
                "modifiedTime": "2025-06-01T14:40:00.000Z",
                "size": "1048576",
                "webViewLink": "https://drive.google.com/file/d/f1/view"
            }"#,
        )
        .unwrap();
        assert_eq!(record.size, Some(1_048_576));
        assert!(record.created_time.is_some());
        assert_eq!(record.web_content_link, None);

        let numeric: FileRecord = serde_json::from_str(r#"{"id": "f2", "size": 42}"#).unwrap();
        assert_eq!(numeric.size, Some(42));
    }

    #[test]
    fn queries_escape_quotes() {
        let query = RecordingQuery::new("Bob's Recordings", "video/mp4");
        assert_eq!(
            query.folder_query().build(),
            "name = 'Bob\\'s Recordings' and mimeType = 'application/vnd.google-apps.folder' and trashed = false"
        );
        assert_eq!(
            query.files_query("folder1").build(),
            "'folder1' in parents and mimeType = 'video/mp4' and trashed = false"
        );
    }

    #[test]
    fn queries_evaluate_locally() {
        let query = RecordingQuery::default().files_query("folder1");
        let mut recording = file("Standup", Some("2025-06-01T13:00:00Z"));
        assert!(!query.matches(&recording));

        recording.parents = vec!["folder1".into()];
        assert!(query.matches(&recording));

        recording.trashed = true;
        assert!(!query.matches(&recording));

        let folder = FileRecord {
            name: "Meet Recordings".into(),
            mime_type: FOLDER_MIME.into(),
            ..FileRecord::default()
        };
        assert!(RecordingQuery::default().folder_query().matches(&folder));
        assert!(!DriveQuery::folder("Other").matches(&folder));
    }

    #[test]
    fn matches_title_and_day() {
        let files = vec![
            file("Standup (2025-06-01)", Some("2025-06-02T00:30:00Z")),
            file("standup - earlier", Some("2025-06-01T13:00:00Z")),
            file("Standup (2025-05-31)", Some("2025-05-31T14:00:00Z")),
            file("Retro", Some("2025-06-01T15:00:00Z")),
            file("Standup undated", None),
        ];
        let found = match_recordings("Standup", &start(), &files);
        let names: Vec<_> = found.iter().map(|f| f.name.as_str()).collect();
        // 00:30Z on the 2nd is still the evening of the 1st at -04:00.
        assert_eq!(names, vec!["standup - earlier", "Standup (2025-06-01)"]);
    }

    #[test]
    fn no_match_is_empty_not_error() {
        let files = vec![file("Retro", Some("2025-06-01T15:00:00Z"))];
        assert!(match_recordings("Standup", &start(), &files).is_empty());
        assert!(match_recordings("", &start(), &files).is_empty());
    }
}
