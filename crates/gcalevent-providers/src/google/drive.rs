//! Google Drive API v3 backend, used to look up meeting recordings.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use gcalevent_core::{DriveQuery, FileRecord};

use super::config::GoogleConfig;
use super::http::ApiClient;
use crate::error::ProviderResult;
use crate::service::{AccessTokenSource, BoxFuture, FileStore};

const PROVIDER_NAME: &str = "google-drive";

/// Metadata fields requested for every file.
const FILE_FIELDS: &str = "nextPageToken, files(id, name, mimeType, createdTime, modifiedTime, size, webViewLink, webContentLink, parents, trashed)";

const PAGE_SIZE: &str = "100";

/// [`FileStore`] over the Google Drive REST API.
#[derive(Clone)]
pub struct GoogleDriveStore {
    api: ApiClient,
    base_url: String,
}

impl fmt::Debug for GoogleDriveStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleDriveStore")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GoogleDriveStore {
    pub fn new(config: &GoogleConfig, tokens: Arc<dyn AccessTokenSource>) -> ProviderResult<Self> {
        Ok(Self {
            api: ApiClient::new(config.http_client()?, tokens, PROVIDER_NAME),
            base_url: config.drive_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn files_url(&self) -> String {
        format!("{}/files", self.base_url)
    }

    fn file_url(&self, file_id: &str) -> String {
        format!("{}/{}", self.files_url(), urlencoding::encode(file_id))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileListResponse {
    #[serde(default)]
    files: Vec<FileRecord>,
    next_page_token: Option<String>,
}

impl FileStore for GoogleDriveStore {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn search_files<'a>(
        &'a self,
        query: &'a DriveQuery,
    ) -> BoxFuture<'a, ProviderResult<Vec<FileRecord>>> {
        Box::pin(async move {
            let q = query.build();
            debug!(q = %q, "Searching files");

            let mut files = Vec::new();
            let mut page_token: Option<String> = None;
            loop {
                let mut request = self.api.http().get(self.files_url()).query(&[
                    ("q", q.as_str()),
                    ("fields", FILE_FIELDS),
                    ("pageSize", PAGE_SIZE),
                    ("orderBy", "createdTime"),
                    ("spaces", "drive"),
                ]);
                if let Some(ref token) = page_token {
                    request = request.query(&[("pageToken", token)]);
                }

                let page: FileListResponse = self.api.json(request).await?;
                files.extend(page.files);
                match page.next_page_token {
                    Some(token) => page_token = Some(token),
                    None => break,
                }
            }
            Ok(files)
        })
    }

    fn download<'a>(&'a self, file_id: &'a str) -> BoxFuture<'a, ProviderResult<Vec<u8>>> {
        Box::pin(async move {
            let request = self
                .api
                .http()
                .get(self.file_url(file_id))
                .query(&[("alt", "media")]);
            self.api.bytes(request).await
        })
    }
}
