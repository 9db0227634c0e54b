//! Authenticated requests and status-to-error mapping.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::error::{ProviderError, ProviderErrorCode, ProviderResult};
use crate::service::AccessTokenSource;

/// A reqwest client that attaches a bearer token and maps failures.
#[derive(Clone)]
pub(crate) struct ApiClient {
    http: reqwest::Client,
    tokens: Arc<dyn AccessTokenSource>,
    provider: &'static str,
}

impl ApiClient {
    pub(crate) fn new(
        http: reqwest::Client,
        tokens: Arc<dyn AccessTokenSource>,
        provider: &'static str,
    ) -> Self {
        Self {
            http,
            tokens,
            provider,
        }
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Sends `request`, returning the response only on a 2xx status.
    pub(crate) async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> ProviderResult<reqwest::Response> {
        let token = self
            .tokens
            .access_token()
            .await
            .map_err(|e| e.with_provider(self.provider))?;

        let response = request
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| request_error(e).with_provider(self.provider))?;

        let status = response.status();
        debug!(status = status.as_u16(), url = %response.url(), "API response");
        if status.is_success() {
            return Ok(response);
        }

        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok());
        let body = response.text().await.unwrap_or_default();
        Err(error_from_response(status.as_u16(), &body, retry_after).with_provider(self.provider))
    }

    /// Sends `request` and parses a JSON body.
    pub(crate) async fn json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> ProviderResult<T> {
        let response = self.send(request).await?;
        let body = response.text().await.map_err(|e| {
            ProviderError::network(format!("failed to read response: {e}"))
                .with_provider(self.provider)
                .with_source(e)
        })?;
        serde_json::from_str(&body).map_err(|e| {
            ProviderError::invalid_response(format!("failed to parse response: {e}"))
                .with_provider(self.provider)
                .with_source(e)
        })
    }

    /// Sends `request` and returns the raw body.
    pub(crate) async fn bytes(&self, request: reqwest::RequestBuilder) -> ProviderResult<Vec<u8>> {
        let response = self.send(request).await?;
        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| {
                ProviderError::network(format!("failed to read response: {e}"))
                    .with_provider(self.provider)
                    .with_source(e)
            })
    }
}

fn request_error(e: reqwest::Error) -> ProviderError {
    let message = if e.is_timeout() {
        "request timeout".to_string()
    } else if e.is_connect() {
        format!("connection failed: {e}")
    } else {
        format!("request failed: {e}")
    };
    ProviderError::network(message).with_source(e)
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    reason: Option<String>,
}

/// Maps an unsuccessful response to a [`ProviderError`].
///
/// Google reports per-user quota exhaustion as 403 with a rate-limit
/// reason, so those are classified as rate limiting rather than access
/// denial.
pub(crate) fn error_from_response(
    status: u16,
    body: &str,
    retry_after: Option<u64>,
) -> ProviderError {
    let envelope = serde_json::from_str::<ErrorEnvelope>(body).ok();
    let reason = envelope
        .as_ref()
        .and_then(|e| e.error.errors.iter().find_map(|d| d.reason.clone()));
    let message = envelope
        .and_then(|e| e.error.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                format!("HTTP {status}")
            } else {
                trimmed.chars().take(200).collect()
            }
        });

    let rate_limit_reason = matches!(
        reason.as_deref(),
        Some("rateLimitExceeded" | "userRateLimitExceeded" | "quotaExceeded")
    );

    let code = match status {
        400 => ProviderErrorCode::BadRequest,
        401 => ProviderErrorCode::AuthenticationFailed,
        403 if rate_limit_reason => ProviderErrorCode::RateLimited,
        403 => ProviderErrorCode::AuthorizationFailed,
        404 | 410 => ProviderErrorCode::NotFound,
        409 | 412 => ProviderErrorCode::Conflict,
        429 => ProviderErrorCode::RateLimited,
        500..=599 => ProviderErrorCode::ServerError,
        _ => ProviderErrorCode::BadRequest,
    };

    let message = match (code, retry_after) {
        (ProviderErrorCode::RateLimited, Some(secs)) => {
            format!("{message}, retry after {secs} seconds")
        }
        _ => message,
    };

    ProviderError::new(code, message).with_status(status)
}
