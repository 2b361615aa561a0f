//! Reqwest-backed Gemini completion adapter.
//!
//! This adapter owns transport details only: request serialisation, timeout
//! and HTTP error mapping, and JSON decoding into the reply text. The API key
//! travels in the `x-goog-api-key` header so it never appears in URLs or
//! logs.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};

use super::dto::{GenerateContentRequest, GenerateContentResponse};
use crate::domain::ports::{CompletionSource, CompletionSourceError};

const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Gemini adapter performing `generateContent` calls against one endpoint.
pub struct GeminiHttpSource {
    client: Client,
    endpoint: Url,
    api_key: String,
}

impl GeminiHttpSource {
    /// Build an adapter for the default model with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the endpoint URL cannot be derived or the
    /// reqwest client cannot be constructed.
    pub fn new(
        base_url: &Url,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, CompletionSourceError> {
        Self::with_model(base_url, api_key, DEFAULT_MODEL, timeout)
    }

    /// Build an adapter for a specific model.
    ///
    /// # Errors
    ///
    /// Returns an error when the endpoint URL cannot be derived or the
    /// reqwest client cannot be constructed.
    pub fn with_model(
        base_url: &Url,
        api_key: impl Into<String>,
        model: &str,
        timeout: Duration,
    ) -> Result<Self, CompletionSourceError> {
        let endpoint = base_url
            .join(&format!("v1beta/models/{model}:generateContent"))
            .map_err(|err| {
                CompletionSourceError::invalid_request(format!("invalid model endpoint: {err}"))
            })?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| CompletionSourceError::transport(err.to_string()))?;
        Ok(Self {
            client,
            endpoint,
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl CompletionSource for GeminiHttpSource {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionSourceError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header("x-goog-api-key", self.api_key.as_str())
            .json(&GenerateContentRequest::from_prompt(prompt))
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        parse_reply(body.as_ref())
    }
}

fn parse_reply(body: &[u8]) -> Result<String, CompletionSourceError> {
    let decoded: GenerateContentResponse = serde_json::from_slice(body).map_err(|error| {
        CompletionSourceError::decode(format!("invalid completion JSON payload: {error}"))
    })?;
    decoded.into_first_text().ok_or_else(|| {
        CompletionSourceError::decode("completion response contained no candidate text")
    })
}

fn map_transport_error(error: reqwest::Error) -> CompletionSourceError {
    if error.is_timeout() {
        CompletionSourceError::timeout(error.to_string())
    } else {
        CompletionSourceError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> CompletionSourceError {
    let body_preview = body_preview(body);
    let message = if body_preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), body_preview)
    };

    match status {
        StatusCode::TOO_MANY_REQUESTS => CompletionSourceError::rate_limited(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            CompletionSourceError::timeout(message)
        }
        _ if status.is_client_error() => CompletionSourceError::invalid_request(message),
        _ => CompletionSourceError::transport(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
