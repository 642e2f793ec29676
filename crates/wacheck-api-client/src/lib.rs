//! HTTP client for the wacheck API.
//!
//! Generic GET/POST helpers plus domain methods (checks, carrier lookup, list
//! and file tools, export). The CLI uses this client directly.

pub mod api;

use anyhow::{Context, Result};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

const DEFAULT_API_URL: &str = "http://localhost:3000";

/// Non-success answer from the API. `message` is the server's `error` field when
/// the body is an error envelope, the raw body otherwise.
#[derive(Debug, thiserror::Error)]
#[error("API request failed with status {status}: {message}")]
pub struct ApiStatusError {
    pub status: u16,
    pub code: Option<String>,
    pub message: String,
}

impl ApiStatusError {
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }
}

/// A downloaded file: name from `Content-Disposition` plus the raw bytes.
#[derive(Debug, Clone)]
pub struct Download {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// HTTP client for the wacheck API.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create client from environment: WACHECK_API_URL (or API_URL).
    /// Bulk checks wait on the server's per-number delay, so the timeout is generous.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("WACHECK_API_URL")
            .or_else(|_| std::env::var("API_URL"))
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let timeout_secs = std::env::var("WACHECK_API_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3600);

        Self::new(base_url, Duration::from_secs(timeout_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET request with optional query parameters. Deserializes JSON response.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let mut request = self.client.get(self.build_url(path));
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request.send().await.context("Failed to send request")?;
        parse_json(response).await
    }

    /// POST without a body and deserialize response.
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .client
            .post(self.build_url(path))
            .send()
            .await
            .context("Failed to send request")?;
        parse_json(response).await
    }

    /// POST JSON body and deserialize response.
    pub async fn post_json<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let response = self
            .client
            .post(self.build_url(path))
            .json(body)
            .send()
            .await
            .context("Failed to send request")?;
        parse_json(response).await
    }

    /// POST multipart form and deserialize response.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T> {
        let response = self
            .client
            .post(self.build_url(path))
            .multipart(form)
            .send()
            .await
            .context("Failed to send request")?;
        parse_json(response).await
    }

    /// POST JSON body and return the attachment it answers with.
    pub async fn post_json_download<B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
        fallback_name: &str,
    ) -> Result<Download> {
        let response = self
            .client
            .post(self.build_url(path))
            .json(body)
            .send()
            .await
            .context("Failed to send request")?;
        read_download(response, fallback_name).await
    }

    /// POST multipart form and return the attachment it answers with.
    pub async fn post_multipart_download(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
        fallback_name: &str,
    ) -> Result<Download> {
        let response = self
            .client
            .post(self.build_url(path))
            .multipart(form)
            .send()
            .await
            .context("Failed to send request")?;
        read_download(response, fallback_name).await
    }

    /// Raw client for custom requests.
    pub fn client(&self) -> &Client {
        &self.client
    }
}

async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    let envelope = serde_json::from_str::<serde_json::Value>(&body).ok();
    let field = |name: &str| {
        envelope
            .as_ref()
            .and_then(|v| v.get(name))
            .and_then(|v| v.as_str())
            .map(str::to_string)
    };

    Err(ApiStatusError {
        status: status.as_u16(),
        code: field("code"),
        message: field("error").unwrap_or(body),
    }
    .into())
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let response = ensure_success(response).await?;
    response
        .json()
        .await
        .context("Failed to parse response as JSON")
}

async fn read_download(response: Response, fallback_name: &str) -> Result<Download> {
    let response = ensure_success(response).await?;
    let file_name = response
        .headers()
        .get(reqwest::header::CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .and_then(attachment_file_name)
        .unwrap_or_else(|| fallback_name.to_string());

    let bytes = response
        .bytes()
        .await
        .context("Failed to read response body")?;

    Ok(Download {
        file_name,
        bytes: bytes.to_vec(),
    })
}

/// `attachment; filename="x.csv"` → `x.csv`
pub fn attachment_file_name(disposition: &str) -> Option<String> {
    disposition
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))
        .map(|name| name.trim_matches('"').to_string())
        .filter(|name| !name.is_empty())
}

pub use api::{
    BulkCheckOutcome, CheckMode, MessageResponse, ParsedList, PrefixedContent,
    BULK_FALLBACK_DELAY,
};
pub use wacheck_core::models::{
    CarrierResult, CheckOutcome, CheckResult, QrResponse, StatusResponse,
};
