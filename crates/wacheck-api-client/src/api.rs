//! Domain methods for the wacheck API client.
//!
//! Response types come from `wacheck_core::models` where the server shares them.
//! Wrapper types for the `{success, data}` envelopes are defined here.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use wacheck_core::file_tools::PrefixMode;
use wacheck_core::models::{
    CarrierResult, CheckOutcome, CheckResult, QrResponse, StatusResponse,
};
use wacheck_core::ResultFilter;

use crate::{ApiClient, ApiStatusError, Download};

/// Pause between per-number checks when the bulk endpoint is unavailable.
pub const BULK_FALLBACK_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

/// `{success, message}` answers of the session actions; `status` only on disconnect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedList {
    pub file_name: String,
    pub count: usize,
    pub numbers: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrefixedContent {
    pub content: String,
    pub line_count: usize,
}

/// How a batch was actually checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckMode {
    Bulk,
    /// Bulk endpoint failed; numbers were sent one at a time
    PerNumber,
}

#[derive(Debug, Clone)]
pub struct BulkCheckOutcome {
    pub results: Vec<CheckResult>,
    pub mode: CheckMode,
}

/// Whether a failed bulk call is worth retrying number by number.
/// Rejected input and a disconnected session fail the same way per number.
fn should_fall_back(err: &anyhow::Error) -> bool {
    match err.downcast_ref::<ApiStatusError>() {
        Some(status_err) => {
            !status_err.is_client_error()
                && status_err.code.as_deref() != Some("SESSION_NOT_CONNECTED")
        }
        None => true,
    }
}

async fn read_upload(path: &Path) -> Result<(String, Vec<u8>)> {
    if path
        .components()
        .any(|c| c == std::path::Component::ParentDir)
    {
        return Err(anyhow::anyhow!("Invalid input: {}", path.display()));
    }

    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("numbers.txt")
        .to_string();

    Ok((file_name, bytes))
}

impl ApiClient {
    pub async fn status(&self) -> Result<StatusResponse> {
        self.get("/api/status", &[]).await
    }

    pub async fn qr(&self) -> Result<QrResponse> {
        self.get("/api/qr", &[]).await
    }

    pub async fn restart(&self) -> Result<MessageResponse> {
        self.post_empty("/api/restart").await
    }

    pub async fn disconnect(&self) -> Result<MessageResponse> {
        self.post_empty("/api/disconnect").await
    }

    pub async fn health(&self) -> Result<serde_json::Value> {
        self.get("/health", &[]).await
    }

    pub async fn check_number(&self, number: &str) -> Result<CheckResult> {
        let envelope: Envelope<CheckResult> = self
            .post_json("/api/check-whatsapp", &serde_json::json!({ "number": number }))
            .await?;
        Ok(envelope.data)
    }

    pub async fn check_bulk(&self, numbers: &[String]) -> Result<Vec<CheckResult>> {
        let envelope: Envelope<Vec<CheckResult>> = self
            .post_json(
                "/api/check-whatsapp-bulk",
                &serde_json::json!({ "numbers": numbers }),
            )
            .await?;
        Ok(envelope.data)
    }

    /// Bulk check, falling back to one request per number when the bulk call fails.
    pub async fn check_numbers(&self, numbers: &[String]) -> Result<BulkCheckOutcome> {
        self.check_numbers_with_delay(numbers, BULK_FALLBACK_DELAY)
            .await
    }

    pub async fn check_numbers_with_delay(
        &self,
        numbers: &[String],
        delay: Duration,
    ) -> Result<BulkCheckOutcome> {
        let err = match self.check_bulk(numbers).await {
            Ok(results) => {
                return Ok(BulkCheckOutcome {
                    results,
                    mode: CheckMode::Bulk,
                })
            }
            Err(err) if should_fall_back(&err) => err,
            Err(err) => return Err(err),
        };

        tracing::warn!(error = %err, count = numbers.len(), "Bulk check failed, checking numbers individually");

        let mut results: Vec<CheckResult> = Vec::with_capacity(numbers.len());
        for number in numbers {
            // rejected numbers never reached the session, so no pause after them
            let after_check = results
                .last()
                .is_some_and(|last| last.outcome != CheckOutcome::Invalid);
            if after_check && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            let result = match self.check_number(number).await {
                Ok(result) => result,
                Err(err) => match err.downcast_ref::<ApiStatusError>() {
                    Some(status_err) if status_err.status == 400 => {
                        CheckResult::invalid(number.trim(), status_err.message.clone())
                    }
                    Some(status_err) => {
                        CheckResult::check_failed(number.trim(), status_err.message.clone())
                    }
                    None => CheckResult::check_failed(number.trim(), err.to_string()),
                },
            };
            results.push(result);
        }

        Ok(BulkCheckOutcome {
            results,
            mode: CheckMode::PerNumber,
        })
    }

    pub async fn carrier(&self, number: &str) -> Result<CarrierResult> {
        let envelope: Envelope<CarrierResult> = self
            .post_json("/api/carrier", &serde_json::json!({ "number": number }))
            .await?;
        Ok(envelope.data)
    }

    pub async fn carrier_bulk(&self, numbers: &[String]) -> Result<Vec<CarrierResult>> {
        let envelope: Envelope<Vec<CarrierResult>> = self
            .post_json("/api/carrier-bulk", &serde_json::json!({ "numbers": numbers }))
            .await?;
        Ok(envelope.data)
    }

    /// Upload a `.txt` or `.csv` list and get its candidate numbers back.
    pub async fn parse_list(&self, path: &Path) -> Result<ParsedList> {
        let (file_name, bytes) = read_upload(path).await?;
        let form = reqwest::multipart::Form::new().part(
            "file",
            reqwest::multipart::Part::bytes(bytes).file_name(file_name),
        );

        let envelope: Envelope<ParsedList> =
            self.post_multipart("/api/lists/parse", form).await?;
        Ok(envelope.data)
    }

    pub async fn export(&self, results: &[CheckResult], filter: ResultFilter) -> Result<Download> {
        self.post_json_download(
            "/api/export",
            &serde_json::json!({ "results": results, "filter": filter }),
            "whatsapp_results.csv",
        )
        .await
    }

    /// Split a list file into chunks; the server answers with a zip archive.
    pub async fn split_file(&self, path: &Path, chunk_size: usize) -> Result<Download> {
        let (file_name, bytes) = read_upload(path).await?;
        let form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(bytes).file_name(file_name),
            )
            .text("chunkSize", chunk_size.to_string());

        self.post_multipart_download("/api/files/split", form, "numbers_split.zip")
            .await
    }

    pub async fn prefix(
        &self,
        content: &str,
        prefix: &str,
        mode: PrefixMode,
    ) -> Result<PrefixedContent> {
        let envelope: Envelope<PrefixedContent> = self
            .post_json(
                "/api/files/prefix",
                &serde_json::json!({ "content": content, "prefix": prefix, "mode": mode }),
            )
            .await?;
        Ok(envelope.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client(url: String) -> ApiClient {
        ApiClient::new(url, Duration::from_secs(5)).unwrap()
    }

    fn numbers() -> Vec<String> {
        vec!["+962791234567".to_string(), "+971501234567".to_string()]
    }

    #[tokio::test]
    async fn test_check_numbers_uses_bulk_endpoint() {
        let mut server = mockito::Server::new_async().await;
        let bulk = server
            .mock("POST", "/api/check-whatsapp-bulk")
            .match_body(Matcher::PartialJson(serde_json::json!({ "numbers": numbers() })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"success":true,"data":[
                    {"number":"+962791234567","hasWhatsApp":true,"outcome":"found"},
                    {"number":"+971501234567","hasWhatsApp":false,"outcome":"not_found"}
                ]}"#,
            )
            .expect(1)
            .create_async()
            .await;

        let outcome = client(server.url())
            .check_numbers_with_delay(&numbers(), Duration::ZERO)
            .await
            .unwrap();

        bulk.assert_async().await;
        assert_eq!(outcome.mode, CheckMode::Bulk);
        assert_eq!(outcome.results.len(), 2);
        assert!(outcome.results[0].has_whats_app);
    }

    #[tokio::test]
    async fn test_check_numbers_falls_back_per_number() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/check-whatsapp-bulk")
            .with_status(500)
            .with_body(r#"{"success":false,"error":"Internal server error","code":"INTERNAL_ERROR","recoverable":false}"#)
            .create_async()
            .await;
        let first = server
            .mock("POST", "/api/check-whatsapp")
            .match_body(Matcher::PartialJson(serde_json::json!({ "number": "+962791234567" })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success":true,"data":{"number":"+962791234567","hasWhatsApp":true,"outcome":"found"}}"#)
            .expect(1)
            .create_async()
            .await;
        let second = server
            .mock("POST", "/api/check-whatsapp")
            .match_body(Matcher::PartialJson(serde_json::json!({ "number": "+971501234567" })))
            .with_status(500)
            .with_body(r#"{"success":false,"error":"Evaluation failed","code":"BRIDGE_ERROR","recoverable":true}"#)
            .expect(1)
            .create_async()
            .await;

        let outcome = client(server.url())
            .check_numbers_with_delay(&numbers(), Duration::ZERO)
            .await
            .unwrap();

        first.assert_async().await;
        second.assert_async().await;
        assert_eq!(outcome.mode, CheckMode::PerNumber);
        assert_eq!(outcome.results[0].outcome, CheckOutcome::Found);
        assert_eq!(outcome.results[1].outcome, CheckOutcome::CheckFailed);
        assert_eq!(outcome.results[1].error.as_deref(), Some("Evaluation failed"));
    }

    #[tokio::test]
    async fn test_fallback_pauses_only_after_checked_numbers() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/check-whatsapp-bulk")
            .with_status(502)
            .create_async()
            .await;
        for rejected in ["12345", "0791234567", "+1"] {
            server
                .mock("POST", "/api/check-whatsapp")
                .match_body(Matcher::PartialJson(serde_json::json!({ "number": rejected })))
                .with_status(400)
                .with_body(r#"{"success":false,"error":"Phone number must start with +","code":"INVALID_INPUT","recoverable":false}"#)
                .create_async()
                .await;
        }
        for (number, found) in [("+962791234567", true), ("+971501234567", false)] {
            let body = serde_json::json!({
                "success": true,
                "data": {
                    "number": number,
                    "hasWhatsApp": found,
                    "outcome": if found { "found" } else { "not_found" },
                },
            });
            server
                .mock("POST", "/api/check-whatsapp")
                .match_body(Matcher::PartialJson(serde_json::json!({ "number": number })))
                .with_status(200)
                .with_header("content-type", "application/json")
                .with_body(body.to_string())
                .create_async()
                .await;
        }

        // one pause: after +962791234567, before "+1"
        let list: Vec<String> = ["12345", "0791234567", "+962791234567", "+1", "+971501234567"]
            .iter()
            .map(|n| n.to_string())
            .collect();
        let delay = Duration::from_millis(500);
        let started = std::time::Instant::now();
        let outcome = client(server.url())
            .check_numbers_with_delay(&list, delay)
            .await
            .unwrap();
        let elapsed = started.elapsed();

        assert_eq!(outcome.mode, CheckMode::PerNumber);
        let outcomes: Vec<_> = outcome.results.iter().map(|r| r.outcome).collect();
        assert_eq!(
            outcomes,
            vec![
                CheckOutcome::Invalid,
                CheckOutcome::Invalid,
                CheckOutcome::Found,
                CheckOutcome::Invalid,
                CheckOutcome::NotFound,
            ]
        );
        assert!(elapsed >= delay, "elapsed {:?}", elapsed);
        assert!(elapsed < delay * 2, "elapsed {:?}", elapsed);
    }

    #[tokio::test]
    async fn test_check_numbers_does_not_fall_back_when_disconnected() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/check-whatsapp-bulk")
            .with_status(503)
            .with_body(r#"{"success":false,"error":"WhatsApp client is not connected","code":"SESSION_NOT_CONNECTED","recoverable":true,"status":"qr_ready"}"#)
            .create_async()
            .await;
        let single = server
            .mock("POST", "/api/check-whatsapp")
            .expect(0)
            .create_async()
            .await;

        let err = client(server.url())
            .check_numbers_with_delay(&numbers(), Duration::ZERO)
            .await
            .unwrap_err();

        single.assert_async().await;
        let status_err = err.downcast_ref::<ApiStatusError>().unwrap();
        assert_eq!(status_err.status, 503);
    }

    #[tokio::test]
    async fn test_export_reads_attachment_name() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/export")
            .match_body(Matcher::PartialJson(serde_json::json!({ "filter": "valid" })))
            .with_status(200)
            .with_header("content-type", "text/csv; charset=utf-8")
            .with_header(
                "content-disposition",
                "attachment; filename=\"whatsapp_results_valid_2026-03-14.csv\"",
            )
            .with_body("\u{FEFF}\"Number\"\n")
            .create_async()
            .await;

        let download = client(server.url())
            .export(&[CheckResult::found("+962791234567")], ResultFilter::Valid)
            .await
            .unwrap();

        assert_eq!(download.file_name, "whatsapp_results_valid_2026-03-14.csv");
        assert!(download.bytes.starts_with("\u{FEFF}".as_bytes()));
    }

    #[tokio::test]
    async fn test_prefix_sends_mode() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/files/prefix")
            .match_body(Matcher::PartialJson(
                serde_json::json!({ "prefix": "+", "mode": "remove" }),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success":true,"data":{"content":"962791234567","lineCount":1}}"#)
            .create_async()
            .await;

        let prefixed = client(server.url())
            .prefix("+962791234567", "+", PrefixMode::Remove)
            .await
            .unwrap();

        assert_eq!(prefixed.content, "962791234567");
        assert_eq!(prefixed.line_count, 1);
    }

    #[tokio::test]
    async fn test_read_upload_rejects_parent_dir() {
        let err = read_upload(Path::new("../numbers.txt")).await.unwrap_err();
        assert!(err.to_string().contains("Invalid input"));
    }
}
