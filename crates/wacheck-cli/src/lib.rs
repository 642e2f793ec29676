use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use wacheck_api_client::{CarrierResult, CheckOutcome, CheckResult, StatusResponse};
use wacheck_core::ResultStats;

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// One table row per check result.
pub fn format_check_line(result: &CheckResult) -> String {
    let verdict = match result.outcome {
        CheckOutcome::Found if result.is_business() => "business",
        CheckOutcome::Found => "personal",
        CheckOutcome::NotFound => "not on WhatsApp",
        CheckOutcome::Invalid => "invalid",
        CheckOutcome::CheckFailed => "check failed",
    };

    let detail = match (&result.error, &result.name) {
        (Some(error), _) => error.clone(),
        (None, Some(name)) => name.clone(),
        (None, None) => String::new(),
    };

    format!(
        "{:<18} {:<16} {}",
        result.number,
        verdict,
        truncate_string(&detail, 48)
    )
    .trim_end()
    .to_string()
}

pub fn format_carrier_line(result: &CarrierResult) -> String {
    match &result.error {
        Some(error) => format!("{:<18} {}", result.number, error),
        None => format!(
            "{:<18} {:<24} {:<20} {}",
            result.number, result.country, result.carrier, result.number_type
        ),
    }
}

pub fn format_status(status: &StatusResponse) -> String {
    let mut line = format!("Session: {}", status.status);
    if let Some(account) = &status.account_info {
        line.push_str(&format!(
            " ({}, {}, {})",
            account.name, account.number, account.platform
        ));
    }
    if status.qr_code.is_some() {
        line.push_str(" - scan the QR code from the dashboard");
    }
    line
}

pub fn format_stats(stats: &ResultStats) -> String {
    let mut lines = vec![
        format!("Total:            {}", stats.total),
        format!("On WhatsApp:      {}", stats.with_whats_app),
        format!("Not on WhatsApp:  {}", stats.without_whats_app),
        format!("Business:         {}", stats.business_accounts),
        format!("Personal:         {}", stats.personal_accounts),
        format!("Errors:           {}", stats.errors),
        format!("Profile pictures: {}", stats.with_profile_picture),
    ];

    for detail in &stats.business_details {
        let summary = detail.business_info.summary();
        lines.push(format!(
            "  {} {}{}",
            detail.number,
            detail.name.as_deref().unwrap_or(""),
            if summary.is_empty() {
                String::new()
            } else {
                format!(" - {}", summary)
            }
        ));
    }

    lines.join("\n")
}

/// Write `bytes` as `dir/file_name`, keeping only the base name of `file_name`.
pub fn write_output(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
    let base = Path::new(file_name)
        .file_name()
        .context("Server returned an empty file name")?;
    let path = dir.join(base);
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    std::fs::write(&path, bytes)
        .with_context(|| format!("Failed to write file: {}", path.display()))?;
    Ok(path)
}

/// Read results previously saved by `wacheck bulk --output`.
pub fn read_results(path: &Path) -> Result<Vec<CheckResult>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read results file: {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Results file is not a JSON array of results: {}", path.display()))
}

/// Initialize tracing for the CLI.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}
