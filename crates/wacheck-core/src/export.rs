//! CSV export of check results.

use chrono::NaiveDate;

use crate::carrier::CarrierLookup;
use crate::models::CheckResult;
use crate::results::{filter_results, ResultFilter};

const BOM: &str = "\u{FEFF}";

pub const EXPORT_HEADERS: [&str; 8] = [
    "Number",
    "Status",
    "Type",
    "Name",
    "Business Info",
    "Country",
    "Carrier",
    "Profile Picture",
];

/// A rendered CSV document ready for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub file_name: String,
    pub content: String,
    pub rows: usize,
}

/// `whatsapp_results_<filter>_<YYYY-MM-DD>.csv`
pub fn export_file_name(filter: ResultFilter, date: NaiveDate) -> String {
    format!(
        "whatsapp_results_{}_{}.csv",
        filter.as_str(),
        date.format("%Y-%m-%d")
    )
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn status_label(result: &CheckResult) -> &'static str {
    if result.is_error() || result.error.is_some() {
        "Error"
    } else if result.has_whats_app {
        "Has WhatsApp"
    } else {
        "No WhatsApp"
    }
}

fn type_label(result: &CheckResult) -> &'static str {
    if !result.has_whats_app {
        "-"
    } else if result.is_business() {
        "Business"
    } else {
        "Personal"
    }
}

fn export_row(result: &CheckResult, carriers: &CarrierLookup) -> String {
    let carrier = carriers.lookup_raw(&result.number);
    let business = result
        .business_info
        .as_ref()
        .map(|info| info.summary())
        .unwrap_or_default();
    let picture = if result.profile_picture.is_some() {
        "Available"
    } else {
        "Not available"
    };

    let fields = [
        result.number.as_str(),
        status_label(result),
        type_label(result),
        result.name.as_deref().unwrap_or(""),
        business.as_str(),
        carrier.country.as_str(),
        carrier.carrier.as_str(),
        picture,
    ];

    fields.iter().map(|f| quote(f)).collect::<Vec<_>>().join(",")
}

/// Render the filtered results as CSV (UTF-8 with BOM, every field quoted).
pub fn export_results(
    results: &[CheckResult],
    filter: ResultFilter,
    carriers: &CarrierLookup,
    date: NaiveDate,
) -> CsvExport {
    let mut lines = vec![EXPORT_HEADERS
        .iter()
        .map(|h| quote(h))
        .collect::<Vec<_>>()
        .join(",")];

    lines.extend(filter_results(results, filter).map(|r| export_row(r, carriers)));
    let rows = lines.len() - 1;

    tracing::debug!(filter = %filter, rows, "Exported results to CSV");

    CsvExport {
        file_name: export_file_name(filter, date),
        content: format!("{}{}\n", BOM, lines.join("\n")),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
    }

    #[test]
    fn test_export_valid_filter_rows() {
        let results = vec![
            CheckResult::found("+962791234567"),
            CheckResult::found("+966501234567"),
            CheckResult::not_found("+971501234567"),
        ];
        let export = export_results(&results, ResultFilter::Valid, &CarrierLookup::default(), date());

        assert_eq!(export.rows, 2);
        assert_eq!(export.file_name, "whatsapp_results_valid_2026-03-14.csv");
        assert!(export.content.starts_with('\u{FEFF}'));

        let lines: Vec<&str> = export.content.trim_start_matches('\u{FEFF}').lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "\"Number\",\"Status\",\"Type\",\"Name\",\"Business Info\",\"Country\",\"Carrier\",\"Profile Picture\""
        );
        assert_eq!(
            lines[1],
            "\"+962791234567\",\"Has WhatsApp\",\"Personal\",\"\",\"\",\"Jordan\",\"Umniah\",\"Not available\""
        );
    }

    #[test]
    fn test_export_escapes_quotes() {
        let mut result = CheckResult::found("+12025550123");
        result.name = Some("Joe \"JJ\" Doe".to_string());
        let export = export_results(&[result], ResultFilter::All, &CarrierLookup::default(), date());
        assert!(export.content.contains("\"Joe \"\"JJ\"\" Doe\""));
        assert!(export.content.contains("\"Verizon\""));
    }

    #[test]
    fn test_export_error_rows() {
        let results = vec![CheckResult::invalid("abc", "Phone number must start with +")];
        let export = export_results(&results, ResultFilter::Errors, &CarrierLookup::default(), date());
        assert_eq!(export.rows, 1);
        assert!(export.content.contains("\"abc\",\"Error\",\"-\""));
        assert!(export.content.contains("\"Unknown\",\"Unknown\""));
    }
}
