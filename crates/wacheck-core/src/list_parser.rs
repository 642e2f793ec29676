//! Extraction of candidate numbers from uploaded list files.
//!
//! `.csv` files are scanned cell by cell for something that looks like a
//! phone number; every other extension is treated as one number per line.
//! Candidates are not validated here beyond the CSV length filter.

use std::sync::OnceLock;

use regex::Regex;

use crate::phone::{clean_number, MAX_NUMBER_LEN, MIN_NUMBER_LEN};

const MAX_LOGGED_SKIPPED_LINES: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ListParseError {
    #[error("File is empty")]
    EmptyFile,

    #[error("No valid phone numbers found in CSV file")]
    NoValidNumbersInCsv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFormat {
    Csv,
    Text,
}

impl ListFormat {
    pub fn from_file_name(file_name: &str) -> Self {
        if file_name.to_lowercase().ends_with(".csv") {
            ListFormat::Csv
        } else {
            ListFormat::Text
        }
    }
}

fn digits_only_candidate() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{8,}$").expect("static regex is valid"))
}

/// Parse list content, choosing the format from the file name.
pub fn parse_list(content: &str, file_name: &str) -> Result<Vec<String>, ListParseError> {
    if content.trim().is_empty() {
        return Err(ListParseError::EmptyFile);
    }

    match ListFormat::from_file_name(file_name) {
        ListFormat::Csv => parse_csv(content),
        ListFormat::Text => Ok(parse_text(content)),
    }
}

/// One trimmed candidate per non-blank line.
pub fn parse_text(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// First acceptable phone-like cell of every line.
pub fn parse_csv(content: &str) -> Result<Vec<String>, ListParseError> {
    let mut numbers = Vec::new();
    let mut skipped = 0usize;

    for (index, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        match line.split(',').find_map(csv_cell_candidate) {
            Some(number) => numbers.push(number),
            None => {
                skipped += 1;
                if skipped <= MAX_LOGGED_SKIPPED_LINES {
                    tracing::debug!(line = index + 1, content = %line, "No phone number found in CSV line");
                }
            }
        }
    }

    if skipped > 0 {
        tracing::debug!(skipped, accepted = numbers.len(), "CSV lines without a phone number were skipped");
    }

    if numbers.is_empty() {
        return Err(ListParseError::NoValidNumbersInCsv);
    }

    Ok(numbers)
}

fn csv_cell_candidate(cell: &str) -> Option<String> {
    let cell = cell
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim();

    if !(cell.starts_with('+') || digits_only_candidate().is_match(cell)) {
        return None;
    }

    let mut normalized = clean_number(cell);
    if !normalized.starts_with('+') {
        normalized.insert(0, '+');
    }

    (MIN_NUMBER_LEN..=MAX_NUMBER_LEN)
        .contains(&normalized.len())
        .then_some(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_list_skips_blank_lines() {
        let numbers = parse_list("+1234567890\n\n+9876543210\n", "numbers.txt").unwrap();
        assert_eq!(numbers, vec!["+1234567890", "+9876543210"]);
    }

    #[test]
    fn test_text_list_keeps_invalid_entries_for_later_validation() {
        let numbers = parse_list("  abc \n+1234567890\n+1234567890", "list").unwrap();
        assert_eq!(numbers, vec!["abc", "+1234567890", "+1234567890"]);
    }

    #[test]
    fn test_empty_file() {
        assert_eq!(parse_list("  \n\n", "a.txt"), Err(ListParseError::EmptyFile));
        assert_eq!(parse_list("", "a.csv"), Err(ListParseError::EmptyFile));
    }

    #[test]
    fn test_csv_picks_first_phone_cell() {
        let content = "name,phone,backup\n\"Ali\",\"+962791234567\",+962781234567\nSara,966501234567,\n";
        let numbers = parse_list(content, "Contacts.CSV").unwrap();
        assert_eq!(numbers, vec!["+962791234567", "+966501234567"]);
    }

    #[test]
    fn test_csv_strips_single_quotes_and_spaces() {
        let numbers = parse_csv("' +971 50 123 4567 ',x").unwrap();
        assert_eq!(numbers, vec!["+971501234567"]);
    }

    #[test]
    fn test_csv_rejects_short_and_long_candidates() {
        // 8 digits becomes 9 characters with the plus: too short
        let content = "12345678\n+1234567890123456\n+12345678901\n";
        assert_eq!(parse_csv(content).unwrap(), vec!["+12345678901"]);
    }

    #[test]
    fn test_csv_ignores_short_digit_cells() {
        let content = "id,number\n42,+962791234567\n";
        assert_eq!(parse_csv(content).unwrap(), vec!["+962791234567"]);
    }

    #[test]
    fn test_csv_without_numbers() {
        assert_eq!(
            parse_csv("name,city\nAli,Amman\n"),
            Err(ListParseError::NoValidNumbersInCsv)
        );
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(ListFormat::from_file_name("a.csv"), ListFormat::Csv);
        assert_eq!(ListFormat::from_file_name("a.txt"), ListFormat::Text);
        assert_eq!(ListFormat::from_file_name("a.csv.txt"), ListFormat::Text);
    }
}
