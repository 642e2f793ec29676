//! Carrier lookup from static prefix tables.

use std::sync::Arc;

use crate::models::CarrierResult;
use crate::phone::{NumberParser, NumberValidator, PhoneNumber};
use crate::prefix_tables::{self, UNKNOWN};

pub const CARRIER_UNDETERMINED: &str = "CarrierUndetermined";

/// Maps validated numbers to country, carrier and region information.
#[derive(Debug, Clone, Default)]
pub struct CarrierLookup {
    validator: NumberValidator,
}

impl CarrierLookup {
    pub fn new(validator: NumberValidator) -> Self {
        Self { validator }
    }

    fn parser(&self) -> Option<&Arc<dyn NumberParser>> {
        self.validator.parser()
    }

    pub fn lookup(&self, number: &PhoneNumber) -> CarrierResult {
        if let Some(parser) = self.parser() {
            match parser.parse(number.as_str()) {
                Ok(parsed) if parsed.valid => {
                    if let Some(iso) = parsed.country.as_deref() {
                        let carrier = prefix_tables::carrier_for_national(
                            iso,
                            &parsed.national_number,
                        )
                        .unwrap_or(UNKNOWN);
                        return CarrierResult {
                            number: number.to_string(),
                            country: prefix_tables::country_name(iso),
                            country_code: Some(iso.to_string()),
                            carrier: carrier.to_string(),
                            number_type: parsed
                                .number_type
                                .unwrap_or_else(|| UNKNOWN.to_string()),
                            region: prefix_tables::region(iso).to_string(),
                            time_zone: prefix_tables::time_zone(iso).map(str::to_string),
                            error: None,
                        };
                    }
                }
                Ok(_) => {
                    tracing::debug!(number = %number, "Parser reports number invalid, using flat carrier table");
                }
                Err(e) => {
                    tracing::debug!(number = %number, error = %e, "Parser failed, using flat carrier table");
                }
            }
        }

        self.lookup_flat(number)
    }

    fn lookup_flat(&self, number: &PhoneNumber) -> CarrierResult {
        match prefix_tables::flat_carrier(number.as_str()) {
            Some((prefix, carrier)) => CarrierResult {
                number: number.to_string(),
                country: prefix_tables::country_from_prefix(prefix).to_string(),
                // Assumes a two-digit operator suffix on every stored prefix
                country_code: Some(prefix[..prefix.len() - 2].to_string()),
                carrier: carrier.to_string(),
                number_type: UNKNOWN.to_string(),
                region: UNKNOWN.to_string(),
                time_zone: None,
                error: None,
            },
            None => undetermined(number.as_str(), CARRIER_UNDETERMINED),
        }
    }

    /// Normalize raw input then look it up; malformed input is carried in `error`.
    /// Numbers the parser rejects still go through the flat table.
    pub fn lookup_raw(&self, raw: &str) -> CarrierResult {
        match PhoneNumber::parse(raw) {
            Ok(number) => self.lookup(&number),
            Err(e) => undetermined(raw.trim(), &e.to_string()),
        }
    }

    pub fn lookup_many<S: AsRef<str>>(&self, numbers: &[S]) -> Vec<CarrierResult> {
        numbers.iter().map(|n| self.lookup_raw(n.as_ref())).collect()
    }
}

fn undetermined(number: &str, error: &str) -> CarrierResult {
    CarrierResult {
        number: number.to_string(),
        country: UNKNOWN.to_string(),
        country_code: None,
        carrier: UNKNOWN.to_string(),
        number_type: UNKNOWN.to_string(),
        region: UNKNOWN.to_string(),
        time_zone: None,
        error: Some(error.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phone::tests::StaticParser;

    fn with_parser() -> CarrierLookup {
        CarrierLookup::new(NumberValidator::with_parser(Arc::new(StaticParser)))
    }

    #[test]
    fn test_parser_path_jordan_umniah() {
        let lookup = with_parser();
        let number = PhoneNumber::parse("+962 79-123 4567").unwrap();
        let result = lookup.lookup(&number);
        assert_eq!(result.carrier, "Umniah");
        assert_eq!(result.country, "Jordan");
        assert_eq!(result.country_code.as_deref(), Some("JO"));
        assert_eq!(result.region, "Middle East");
        assert_eq!(result.number_type, "Mobile");
        assert_eq!(result.time_zone.as_deref(), Some("Asia/Amman"));
        assert!(result.error.is_none());
    }

    #[test]
    fn test_parser_path_saudi() {
        let result = with_parser().lookup_raw("+966501234567");
        assert_eq!(result.carrier, "STC");
        assert_eq!(result.country, "Saudi Arabia");
    }

    #[test]
    fn test_flat_fallback_without_parser() {
        let lookup = CarrierLookup::default();
        let result = lookup.lookup_raw("+96278 1234567");
        assert_eq!(result.carrier, "Orange Jordan");
        assert_eq!(result.country, "Jordan");
        assert_eq!(result.country_code.as_deref(), Some("+962"));
        assert_eq!(result.region, UNKNOWN);
    }

    #[test]
    fn test_flat_fallback_country_code_quirk() {
        // +1212 loses two characters: +12
        let result = CarrierLookup::default().lookup_raw("+12125551234");
        assert_eq!(result.carrier, "Verizon");
        assert_eq!(result.country_code.as_deref(), Some("+12"));
        assert_eq!(result.country, "United States / Canada");
    }

    #[test]
    fn test_parser_invalid_falls_back_to_flat_table() {
        let result = with_parser().lookup_raw("+97155123456");
        assert_eq!(result.carrier, "du");
    }

    #[test]
    fn test_unknown_when_no_prefix_matches() {
        let result = CarrierLookup::default().lookup_raw("+33612345678");
        assert_eq!(result.carrier, UNKNOWN);
        assert_eq!(result.country, UNKNOWN);
        assert_eq!(result.error.as_deref(), Some(CARRIER_UNDETERMINED));
    }

    #[test]
    fn test_invalid_input_reports_validation_error() {
        let results = CarrierLookup::default().lookup_many(&["962791234567", "+96279123456"]);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].carrier, UNKNOWN);
        assert!(results[0].error.as_deref().unwrap().contains('+'));
        assert_eq!(results[1].carrier, "Umniah");
    }
}
