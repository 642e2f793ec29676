//! Phone number normalization and validation.
//!
//! Numbers are reduced to ASCII digits plus a leading `+` and must be 10 to 15
//! characters long including the `+`. Deeper checks (country metadata,
//! national formatting) are delegated to a [`NumberParser`] when one is
//! configured on the [`NumberValidator`].

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const MIN_NUMBER_LEN: usize = 10;
pub const MAX_NUMBER_LEN: usize = 15;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Phone number is required")]
    EmptyInput,

    #[error("Phone number must start with +")]
    MissingPlus,

    #[error("Phone number must contain digits after +")]
    PlusOnly,

    #[error("Phone number is too short ({digits} digits)")]
    TooShort { digits: usize },

    #[error("Phone number is too long ({digits} digits)")]
    TooLong { digits: usize },

    #[error("Phone number is not valid for its country")]
    InvalidForCountry,

    #[error("Invalid phone number format: {0}")]
    ParseError(String),
}

/// A number normalized to `+<country code><national number>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Clean and length-check a raw string. Does not consult any parser.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let clean = clean_number(raw);

        if clean.is_empty() {
            return Err(ValidationError::EmptyInput);
        }
        if !clean.starts_with('+') {
            return Err(ValidationError::MissingPlus);
        }
        if clean == "+" {
            return Err(ValidationError::PlusOnly);
        }

        let digits = clean.len() - 1;
        if clean.len() < MIN_NUMBER_LEN {
            return Err(ValidationError::TooShort { digits });
        }
        if clean.len() > MAX_NUMBER_LEN {
            return Err(ValidationError::TooLong { digits });
        }

        Ok(PhoneNumber(clean))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The number without its leading `+`
    pub fn digits(&self) -> &str {
        &self.0[1..]
    }

    /// Messaging platform user id: `<digits>@c.us`
    pub fn chat_id(&self) -> String {
        format!("{}@c.us", self.digits())
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Keep ASCII digits and `+` only.
pub fn clean_number(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect()
}

/// What an international number parser reports about a number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedNumber {
    pub valid: bool,
    /// ISO 3166-1 alpha-2 region, e.g. `JO`
    pub country: Option<String>,
    pub country_code: String,
    pub national_number: String,
    pub e164: String,
    pub international: String,
    pub number_type: Option<String>,
}

/// International number parsing, provided by an external metadata library.
pub trait NumberParser: Send + Sync + fmt::Debug {
    fn parse(&self, number: &str) -> Result<ParsedNumber, String>;
}

/// Outcome of a successful validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedNumber {
    pub number: PhoneNumber,
    /// Present only when a parser was configured and accepted the number
    pub parsed: Option<ParsedNumber>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub national_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Result<ValidatedNumber, ValidationError>> for ValidationResult {
    fn from(result: Result<ValidatedNumber, ValidationError>) -> Self {
        match result {
            Ok(validated) => {
                let parsed = validated.parsed;
                ValidationResult {
                    valid: true,
                    formatted: Some(validated.number.as_str().to_string()),
                    country: parsed.as_ref().and_then(|p| p.country.clone()),
                    national_number: parsed.as_ref().map(|p| p.national_number.clone()),
                    country_code: parsed.as_ref().map(|p| p.country_code.clone()),
                    display: parsed.map(|p| p.international),
                    error: None,
                }
            }
            Err(err) => ValidationResult {
                valid: false,
                formatted: None,
                country: None,
                national_number: None,
                country_code: None,
                display: None,
                error: Some(err.to_string()),
            },
        }
    }
}

/// Validates raw input, optionally backed by a [`NumberParser`].
#[derive(Debug, Clone, Default)]
pub struct NumberValidator {
    parser: Option<Arc<dyn NumberParser>>,
}

impl NumberValidator {
    /// Validator without parser: cleaning and length rules only
    pub fn new() -> Self {
        Self { parser: None }
    }

    pub fn with_parser(parser: Arc<dyn NumberParser>) -> Self {
        Self {
            parser: Some(parser),
        }
    }

    /// Uses libphonenumber metadata when the `libphonenumber` feature is enabled.
    pub fn with_default_parser() -> Self {
        #[cfg(feature = "libphonenumber")]
        {
            Self::with_parser(Arc::new(LibPhoneNumberParser))
        }
        #[cfg(not(feature = "libphonenumber"))]
        {
            Self::new()
        }
    }

    pub fn parser(&self) -> Option<&Arc<dyn NumberParser>> {
        self.parser.as_ref()
    }

    pub fn validate(&self, raw: &str) -> Result<ValidatedNumber, ValidationError> {
        let number = PhoneNumber::parse(raw)?;

        let Some(parser) = &self.parser else {
            return Ok(ValidatedNumber {
                number,
                parsed: None,
            });
        };

        let parsed = parser
            .parse(number.as_str())
            .map_err(ValidationError::ParseError)?;
        if !parsed.valid {
            return Err(ValidationError::InvalidForCountry);
        }

        // The parser's E.164 form wins so that formatting stays canonical
        let number = PhoneNumber::parse(&parsed.e164).unwrap_or(number);
        Ok(ValidatedNumber {
            number,
            parsed: Some(parsed),
        })
    }

    /// Validation outcome in its wire shape
    pub fn check(&self, raw: &str) -> ValidationResult {
        self.validate(raw).into()
    }
}

#[cfg(feature = "libphonenumber")]
#[derive(Debug, Clone, Copy, Default)]
pub struct LibPhoneNumberParser;

#[cfg(feature = "libphonenumber")]
impl NumberParser for LibPhoneNumberParser {
    fn parse(&self, number: &str) -> Result<ParsedNumber, String> {
        use phonenumber::Mode;

        let parsed = phonenumber::parse(None, number).map_err(|e| e.to_string())?;
        let valid = phonenumber::is_valid(&parsed);
        let country = parsed.country().id().map(|id| format!("{:?}", id));
        let number_type = format!(
            "{:?}",
            parsed.number_type(&phonenumber::metadata::DATABASE)
        );

        Ok(ParsedNumber {
            valid,
            country,
            country_code: parsed.code().value().to_string(),
            national_number: parsed.national().value().to_string(),
            e164: parsed.format().mode(Mode::E164).to_string(),
            international: parsed.format().mode(Mode::International).to_string(),
            number_type: Some(number_type),
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Parser stub that knows a handful of numbers.
    #[derive(Debug, Default)]
    pub(crate) struct StaticParser;

    impl NumberParser for StaticParser {
        fn parse(&self, number: &str) -> Result<ParsedNumber, String> {
            match number {
                "+962791234567" => Ok(ParsedNumber {
                    valid: true,
                    country: Some("JO".to_string()),
                    country_code: "962".to_string(),
                    national_number: "791234567".to_string(),
                    e164: "+962791234567".to_string(),
                    international: "+962 7 9123 4567".to_string(),
                    number_type: Some("Mobile".to_string()),
                }),
                "+966501234567" => Ok(ParsedNumber {
                    valid: true,
                    country: Some("SA".to_string()),
                    country_code: "966".to_string(),
                    national_number: "501234567".to_string(),
                    e164: "+966501234567".to_string(),
                    international: "+966 50 123 4567".to_string(),
                    number_type: Some("Mobile".to_string()),
                }),
                "+999123456789" => Err("invalid country code".to_string()),
                _ => Ok(ParsedNumber {
                    valid: false,
                    country: None,
                    country_code: String::new(),
                    national_number: String::new(),
                    e164: number.to_string(),
                    international: number.to_string(),
                    number_type: None,
                }),
            }
        }
    }

    #[test]
    fn test_cleaning_strips_formatting() {
        let number = PhoneNumber::parse("+962 79-123 4567").unwrap();
        assert_eq!(number.as_str(), "+962791234567");
        assert_eq!(number.digits(), "962791234567");
        assert_eq!(number.chat_id(), "962791234567@c.us");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(PhoneNumber::parse(""), Err(ValidationError::EmptyInput));
        assert_eq!(PhoneNumber::parse(" - ()"), Err(ValidationError::EmptyInput));
    }

    #[test]
    fn test_missing_plus() {
        assert_eq!(
            PhoneNumber::parse("00962791234567"),
            Err(ValidationError::MissingPlus)
        );
    }

    #[test]
    fn test_plus_only() {
        assert_eq!(PhoneNumber::parse("+"), Err(ValidationError::PlusOnly));
        assert_eq!(PhoneNumber::parse(" + "), Err(ValidationError::PlusOnly));
    }

    #[test]
    fn test_length_bounds_report_digit_count() {
        assert_eq!(
            PhoneNumber::parse("+12345678"),
            Err(ValidationError::TooShort { digits: 8 })
        );
        assert_eq!(
            PhoneNumber::parse("+1234567890123456"),
            Err(ValidationError::TooLong { digits: 16 })
        );
        assert!(PhoneNumber::parse("+123456789").is_ok());
        assert!(PhoneNumber::parse("+12345678901234").is_ok());
    }

    #[test]
    fn test_validator_without_parser_returns_clean_number() {
        let validator = NumberValidator::new();
        let result = validator.check("+1 (234) 567-890");
        assert!(result.valid);
        assert_eq!(result.formatted.as_deref(), Some("+1234567890"));
        assert!(result.country.is_none());
        assert!(result.error.is_none());
    }

    #[test]
    fn test_validator_with_parser_fills_details() {
        let validator = NumberValidator::with_parser(Arc::new(StaticParser));
        let result = validator.check("+962 79-123 4567");
        assert!(result.valid);
        assert_eq!(result.formatted.as_deref(), Some("+962791234567"));
        assert_eq!(result.country.as_deref(), Some("JO"));
        assert_eq!(result.country_code.as_deref(), Some("962"));
        assert_eq!(result.national_number.as_deref(), Some("791234567"));
        assert_eq!(result.display.as_deref(), Some("+962 7 9123 4567"));
    }

    #[test]
    fn test_validator_parser_rejects_number() {
        let validator = NumberValidator::with_parser(Arc::new(StaticParser));
        assert_eq!(
            validator.validate("+11111111111").unwrap_err(),
            ValidationError::InvalidForCountry
        );
    }

    #[test]
    fn test_validator_parser_error_is_reported() {
        let validator = NumberValidator::with_parser(Arc::new(StaticParser));
        let result = validator.check("+999123456789");
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("invalid country code"));
    }

    #[test]
    fn test_length_rules_apply_before_parser() {
        let validator = NumberValidator::with_parser(Arc::new(StaticParser));
        assert_eq!(
            validator.validate("962791234567").unwrap_err(),
            ValidationError::MissingPlus
        );
    }

    #[test]
    fn test_validation_result_serializes_camel_case() {
        let validator = NumberValidator::with_parser(Arc::new(StaticParser));
        let json = serde_json::to_value(validator.check("+966501234567")).unwrap();
        assert_eq!(json["nationalNumber"], "501234567");
        assert_eq!(json["countryCode"], "966");
        assert!(json.get("error").is_none());
    }
}
