use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Terminal state of a single number's check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CheckOutcome {
    /// Rejected by the number validator; the session was never called
    Invalid,
    Found,
    NotFound,
    /// The session call failed for this number
    CheckFailed,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BusinessInfo {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub verified_name: Option<String>,
    #[serde(default)]
    pub product_count: usize,
    #[serde(default)]
    pub products: Vec<Product>,
}

impl BusinessInfo {
    /// One-line summary used in exports and terminal output
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if let Some(category) = &self.category {
            parts.push(format!("Category: {}", category));
        }
        if let Some(description) = &self.description {
            parts.push(format!("Description: {}", description));
        }
        if let Some(website) = &self.website {
            parts.push(format!("Website: {}", website));
        }
        if let Some(email) = &self.email {
            parts.push(format!("Email: {}", email));
        }
        if self.product_count > 0 {
            parts.push(format!("Products: {}", self.product_count));
        }
        parts.join(" | ")
    }
}

/// Result of checking one number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    pub number: String,
    pub has_whats_app: bool,
    pub outcome: CheckOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_business: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_info: Option<BusinessInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_contact: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CheckResult {
    fn bare(number: impl Into<String>, outcome: CheckOutcome) -> Self {
        CheckResult {
            number: number.into(),
            has_whats_app: outcome == CheckOutcome::Found,
            outcome,
            is_business: None,
            business_info: None,
            name: None,
            status: None,
            profile_picture: None,
            is_contact: None,
            error: None,
        }
    }

    pub fn invalid(number: impl Into<String>, error: impl Into<String>) -> Self {
        CheckResult {
            error: Some(error.into()),
            ..Self::bare(number, CheckOutcome::Invalid)
        }
    }

    pub fn not_found(number: impl Into<String>) -> Self {
        Self::bare(number, CheckOutcome::NotFound)
    }

    pub fn check_failed(number: impl Into<String>, error: impl Into<String>) -> Self {
        CheckResult {
            error: Some(error.into()),
            ..Self::bare(number, CheckOutcome::CheckFailed)
        }
    }

    /// Registered number without enrichment
    pub fn found(number: impl Into<String>) -> Self {
        CheckResult {
            is_business: Some(false),
            is_contact: Some(false),
            ..Self::bare(number, CheckOutcome::Found)
        }
    }

    pub fn is_business(&self) -> bool {
        self.is_business.unwrap_or(false)
    }

    /// Invalid and failed checks both count as errors
    pub fn is_error(&self) -> bool {
        matches!(
            self.outcome,
            CheckOutcome::Invalid | CheckOutcome::CheckFailed
        )
    }
}
