//! Result filtering and summary statistics.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{BusinessInfo, CheckResult};

/// Subset of check results to display or export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResultFilter {
    #[default]
    All,
    /// Registered on the platform
    Valid,
    /// Checked and not registered
    Invalid,
    Business,
    Personal,
    Errors,
}

impl ResultFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultFilter::All => "all",
            ResultFilter::Valid => "valid",
            ResultFilter::Invalid => "invalid",
            ResultFilter::Business => "business",
            ResultFilter::Personal => "personal",
            ResultFilter::Errors => "errors",
        }
    }

    pub fn matches(&self, result: &CheckResult) -> bool {
        let errored = result.is_error() || result.error.is_some();
        match self {
            ResultFilter::All => true,
            ResultFilter::Valid => !errored && result.has_whats_app,
            ResultFilter::Invalid => !errored && !result.has_whats_app,
            ResultFilter::Business => !errored && result.has_whats_app && result.is_business(),
            ResultFilter::Personal => !errored && result.has_whats_app && !result.is_business(),
            ResultFilter::Errors => errored,
        }
    }
}

impl fmt::Display for ResultFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResultFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(ResultFilter::All),
            "valid" => Ok(ResultFilter::Valid),
            "invalid" => Ok(ResultFilter::Invalid),
            "business" => Ok(ResultFilter::Business),
            "personal" => Ok(ResultFilter::Personal),
            "errors" | "error" => Ok(ResultFilter::Errors),
            other => Err(format!("Unknown result filter: {}", other)),
        }
    }
}

pub fn filter_results<'a>(
    results: &'a [CheckResult],
    filter: ResultFilter,
) -> impl Iterator<Item = &'a CheckResult> + 'a {
    results.iter().filter(move |r| filter.matches(r))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BusinessDetail {
    pub number: String,
    pub name: Option<String>,
    pub business_info: BusinessInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResultStats {
    pub total: usize,
    pub with_whats_app: usize,
    pub without_whats_app: usize,
    pub business_accounts: usize,
    pub personal_accounts: usize,
    pub errors: usize,
    pub with_profile_picture: usize,
    pub business_details: Vec<BusinessDetail>,
}

impl ResultStats {
    pub fn from_results(results: &[CheckResult]) -> Self {
        let mut stats = ResultStats {
            total: results.len(),
            ..Default::default()
        };

        for result in results {
            if result.is_error() || result.error.is_some() {
                stats.errors += 1;
            } else if result.has_whats_app {
                stats.with_whats_app += 1;
                if result.is_business() {
                    stats.business_accounts += 1;
                    if let Some(info) = &result.business_info {
                        stats.business_details.push(BusinessDetail {
                            number: result.number.clone(),
                            name: result.name.clone(),
                            business_info: info.clone(),
                        });
                    }
                } else {
                    stats.personal_accounts += 1;
                }
                if result.profile_picture.is_some() {
                    stats.with_profile_picture += 1;
                }
            } else {
                stats.without_whats_app += 1;
            }
        }

        stats
    }
}
