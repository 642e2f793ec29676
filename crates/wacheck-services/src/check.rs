//! Registration check and metadata enrichment.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use wacheck_bridge::{BridgeError, Contact, MessagingClient, NumberStatus};
use wacheck_core::models::{BusinessInfo, CheckResult, Product};
use wacheck_core::{AppError, NumberValidator, PhoneNumber, TimingConfig};

use crate::session::SessionManager;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckTimings {
    /// Pause between numbers of a bulk request that reach the session
    pub check_delay: Duration,
    /// Pause before the contact lookup fallback
    pub confirmation_delay: Duration,
}

impl From<&TimingConfig> for CheckTimings {
    fn from(timing: &TimingConfig) -> Self {
        Self {
            check_delay: timing.check_delay(),
            confirmation_delay: timing.confirmation_delay(),
        }
    }
}

/// Evidence that confirmed a registration, in ranking order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationSignal {
    ExistsFlag,
    CanReceiveMessage,
    Status200,
    SerializedId,
    ContactLookup,
}

impl RegistrationSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationSignal::ExistsFlag => "exists_flag",
            RegistrationSignal::CanReceiveMessage => "can_receive_message",
            RegistrationSignal::Status200 => "status_200",
            RegistrationSignal::SerializedId => "serialized_id",
            RegistrationSignal::ContactLookup => "contact_lookup",
        }
    }

    /// First signal in the number status that indicates a registration.
    /// The contact lookup is a separate, slower step.
    pub fn primary(status: &NumberStatus) -> Option<Self> {
        let code = status.status;
        let failed_code = matches!(code, Some(404) | Some(500));

        if status.number_exists == Some(true) || status.exists == Some(true) {
            return Some(RegistrationSignal::ExistsFlag);
        }
        if status.can_receive_message == Some(true) && !failed_code {
            return Some(RegistrationSignal::CanReceiveMessage);
        }
        if code == Some(200) {
            return Some(RegistrationSignal::Status200);
        }
        if status.id.as_ref().is_some_and(|id| id.has_serialized()) && code != Some(404) {
            return Some(RegistrationSignal::SerializedId);
        }
        None
    }
}

impl fmt::Display for RegistrationSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runs single and bulk checks against the connected session.
#[derive(Debug, Clone)]
pub struct CheckService {
    session: Arc<SessionManager>,
    validator: NumberValidator,
    timings: CheckTimings,
    max_bulk: usize,
    debug: bool,
}

impl CheckService {
    pub fn new(
        session: Arc<SessionManager>,
        validator: NumberValidator,
        timings: CheckTimings,
        max_bulk: usize,
    ) -> Self {
        Self {
            session,
            validator,
            timings,
            max_bulk,
            debug: false,
        }
    }

    /// Per-number diagnostics at info level
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    pub fn validator(&self) -> &NumberValidator {
        &self.validator
    }

    pub fn max_bulk(&self) -> usize {
        self.max_bulk
    }

    /// Check one number. Invalid input and a disconnected session are
    /// request errors; a bridge failure is an internal error.
    pub async fn check_one(&self, raw: &str) -> Result<CheckResult, AppError> {
        if raw.trim().is_empty() {
            return Err(AppError::InvalidInput("Phone number is required".to_string()));
        }

        let client = self.session.connected_client()?;

        let validated = self
            .validator
            .validate(raw)
            .map_err(|e| AppError::InvalidInput(e.to_string()))?;

        let result = self.check_number(client.as_ref(), &validated.number).await?;
        Ok(result)
    }

    /// Check numbers one after another. Invalid entries never reach the
    /// session; a failure on one number is recorded and the batch continues.
    pub async fn check_bulk<S: AsRef<str>>(
        &self,
        numbers: &[S],
    ) -> Result<Vec<CheckResult>, AppError> {
        if numbers.len() > self.max_bulk {
            return Err(AppError::BadRequest(format!(
                "Too many numbers: {} (maximum {})",
                numbers.len(),
                self.max_bulk
            )));
        }

        let client = self.session.connected_client()?;
        tracing::info!(count = numbers.len(), "Starting bulk check");

        let mut results = Vec::with_capacity(numbers.len());
        let mut reached_session = false;

        for (index, raw) in numbers.iter().enumerate() {
            let raw = raw.as_ref();
            let number = match self.validator.validate(raw) {
                Ok(validated) => validated.number,
                Err(e) => {
                    tracing::debug!(index, number = %raw, error = %e, "Skipping invalid number");
                    results.push(CheckResult::invalid(raw.trim(), e.to_string()));
                    continue;
                }
            };

            if reached_session {
                tokio::time::sleep(self.timings.check_delay).await;
            }
            reached_session = true;

            let result = match self.check_number(client.as_ref(), &number).await {
                Ok(result) => result,
                Err(e) => {
                    tracing::warn!(number = %number, error = %e, "Check failed");
                    CheckResult::check_failed(number.as_str(), e.to_string())
                }
            };
            results.push(result);
        }

        let found = results.iter().filter(|r| r.has_whats_app).count();
        tracing::info!(count = results.len(), found, "Bulk check finished");

        Ok(results)
    }

    async fn check_number(
        &self,
        client: &dyn MessagingClient,
        number: &PhoneNumber,
    ) -> Result<CheckResult, BridgeError> {
        let chat_id = number.chat_id();
        let status = client.check_number_status(&chat_id).await?;

        if self.debug {
            tracing::info!(number = %number, status = ?status, "Number status");
        }

        let signal = match RegistrationSignal::primary(&status) {
            Some(signal) => Some(signal),
            None => self.confirm_with_contact(client, &chat_id).await,
        };

        let Some(signal) = signal else {
            tracing::debug!(number = %number, "Number is not registered");
            return Ok(CheckResult::not_found(number.as_str()));
        };

        tracing::debug!(number = %number, signal = %signal, "Number is registered");
        Ok(self.enrich(client, number, &chat_id, status.is_business).await)
    }

    async fn confirm_with_contact(
        &self,
        client: &dyn MessagingClient,
        chat_id: &str,
    ) -> Option<RegistrationSignal> {
        tokio::time::sleep(self.timings.confirmation_delay).await;

        match client.get_contact(chat_id).await {
            Ok(Some(contact)) if contact.has_serialized_id() => {
                Some(RegistrationSignal::ContactLookup)
            }
            Ok(_) => None,
            Err(e) => {
                tracing::debug!(chat_id, error = %e, "Contact lookup failed");
                None
            }
        }
    }

    /// Best-effort metadata for a registered number
    async fn enrich(
        &self,
        client: &dyn MessagingClient,
        number: &PhoneNumber,
        chat_id: &str,
        status_business_flag: Option<bool>,
    ) -> CheckResult {
        let mut result = CheckResult::found(number.as_str());

        let contact = match client.get_contact(chat_id).await {
            Ok(contact) => contact,
            Err(e) => {
                tracing::warn!(number = %number, error = %e, "Could not get contact info");
                None
            }
        };

        if let Some(contact) = &contact {
            result.name = contact.display_name();
            result.status = contact.status.clone();
            result.is_contact = Some(contact.is_my_contact.unwrap_or(false));
        }

        match client.get_profile_picture(chat_id).await {
            Ok(url) => result.profile_picture = url.filter(|u| !u.is_empty()),
            Err(e) => {
                tracing::warn!(number = %number, error = %e, "Could not get profile picture");
            }
        }

        let products = match client.get_business_products(chat_id).await {
            Ok(products) => products,
            Err(e) => {
                tracing::debug!(number = %number, error = %e, "No business products");
                Vec::new()
            }
        };

        let is_business = !products.is_empty()
            || contact.as_ref().is_some_and(Contact::has_business_marker)
            || status_business_flag.unwrap_or(false);
        result.is_business = Some(is_business);

        if is_business {
            result.business_info = Some(business_info(contact.as_ref(), products));
        }

        if self.debug {
            tracing::info!(
                number = %number,
                is_business,
                has_picture = result.profile_picture.is_some(),
                "Enriched registered number"
            );
        }

        result
    }
}

fn business_info(contact: Option<&Contact>, products: Vec<Product>) -> BusinessInfo {
    let profile = contact.and_then(|c| c.business_profile.clone()).unwrap_or_default();

    BusinessInfo {
        description: profile.description,
        category: profile.category,
        website: profile.website,
        email: profile.email,
        address: profile.address,
        verified_name: contact.and_then(|c| c.verified_name.clone()),
        product_count: products.len(),
        products,
    }
}
