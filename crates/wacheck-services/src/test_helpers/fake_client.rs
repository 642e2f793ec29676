//! In-memory messaging client for testing without a bridge
//!
//! Numbers are keyed by their digits (the user part of the chat id). Unknown
//! numbers behave like unregistered ones.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use wacheck_bridge::{
    BridgeError, BridgeStatus, BusinessProfile, ClientFactory, Contact, HostDevice,
    MessagingClient, NumberStatus, WaId,
};
use wacheck_core::models::Product;

fn wa_id(digits: &str) -> WaId {
    WaId {
        serialized: Some(format!("{}@c.us", digits)),
        user: Some(digits.to_string()),
        server: Some("c.us".to_string()),
    }
}

/// Canned bridge answers for one number
#[derive(Debug, Clone, Default)]
pub struct FakeNumber {
    pub status: NumberStatus,
    pub contact: Option<Contact>,
    pub profile_picture: Option<String>,
    pub products: Vec<Product>,
    /// Fails `check_number_status`
    pub status_error: Option<String>,
    /// Fails contact, picture and product lookups
    pub enrichment_error: Option<String>,
}

impl FakeNumber {
    pub fn registered(digits: &str) -> Self {
        Self {
            status: NumberStatus {
                number_exists: Some(true),
                can_receive_message: Some(true),
                status: Some(200),
                id: Some(wa_id(digits)),
                ..Default::default()
            },
            contact: Some(Contact {
                id: Some(wa_id(digits)),
                is_my_contact: Some(false),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    pub fn unregistered() -> Self {
        Self {
            status: NumberStatus {
                number_exists: Some(false),
                status: Some(404),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// No primary signal, only the contact lookup confirms the registration
    pub fn contact_only(digits: &str) -> Self {
        Self {
            status: NumberStatus::default(),
            contact: Some(Contact {
                id: Some(wa_id(digits)),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    pub fn business(digits: &str, products: Vec<Product>) -> Self {
        let mut number = Self::registered(digits);
        if let Some(contact) = number.contact.as_mut() {
            contact.is_business = Some(true);
            contact.business_profile = Some(BusinessProfile {
                category: Some("Cafe".to_string()),
                description: Some("Coffee and pastries".to_string()),
                ..Default::default()
            });
        }
        number.products = products;
        number
    }

    pub fn failing(message: &str) -> Self {
        Self {
            status_error: Some(message.to_string()),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        let contact = self.contact.get_or_insert_with(Contact::default);
        contact.pushname = Some(name.to_string());
        self
    }

    pub fn with_picture(mut self, url: &str) -> Self {
        self.profile_picture = Some(url.to_string());
        self
    }

    pub fn with_enrichment_error(mut self, message: &str) -> Self {
        self.enrichment_error = Some(message.to_string());
        self
    }
}

#[derive(Debug, Default)]
pub struct FakeMessagingClient {
    numbers: Mutex<HashMap<String, FakeNumber>>,
    start_results: Mutex<VecDeque<Result<BridgeStatus, BridgeError>>>,
    status_results: Mutex<VecDeque<BridgeStatus>>,
    host_device: Mutex<Option<HostDevice>>,
    calls: Mutex<Vec<String>>,
    start_calls: AtomicUsize,
    close_calls: AtomicUsize,
}

impl FakeMessagingClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_number(&self, digits: &str, number: FakeNumber) {
        self.numbers
            .lock()
            .unwrap()
            .insert(digits.to_string(), number);
    }

    /// Queue the result of the next `start`; `CONNECTED` once the queue is empty
    pub fn push_start(&self, result: Result<BridgeStatus, BridgeError>) {
        self.start_results.lock().unwrap().push_back(result);
    }

    /// Queue the result of the next `status` poll; `CONNECTED` once the queue is empty
    pub fn push_status(&self, status: BridgeStatus) {
        self.status_results.lock().unwrap().push_back(status);
    }

    pub fn set_host_device(&self, device: HostDevice) {
        *self.host_device.lock().unwrap() = Some(device);
    }

    /// Per-number calls in order, as `<kind>:<digits>`
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn start_calls(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }

    fn record(&self, kind: &str, chat_id: &str) -> Option<FakeNumber> {
        let digits = chat_id.split('@').next().unwrap_or(chat_id);
        self.calls
            .lock()
            .unwrap()
            .push(format!("{}:{}", kind, digits));
        self.numbers.lock().unwrap().get(digits).cloned()
    }

    fn enrichment(&self, kind: &str, chat_id: &str) -> Result<Option<FakeNumber>, BridgeError> {
        match self.record(kind, chat_id) {
            Some(FakeNumber {
                enrichment_error: Some(message),
                ..
            }) => Err(BridgeError::Request(message)),
            number => Ok(number),
        }
    }
}

#[async_trait]
impl MessagingClient for FakeMessagingClient {
    async fn start(&self) -> Result<BridgeStatus, BridgeError> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        self.start_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(BridgeStatus::new("CONNECTED", None)))
    }

    async fn status(&self) -> Result<BridgeStatus, BridgeError> {
        Ok(self
            .status_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| BridgeStatus::new("CONNECTED", None)))
    }

    async fn close(&self) -> Result<(), BridgeError> {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn check_number_status(&self, chat_id: &str) -> Result<NumberStatus, BridgeError> {
        match self.record("status", chat_id) {
            Some(FakeNumber {
                status_error: Some(message),
                ..
            }) => Err(BridgeError::Request(message)),
            Some(number) => Ok(number.status),
            None => Ok(FakeNumber::unregistered().status),
        }
    }

    async fn get_contact(&self, chat_id: &str) -> Result<Option<Contact>, BridgeError> {
        Ok(self.enrichment("contact", chat_id)?.and_then(|n| n.contact))
    }

    async fn get_profile_picture(&self, chat_id: &str) -> Result<Option<String>, BridgeError> {
        Ok(self
            .enrichment("picture", chat_id)?
            .and_then(|n| n.profile_picture))
    }

    async fn get_business_products(&self, chat_id: &str) -> Result<Vec<Product>, BridgeError> {
        Ok(self
            .enrichment("products", chat_id)?
            .map(|n| n.products)
            .unwrap_or_default())
    }

    async fn get_host_device(&self) -> Result<HostDevice, BridgeError> {
        Ok(self
            .host_device
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| HostDevice {
                id: Some(wa_id("962790000000")),
                pushname: Some("Test Account".to_string()),
                platform: Some("android".to_string()),
                ..Default::default()
            }))
    }
}

/// Hands out the same shared fake client on every `create`
#[derive(Debug)]
pub struct FakeClientFactory {
    client: Arc<FakeMessagingClient>,
    failures: Mutex<VecDeque<BridgeError>>,
    created: AtomicUsize,
}

impl FakeClientFactory {
    pub fn new(client: Arc<FakeMessagingClient>) -> Self {
        Self {
            client,
            failures: Mutex::new(VecDeque::new()),
            created: AtomicUsize::new(0),
        }
    }

    pub fn fail_next(&self, err: BridgeError) {
        self.failures.lock().unwrap().push_back(err);
    }

    /// Successful creations
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

impl ClientFactory for FakeClientFactory {
    fn create(&self) -> Result<Arc<dyn MessagingClient>, BridgeError> {
        if let Some(err) = self.failures.lock().unwrap().pop_front() {
            return Err(err);
        }
        self.created.fetch_add(1, Ordering::SeqCst);
        let client: Arc<dyn MessagingClient> = self.client.clone();
        Ok(client)
    }
}
