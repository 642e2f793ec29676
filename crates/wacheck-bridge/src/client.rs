use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use wacheck_core::models::Product;

use crate::error::BridgeError;
use crate::types::{BridgeStatus, Contact, HostDevice, NumberStatus};

/// Operations the services need from the automation library.
///
/// `chat_id` arguments are platform user ids (`<digits>@c.us`).
#[async_trait]
pub trait MessagingClient: Send + Sync + Debug {
    /// Start (or attach to) the browser session
    async fn start(&self) -> Result<BridgeStatus, BridgeError>;

    /// Current session state as reported by the bridge
    async fn status(&self) -> Result<BridgeStatus, BridgeError>;

    /// Close the browser session
    async fn close(&self) -> Result<(), BridgeError>;

    async fn check_number_status(&self, chat_id: &str) -> Result<NumberStatus, BridgeError>;

    /// `None` when the platform has no contact record for the id
    async fn get_contact(&self, chat_id: &str) -> Result<Option<Contact>, BridgeError>;

    /// Profile picture URL, if the account exposes one
    async fn get_profile_picture(&self, chat_id: &str) -> Result<Option<String>, BridgeError>;

    async fn get_business_products(&self, chat_id: &str) -> Result<Vec<Product>, BridgeError>;

    /// Device of the paired account
    async fn get_host_device(&self) -> Result<HostDevice, BridgeError>;
}

/// Creates fresh client instances for the session manager.
pub trait ClientFactory: Send + Sync + Debug {
    fn create(&self) -> Result<Arc<dyn MessagingClient>, BridgeError>;
}
