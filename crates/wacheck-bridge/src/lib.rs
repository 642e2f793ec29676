//! Messaging platform access for wacheck.
//!
//! The messaging platform is driven by an external automation bridge that
//! owns the headless browser. This crate defines the [`MessagingClient`]
//! abstraction the services depend on, the raw shapes the bridge reports, and
//! an HTTP implementation for WPPConnect-server compatible bridges.

pub mod client;
pub mod error;
pub mod http;
pub mod types;

pub use client::{ClientFactory, MessagingClient};
pub use error::BridgeError;
pub use http::{HttpBridgeClient, HttpClientFactory};
pub use types::{BridgeStatus, BusinessProfile, Contact, HostDevice, NumberStatus, WaId};
