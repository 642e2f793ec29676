//! Service wiring: bridge client factory, session manager, check service

use std::sync::Arc;

use anyhow::Result;
use wacheck_bridge::HttpClientFactory;
use wacheck_core::{Config, NumberValidator};
use wacheck_services::{SessionManager, SessionTimings};

use crate::state::AppState;

/// Build the application state and start the messaging session in the background.
pub async fn initialize_services(config: &Config) -> Result<Arc<AppState>> {
    let factory = Arc::new(HttpClientFactory::new(config.bridge.clone()));
    let session = SessionManager::new(factory, SessionTimings::from(&config.timing));

    let validator = NumberValidator::with_default_parser();
    if validator.parser().is_none() {
        tracing::info!("No international number parser configured, using length rules and flat carrier table");
    }

    let state = Arc::new(AppState::new(config.clone(), Arc::clone(&session), validator));

    tracing::info!(
        bridge_url = %config.bridge.url,
        session = %config.bridge.session,
        "Starting WhatsApp session"
    );
    session.start().await;

    Ok(state)
}
