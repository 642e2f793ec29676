//! Application state shared by all handlers.

use std::sync::Arc;

use wacheck_core::{CarrierLookup, Config, NumberValidator};
use wacheck_services::{CheckService, CheckTimings, SessionManager};

pub struct AppState {
    pub config: Config,
    pub session: Arc<SessionManager>,
    pub checks: CheckService,
    pub carriers: CarrierLookup,
}

impl AppState {
    /// Wire the check service and carrier lookup around an existing session.
    pub fn new(config: Config, session: Arc<SessionManager>, validator: NumberValidator) -> Self {
        let checks = CheckService::new(
            Arc::clone(&session),
            validator.clone(),
            CheckTimings::from(&config.timing),
            config.server.max_bulk_numbers,
        )
        .with_debug(config.debug_enabled());

        Self {
            carriers: CarrierLookup::new(validator),
            config,
            session,
            checks,
        }
    }
}
