//! Messaging session lifecycle.
//!
//! One [`SessionManager`] per process owns the single messaging client.
//! Lifecycle transitions (initialize, restart, disconnect, shutdown and the
//! watcher's bridge updates) are serialized behind one async mutex, while
//! status reads go through a `watch` channel and never wait on a transition.
//!
//! ```text
//! disconnected -> initializing -> qr_ready -> connected
//!                      |                         |
//!                      +--> error --(retry)--+   +--> disconnected
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch, Mutex};
use wacheck_bridge::{BridgeError, BridgeStatus, ClientFactory, MessagingClient};
use wacheck_core::models::{AccountInfo, SessionStatus};
use wacheck_core::{AppError, TimingConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTimings {
    /// Bridge polling interval for the watcher
    pub status_poll: Duration,
    /// Backoff before retrying a failed initialization
    pub init_retry: Duration,
    /// Delay between closing and recreating the client on restart
    pub restart_delay: Duration,
}

impl From<&TimingConfig> for SessionTimings {
    fn from(timing: &TimingConfig) -> Self {
        Self {
            status_poll: timing.status_poll(),
            init_retry: timing.init_retry(),
            restart_delay: timing.restart_delay(),
        }
    }
}

/// Kind of initialization failure, used for the operator hint and retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCategory {
    Browser,
    Timeout,
    ConnectionRefused,
    PermissionDenied,
    Other,
}

impl FailureCategory {
    pub fn classify(err: &BridgeError) -> Self {
        let message = err.to_string().to_lowercase();

        if message.contains("eacces") || message.contains("permission denied") {
            return FailureCategory::PermissionDenied;
        }
        if message.contains("chrome") || message.contains("chromium") || message.contains("sandbox")
        {
            return FailureCategory::Browser;
        }
        match err {
            BridgeError::Timeout(_) => FailureCategory::Timeout,
            BridgeError::ConnectionRefused(_) => FailureCategory::ConnectionRefused,
            _ if message.contains("timeout") || message.contains("timed out") => {
                FailureCategory::Timeout
            }
            _ if message.contains("econnrefused") || message.contains("connection refused") => {
                FailureCategory::ConnectionRefused
            }
            _ => FailureCategory::Other,
        }
    }

    pub fn hint(&self) -> Option<&'static str> {
        match self {
            FailureCategory::Browser => Some(
                "Chrome/Chromium related error. Try setting CHROME_EXECUTABLE_PATH on the bridge.",
            ),
            FailureCategory::Timeout => {
                Some("Timeout during initialization. Check the internet connection.")
            }
            FailureCategory::ConnectionRefused => {
                Some("Connection refused. Check that the automation bridge is running at BRIDGE_URL.")
            }
            FailureCategory::PermissionDenied => Some(
                "Permission denied. Fix the browser profile directory permissions and restart.",
            ),
            FailureCategory::Other => None,
        }
    }

    /// Permission problems need an operator, everything else is retried
    pub fn is_retryable(&self) -> bool {
        !matches!(self, FailureCategory::PermissionDenied)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("WhatsApp client is not connected (status: {0})")]
    NotConnected(SessionStatus),

    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NotConnected(status) => AppError::SessionNotConnected {
                status: status.to_string(),
            },
            SessionError::Bridge(e) => e.into(),
        }
    }
}

#[derive(Debug, Clone)]
struct SessionState {
    status: SessionStatus,
    qr_code: Option<String>,
    last_error: Option<String>,
    failure: Option<FailureCategory>,
    account_info: Option<AccountInfo>,
    client: Option<Arc<dyn MessagingClient>>,
    /// Bumped on every lifecycle transition; stale watchers and retries compare against it
    generation: u64,
}

impl SessionState {
    fn apply_bridge_status(&mut self, bridge: &BridgeStatus) {
        match bridge.session_status() {
            Some(SessionStatus::Connected) => {
                self.status = SessionStatus::Connected;
                self.qr_code = None;
            }
            Some(SessionStatus::QrReady) => {
                self.status = SessionStatus::QrReady;
                if bridge.qrcode.is_some() {
                    self.qr_code = bridge.qrcode.clone();
                }
            }
            Some(SessionStatus::Disconnected) => {
                self.status = SessionStatus::Disconnected;
                self.qr_code = None;
                self.client = None;
                self.account_info = None;
            }
            Some(status) => self.status = status,
            None => {
                if let Some(qr) = &bridge.qrcode {
                    self.status = SessionStatus::QrReady;
                    self.qr_code = Some(qr.clone());
                }
            }
        }
    }
}

/// Point-in-time view of the session for status endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub qr_code: Option<String>,
    pub last_error: Option<String>,
    pub failure: Option<FailureCategory>,
    pub account_info: Option<AccountInfo>,
}

#[derive(Debug)]
enum Command {
    /// `generation` set: only run if no other transition happened since it was queued
    Initialize { generation: Option<u64> },
}

pub struct SessionManager {
    factory: Arc<dyn ClientFactory>,
    timings: SessionTimings,
    state: watch::Sender<SessionState>,
    lifecycle: Mutex<()>,
    commands: mpsc::UnboundedSender<Command>,
    command_rx: Mutex<Option<mpsc::UnboundedReceiver<Command>>>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("status", &self.status())
            .field("timings", &self.timings)
            .finish()
    }
}

impl SessionManager {
    pub fn new(factory: Arc<dyn ClientFactory>, timings: SessionTimings) -> Arc<Self> {
        let (state, _) = watch::channel(SessionState {
            status: SessionStatus::Disconnected,
            qr_code: None,
            last_error: None,
            failure: None,
            account_info: None,
            client: None,
            generation: 0,
        });
        let (commands, command_rx) = mpsc::unbounded_channel();

        Arc::new(Self {
            factory,
            timings,
            state,
            lifecycle: Mutex::new(()),
            commands,
            command_rx: Mutex::new(Some(command_rx)),
        })
    }

    /// Spawn the lifecycle worker and queue the first initialization.
    pub async fn start(self: &Arc<Self>) {
        let Some(rx) = self.command_rx.lock().await.take() else {
            tracing::warn!("Session manager already started");
            return;
        };

        let this = Arc::clone(self);
        tokio::spawn(async move {
            this.worker_loop(rx).await;
        });

        self.queue(Command::Initialize { generation: None });
    }

    async fn worker_loop(self: Arc<Self>, mut rx: mpsc::UnboundedReceiver<Command>) {
        tracing::debug!("Session worker started");

        while let Some(command) = rx.recv().await {
            match command {
                Command::Initialize { generation } => {
                    if let Some(expected) = generation {
                        let (current, status) = {
                            let state = self.state.borrow();
                            (state.generation, state.status)
                        };
                        if current != expected {
                            tracing::debug!(expected, current, "Skipping superseded initialization");
                            continue;
                        }
                        if status != SessionStatus::Error && status != SessionStatus::Disconnected {
                            tracing::debug!(status = %status, "Skipping initialization, session is active");
                            continue;
                        }
                    }
                    self.initialize().await;
                }
            }
        }

        tracing::debug!("Session worker stopped");
    }

    fn queue(&self, command: Command) {
        if self.commands.send(command).is_err() {
            tracing::warn!("Session worker is not running; command dropped");
        }
    }

    fn queue_after(&self, delay: Duration, command: Command) {
        let commands = self.commands.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = commands.send(command);
        });
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.borrow();
        SessionSnapshot {
            status: state.status,
            qr_code: state.qr_code.clone(),
            last_error: state.last_error.clone(),
            failure: state.failure,
            account_info: state.account_info.clone(),
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.state.borrow().status
    }

    /// QR payload, only while a scan is pending
    pub fn qr_code(&self) -> Option<String> {
        let state = self.state.borrow();
        match state.status {
            SessionStatus::QrReady => state.qr_code.clone(),
            _ => None,
        }
    }

    /// The client, if the session is connected.
    pub fn connected_client(&self) -> Result<Arc<dyn MessagingClient>, SessionError> {
        let state = self.state.borrow();
        match (&state.status, &state.client) {
            (SessionStatus::Connected, Some(client)) => Ok(Arc::clone(client)),
            (status, _) => Err(SessionError::NotConnected(*status)),
        }
    }

    /// Wait until the session reaches `status`; false on timeout.
    pub async fn wait_for_status(&self, status: SessionStatus, timeout: Duration) -> bool {
        let mut rx = self.state.subscribe();
        let reached = tokio::time::timeout(timeout, async move {
            rx.wait_for(|state| state.status == status).await.is_ok()
        })
        .await;
        reached.unwrap_or(false)
    }

    /// Paired account details, fetched once per connection.
    pub async fn account_info(&self) -> Option<AccountInfo> {
        let (client, generation) = {
            let state = self.state.borrow();
            if state.status != SessionStatus::Connected {
                return None;
            }
            if let Some(info) = &state.account_info {
                return Some(info.clone());
            }
            (state.client.clone()?, state.generation)
        };

        match client.get_host_device().await {
            Ok(device) => {
                let info = device.account_info();
                tracing::info!(name = %info.name, platform = %info.platform, "Connected account info");
                self.state.send_modify(|state| {
                    if state.generation == generation {
                        state.account_info = Some(info.clone());
                    }
                });
                Some(info)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not get account info");
                None
            }
        }
    }

    /// Start a new transition: bump the generation and reset the state.
    /// Returns the new generation and the previous client.
    fn begin_transition(&self, status: SessionStatus) -> (u64, Option<Arc<dyn MessagingClient>>) {
        let mut generation = 0;
        let mut previous = None;
        self.state.send_modify(|state| {
            state.generation += 1;
            generation = state.generation;
            previous = state.client.take();
            state.status = status;
            state.qr_code = None;
            state.last_error = None;
            state.failure = None;
            state.account_info = None;
        });
        (generation, previous)
    }

    async fn close_client(client: Option<Arc<dyn MessagingClient>>) {
        if let Some(client) = client {
            if let Err(e) = client.close().await {
                tracing::warn!(error = %e, "Failed to close WhatsApp client");
            }
        }
    }

    /// Create a client and start its session. Failures move the session to
    /// `error` and schedule a retry unless the failure needs an operator.
    pub async fn initialize(self: &Arc<Self>) {
        let _guard = self.lifecycle.lock().await;

        let (generation, previous) = self.begin_transition(SessionStatus::Initializing);
        Self::close_client(previous).await;
        tracing::info!(generation, "Initializing WhatsApp client");

        let client = match self.factory.create() {
            Ok(client) => client,
            Err(e) => {
                self.record_failure(generation, e);
                return;
            }
        };

        match client.start().await {
            Ok(bridge_status) => {
                self.state.send_modify(|state| {
                    if state.generation == generation {
                        state.client = Some(Arc::clone(&client));
                        state.apply_bridge_status(&bridge_status);
                    }
                });
                tracing::info!(
                    bridge_status = %bridge_status.status,
                    status = %self.status(),
                    "WhatsApp client created"
                );

                let this = Arc::clone(self);
                tokio::spawn(async move {
                    this.watch_session(generation).await;
                });
            }
            Err(e) => self.record_failure(generation, e),
        }
    }

    fn record_failure(&self, generation: u64, err: BridgeError) {
        let category = FailureCategory::classify(&err);
        tracing::error!(error = %err, category = ?category, "Error initializing WhatsApp client");
        if let Some(hint) = category.hint() {
            tracing::error!("{}", hint);
        }

        let message = err.to_string();
        self.state.send_modify(|state| {
            if state.generation == generation {
                state.status = SessionStatus::Error;
                state.last_error = Some(message);
                state.failure = Some(category);
                state.client = None;
                state.qr_code = None;
            }
        });

        if category.is_retryable() {
            tracing::info!(
                retry_in_secs = self.timings.init_retry.as_secs(),
                "Will retry initialization"
            );
            self.queue_after(
                self.timings.init_retry,
                Command::Initialize {
                    generation: Some(generation),
                },
            );
        } else {
            tracing::warn!("Automatic retry disabled for this failure; restart the session manually");
        }
    }

    /// Poll the bridge for as long as this generation's client is alive, so a
    /// browser closed after pairing still moves the session to `disconnected`.
    async fn watch_session(self: Arc<Self>, generation: u64) {
        let mut logged_in = false;

        loop {
            let (status, client) = {
                let state = self.state.borrow();
                if state.generation != generation {
                    return;
                }
                (state.status, state.client.clone())
            };

            match status {
                SessionStatus::Connected if !logged_in => {
                    logged_in = true;
                    tracing::info!("Successfully logged in");
                    self.account_info().await;
                }
                SessionStatus::Connected
                | SessionStatus::Initializing
                | SessionStatus::QrReady => {}
                _ => return,
            }

            let Some(client) = client else {
                return;
            };

            tokio::time::sleep(self.timings.status_poll).await;

            match client.status().await {
                Ok(bridge_status) => {
                    let _guard = self.lifecycle.lock().await;
                    self.state.send_if_modified(|state| {
                        if state.generation != generation {
                            return false;
                        }
                        let before = (state.status, state.qr_code.clone());
                        state.apply_bridge_status(&bridge_status);
                        if before.0 != state.status {
                            tracing::info!(
                                bridge_status = %bridge_status.status,
                                status = %state.status,
                                "Session status changed"
                            );
                        }
                        before != (state.status, state.qr_code.clone())
                    });
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to poll session status");
                }
            }
        }
    }

    /// Close the client, reset, and recreate it after the restart delay.
    pub async fn restart(&self) {
        let generation = {
            let _guard = self.lifecycle.lock().await;
            let (generation, previous) = self.begin_transition(SessionStatus::Disconnected);
            Self::close_client(previous).await;
            generation
        };

        tracing::info!(
            delay_ms = self.timings.restart_delay.as_millis() as u64,
            "WhatsApp client restarting"
        );
        self.queue_after(
            self.timings.restart_delay,
            Command::Initialize {
                generation: Some(generation),
            },
        );
    }

    /// Close the client without recreating it.
    pub async fn disconnect(&self) -> SessionStatus {
        let _guard = self.lifecycle.lock().await;
        tracing::info!("Disconnecting WhatsApp client");
        let (_, previous) = self.begin_transition(SessionStatus::Disconnected);
        Self::close_client(previous).await;
        tracing::info!("WhatsApp client disconnected");
        SessionStatus::Disconnected
    }

    /// Close the client on process shutdown.
    pub async fn shutdown(&self) {
        let _guard = self.lifecycle.lock().await;
        let (_, previous) = self.begin_transition(SessionStatus::Disconnected);
        if previous.is_some() {
            tracing::info!("Closing WhatsApp client before shutdown");
        }
        Self::close_client(previous).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{fast_session_timings, FakeClientFactory, FakeMessagingClient};
    use wacheck_core::ErrorMetadata;

    const WAIT: Duration = Duration::from_secs(2);

    fn manager(client: &Arc<FakeMessagingClient>) -> (Arc<SessionManager>, Arc<FakeClientFactory>) {
        let factory = Arc::new(FakeClientFactory::new(Arc::clone(client)));
        let manager = SessionManager::new(factory.clone(), fast_session_timings());
        (manager, factory)
    }

    #[tokio::test]
    async fn test_not_connected_before_start() {
        let client = Arc::new(FakeMessagingClient::new());
        let (manager, _) = manager(&client);

        assert_eq!(manager.status(), SessionStatus::Disconnected);
        let err = manager.connected_client().unwrap_err();
        let app_err: AppError = err.into();
        assert_eq!(app_err.http_status_code(), 503);
        assert_eq!(app_err.session_status(), Some("disconnected"));
    }

    #[tokio::test]
    async fn test_qr_then_connected() {
        let client = Arc::new(FakeMessagingClient::new());
        client.push_start(Ok(BridgeStatus::new("QRCODE", Some("data:image/png;base64,QR".to_string()))));
        client.push_status(BridgeStatus::new("notLogged", None));
        client.push_status(BridgeStatus::new("isLogged", None));
        let (manager, _) = manager(&client);

        manager.start().await;
        assert!(manager.wait_for_status(SessionStatus::QrReady, WAIT).await);
        assert_eq!(manager.qr_code().as_deref(), Some("data:image/png;base64,QR"));

        assert!(manager.wait_for_status(SessionStatus::Connected, WAIT).await);
        assert!(manager.qr_code().is_none());
        assert!(manager.connected_client().is_ok());

        let info = manager.account_info().await.unwrap();
        assert_eq!(info.name, "Test Account");
        assert!(info.connected);
    }

    #[tokio::test]
    async fn test_failed_initialization_is_retried() {
        let client = Arc::new(FakeMessagingClient::new());
        client.push_start(Err(BridgeError::Timeout("navigation timeout".to_string())));
        let (manager, _) = manager(&client);

        manager.start().await;
        assert!(manager.wait_for_status(SessionStatus::Error, WAIT).await);
        assert!(manager.wait_for_status(SessionStatus::Connected, WAIT).await);
        assert_eq!(client.start_calls(), 2);
        assert!(manager.snapshot().last_error.is_none());
    }

    #[tokio::test]
    async fn test_permission_failure_is_not_retried() {
        let client = Arc::new(FakeMessagingClient::new());
        client.push_start(Err(BridgeError::Request(
            "EACCES: permission denied, mkdir '/tokens'".to_string(),
        )));
        let (manager, _) = manager(&client);

        manager.start().await;
        assert!(manager.wait_for_status(SessionStatus::Error, WAIT).await);
        tokio::time::sleep(Duration::from_millis(150)).await;

        let snapshot = manager.snapshot();
        assert_eq!(snapshot.status, SessionStatus::Error);
        assert_eq!(snapshot.failure, Some(FailureCategory::PermissionDenied));
        assert!(snapshot.last_error.unwrap().contains("EACCES"));
        assert_eq!(client.start_calls(), 1);
    }

    #[tokio::test]
    async fn test_factory_failure_moves_to_error() {
        let client = Arc::new(FakeMessagingClient::new());
        let (manager, factory) = manager(&client);
        factory.fail_next(BridgeError::Config("chrome not found".to_string()));

        manager.start().await;
        assert!(manager.wait_for_status(SessionStatus::Error, WAIT).await);
        assert_eq!(manager.snapshot().failure, Some(FailureCategory::Browser));
        // retried with a working factory
        assert!(manager.wait_for_status(SessionStatus::Connected, WAIT).await);
    }

    #[tokio::test]
    async fn test_disconnect_closes_client() {
        let client = Arc::new(FakeMessagingClient::new());
        let (manager, _) = manager(&client);
        manager.start().await;
        assert!(manager.wait_for_status(SessionStatus::Connected, WAIT).await);

        let status = manager.disconnect().await;
        assert_eq!(status, SessionStatus::Disconnected);
        assert_eq!(client.close_calls(), 1);
        assert!(manager.connected_client().is_err());

        // no automatic reconnect after an explicit disconnect
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(manager.status(), SessionStatus::Disconnected);
        assert_eq!(client.start_calls(), 1);
    }

    #[tokio::test]
    async fn test_restart_recreates_client() {
        let client = Arc::new(FakeMessagingClient::new());
        let (manager, factory) = manager(&client);
        manager.start().await;
        assert!(manager.wait_for_status(SessionStatus::Connected, WAIT).await);

        manager.restart().await;
        assert_eq!(manager.status(), SessionStatus::Disconnected);
        assert!(manager.wait_for_status(SessionStatus::Connected, WAIT).await);
        assert_eq!(client.close_calls(), 1);
        assert_eq!(factory.created(), 2);
    }

    #[tokio::test]
    async fn test_browser_close_reported_by_bridge() {
        let client = Arc::new(FakeMessagingClient::new());
        client.push_start(Ok(BridgeStatus::new("QRCODE", Some("qr".to_string()))));
        client.push_status(BridgeStatus::new("browserClose", None));
        let (manager, _) = manager(&client);

        manager.start().await;
        assert!(manager.wait_for_status(SessionStatus::Disconnected, WAIT).await);
        assert!(manager.connected_client().is_err());
    }

    #[tokio::test]
    async fn test_browser_close_after_pairing() {
        let client = Arc::new(FakeMessagingClient::new());
        let (manager, _) = manager(&client);

        manager.start().await;
        assert!(manager.wait_for_status(SessionStatus::Connected, WAIT).await);
        assert!(manager.account_info().await.is_some());

        client.push_status(BridgeStatus::new("browserClose", None));
        assert!(manager.wait_for_status(SessionStatus::Disconnected, WAIT).await);

        let err: AppError = manager.connected_client().unwrap_err().into();
        assert_eq!(err.http_status_code(), 503);
        assert!(manager.snapshot().account_info.is_none());
    }

    #[test]
    fn test_failure_classification() {
        let classify = |e: BridgeError| FailureCategory::classify(&e);
        assert_eq!(
            classify(BridgeError::Request("Failed to launch chrome!".to_string())),
            FailureCategory::Browser
        );
        assert_eq!(
            classify(BridgeError::Timeout("deadline".to_string())),
            FailureCategory::Timeout
        );
        assert_eq!(
            classify(BridgeError::ConnectionRefused("tcp".to_string())),
            FailureCategory::ConnectionRefused
        );
        assert_eq!(
            classify(BridgeError::Request("connect ECONNREFUSED 127.0.0.1:21465".to_string())),
            FailureCategory::ConnectionRefused
        );
        assert_eq!(
            classify(BridgeError::Request("EACCES".to_string())),
            FailureCategory::PermissionDenied
        );
        assert_eq!(
            classify(BridgeError::InvalidResponse("garbage".to_string())),
            FailureCategory::Other
        );
        assert!(!FailureCategory::PermissionDenied.is_retryable());
        assert!(FailureCategory::Timeout.is_retryable());
        assert!(FailureCategory::Other.hint().is_none());
    }
}
