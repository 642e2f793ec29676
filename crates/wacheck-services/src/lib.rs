//! wacheck Services Layer
//!
//! Orchestration on top of the messaging bridge: the session manager owns
//! the single client instance and its lifecycle, the check service runs the
//! registration heuristic and metadata enrichment. Thin HTTP handling lives
//! in wacheck-api.

pub mod check;
pub mod session;

#[cfg(any(test, feature = "test-fixtures"))]
pub mod test_helpers;

pub use check::{CheckService, CheckTimings, RegistrationSignal};
pub use session::{FailureCategory, SessionError, SessionManager, SessionSnapshot, SessionTimings};
