//! Data models for the application
//!
//! Request-scoped and process-scoped shapes shared by the services, the HTTP
//! API and the command-line client. Everything serializes in camelCase.

mod carrier;
mod check;
mod file;
mod session;

pub use carrier::*;
pub use check::*;
pub use file::*;
pub use session::*;
