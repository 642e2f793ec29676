//! wacheck Core Library
//!
//! This crate provides the domain models, error types, configuration and the
//! pure number tooling (validation, carrier lookup, list parsing, export and
//! file tools) shared across all wacheck components.

pub mod carrier;
pub mod config;
pub mod error;
pub mod export;
pub mod file_tools;
pub mod list_parser;
pub mod models;
pub mod phone;
pub mod prefix_tables;
pub mod results;

// Re-export commonly used types
pub use carrier::CarrierLookup;
pub use config::{BridgeConfig, Config, ServerConfig, TimingConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use list_parser::{parse_list, ListParseError};
pub use phone::{NumberParser, NumberValidator, PhoneNumber, ValidationError, ValidationResult};
pub use results::{ResultFilter, ResultStats};
