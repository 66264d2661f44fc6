//! Infrastructure layer module
//!
//! Cross-cutting concerns shared by the binary and the adapters:
//! - Configuration management (figment)
//! - Logging and the audit trail (tracing)

pub mod config;
pub mod logging;
