//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber:
//! - JSON or pretty formatting with env-filter overrides
//! - Optional daily-rotated file output
//! - Secret scrubbing for anything written to the audit trail
//! - Audit trail of completion exchanges and mutating commands

pub mod audit;
pub mod logger;
pub mod secret_scrubbing;

pub use audit::{AuditEvent, AuditEventType, AuditLogger, AuditOutcome};
pub use logger::LoggerImpl;
pub use secret_scrubbing::SecretScrubber;
