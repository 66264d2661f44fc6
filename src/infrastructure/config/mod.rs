//! Configuration management infrastructure
//!
//! Hierarchical configuration using figment:
//! - Serialized defaults
//! - `.taskpilot/config.yaml` and `.taskpilot/local.yaml`
//! - `TASKPILOT_*` environment overrides
//! - Validation after extraction

pub mod loader;

pub use loader::{ConfigError, ConfigLoader};
