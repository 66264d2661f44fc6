//! Adapters for external systems.
//!
//! - `sqlite`: repository implementations over a sqlx pool
//! - `completion`: chat-completions clients

pub mod completion;
pub mod sqlite;
