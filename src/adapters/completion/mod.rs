//! Completion service adapters.
//!
//! - `OpenAiCompatClient`: any OpenAI-compatible `/chat/completions` endpoint
//!   (Groq by default)
//! - `ScriptedCompletionClient`: in-process replies for tests and offline use

pub mod mock;
pub mod openai_compat;

pub use mock::{RecordedRequest, ScriptedCompletionClient, ScriptedReply};
pub use openai_compat::OpenAiCompatClient;
