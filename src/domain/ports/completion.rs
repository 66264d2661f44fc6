//! Completion service port.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::errors::DomainResult;

/// Placeholder replaced by the current date in system prompts.
pub const TODAY_PLACEHOLDER: &str = "{today}";

/// A chat-completions backend: one system prompt, one user prompt, raw text back.
///
/// Implementations perform no retries and do not interpret the reply.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send one exchange and return the first choice's content.
    ///
    /// # Errors
    /// - `Upstream` for transport failures and non-success statuses
    /// - `EmptyResponse` when the service returns no choices
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> DomainResult<String>;
}

/// Inject `today` into a system prompt template.
///
/// Every `{today}` placeholder is replaced. Templates without one get the
/// date appended on a final line so relative dates can still be resolved.
pub fn render_system_prompt(template: &str, today: NaiveDate) -> String {
    let date = today.format("%Y-%m-%d").to_string();
    if template.contains(TODAY_PLACEHOLDER) {
        template.replace(TODAY_PLACEHOLDER, &date)
    } else {
        format!("{}\n\nToday's date is {date}.", template.trim_end())
    }
}
