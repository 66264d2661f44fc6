//! OpenAI-compatible chat-completions adapter.
//!
//! Sends one system message and one user message to
//! `{base_url}/chat/completions` and returns the first choice's content.
//! Compatible with Groq, OpenAI and local servers speaking the same API.

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::CompletionConfig;
use crate::domain::ports::{render_system_prompt, CompletionClient};
use crate::infrastructure::logging::AuditLogger;

/// Environment variable consulted when no key is configured.
pub const API_KEY_ENV: &str = "GROQ_API_KEY";

/// Chat-completions client.
pub struct OpenAiCompatClient {
    config: CompletionConfig,
    client: reqwest::Client,
    audit: Option<AuditLogger>,
}

impl OpenAiCompatClient {
    /// Build a client. A missing API key is only reported when a call is made.
    pub fn new(config: CompletionConfig) -> DomainResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DomainError::Upstream(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            config,
            client,
            audit: None,
        })
    }

    /// Record every exchange in the audit trail.
    pub fn with_audit(mut self, audit: AuditLogger) -> Self {
        self.audit = Some(audit);
        self
    }

    fn api_key(&self) -> DomainResult<String> {
        self.config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var(API_KEY_ENV).ok().filter(|k| !k.trim().is_empty()))
            .ok_or_else(|| {
                DomainError::Upstream(format!(
                    "Completion API key not set. Set {API_KEY_ENV} or configure completion.api_key."
                ))
            })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    async fn audit_exchange(&self, user_prompt: &str, reply: &str) {
        if let Some(audit) = &self.audit {
            if let Err(e) = audit.log_completion(&self.config.model, user_prompt, reply).await {
                tracing::warn!(error = %e, "failed to write completion audit event");
            }
        }
    }
}

#[async_trait]
impl CompletionClient for OpenAiCompatClient {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> DomainResult<String> {
        let api_key = self.api_key()?;
        let system = render_system_prompt(system_prompt, Utc::now().date_naive());

        let request_body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &system,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
        };

        tracing::debug!(model = %self.config.model, prompt_chars = user_prompt.len(), "sending completion request");

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| DomainError::Upstream(format!("Completion request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read response body".to_string());
            tracing::warn!(status = %status, "completion service returned an error status");
            return Err(DomainError::Upstream(format!(
                "Completion API returned {status}: {body}"
            )));
        }

        let result: ChatResponse = response
            .json()
            .await
            .map_err(|e| DomainError::Upstream(format!("Failed to parse completion response: {e}")))?;

        let reply = result
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.unwrap_or_default())
            .ok_or(DomainError::EmptyResponse)?;

        self.audit_exchange(user_prompt, &reply).await;
        Ok(reply)
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn config_for(server: &mockito::ServerGuard) -> CompletionConfig {
        CompletionConfig {
            base_url: server.url(),
            model: "test-model".to_string(),
            api_key: Some("test-key".to_string()),
            timeout_secs: 5,
        }
    }

    #[tokio::test]
    async fn test_complete_returns_first_choice() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .match_body(Matcher::AllOf(vec![
                Matcher::PartialJson(serde_json::json!({"model": "test-model"})),
                Matcher::Regex(r#"\{"role":"system","content":"You are helpful\."#.to_string()),
                Matcher::Regex(r#"\{"role":"user","content":"hello"\}"#.to_string()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"first"}},{"message":{"content":"second"}}]}"#)
            .create_async()
            .await;

        let client = OpenAiCompatClient::new(config_for(&server)).unwrap();
        let reply = client.complete("You are helpful.", "hello").await.unwrap();

        assert_eq!(reply, "first");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_system_prompt_carries_todays_date() {
        let mut server = mockito::Server::new_async().await;
        let today = Utc::now().date_naive().format("%Y-%m-%d").to_string();
        let mock = server
            .mock("POST", "/chat/completions")
            .match_body(Matcher::Regex(format!("Today is {today}")))
            .with_status(200)
            .with_body(r#"{"choices":[{"message":{"content":"ok"}}]}"#)
            .create_async()
            .await;

        let client = OpenAiCompatClient::new(config_for(&server)).unwrap();
        client.complete("Today is {today}.", "hi").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_status_is_upstream() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body(r#"{"error":"invalid api key"}"#)
            .create_async()
            .await;

        let client = OpenAiCompatClient::new(config_for(&server)).unwrap();
        let err = client.complete("sys", "hi").await.unwrap_err();

        assert!(matches!(err, DomainError::Upstream(ref msg) if msg.contains("401")));
        assert_eq!(err.public_message(), "the assistant is temporarily unavailable");
    }

    #[tokio::test]
    async fn test_zero_choices_is_empty_response() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[]}"#)
            .create_async()
            .await;

        let client = OpenAiCompatClient::new(config_for(&server)).unwrap();
        let err = client.complete("sys", "hi").await.unwrap_err();
        assert!(matches!(err, DomainError::EmptyResponse));
    }

    #[test]
    fn test_api_key_falls_back_to_env() {
        let server_config = CompletionConfig {
            api_key: None,
            ..CompletionConfig::default()
        };
        let client = OpenAiCompatClient::new(server_config).unwrap();

        let key = temp_env::with_var(API_KEY_ENV, Some("gsk_from_env"), || client.api_key());
        assert_eq!(key.unwrap(), "gsk_from_env");

        let missing = temp_env::with_var_unset(API_KEY_ENV, || client.api_key());
        assert!(matches!(missing, Err(DomainError::Upstream(ref msg)) if msg.contains(API_KEY_ENV)));
    }

    #[test]
    fn test_configured_key_wins_over_env() {
        let client = OpenAiCompatClient::new(CompletionConfig {
            api_key: Some("configured".to_string()),
            ..CompletionConfig::default()
        })
        .unwrap();

        let key = temp_env::with_var(API_KEY_ENV, Some("from-env"), || client.api_key());
        assert_eq!(key.unwrap(), "configured");
    }

    #[tokio::test]
    async fn test_exchange_is_audited() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[{"message":{"content":"{\"intent\":\"chat\"}"}}]}"#)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let audit_path = dir.path().join("audit.jsonl");
        let audit = AuditLogger::new(&audit_path).await.unwrap();

        let client = OpenAiCompatClient::new(config_for(&server)).unwrap().with_audit(audit);
        client.complete("sys", "what's up").await.unwrap();

        let contents = std::fs::read_to_string(&audit_path).unwrap();
        assert_eq!(contents.lines().count(), 1);
        assert!(contents.contains("what's up"));
        assert!(contents.contains("completion_exchange"));
    }
}
