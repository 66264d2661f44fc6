//! Scripted completion client for testing and offline use.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::CompletionClient;

/// One scripted answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedReply {
    /// Return this text as the first choice.
    Text(String),
    /// Fail as an upstream error with this detail.
    Upstream(String),
    /// Fail as a response without choices.
    Empty,
}

impl ScriptedReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Serialize `value` as the reply text.
    pub fn json(value: &serde_json::Value) -> Self {
        Self::Text(value.to_string())
    }
}

/// A request the client received, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub system_prompt: String,
    pub user_prompt: String,
}

/// Completion client that replays a queue of replies.
///
/// Replies are consumed first in, first out. Running out of replies is an
/// upstream failure so an unexpected extra call shows up in tests.
#[derive(Clone, Default)]
pub struct ScriptedCompletionClient {
    replies: Arc<Mutex<VecDeque<ScriptedReply>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    delay: Option<Duration>,
}

impl ScriptedCompletionClient {
    pub fn new(replies: impl IntoIterator<Item = ScriptedReply>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(replies.into_iter().collect())),
            requests: Arc::new(Mutex::new(Vec::new())),
            delay: None,
        }
    }

    /// Convenience for a script of JSON replies.
    pub fn with_json(replies: impl IntoIterator<Item = serde_json::Value>) -> Self {
        Self::new(replies.into_iter().map(|v| ScriptedReply::json(&v)))
    }

    /// Wait this long before answering each call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub async fn push(&self, reply: ScriptedReply) {
        self.replies.lock().await.push_back(reply);
    }

    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn remaining(&self) -> usize {
        self.replies.lock().await.len()
    }
}

#[async_trait]
impl CompletionClient for ScriptedCompletionClient {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> DomainResult<String> {
        self.requests.lock().await.push(RecordedRequest {
            system_prompt: system_prompt.to_string(),
            user_prompt: user_prompt.to_string(),
        });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let reply = self.replies.lock().await.pop_front();
        match reply {
            Some(ScriptedReply::Text(text)) => Ok(text),
            Some(ScriptedReply::Upstream(detail)) => Err(DomainError::Upstream(detail)),
            Some(ScriptedReply::Empty) => Err(DomainError::EmptyResponse),
            None => Err(DomainError::Upstream("no scripted reply left".to_string())),
        }
    }
}
