//! Two-pass intent classification over the completion service.
//!
//! The router pass picks an [`IntentKind`]; intents that carry fields get a
//! second, intent-specific pass whose envelope is validated into an
//! [`Intent`]. Replies are parsed strictly and never retried.

use std::sync::Arc;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Intent, IntentEnvelope, IntentKind};
use crate::domain::ports::CompletionClient;
use crate::services::prompts;

pub struct IntentClassifier<L: CompletionClient> {
    client: Arc<L>,
}

impl<L: CompletionClient> IntentClassifier<L> {
    pub fn new(client: Arc<L>) -> Self {
        Self { client }
    }

    /// Classify `prompt` into a fully validated intent.
    pub async fn classify(&self, prompt: &str) -> DomainResult<Intent> {
        let kind = self.route(prompt).await?;
        if !kind.needs_details() {
            return Intent::from_envelope(&kind, IntentEnvelope::default());
        }
        self.detail(&kind, prompt).await
    }

    /// Router pass. Unrecognized discriminators come back as
    /// [`IntentKind::Unknown`].
    pub async fn route(&self, prompt: &str) -> DomainResult<IntentKind> {
        let reply = self.client.complete(prompts::ROUTER, prompt).await?;
        let envelope = IntentEnvelope::parse(&reply)?;
        let kind = IntentKind::from_discriminator(envelope.discriminator()?);

        if let IntentKind::Unknown(raw) = &kind {
            tracing::warn!(discriminator = %raw, "router returned an unknown intent");
        } else {
            tracing::debug!(intent = kind.as_str(), "prompt routed");
        }
        Ok(kind)
    }

    /// Intent-specific pass for a kind that [needs details](IntentKind::needs_details).
    pub async fn detail(&self, kind: &IntentKind, prompt: &str) -> DomainResult<Intent> {
        let (template, user_prompt) = match kind {
            IntentKind::Summarize => (prompts::SUMMARIZE_DETAIL, prompt.to_string()),
            IntentKind::CreateTask => (prompts::CREATE_TASK, format!("{}{prompt}", prompts::CREATE_TASK_LEAD)),
            IntentKind::CreateProject => (prompts::CREATE_PROJECT, prompt.to_string()),
            IntentKind::Complete => (prompts::COMPLETE, prompt.to_string()),
            IntentKind::Update => (prompts::UPDATE, prompt.to_string()),
            IntentKind::List => (prompts::LIST, prompt.to_string()),
            IntentKind::Chat | IntentKind::Unknown(_) => {
                return Intent::from_envelope(kind, IntentEnvelope::default());
            }
        };

        let reply = self.client.complete(template, &user_prompt).await?;
        let mut envelope = IntentEnvelope::parse(&reply)?;
        if envelope.user_prompt.trim().is_empty() {
            envelope.user_prompt = prompt.to_string();
        }
        let intent = Intent::from_envelope(kind, envelope)?;

        tracing::debug!(intent = intent.kind_name(), "prompt classified");
        Ok(intent)
    }

    /// Conversational answer.
    pub async fn chat(&self, prompt: &str) -> DomainResult<String> {
        self.client.complete(prompts::CHAT, prompt).await
    }

    /// Free-form summary with suggested improvements.
    pub async fn summarize(&self, context: &str) -> DomainResult<String> {
        let user_prompt = format!("{}{context}", prompts::SUMMARIZE_LEAD);
        self.client.complete(prompts::SUMMARIZER, &user_prompt).await
    }
}
