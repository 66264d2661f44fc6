use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Scrubs credentials from free text before it is persisted.
///
/// Prompts are user-authored and replies echo them, so both can carry keys
/// or passwords that must never reach the audit file.
#[derive(Clone)]
pub struct SecretScrubber {
    api_key_pattern: Regex,
    token_pattern: Regex,
    bearer_pattern: Regex,
    password_pattern: Regex,
}

impl SecretScrubber {
    /// Create a new secret scrubber
    pub fn new() -> Self {
        Self {
            // Provider keys: sk-..., sk-ant-..., gsk_...
            api_key_pattern: Regex::new(r"\b(?:sk-ant-|sk-|gsk_)[a-zA-Z0-9\-_]{16,}").unwrap(),
            token_pattern: Regex::new(
                r#"["']?(?:api_key|apikey|token|secret)["']?\s*([:=])\s*["']?[a-zA-Z0-9\-_\.]{16,}["']?"#,
            )
            .unwrap(),
            bearer_pattern: Regex::new(r"Bearer\s+[a-zA-Z0-9\-_\.]+").unwrap(),
            password_pattern: Regex::new(r#"["']?password["']?\s*[:=]\s*["']?[^"'\s,}]+["']?"#).unwrap(),
        }
    }

    /// Shared instance; the patterns never change.
    pub fn global() -> &'static Self {
        static SCRUBBER: OnceLock<SecretScrubber> = OnceLock::new();
        SCRUBBER.get_or_init(Self::new)
    }

    /// Scrub a message of sensitive data
    pub fn scrub_message(&self, message: &str) -> String {
        let scrubbed = self.bearer_pattern.replace_all(message, "Bearer [TOKEN_REDACTED]");
        let scrubbed = self.token_pattern.replace_all(&scrubbed, |caps: &regex::Captures| {
            let full_match = &caps[0];
            let separator = &caps[1];
            match full_match.find(separator) {
                Some(pos) => format!("{}{separator}[REDACTED]", &full_match[..pos]),
                None => "[REDACTED]".to_string(),
            }
        });
        let scrubbed = self.api_key_pattern.replace_all(&scrubbed, "[API_KEY_REDACTED]");
        self.password_pattern
            .replace_all(&scrubbed, "password=[REDACTED]")
            .into_owned()
    }
}

impl Default for SecretScrubber {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SecretScrubber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretScrubber").finish()
    }
}
