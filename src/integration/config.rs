//! Configuration for assembling the assistant.

use crate::source::DEFAULT_CHAR_DELAY;
use std::time::Duration;

/// Configuration for the complete assistant.
#[derive(Clone, Debug)]
pub struct AssistantConfig {
    /// Base URL of the retrieval/chunking backend.
    pub backend_url: String,

    /// Delay between characters of a simulated-stream answer.
    pub char_delay: Duration,

    /// Gemini API key for the generative source. Leave empty to run
    /// retrieval-only.
    pub gemini_api_key: String,

    /// User id recorded on persisted conversations.
    pub user_id: String,

    /// Whether completed sentences are narrated aloud.
    pub enable_speech: bool,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:8001".to_string(),
            char_delay: DEFAULT_CHAR_DELAY,
            gemini_api_key: String::new(),
            user_id: "local".to_string(),
            enable_speech: true,
        }
    }
}

impl AssistantConfig {
    /// Build a configuration from the environment, falling back to the
    /// defaults for anything unset.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("DOCVOX_BACKEND_URL") {
            config.backend_url = url;
        }
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            config.gemini_api_key = key;
        }
        if let Ok(user) = std::env::var("DOCVOX_USER_ID") {
            config.user_id = user;
        }
        config
    }

    pub fn with_backend_url(mut self, url: impl Into<String>) -> Self {
        self.backend_url = url.into();
        self
    }

    pub fn with_char_delay(mut self, delay: Duration) -> Self {
        self.char_delay = delay;
        self
    }

    pub fn with_gemini_api_key(mut self, key: impl Into<String>) -> Self {
        self.gemini_api_key = key.into();
        self
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    /// Disable narration (text-only mode).
    pub fn without_speech(mut self) -> Self {
        self.enable_speech = false;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.backend_url.is_empty() {
            return Err("Backend URL is required".to_string());
        }
        if self.user_id.is_empty() {
            return Err("User id is required".to_string());
        }
        Ok(())
    }
}
