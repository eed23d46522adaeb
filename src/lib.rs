pub mod backend;
pub mod intake;
pub mod integration;
pub mod messages;
pub mod session;
pub mod source;
pub mod speech;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum DocvoxError {
    #[error("Question must not be empty")]
    EmptyQuestion,

    #[error("Cancelled")]
    Cancelled,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Speech error: {0}")]
    Speech(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for DocvoxError {
    fn from(e: reqwest::Error) -> Self {
        DocvoxError::Transport(e.to_string())
    }
}

impl DocvoxError {
    /// True for the cooperative cancellation signal, which is not a
    /// user-facing failure.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, DocvoxError::Cancelled)
    }

    /// Get a user-friendly description
    pub fn user_message(&self) -> String {
        match self {
            DocvoxError::EmptyQuestion => "Please enter a question.".to_string(),
            DocvoxError::Cancelled => "Request was cancelled.".to_string(),
            DocvoxError::Transport(_) => {
                "Failed to get response from vector collection".to_string()
            }
            DocvoxError::Provider(_) => "Failed to get response from AI".to_string(),
            DocvoxError::Speech(_) => {
                "Text-to-speech failed. Response will be shown as text.".to_string()
            }
            DocvoxError::Persistence(_) => "Failed to save the conversation.".to_string(),
            DocvoxError::Config(_) => "Configuration error. Please check settings.".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DocvoxError>;
