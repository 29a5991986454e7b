//! Generative backend abstraction
//!
//! The gateway talks to the model service only through [`ModelBackend`]. A
//! backend accepts a text prompt with optional binary attachments, an
//! optional response schema, an optional system instruction and prior turns,
//! and returns the raw reply text. Structure is checked by the decoder, not
//! here.

pub mod gemini;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::ModelTuning;
use crate::thread::HistoryEntry;
use crate::types::Attachment;

pub use gemini::GeminiBackend;

/// Error types for transport-level failures
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Authentication rejected ({0})")]
    Unauthorized(u16),

    #[error("API error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("No API key configured")]
    MissingApiKey,

    #[error("Unreadable response body: {0}")]
    InvalidBody(String),
}

impl TransportError {
    /// Whether a fresh attempt could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::Http(_) => true,
            TransportError::Status { status, .. } => *status == 429 || *status >= 500,
            TransportError::InvalidBody(_) => true,
            TransportError::Unauthorized(_) | TransportError::MissingApiKey => false,
        }
    }
}

/// One request to the model service
#[derive(Debug, Clone, Default)]
pub struct ModelRequest {
    pub model: String,
    /// Text of the new user message
    pub prompt: String,
    /// Binary parts sent ahead of the prompt
    pub attachments: Vec<Attachment>,
    /// Structured-output schema; `None` asks for free text
    pub response_schema: Option<Value>,
    pub system_instruction: Option<String>,
    /// Prior turns; non-empty makes this a multi-turn request
    pub history: Vec<HistoryEntry>,
    pub tuning: ModelTuning,
}

impl ModelRequest {
    pub fn is_multi_turn(&self) -> bool {
        !self.history.is_empty()
    }
}

/// The external model service
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Short identifier for logs
    fn name(&self) -> &'static str;

    /// Issue a single request and return the reply text (possibly empty)
    async fn invoke(&self, request: ModelRequest) -> Result<String, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_retry_classification() {
        let status = |status| TransportError::Status {
            status,
            body: String::new(),
        };
        assert!(status(503).is_retryable());
        assert!(status(429).is_retryable());
        assert!(!status(400).is_retryable());
        assert!(!TransportError::Unauthorized(401).is_retryable());
        assert!(!TransportError::MissingApiKey.is_retryable());
    }
}
