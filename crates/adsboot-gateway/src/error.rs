//! Error taxonomy for gateway calls

use std::time::Duration;

use thiserror::Error;

use crate::backend::TransportError;
use crate::schema::FieldType;

/// Caller input rejected before any network activity
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Attachment is empty")]
    EmptyAttachment,

    #[error("Attachment too large: {size} bytes (max {limit} bytes)")]
    AttachmentTooLarge { size: u64, limit: u64 },

    #[error("Unsupported media type '{0}': expected an image or video")]
    UnsupportedMediaType(String),
}

/// The service answered but the payload does not satisfy the contract
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("malformed payload: {0}")]
    Malformed(String),

    #[error("missing field {field}{}", item_suffix(.index))]
    MissingField {
        field: &'static str,
        index: Option<usize>,
    },

    #[error("invalid field {field}{}: expected {}", item_suffix(.index), .expected.describe())]
    InvalidField {
        field: &'static str,
        expected: FieldType,
        index: Option<usize>,
    },
}

fn item_suffix(index: &Option<usize>) -> String {
    index
        .map(|i| format!(" in item {}", i))
        .unwrap_or_default()
}

/// Every way a gateway call can fail
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("No active session")]
    NoSession,

    #[error("Request timed out after {0:?}")]
    TimedOut(Duration),

    #[error("Request cancelled")]
    Cancelled,
}

impl GatewayError {
    /// The service did not answer; re-invoking may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            GatewayError::Transport(err) => err.is_retryable(),
            GatewayError::TimedOut(_) => true,
            _ => false,
        }
    }

    /// The service answered, but unusably
    pub fn is_decode(&self) -> bool {
        matches!(self, GatewayError::Decode(_))
    }
}
