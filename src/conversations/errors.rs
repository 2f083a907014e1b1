//! Error types for the conversation registry.

use thiserror::Error;

/// Conversation registry error type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A required conversation identifier was missing, empty, or malformed.
    #[error("invalid conversation reference: {0}")]
    InvalidReference(String),
    /// The conversation does not exist and the registry refuses to materialize it.
    #[error("conversation not found: {0}")]
    NotFound(String),
    /// Invalid configuration or unsupported values.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Convenience result alias for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Failure reported by a subscriber callback.
///
/// Never surfaced to the caller of `add_message` or `subscribe`; the registry
/// logs it and keeps delivering to the remaining subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("subscriber callback failed: {0}")]
pub struct SubscriberError(pub String);

impl SubscriberError {
    /// Build an error from any displayable reason.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}
