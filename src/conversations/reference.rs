//! Resolution of "id or conversation" arguments.

use crate::conversations::errors::{RegistryError, RegistryResult};
use crate::conversations::ids::ConversationId;
use crate::conversations::types::Conversation;

/// Something that should name a conversation.
///
/// `add_message` accepts a raw id, a typed id, or a conversation value; a
/// missing reference is representable so callers holding an `Option` get a
/// proper `InvalidReference` instead of having to special-case it.
#[derive(Clone, Copy, Debug)]
pub enum ConversationRef<'a> {
    /// A raw identifier string.
    Raw(&'a str),
    /// A typed identifier.
    Id(&'a ConversationId),
    /// A conversation-shaped value.
    Conversation(&'a Conversation),
    /// Nothing was supplied.
    Missing,
}

impl ConversationRef<'_> {
    /// Resolve to a validated identifier.
    ///
    /// # Errors
    /// Returns `RegistryError::InvalidReference` when no identifier can be resolved.
    pub fn resolve(self) -> RegistryResult<ConversationId> {
        match self {
            Self::Raw(raw) => ConversationId::new(raw),
            Self::Id(id) => Ok(id.clone()),
            Self::Conversation(conversation) => Ok(conversation.id.clone()),
            Self::Missing => Err(RegistryError::InvalidReference(
                "no conversation supplied".to_string(),
            )),
        }
    }
}

impl<'a> From<&'a str> for ConversationRef<'a> {
    fn from(value: &'a str) -> Self {
        Self::Raw(value)
    }
}

impl<'a> From<&'a String> for ConversationRef<'a> {
    fn from(value: &'a String) -> Self {
        Self::Raw(value.as_str())
    }
}

impl<'a> From<&'a ConversationId> for ConversationRef<'a> {
    fn from(value: &'a ConversationId) -> Self {
        Self::Id(value)
    }
}

impl<'a> From<&'a Conversation> for ConversationRef<'a> {
    fn from(value: &'a Conversation) -> Self {
        Self::Conversation(value)
    }
}

impl<'a, T> From<Option<T>> for ConversationRef<'a>
where
    T: Into<ConversationRef<'a>>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Missing, Into::into)
    }
}
