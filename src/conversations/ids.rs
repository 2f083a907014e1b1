//! Identifier types for the conversation registry.
//!
//! Conversation ids are strings rather than bare UUIDs: the registry generates
//! its own ids, but callers may also append to ids minted elsewhere (a chat
//! screen, a match record), which then become placeholder conversations.

use core::fmt;
use core::str::FromStr;
use std::borrow::Borrow;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::conversations::errors::{RegistryError, RegistryResult};

/// Identifier of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ConversationId(String);

impl ConversationId {
    /// Build a `ConversationId` from a caller-supplied reference.
    ///
    /// The id is opaque: it is stored exactly as given, so `" court "` and
    /// `"court"` name different conversations. Only blank input is refused.
    ///
    /// # Errors
    /// Returns `RegistryError::InvalidReference` if the input is empty or blank.
    pub fn new(raw: impl AsRef<str>) -> RegistryResult<Self> {
        let s = raw.as_ref();

        if s.trim().is_empty() {
            return Err(RegistryError::InvalidReference(
                "conversation id must not be empty".to_string(),
            ));
        }

        Ok(Self(s.to_owned()))
    }

    /// Generate a fresh identifier with the given prefix.
    ///
    /// Uses `UUIDv7`: a millisecond timestamp followed by random bits, so ids
    /// sort roughly by creation time and stay collision-free under rapid calls.
    #[must_use]
    pub fn generate(prefix: &str) -> Self {
        Self(format!("{prefix}{}", Uuid::now_v7().simple()))
    }

    /// Borrow as `&str`.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into `String`.
    #[inline]
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConversationId {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for ConversationId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Borrow<str> for ConversationId {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl From<ConversationId> for String {
    fn from(value: ConversationId) -> Self {
        value.into_string()
    }
}

impl TryFrom<String> for ConversationId {
    type Error = RegistryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Identifier of a single subscriber registration.
///
/// Two registrations of the same callback get distinct ids, so each
/// `Subscription` handle removes exactly the registration it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct SubscriberId(pub Uuid);

impl Default for SubscriberId {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl SubscriberId {
    /// Create a new random identifier.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Borrow the underlying UUID.
    #[inline]
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_conversation_id_keeps_input_verbatim() {
        let padded = ConversationId::new("  match-42  ");
        assert_eq!(
            padded.map(ConversationId::into_string),
            Ok("  match-42  ".to_string())
        );
        assert_ne!(ConversationId::new(" court "), ConversationId::new("court"));
    }

    #[test]
    fn test_conversation_id_rejects_blank() {
        assert!(matches!(
            ConversationId::new("   "),
            Err(RegistryError::InvalidReference(_))
        ));
        assert!(matches!(
            ConversationId::new(""),
            Err(RegistryError::InvalidReference(_))
        ));
    }

    #[test]
    fn test_conversation_id_accepts_long_and_non_ascii() {
        let long = format!("match-{}", "x".repeat(300));
        assert_eq!(
            ConversationId::new(&long).map(ConversationId::into_string),
            Ok(long)
        );

        let accented = ConversationId::new("équipe-mixte-été");
        assert!(accented.is_ok_and(|id| id.as_str() == "équipe-mixte-été"));
    }

    #[test]
    fn test_generated_ids_are_prefixed_and_unique() {
        let ids: HashSet<ConversationId> =
            (0..1_000).map(|_| ConversationId::generate("conv_")).collect();
        assert_eq!(ids.len(), 1_000);
        assert!(ids.iter().all(|id| id.as_str().starts_with("conv_")));
    }

    #[test]
    fn test_conversation_id_serde_validates() {
        let parsed: Result<ConversationId, _> = serde_json::from_str("\"court-7\"");
        assert_eq!(parsed.ok().map(ConversationId::into_string), Some("court-7".to_string()));

        let blank: Result<ConversationId, _> = serde_json::from_str("\"\"");
        assert!(blank.is_err());
    }
}
