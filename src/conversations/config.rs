//! Configuration for the conversation registry.

use serde::{Deserialize, Serialize};

use crate::conversations::errors::{RegistryError, RegistryResult};

/// Environment variable selecting the unknown-conversation policy.
pub const ENV_UNKNOWN_CONVERSATION: &str = "COURTSIDE_UNKNOWN_CONVERSATION";

/// Environment variable overriding the generated id prefix.
pub const ENV_ID_PREFIX: &str = "COURTSIDE_ID_PREFIX";

/// What `add_message` does with an id the registry has never seen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownConversationPolicy {
    /// Create a placeholder conversation and append to it.
    #[default]
    Materialize,
    /// Fail with `RegistryError::NotFound`.
    Reject,
}

impl UnknownConversationPolicy {
    /// Stable string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Materialize => "materialize",
            Self::Reject => "reject",
        }
    }

    /// Parse from the string form (case-insensitive).
    ///
    /// # Errors
    /// Returns `RegistryError::InvalidConfig` for unknown values.
    pub fn parse(raw: &str) -> RegistryResult<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "materialize" => Ok(Self::Materialize),
            "reject" => Ok(Self::Reject),
            other => Err(RegistryError::InvalidConfig(format!(
                "unknown conversation policy: {other}"
            ))),
        }
    }
}

/// Configuration for the conversation registry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Behaviour of `add_message` on an unknown conversation id.
    pub unknown_conversation: UnknownConversationPolicy,
    /// Prefix of generated conversation ids.
    pub id_prefix: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            unknown_conversation: UnknownConversationPolicy::Materialize,
            id_prefix: "conv_".to_string(),
        }
    }
}

impl RegistryConfig {
    /// Create a new config with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the unknown-conversation policy.
    #[must_use]
    pub const fn with_unknown_conversation(mut self, policy: UnknownConversationPolicy) -> Self {
        self.unknown_conversation = policy;
        self
    }

    /// Set the generated id prefix.
    #[must_use]
    pub fn with_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.id_prefix = prefix.into();
        self
    }

    /// Load from the process environment, falling back to defaults.
    ///
    /// # Errors
    /// Returns an error if a variable is set to an invalid value.
    pub fn from_env() -> RegistryResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup.
    ///
    /// # Errors
    /// Returns an error if a variable is set to an invalid value.
    pub fn from_lookup<F>(lookup: F) -> RegistryResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_UNKNOWN_CONVERSATION) {
            config.unknown_conversation = UnknownConversationPolicy::parse(&raw)?;
        }
        if let Some(prefix) = lookup(ENV_ID_PREFIX) {
            config.id_prefix = prefix;
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse from a JSON document. Missing keys take their default.
    ///
    /// # Errors
    /// Returns an error if the document is malformed or fails validation.
    pub fn from_json(raw: &str) -> RegistryResult<Self> {
        let config: Self = serde_json::from_str(raw)
            .map_err(|e| RegistryError::InvalidConfig(format!("malformed config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if any values are out of range or invalid.
    pub fn validate(&self) -> RegistryResult<()> {
        if self.id_prefix.is_empty() {
            return Err(RegistryError::InvalidConfig(
                "id_prefix must not be empty".to_string(),
            ));
        }

        if let Some(ch) = self
            .id_prefix
            .chars()
            .find(|ch| !(ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-')))
        {
            return Err(RegistryError::InvalidConfig(format!(
                "id_prefix contains invalid character {ch:?}"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RegistryConfig::default();
        assert_eq!(
            config.unknown_conversation,
            UnknownConversationPolicy::Materialize
        );
        assert_eq!(config.id_prefix, "conv_");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = RegistryConfig::new()
            .with_unknown_conversation(UnknownConversationPolicy::Reject)
            .with_id_prefix("chat-");

        assert_eq!(config.unknown_conversation, UnknownConversationPolicy::Reject);
        assert_eq!(config.id_prefix, "chat-");
    }

    #[test]
    fn test_from_lookup() {
        let config = RegistryConfig::from_lookup(|key| match key {
            ENV_UNKNOWN_CONVERSATION => Some("Reject".to_string()),
            ENV_ID_PREFIX => Some("match_".to_string()),
            _ => None,
        });
        assert_eq!(
            config,
            Ok(RegistryConfig::new()
                .with_unknown_conversation(UnknownConversationPolicy::Reject)
                .with_id_prefix("match_"))
        );

        let bad = RegistryConfig::from_lookup(|key| {
            (key == ENV_UNKNOWN_CONVERSATION).then(|| "sometimes".to_string())
        });
        assert!(matches!(bad, Err(RegistryError::InvalidConfig(_))));
    }

    #[test]
    fn test_from_json() {
        let config = RegistryConfig::from_json(r#"{"unknown_conversation":"reject"}"#);
        assert_eq!(
            config.map(|c| c.unknown_conversation),
            Ok(UnknownConversationPolicy::Reject)
        );

        assert!(RegistryConfig::from_json(r#"{"id_prefix":"bad prefix"}"#).is_err());
        assert!(RegistryConfig::from_json("not json").is_err());
    }

    #[test]
    fn test_policy_round_trip() {
        for policy in [
            UnknownConversationPolicy::Materialize,
            UnknownConversationPolicy::Reject,
        ] {
            assert_eq!(UnknownConversationPolicy::parse(policy.as_str()), Ok(policy));
        }
    }
}
