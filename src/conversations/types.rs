//! Conversation and message types held by the registry.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::conversations::ids::ConversationId;

/// Opaque key/value record attached to conversations and carried by messages.
pub type Metadata = serde_json::Map<String, Value>;

/// Field name holding the message timestamp.
pub const TIMESTAMP_FIELD: &str = "timestamp";

/// Timestamp carried by a message.
///
/// RFC 3339 strings and integer epoch milliseconds are read as points in
/// time; any other caller value is kept as supplied.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum MessageTimestamp {
    /// A point in time.
    At(DateTime<Utc>),
    /// A caller value that is not a recognisable time.
    Raw(Value),
}

impl MessageTimestamp {
    /// The point in time, when the value is one.
    #[must_use]
    pub const fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::At(ts) => Some(*ts),
            Self::Raw(_) => None,
        }
    }
}

impl From<DateTime<Utc>> for MessageTimestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self::At(value)
    }
}

impl From<Value> for MessageTimestamp {
    fn from(value: Value) -> Self {
        let parsed = match &value {
            Value::String(s) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|ts| ts.with_timezone(&Utc)),
            Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
            _ => None,
        };
        parsed.map_or(Self::Raw(value), Self::At)
    }
}

impl From<MessageTimestamp> for Value {
    fn from(value: MessageTimestamp) -> Self {
        match value {
            MessageTimestamp::At(ts) => {
                Self::String(ts.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            MessageTimestamp::Raw(raw) => raw,
        }
    }
}

impl fmt::Display for MessageTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::At(ts) => f.write_str(&ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Self::Raw(raw) => write!(f, "{raw}"),
        }
    }
}

/// A message as supplied by a caller, before the registry appends it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MessagePayload {
    /// Caller-supplied timestamp; the registry stamps one when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<MessageTimestamp>,
    /// Free-form fields (content, sender, type tag, ...).
    #[serde(flatten)]
    pub fields: Metadata,
}

impl MessagePayload {
    /// Create an empty payload.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a plain text message from a sender.
    #[must_use]
    pub fn text(sender: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new()
            .with_field("type", "text")
            .with_field("sender", Value::String(sender.into()))
            .with_field("content", Value::String(content.into()))
    }

    /// Set a free-form field.
    ///
    /// A non-null `timestamp` field counts as a caller-supplied timestamp.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Supply the timestamp explicitly.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: impl Into<MessageTimestamp>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    /// Turn the payload into an immutable message.
    ///
    /// `now` is used only when the caller supplied no timestamp, neither
    /// through [`Self::with_timestamp`] nor through a `timestamp` field.
    pub(crate) fn stamp(mut self, now: DateTime<Utc>) -> Message {
        let from_field = self
            .fields
            .remove(TIMESTAMP_FIELD)
            .filter(|value| !value.is_null())
            .map(MessageTimestamp::from);
        Message {
            timestamp: self
                .timestamp
                .or(from_field)
                .unwrap_or(MessageTimestamp::At(now)),
            fields: self.fields,
        }
    }
}

/// A message appended to a conversation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// When the message was appended, or the caller-supplied timestamp.
    pub timestamp: MessageTimestamp,
    /// Free-form fields copied from the payload.
    #[serde(flatten)]
    pub fields: Metadata,
}

impl Message {
    /// Look up a free-form field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// The `content` field, when it is a string.
    #[must_use]
    pub fn content(&self) -> Option<&str> {
        self.get("content").and_then(Value::as_str)
    }

    /// The `sender` field, when it is a string.
    #[must_use]
    pub fn sender(&self) -> Option<&str> {
        self.get("sender").and_then(Value::as_str)
    }
}

/// A named, ordered, append-only sequence of messages.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    /// Unique identifier.
    pub id: ConversationId,
    /// Classification tag used for filtered listing.
    pub agent_name: Option<String>,
    /// Metadata attached at creation.
    pub metadata: Metadata,
    /// Messages in append order.
    pub messages: Vec<Message>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    pub(crate) fn new(id: ConversationId, agent_name: Option<String>, metadata: Metadata) -> Self {
        Self {
            id,
            agent_name,
            metadata,
            messages: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Minimal conversation materialized by an append to an unknown id.
    pub(crate) fn placeholder(id: ConversationId) -> Self {
        Self::new(id, None, Metadata::new())
    }

    /// Timestamp of the most recent message, when it is a point in time.
    #[must_use]
    pub fn last_activity(&self) -> Option<DateTime<Utc>> {
        self.messages
            .last()
            .and_then(|m| m.timestamp.as_datetime())
    }
}

/// Filter applied by `list`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationFilter {
    /// Keep only conversations created with this agent name.
    pub agent_name: Option<String>,
}

impl ConversationFilter {
    /// Match every conversation.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Match conversations created for a given agent.
    #[must_use]
    pub fn agent(name: impl Into<String>) -> Self {
        Self {
            agent_name: Some(name.into()),
        }
    }

    /// Check whether a conversation passes the filter.
    #[must_use]
    pub fn matches(&self, conversation: &Conversation) -> bool {
        self.agent_name
            .as_deref()
            .is_none_or(|name| conversation.agent_name.as_deref() == Some(name))
    }
}
