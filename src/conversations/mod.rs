//! In-memory conversation registry.
//!
//! Stands in for the hosted agent service when none is configured:
//! - `ids`: Conversation and subscriber identifiers
//! - `types`: Conversations, messages, payloads, and list filters
//! - `reference`: Resolution of "id or conversation" arguments
//! - `errors`: Registry and subscriber error types
//! - `config`: Registry configuration
//! - `subscription`: Subscriber registrations and delivery
//! - `registry`: The shared registry itself
//! - `service`: Trait seam consumed by the rest of the application

pub mod config;
pub mod errors;
pub mod ids;
pub mod reference;
pub mod registry;
pub mod service;
pub mod subscription;
pub mod types;

pub use config::{RegistryConfig, UnknownConversationPolicy};
pub use errors::{RegistryError, RegistryResult, SubscriberError};
pub use ids::{ConversationId, SubscriberId};
pub use reference::ConversationRef;
pub use registry::{ConversationRegistry, RegistryStats};
pub use service::ConversationService;
pub use subscription::{SubscriberCallback, Subscription};
pub use types::{
    Conversation, ConversationFilter, Message, MessagePayload, MessageTimestamp, Metadata,
};
