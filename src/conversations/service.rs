//! Contract consumed by chat screens and notifiers.

use crate::conversations::errors::RegistryResult;
use crate::conversations::reference::ConversationRef;
use crate::conversations::registry::ConversationRegistry;
use crate::conversations::subscription::{SubscriberCallback, Subscription};
use crate::conversations::types::{
    Conversation, ConversationFilter, Message, MessagePayload, Metadata,
};

/// Conversation operations offered to the rest of the application.
///
/// Four operations (`list`, `create`, `add_message`, `subscribe`) plus
/// `unsubscribe`, which undoes a `subscribe`.
///
/// The in-memory registry is the fallback implementation used when no hosted
/// agent service is configured; consumers hold an `Arc<dyn ConversationService>`.
pub trait ConversationService: Send + Sync {
    /// Snapshot conversations passing the filter.
    fn list(&self, filter: &ConversationFilter) -> Vec<Conversation>;

    /// Create a conversation.
    fn create(&self, agent_name: Option<String>, metadata: Metadata) -> Conversation;

    /// Append a message and notify subscribers.
    ///
    /// # Errors
    /// Returns an error if the conversation reference cannot be resolved.
    fn add_message(
        &self,
        conversation: ConversationRef<'_>,
        payload: MessagePayload,
    ) -> RegistryResult<Message>;

    /// Register a callback, delivering the current state immediately.
    ///
    /// # Errors
    /// Returns an error if the conversation reference cannot be resolved.
    fn subscribe(
        &self,
        conversation: ConversationRef<'_>,
        callback: SubscriberCallback,
    ) -> RegistryResult<Subscription>;

    /// Remove a registration. Safe to call repeatedly.
    fn unsubscribe(&self, subscription: &Subscription) -> bool;
}

impl ConversationService for ConversationRegistry {
    fn list(&self, filter: &ConversationFilter) -> Vec<Conversation> {
        Self::list(self, filter)
    }

    fn create(&self, agent_name: Option<String>, metadata: Metadata) -> Conversation {
        Self::create(self, agent_name, metadata)
    }

    fn add_message(
        &self,
        conversation: ConversationRef<'_>,
        payload: MessagePayload,
    ) -> RegistryResult<Message> {
        Self::add_message(self, conversation, payload)
    }

    fn subscribe(
        &self,
        conversation: ConversationRef<'_>,
        callback: SubscriberCallback,
    ) -> RegistryResult<Subscription> {
        self.subscribe_callback(conversation, callback)
    }

    fn unsubscribe(&self, subscription: &Subscription) -> bool {
        Self::unsubscribe(self, subscription)
    }
}
