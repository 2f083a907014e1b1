//! In-memory conversation registry with live subscriptions.
//!
//! The registry is an explicitly constructed service object. Cloning it is
//! cheap and yields another handle onto the same state, so a chat screen, a
//! match list and a notifier can all share one instance.
//!
//! ## Delivery model
//! Every append is followed by a synchronous fan-out of the *complete* message
//! sequence to each subscriber of that conversation. Subscribers are expected
//! to re-render from the snapshot rather than apply deltas. A failing or
//! panicking subscriber is logged and counted; it never affects the caller or
//! the other subscribers.
//!
//! No map lock is held while callbacks run, so a callback may call back into
//! the registry (reply, unsubscribe, subscribe elsewhere).

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::{debug, warn};

use crate::conversations::config::{RegistryConfig, UnknownConversationPolicy};
use crate::conversations::errors::{RegistryError, RegistryResult, SubscriberError};
use crate::conversations::ids::ConversationId;
use crate::conversations::reference::ConversationRef;
use crate::conversations::subscription::{
    Delivery, Subscriber, SubscriberCallback, Subscription,
};
use crate::conversations::types::{
    Conversation, ConversationFilter, Message, MessagePayload, Metadata,
};

struct RegistryInner {
    config: RegistryConfig,
    conversations: DashMap<ConversationId, Conversation>,
    subscribers: DashMap<ConversationId, Vec<Subscriber>>,
    delivered: AtomicU64,
    delivery_failures: AtomicU64,
}

/// Shared in-memory conversation registry.
#[derive(Clone)]
pub struct ConversationRegistry {
    inner: Arc<RegistryInner>,
}

impl Default for ConversationRegistry {
    fn default() -> Self {
        Self::from_valid_config(RegistryConfig::default())
    }
}

impl std::fmt::Debug for ConversationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationRegistry")
            .field("config", &self.inner.config)
            .field("conversations", &self.inner.conversations.len())
            .field("subscribed_conversations", &self.inner.subscribers.len())
            .finish()
    }
}

impl ConversationRegistry {
    /// Create an empty registry.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn new(config: RegistryConfig) -> RegistryResult<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    /// Create an empty registry with default settings.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::default()
    }

    fn from_valid_config(config: RegistryConfig) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                config,
                conversations: DashMap::new(),
                subscribers: DashMap::new(),
                delivered: AtomicU64::new(0),
                delivery_failures: AtomicU64::new(0),
            }),
        }
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &RegistryConfig {
        &self.inner.config
    }

    /// Snapshot all conversations passing the filter.
    ///
    /// Ordered by creation time, then id.
    #[must_use]
    pub fn list(&self, filter: &ConversationFilter) -> Vec<Conversation> {
        let mut conversations: Vec<Conversation> = self
            .inner
            .conversations
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        conversations.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        conversations
    }

    /// Create and register a new conversation.
    pub fn create(&self, agent_name: Option<String>, metadata: Metadata) -> Conversation {
        loop {
            let id = ConversationId::generate(&self.inner.config.id_prefix);
            if let Entry::Vacant(vacant) = self.inner.conversations.entry(id.clone()) {
                let conversation = Conversation::new(id, agent_name, metadata);
                let snapshot = conversation.clone();
                vacant.insert(conversation);
                debug!(
                    conversation_id = %snapshot.id,
                    agent_name = snapshot.agent_name.as_deref().unwrap_or("-"),
                    "conversation created"
                );
                return snapshot;
            }
        }
    }

    /// Append a message and notify the conversation's subscribers.
    ///
    /// The registry stamps the current time unless the payload carries a
    /// timestamp. Unknown ids become placeholder conversations unless the
    /// registry was configured with [`UnknownConversationPolicy::Reject`].
    ///
    /// # Errors
    /// Returns `RegistryError::InvalidReference` if no id can be resolved, or
    /// `RegistryError::NotFound` for an unknown id under the reject policy.
    pub fn add_message<'a>(
        &self,
        conversation: impl Into<ConversationRef<'a>>,
        payload: MessagePayload,
    ) -> RegistryResult<Message> {
        let id = conversation.into().resolve()?;

        let (message, snapshot) = {
            let mut entry = match self.inner.conversations.entry(id.clone()) {
                Entry::Occupied(occupied) => occupied.into_ref(),
                Entry::Vacant(vacant) => match self.inner.config.unknown_conversation {
                    UnknownConversationPolicy::Reject => {
                        return Err(RegistryError::NotFound(id.into_string()));
                    }
                    UnknownConversationPolicy::Materialize => {
                        debug!(conversation_id = %id, "materializing placeholder conversation");
                        vacant.insert(Conversation::placeholder(id.clone()))
                    }
                },
            };
            let message = payload.stamp(Utc::now());
            entry.messages.push(message.clone());
            (message, entry.messages.clone())
        };

        debug!(
            conversation_id = %id,
            message_count = snapshot.len(),
            "message appended"
        );
        self.notify(&id, &snapshot);
        Ok(message)
    }

    /// Register a callback for a conversation.
    ///
    /// The callback is invoked once before this returns, with the current
    /// message sequence (empty if the conversation does not exist yet), and
    /// then after every append.
    ///
    /// # Errors
    /// Returns `RegistryError::InvalidReference` if the id is missing or blank.
    pub fn subscribe<'a, F>(
        &self,
        conversation: impl Into<ConversationRef<'a>>,
        callback: F,
    ) -> RegistryResult<Subscription>
    where
        F: Fn(&[Message]) -> Result<(), SubscriberError> + Send + Sync + 'static,
    {
        self.subscribe_callback(conversation.into(), Arc::new(callback))
    }

    /// Register an already shared callback.
    ///
    /// # Errors
    /// Returns `RegistryError::InvalidReference` if the id is missing or blank.
    pub fn subscribe_callback(
        &self,
        conversation: ConversationRef<'_>,
        callback: SubscriberCallback,
    ) -> RegistryResult<Subscription> {
        let id = conversation.resolve()?;
        let subscriber = Subscriber::new(callback);

        self.inner
            .subscribers
            .entry(id.clone())
            .or_default()
            .push(subscriber.clone());
        debug!(conversation_id = %id, subscriber_id = %subscriber.id, "subscriber registered");

        let current = self.messages(id.as_str());
        let outcome = subscriber.deliver(&current);
        self.record(&id, &subscriber, outcome);

        Ok(Subscription::new(id, subscriber.id))
    }

    /// Remove a registration.
    ///
    /// Returns `true` if it was removed by this call; repeated calls are no-ops.
    pub fn unsubscribe(&self, subscription: &Subscription) -> bool {
        let target = subscription.subscriber_id();
        let removed = match self
            .inner
            .subscribers
            .entry(subscription.conversation_id().clone())
        {
            Entry::Occupied(mut occupied) => {
                let set = occupied.get_mut();
                let before = set.len();
                set.retain(|subscriber| subscriber.id != target);
                let removed = set.len() != before;
                if set.is_empty() {
                    occupied.remove();
                }
                removed
            }
            Entry::Vacant(_) => false,
        };

        if removed {
            debug!(
                conversation_id = %subscription.conversation_id(),
                subscriber_id = %target,
                "subscriber removed"
            );
        }
        removed
    }

    /// Snapshot one conversation.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Conversation> {
        self.inner
            .conversations
            .get(id)
            .map(|entry| entry.value().clone())
    }

    /// Snapshot one conversation's messages (empty when unknown).
    #[must_use]
    pub fn messages(&self, id: &str) -> Vec<Message> {
        self.inner
            .conversations
            .get(id)
            .map(|entry| entry.messages.clone())
            .unwrap_or_default()
    }

    /// Number of active registrations for a conversation.
    #[must_use]
    pub fn subscriber_count(&self, id: &str) -> usize {
        self.inner
            .subscribers
            .get(id)
            .map_or(0, |set| set.len())
    }

    /// Number of known conversations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.conversations.len()
    }

    /// Whether no conversation exists yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.conversations.is_empty()
    }

    /// Get registry statistics.
    #[must_use]
    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            conversations: self.inner.conversations.len(),
            messages: self
                .inner
                .conversations
                .iter()
                .map(|entry| entry.messages.len())
                .sum(),
            subscriptions: self.inner.subscribers.iter().map(|set| set.len()).sum(),
            delivered: self.inner.delivered.load(Ordering::Relaxed),
            delivery_failures: self.inner.delivery_failures.load(Ordering::Relaxed),
        }
    }

    fn notify(&self, id: &ConversationId, messages: &[Message]) {
        let subscribers: Vec<Subscriber> = self
            .inner
            .subscribers
            .get(id)
            .map(|set| set.value().clone())
            .unwrap_or_default();

        for subscriber in &subscribers {
            let outcome = subscriber.deliver(messages);
            self.record(id, subscriber, outcome);
        }
    }

    fn record(&self, id: &ConversationId, subscriber: &Subscriber, outcome: Delivery) {
        match outcome {
            Delivery::Delivered => {
                self.inner.delivered.fetch_add(1, Ordering::Relaxed);
            }
            Delivery::Failed(err) => {
                self.inner.delivery_failures.fetch_add(1, Ordering::Relaxed);
                warn!(
                    conversation_id = %id,
                    subscriber_id = %subscriber.id,
                    error = %err,
                    "subscriber callback failed"
                );
            }
            Delivery::Panicked(reason) => {
                self.inner.delivery_failures.fetch_add(1, Ordering::Relaxed);
                warn!(
                    conversation_id = %id,
                    subscriber_id = %subscriber.id,
                    panic = %reason,
                    "subscriber callback panicked"
                );
            }
        }
    }
}

/// Registry statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryStats {
    /// Known conversations.
    pub conversations: usize,
    /// Messages across all conversations.
    pub messages: usize,
    /// Active subscriber registrations.
    pub subscriptions: usize,
    /// Successful callback invocations.
    pub delivered: u64,
    /// Callback invocations that returned an error or panicked.
    pub delivery_failures: u64,
}
