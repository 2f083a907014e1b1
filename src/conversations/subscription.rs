//! Subscriber registrations and per-subscriber delivery.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::conversations::errors::SubscriberError;
use crate::conversations::ids::{ConversationId, SubscriberId};
use crate::conversations::registry::ConversationRegistry;
use crate::conversations::types::Message;

/// Notification sink invoked with the complete message sequence.
pub type SubscriberCallback =
    Arc<dyn Fn(&[Message]) -> Result<(), SubscriberError> + Send + Sync>;

/// A registered callback.
#[derive(Clone)]
pub(crate) struct Subscriber {
    pub(crate) id: SubscriberId,
    callback: SubscriberCallback,
}

impl fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriber").field("id", &self.id).finish_non_exhaustive()
    }
}

impl Subscriber {
    pub(crate) fn new(callback: SubscriberCallback) -> Self {
        Self {
            id: SubscriberId::new(),
            callback,
        }
    }

    /// Invoke the callback, containing both returned errors and panics.
    pub(crate) fn deliver(&self, messages: &[Message]) -> Delivery {
        match panic::catch_unwind(AssertUnwindSafe(|| (self.callback)(messages))) {
            Ok(Ok(())) => Delivery::Delivered,
            Ok(Err(err)) => Delivery::Failed(err),
            Err(payload) => Delivery::Panicked(panic_message(payload.as_ref())),
        }
    }
}

/// Outcome of one delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Delivery {
    Delivered,
    Failed(SubscriberError),
    Panicked(String),
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}

/// Handle returned by `subscribe`.
///
/// Holds no reference to the registry; unsubscribing is a plain call against
/// whichever registry handle the caller owns, and is idempotent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subscription {
    conversation_id: ConversationId,
    subscriber_id: SubscriberId,
}

impl Subscription {
    pub(crate) const fn new(conversation_id: ConversationId, subscriber_id: SubscriberId) -> Self {
        Self {
            conversation_id,
            subscriber_id,
        }
    }

    /// Conversation this subscription listens to.
    #[must_use]
    pub const fn conversation_id(&self) -> &ConversationId {
        &self.conversation_id
    }

    /// Identifier of this registration.
    #[must_use]
    pub const fn subscriber_id(&self) -> SubscriberId {
        self.subscriber_id
    }

    /// Remove this registration from the registry.
    ///
    /// Returns `true` only on the call that actually removed it.
    pub fn unsubscribe(&self, registry: &ConversationRegistry) -> bool {
        registry.unsubscribe(self)
    }
}
