//! In-memory conversation registry backing Courtside's chat screens when no
//! hosted agent service is configured, in a strictly linted crate.

// Dangerous or non-idiomatic practices are rejected outright
#![deny(warnings)] // Every warning is an error
#![deny(unsafe_code)] // No unsafe code
#![deny(missing_docs)] // Every public item is documented
#![deny(dead_code)] // No unused code
#![deny(non_camel_case_types)]

// Nothing else slips through either
#![deny(unused_imports)]
#![deny(unused_variables)]
#![deny(unused_must_use)] // Results and Options are handled explicitly
#![deny(non_snake_case)]
#![deny(non_upper_case_globals)]
#![deny(nonstandard_style)]
#![forbid(unsafe_op_in_unsafe_fn)]

// Clippy discipline
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::print_stdout)] // Output goes through tracing
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
#![deny(clippy::missing_const_for_fn)]
#![deny(clippy::unwrap_in_result)]
#![deny(clippy::module_inception)]
#![deny(clippy::redundant_clone)]
#![deny(clippy::shadow_unrelated)]
#![deny(clippy::too_many_arguments)]
#![deny(clippy::cognitive_complexity)]

#![deny(overflowing_literals)]

/// Conversations, messages, and live subscriptions.
pub mod conversations;
/// Scripted match-chat session used by the binary.
pub mod match_chat_demo;
/// Tracing initialisation.
pub mod telemetry;

pub use conversations::{
    Conversation, ConversationFilter, ConversationId, ConversationRef, ConversationRegistry,
    ConversationService, Message, MessagePayload, MessageTimestamp, Metadata, RegistryConfig,
    RegistryError, RegistryResult, Subscription, UnknownConversationPolicy,
};
