//! Scripted match-chat session driven through the conversation service.
//!
//! Mirrors what the app's screens do: the match page opens a conversation,
//! the chat screen and the notification badge subscribe, two players agree
//! on a court, then the chat screen is closed.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use serde_json::json;
use tracing::{error, info};

use crate::conversations::{
    ConversationFilter, ConversationRef, ConversationRegistry, ConversationService, Message,
    MessagePayload, Metadata, RegistryConfig, SubscriberError,
};
use crate::telemetry;

/// Agent name tagging match conversations.
pub const MATCH_CHAT_AGENT: &str = "match_chat";

/// Run the demo session.
///
/// # Returns
/// `ExitCode::SUCCESS` when the session completes, `1` on failure.
#[must_use]
pub fn run() -> ExitCode {
    telemetry::init_tracing();
    info!("Starting Courtside match chat v{}", env!("CARGO_PKG_VERSION"));

    match play() {
        Ok(message_count) => {
            info!(message_count, "match chat finished");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Match chat failed: {e:#}");
            ExitCode::from(1)
        }
    }
}

/// Play the scripted session and return the final message count.
///
/// # Errors
/// Returns an error if the configuration is invalid or an append fails.
pub fn play() -> anyhow::Result<usize> {
    let config = RegistryConfig::from_env().context("failed to load registry config")?;
    let registry = ConversationRegistry::new(config).context("failed to create registry")?;
    let service: Arc<dyn ConversationService> = Arc::new(registry.clone());

    let mut metadata = Metadata::new();
    metadata.insert("court".to_string(), json!("Riverside Park, court 3"));
    metadata.insert("format".to_string(), json!("singles"));
    let conversation = service.create(Some(MATCH_CHAT_AGENT.to_string()), metadata);
    info!(conversation_id = %conversation.id, "match conversation opened");

    let chat_screen = service
        .subscribe(
            ConversationRef::from(&conversation),
            Arc::new(render_chat_screen),
        )
        .context("chat screen failed to subscribe")?;
    let badge = service
        .subscribe(
            ConversationRef::from(&conversation.id),
            Arc::new(update_badge),
        )
        .context("notification badge failed to subscribe")?;

    let script = [
        ("ana", "Free Saturday at 9?"),
        ("ben", "Works for me. Court 3?"),
        ("ana", "Booked. Bring balls!"),
    ];
    for (sender, content) in script {
        service
            .add_message(
                ConversationRef::from(&conversation.id),
                MessagePayload::text(sender, content),
            )
            .with_context(|| format!("failed to post message from {sender}"))?;
    }

    service.unsubscribe(&chat_screen);
    service
        .add_message(
            ConversationRef::from(&conversation.id),
            MessagePayload::text("ben", "See you there").with_field("type", "reminder"),
        )
        .context("failed to post reminder")?;
    badge.unsubscribe(&registry);

    let stats = registry.stats();
    info!(
        conversations = stats.conversations,
        delivered = stats.delivered,
        delivery_failures = stats.delivery_failures,
        "registry stats"
    );

    let matches = service.list(&ConversationFilter::agent(MATCH_CHAT_AGENT));
    Ok(matches.iter().map(|c| c.messages.len()).sum())
}

#[allow(clippy::unnecessary_wraps)]
fn render_chat_screen(messages: &[Message]) -> Result<(), SubscriberError> {
    for message in messages {
        info!(
            sender = message.sender().unwrap_or("?"),
            at = %message.timestamp,
            "{}",
            message.content().unwrap_or_default()
        );
    }
    Ok(())
}

fn update_badge(messages: &[Message]) -> Result<(), SubscriberError> {
    if messages.is_empty() {
        return Ok(());
    }
    let unread = u32::try_from(messages.len())
        .map_err(|_| SubscriberError::new("unread count overflow"))?;
    info!(unread, "badge updated");
    Ok(())
}
