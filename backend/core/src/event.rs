use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How an inbound event reached the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSource {
    /// A message read from a chat session (Discord gateway).
    Chat,
    /// A form post to the HTTP listener (Slack outgoing webhook / slash command).
    Webhook,
}

/// A single chat message or webhook call addressed to the bot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundEvent {
    /// Correlates log lines and the audit record for this event.
    pub request_id: Uuid,
    pub source: EventSource,
    pub channel: String,
    pub sender: String,
    pub text: String,
    /// Shared secret carried by webhook posts.
    pub token: Option<String>,
}

impl InboundEvent {
    pub fn chat(channel: impl Into<String>, sender: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            source: EventSource::Chat,
            channel: channel.into(),
            sender: sender.into(),
            text: text.into(),
            token: None,
        }
    }

    pub fn webhook(
        channel: impl Into<String>,
        sender: impl Into<String>,
        text: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            source: EventSource::Webhook,
            channel: channel.into(),
            sender: sender.into(),
            text: text.into(),
            token: Some(token.into()),
        }
    }
}
