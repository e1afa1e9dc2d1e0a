use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serenity::builder::{CreateEmbed, CreateMessage, GetMessages};
use serenity::http::Http;
use serenity::model::channel::Message as DiscordMessage;
use serenity::model::gateway::Ready;
use serenity::model::id::{ChannelId, MessageId};
use serenity::prelude::*;
use shart_commands::{Orchestrator, ReplyFormatter};
use shart_core::{Attachment, ChatTransport, DeleteReport, InboundEvent, ReplyPayload, TransportError};
use tracing::{error, info, warn};

use crate::ChannelAdapter;

/// Discord rejects message content beyond this.
pub const DISCORD_MAX_MESSAGE_LEN: usize = 2000;
const MAX_EMBEDS: usize = 10;
const PAGE_SIZE: u32 = 100;
/// Bulk delete only accepts messages younger than two weeks.
const BULK_DELETE_MAX_AGE_SECS: i64 = 14 * 24 * 60 * 60;

// ---------------------------------------------------------------------------
// Inbound
// ---------------------------------------------------------------------------

struct Handler {
    orchestrator: Orchestrator,
}

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, _ctx: Context, msg: DiscordMessage) {
        if msg.author.bot {
            return;
        }

        let event = InboundEvent::chat(msg.channel_id.to_string(), msg.author.name.clone(), msg.content);
        // The reply is delivered by the spawned task; nothing to wait for here.
        let _ = self.orchestrator.on_inbound(event);
    }

    async fn ready(&self, _: Context, ready: Ready) {
        info!("[Discord] {} is connected!", ready.user.name);
    }
}

pub struct DiscordAdapter {
    token: String,
    orchestrator: Orchestrator,
}

impl DiscordAdapter {
    pub fn new(token: String, orchestrator: Orchestrator) -> Self {
        Self { token, orchestrator }
    }
}

#[async_trait]
impl ChannelAdapter for DiscordAdapter {
    fn name(&self) -> &str {
        "discord"
    }

    async fn start(&self) -> anyhow::Result<()> {
        info!("[Discord] Starting adapter");

        let intents = GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::DIRECT_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT;

        let mut client = Client::builder(&self.token, intents)
            .event_handler(Handler {
                orchestrator: self.orchestrator.clone(),
            })
            .await?;

        if let Err(why) = client.start().await {
            error!("[Discord] Client error: {:?}", why);
            anyhow::bail!("Discord client error: {:?}", why);
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

/// Sends replies and manages channel history over the Discord REST API.
pub struct DiscordTransport {
    http: Arc<Http>,
}

impl DiscordTransport {
    pub fn new(token: &str) -> Self {
        Self {
            http: Arc::new(Http::new(token)),
        }
    }
}

fn parse_channel(channel: &str) -> Result<ChannelId, TransportError> {
    match channel.parse::<u64>() {
        Ok(id) if id > 0 => Ok(ChannelId::new(id)),
        _ => Err(TransportError::InvalidChannel(channel.to_string())),
    }
}

fn build_embed(attachment: &Attachment) -> CreateEmbed {
    let mut builder = CreateEmbed::new().title(&attachment.title);
    if !attachment.text.is_empty() {
        builder = builder.description(&attachment.text);
    }
    if let Some(color) = attachment.color {
        builder = builder.color(color.rgb());
    }
    for field in &attachment.fields {
        builder = builder.field(&field.title, &field.value, field.short);
    }
    // Buttons need an interaction endpoint; show the equivalent command instead.
    for action in &attachment.actions {
        builder = builder.field(&action.label, format!("`{}`", action.command), true);
    }
    builder
}

/// Content as sent, title included, cut to the message limit.
fn message_content(payload: &ReplyPayload) -> String {
    let content = match &payload.title {
        Some(title) => format!("**{title}**\n{}", payload.text),
        None => payload.text.clone(),
    };
    ReplyFormatter::new(DISCORD_MAX_MESSAGE_LEN).fit(&content)
}

fn api_error(err: serenity::Error) -> TransportError {
    match err {
        serenity::Error::Http(http) => match http.status_code() {
            Some(status) => TransportError::Http {
                status: status.as_u16(),
                body: http.to_string(),
            },
            None => TransportError::Network(http.to_string()),
        },
        other => TransportError::Network(other.to_string()),
    }
}

/// Split ids into those bulk delete accepts and those that need single deletes.
fn partition_by_age(ids: &[MessageId], now_secs: i64) -> (Vec<MessageId>, Vec<MessageId>) {
    ids.iter()
        .copied()
        .partition(|id| now_secs - id.created_at().unix_timestamp() < BULK_DELETE_MAX_AGE_SECS)
}

#[async_trait]
impl ChatTransport for DiscordTransport {
    fn name(&self) -> &str {
        "discord"
    }

    fn max_message_len(&self) -> usize {
        DISCORD_MAX_MESSAGE_LEN
    }

    async fn send(&self, payload: &ReplyPayload) -> Result<(), TransportError> {
        let channel = parse_channel(&payload.channel)?;
        let mut builder = CreateMessage::new().content(message_content(payload));
        let embeds: Vec<CreateEmbed> = payload.attachments.iter().take(MAX_EMBEDS).map(build_embed).collect();
        if !embeds.is_empty() {
            builder = builder.embeds(embeds);
        }
        channel
            .send_message(&*self.http, builder)
            .await
            .map_err(api_error)?;
        Ok(())
    }

    async fn recent_messages(&self, channel: &str, limit: Option<u32>) -> Result<Vec<String>, TransportError> {
        let channel = parse_channel(channel)?;
        let mut ids: Vec<MessageId> = Vec::new();
        loop {
            let wanted = match limit {
                Some(limit) => limit.saturating_sub(ids.len() as u32).min(PAGE_SIZE),
                None => PAGE_SIZE,
            };
            if wanted == 0 {
                break;
            }
            let mut request = GetMessages::new().limit(wanted as u8);
            if let Some(oldest) = ids.last() {
                request = request.before(*oldest);
            }
            let page = channel
                .messages(self.http.as_ref(), request)
                .await
                .map_err(api_error)?;
            let fetched = page.len();
            ids.extend(page.into_iter().map(|m| m.id));
            if fetched < wanted as usize {
                break;
            }
        }
        Ok(ids.into_iter().map(|id| id.to_string()).collect())
    }

    async fn delete_messages(&self, channel: &str, ids: &[String]) -> Result<DeleteReport, TransportError> {
        let channel = parse_channel(channel)?;
        let mut report = DeleteReport::default();

        let parsed: Vec<MessageId> = ids
            .iter()
            .filter_map(|id| match id.parse::<u64>() {
                Ok(n) if n > 0 => Some(MessageId::new(n)),
                _ => {
                    report.failed += 1;
                    None
                }
            })
            .collect();

        let (recent, old) = partition_by_age(&parsed, Utc::now().timestamp());

        for batch in recent.chunks(PAGE_SIZE as usize) {
            let result = if batch.len() == 1 {
                channel.delete_message(&*self.http, batch[0]).await
            } else {
                channel.delete_messages(self.http.as_ref(), batch).await
            };
            match result {
                Ok(()) => report.deleted += batch.len(),
                Err(err) => {
                    warn!("[Discord] Bulk delete of {} messages failed: {}", batch.len(), err);
                    report.failed += batch.len();
                }
            }
        }

        for id in old {
            match channel.delete_message(&*self.http, id).await {
                Ok(()) => report.deleted += 1,
                Err(err) => {
                    warn!("[Discord] Deleting message {} failed: {}", id, err);
                    report.failed += 1;
                }
            }
        }

        info!(
            "[Discord] Deleted {} messages in {} ({} failed)",
            report.deleted, channel, report.failed
        );
        Ok(report)
    }
}
