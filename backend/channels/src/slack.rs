/// Slack channel adapter.
///
/// Receives outgoing-webhook / slash-command form posts and replies through a
/// Slack incoming webhook.
///
/// Form fields: `token`, `channel_name`, `text`, optional `user_name`.
/// A token mismatch yields `401 Not Authorized`; when a signing secret is
/// configured the `X-Slack-Signature` HMAC is checked as well.
///
/// Button clicks on replies arrive at [`SLACK_ACTIONS_PATH`] as an
/// interactive-message `payload`; the button value is run as a command.
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use shart_commands::{Disposition, Orchestrator, ReplyFormatter};
use shart_core::{Attachment, ChatTransport, InboundEvent, ReplyPayload, TransportError};
use tracing::{debug, info, warn};

use crate::ChannelAdapter;

/// Short alias always served next to the configured path.
pub const SHORT_WEBHOOK_PATH: &str = "/v1/m";
/// Request URL for interactive message buttons.
pub const SLACK_ACTIONS_PATH: &str = "/v1/actions";
/// Slack only delivers button clicks for attachments that carry a callback id.
const ACTION_CALLBACK_ID: &str = "shart_command";
/// Slack truncates message text beyond this.
pub const SLACK_MAX_MESSAGE_LEN: usize = 4000;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct SlackConfig {
    /// Incoming webhook URL replies are posted to.
    pub incoming_webhook: String,
    /// Optional signing secret for `X-Slack-Signature` verification.
    pub signing_secret: Option<String>,
    pub webhook_path: String,
    /// Display name used for replies.
    pub bot_name: String,
}

// ---------------------------------------------------------------------------
// Axum state
// ---------------------------------------------------------------------------

#[derive(Clone)]
struct AppState {
    signing_secret: Option<String>,
    orchestrator: Orchestrator,
}

// ---------------------------------------------------------------------------
// Slack wire types
// ---------------------------------------------------------------------------

/// Form payload of an outgoing webhook or slash command.
#[derive(Debug, Default, PartialEq, Eq)]
struct CommandForm {
    token: String,
    channel_name: String,
    user_name: String,
    text: String,
}

impl CommandForm {
    fn parse(body: &[u8]) -> Self {
        let mut form = CommandForm::default();
        for (key, value) in url::form_urlencoded::parse(body) {
            match key.as_ref() {
                "token" => form.token = value.into_owned(),
                "channel_name" => form.channel_name = value.into_owned(),
                "user_name" => form.user_name = value.into_owned(),
                "text" => form.text = value.into_owned(),
                _ => {}
            }
        }
        form
    }
}

/// Interactive message callback, JSON inside the `payload` form field.
#[derive(Debug, Deserialize)]
struct ActionCallback {
    #[serde(default)]
    token: String,
    #[serde(default)]
    channel: Named,
    #[serde(default)]
    user: Named,
    #[serde(default)]
    actions: Vec<ActionValue>,
}

#[derive(Debug, Default, Deserialize)]
struct Named {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct ActionValue {
    #[serde(default)]
    value: String,
}

impl ActionCallback {
    fn parse(body: &[u8]) -> Option<Self> {
        let payload = url::form_urlencoded::parse(body)
            .find(|(key, _)| key == "payload")
            .map(|(_, value)| value.into_owned())?;
        serde_json::from_str(&payload).ok()
    }
}

#[derive(Serialize)]
struct SlackWebhookMessage<'a> {
    channel: String,
    username: &'a str,
    text: String,
    mrkdwn: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attachments: Vec<SlackAttachment<'a>>,
}

#[derive(Serialize)]
struct SlackAttachment<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    callback_id: Option<&'static str>,
    title: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<&'static str>,
    fields: Vec<SlackField<'a>>,
    actions: Vec<SlackAction<'a>>,
}

#[derive(Serialize)]
struct SlackField<'a> {
    title: &'a str,
    value: &'a str,
    short: bool,
}

#[derive(Serialize)]
struct SlackAction<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    name: &'a str,
    text: &'a str,
    value: &'a str,
}

impl<'a> From<&'a Attachment> for SlackAttachment<'a> {
    fn from(attachment: &'a Attachment) -> Self {
        Self {
            callback_id: (!attachment.actions.is_empty()).then_some(ACTION_CALLBACK_ID),
            title: &attachment.title,
            text: &attachment.text,
            color: attachment.color.map(|c| c.slack_name()),
            fields: attachment
                .fields
                .iter()
                .map(|f| SlackField {
                    title: &f.title,
                    value: &f.value,
                    short: f.short,
                })
                .collect(),
            actions: attachment
                .actions
                .iter()
                .map(|a| SlackAction {
                    kind: "button",
                    name: &a.label,
                    text: &a.label,
                    value: &a.command,
                })
                .collect(),
        }
    }
}

/// Slack addresses channels by `#name` on incoming webhooks.
fn channel_ref(channel: &str) -> String {
    if channel.starts_with('#') || channel.starts_with('@') {
        channel.to_string()
    } else {
        format!("#{channel}")
    }
}

/// Text as sent, title included, cut to the message limit.
fn message_text(payload: &ReplyPayload) -> String {
    let text = match &payload.title {
        Some(title) => format!("*{title}*\n{}", payload.text),
        None => payload.text.clone(),
    };
    ReplyFormatter::new(SLACK_MAX_MESSAGE_LEN).fit(&text)
}

// ---------------------------------------------------------------------------
// Outbound transport
// ---------------------------------------------------------------------------

/// Posts replies to a Slack incoming webhook. Message history is not
/// reachable through a webhook, so `clear` is unsupported here.
pub struct SlackTransport {
    http_client: Client,
    webhook_url: String,
    username: String,
    timeout_secs: u64,
}

impl SlackTransport {
    pub fn new(config: &SlackConfig, timeout: Duration) -> Result<Self, TransportError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Ok(Self {
            http_client,
            webhook_url: config.incoming_webhook.clone(),
            username: config.bot_name.clone(),
            timeout_secs: timeout.as_secs(),
        })
    }
}

#[async_trait]
impl ChatTransport for SlackTransport {
    fn name(&self) -> &str {
        "slack"
    }

    fn max_message_len(&self) -> usize {
        SLACK_MAX_MESSAGE_LEN
    }

    async fn send(&self, payload: &ReplyPayload) -> Result<(), TransportError> {
        let body = SlackWebhookMessage {
            channel: channel_ref(&payload.channel),
            username: &self.username,
            text: message_text(payload),
            mrkdwn: true,
            attachments: payload.attachments.iter().map(SlackAttachment::from).collect(),
        };

        let res = self
            .http_client
            .post(&self.webhook_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout(self.timeout_secs)
                } else {
                    TransportError::Network(e.without_url().to_string())
                }
            })?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(TransportError::Http {
                status: status.as_u16(),
                body,
            });
        }
        debug!("[Slack] Sent reply to {}", body.channel);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Adapter
// ---------------------------------------------------------------------------

pub struct SlackAdapter {
    config: SlackConfig,
    orchestrator: Orchestrator,
}

impl SlackAdapter {
    pub fn new(config: SlackConfig, orchestrator: Orchestrator) -> Self {
        Self { config, orchestrator }
    }
}

// ---------------------------------------------------------------------------
// Webhook handler
// ---------------------------------------------------------------------------

async fn handle_slack_command(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    // 1. Verify Slack signature (HMAC-SHA256 over timestamp + body)
    if let Some(secret) = &state.signing_secret {
        if !verify_slack_signature(&headers, &body, secret) {
            warn!("[Slack] Invalid signature, rejecting webhook");
            return (StatusCode::UNAUTHORIZED, "Not Authorized").into_response();
        }
    }

    // 2. Hand off; the orchestrator checks the token and spawns the command.
    let form = CommandForm::parse(&body);
    info!("[Slack] Command from {} in #{}", form.user_name, form.channel_name);
    let event = InboundEvent::webhook(form.channel_name, form.user_name, form.text, form.token);

    match state.orchestrator.on_inbound(event).disposition {
        Disposition::Rejected => (StatusCode::UNAUTHORIZED, "Not Authorized").into_response(),
        Disposition::Ignored => (StatusCode::OK, "").into_response(),
        _ => (StatusCode::OK, "Processing...").into_response(),
    }
}

async fn handle_slack_action(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    if let Some(secret) = &state.signing_secret {
        if !verify_slack_signature(&headers, &body, secret) {
            warn!("[Slack] Invalid signature, rejecting action");
            return (StatusCode::UNAUTHORIZED, "Not Authorized").into_response();
        }
    }

    let Some(callback) = ActionCallback::parse(&body) else {
        warn!("[Slack] Unreadable action payload");
        return (StatusCode::BAD_REQUEST, "Bad Request").into_response();
    };
    let Some(command) = callback.actions.into_iter().map(|a| a.value).find(|v| !v.trim().is_empty()) else {
        return (StatusCode::BAD_REQUEST, "Bad Request").into_response();
    };

    info!("[Slack] Button from {} in #{}: {}", callback.user.name, callback.channel.name, command);
    let event = InboundEvent::webhook(callback.channel.name, callback.user.name, command, callback.token);

    match state.orchestrator.on_inbound(event).disposition {
        Disposition::Rejected => (StatusCode::UNAUTHORIZED, "Not Authorized").into_response(),
        // An empty 200 leaves the clicked message unchanged.
        _ => (StatusCode::OK, "").into_response(),
    }
}

/// Verify the `X-Slack-Signature` header using HMAC-SHA256.
fn verify_slack_signature(headers: &HeaderMap, body: &[u8], signing_secret: &str) -> bool {
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    let Some(sig) = headers.get("x-slack-signature").and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let Some(ts) = headers
        .get("x-slack-request-timestamp")
        .and_then(|v| v.to_str().ok())
    else {
        return false;
    };

    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(signing_secret.as_bytes()) else {
        return false;
    };
    mac.update(format!("v0:{ts}:").as_bytes());
    mac.update(body);
    let Some(expected) = sig.strip_prefix("v0=").and_then(|hex_sig| hex::decode(hex_sig).ok()) else {
        return false;
    };
    mac.verify_slice(&expected).is_ok()
}

// ---------------------------------------------------------------------------
// ChannelAdapter impl
// ---------------------------------------------------------------------------

#[async_trait]
impl ChannelAdapter for SlackAdapter {
    fn name(&self) -> &str {
        "slack"
    }

    fn build_router(&self) -> Router {
        let state = AppState {
            signing_secret: self.config.signing_secret.clone(),
            orchestrator: self.orchestrator.clone(),
        };
        let mut router = Router::new().route(&self.config.webhook_path, post(handle_slack_command));
        if self.config.webhook_path != SHORT_WEBHOOK_PATH {
            router = router.route(SHORT_WEBHOOK_PATH, post(handle_slack_command));
        }
        router
            .route(SLACK_ACTIONS_PATH, post(handle_slack_action))
            .with_state(state)
    }

    async fn start(&self) -> anyhow::Result<()> {
        info!("[Slack] Adapter ready at {} (webhook-based)", self.config.webhook_path);
        Ok(())
    }
}
