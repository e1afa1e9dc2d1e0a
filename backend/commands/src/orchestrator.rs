/// Dispatch orchestrator: the single entry point for inbound chat events.
///
/// `on_inbound` authenticates and classifies the event synchronously, then
/// runs the handler and delivers the reply on a spawned task so a slow
/// backend never blocks the next event. Replies to concurrent commands may
/// arrive in any order.
use std::sync::Arc;
use std::time::{Duration, Instant};

use shart_core::{ChatTransport, CommandError, EventSource, InboundEvent, ReplyPayload};
use shart_logging::{AuditOutcome, CommandAudit, redact_sensitive_data};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::detection::{TriggerMatch, match_optional_trigger, match_trigger, parse};
use crate::dispatch::{CommandContext, CommandDispatcher};
use crate::format::ReplyFormatter;
use crate::registry::CommandRegistry;
use crate::types::ParsedInput;

const HELP_COMMAND: &str = "help";

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Case-sensitive keyword that opens every chat command.
    pub trigger: String,
    /// Shared secret webhook events must carry. `None` disables the check.
    pub auth_token: Option<String>,
    /// Chat channels the bot answers in. Empty means every channel.
    pub allowed_channels: Vec<String>,
    pub command_timeout: Duration,
    pub reply_timeout: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            trigger: "shart".into(),
            auth_token: None,
            allowed_channels: Vec::new(),
            command_timeout: Duration::from_secs(15),
            reply_timeout: Duration::from_secs(5),
        }
    }
}

/// What `on_inbound` decided before any handler ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Rejected,
    Ignored,
    Help,
    Invalid,
    Dispatched,
}

/// Synchronous acknowledgement returned to the inbound transport.
#[derive(Debug)]
pub struct Ack {
    pub disposition: Disposition,
    task: Option<JoinHandle<()>>,
}

impl Ack {
    fn new(disposition: Disposition, task: Option<JoinHandle<()>>) -> Self {
        Self { disposition, task }
    }

    /// Wait for the background reply, if one was started.
    pub async fn finished(self) {
        if let Some(task) = self.task {
            if let Err(err) = task.await {
                error!(error = %err, "[Orchestrator] Reply task panicked");
            }
        }
    }
}

struct Inner {
    config: OrchestratorConfig,
    dispatcher: CommandDispatcher,
    transport: Arc<dyn ChatTransport>,
}

/// Routes events from one chat transport. Cheap to clone.
#[derive(Clone)]
pub struct Orchestrator {
    inner: Arc<Inner>,
}

impl Orchestrator {
    pub fn new(
        config: OrchestratorConfig,
        registry: Arc<CommandRegistry>,
        transport: Arc<dyn ChatTransport>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                dispatcher: CommandDispatcher::new(registry),
                transport,
            }),
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.inner.config
    }

    /// Handle one inbound event. Must be called from within a tokio runtime.
    pub fn on_inbound(&self, event: InboundEvent) -> Ack {
        let started = Instant::now();
        let config = &self.inner.config;

        let addressed = match event.source {
            EventSource::Chat => match_trigger(&event.text, &config.trigger),
            EventSource::Webhook => match_optional_trigger(&event.text, &config.trigger),
        };

        let remainder = match addressed {
            TriggerMatch::NotAddressed => {
                debug!(request_id = %event.request_id, "[Orchestrator] Ignoring message without trigger");
                return Ack::new(Disposition::Ignored, None);
            }
            TriggerMatch::Bare => "",
            TriggerMatch::Command(rest) => rest,
        };

        if !self.authenticate(&event) {
            warn!(
                request_id = %event.request_id,
                channel = %event.channel,
                sender = %event.sender,
                "[Orchestrator] Rejected unauthenticated event"
            );
            self.audit(&event, "", AuditOutcome::Rejected, started);
            // Webhook callers get their rejection as an HTTP status instead.
            let task = (event.source == EventSource::Chat)
                .then(|| self.spawn_reply(self.formatter().error(&CommandError::Unauthorized).to(event.channel.clone())));
            return Ack::new(Disposition::Rejected, task);
        }

        let parsed = parse(remainder);
        if parsed.is_empty() || parsed.command == HELP_COMMAND {
            self.audit(&event, HELP_COMMAND, AuditOutcome::Help, started);
            let help = self
                .formatter()
                .help(&config.trigger, self.inner.dispatcher.registry())
                .to(event.channel.clone());
            return Ack::new(Disposition::Help, Some(self.spawn_reply(help)));
        }

        if !self.inner.dispatcher.registry().is_valid(&parsed.command) {
            let err = CommandError::usage(format!(
                "Invalid command `{}`. Type `{} help` to see the available commands.",
                parsed.command, config.trigger
            ));
            info!(request_id = %event.request_id, command = %parsed.command, "[Orchestrator] Invalid command");
            self.audit(&event, &parsed.command, AuditOutcome::failed(err.kind(), err.to_string()), started);
            let reply = self.formatter().error(&err).to(event.channel.clone());
            return Ack::new(Disposition::Invalid, Some(self.spawn_reply(reply)));
        }

        let this = self.clone();
        let task = tokio::spawn(async move { this.run(event, parsed, started).await });
        Ack::new(Disposition::Dispatched, Some(task))
    }

    fn authenticate(&self, event: &InboundEvent) -> bool {
        let config = &self.inner.config;
        match event.source {
            EventSource::Webhook => match &config.auth_token {
                Some(expected) => event.token.as_deref() == Some(expected.as_str()),
                None => true,
            },
            EventSource::Chat => {
                config.allowed_channels.is_empty()
                    || config.allowed_channels.iter().any(|c| c == &event.channel)
            }
        }
    }

    async fn run(&self, event: InboundEvent, parsed: ParsedInput, started: Instant) {
        let ctx = CommandContext {
            request_id: event.request_id,
            channel: event.channel.clone(),
            sender: event.sender.clone(),
            transport: Arc::clone(&self.inner.transport),
        };
        let limit = self.inner.config.command_timeout;
        let command = self
            .inner
            .dispatcher
            .registry()
            .lookup(&parsed.command)
            .map(|c| c.def.key.clone())
            .unwrap_or_else(|| parsed.command.clone());

        let result = match tokio::time::timeout(limit, self.inner.dispatcher.dispatch(&ctx, &parsed)).await {
            Ok(result) => result,
            Err(_) => Err(CommandError::Timeout(limit.as_secs())),
        };

        let reply = match result {
            Ok(reply) => {
                self.audit(&event, &command, AuditOutcome::Replied, started);
                reply
            }
            Err(err) => {
                let cause = redact_sensitive_data(&error_chain(&err));
                if err.is_fault() {
                    error!(request_id = %ctx.request_id, command = %command, kind = err.kind(), cause = %cause, "[Orchestrator] Command failed");
                } else {
                    info!(request_id = %ctx.request_id, command = %command, kind = err.kind(), "[Orchestrator] Command refused: {cause}");
                }
                self.audit(&event, &command, AuditOutcome::failed(err.kind(), &cause), started);
                self.formatter().error(&err).to(ctx.channel.clone())
            }
        };

        self.deliver(reply).await;
    }

    fn spawn_reply(&self, reply: ReplyPayload) -> JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move { this.deliver(reply).await })
    }

    /// Send a reply. Failures are logged only; there is nobody left to tell.
    async fn deliver(&self, reply: ReplyPayload) {
        let transport = &self.inner.transport;
        let limit = self.inner.config.reply_timeout;
        match tokio::time::timeout(limit, transport.send(&reply)).await {
            Ok(Ok(())) => debug!(channel = %reply.channel, "[Orchestrator] Reply delivered"),
            Ok(Err(err)) => error!(
                transport = transport.name(),
                channel = %reply.channel,
                error = %redact_sensitive_data(&err.to_string()),
                "[Orchestrator] Reply delivery failed"
            ),
            Err(_) => error!(
                transport = transport.name(),
                channel = %reply.channel,
                "[Orchestrator] Reply delivery timed out after {}s",
                limit.as_secs()
            ),
        }
    }

    fn formatter(&self) -> ReplyFormatter {
        ReplyFormatter::new(self.inner.transport.max_message_len())
    }

    fn audit(&self, event: &InboundEvent, command: &str, outcome: AuditOutcome, started: Instant) {
        CommandAudit::new(event.request_id, self.inner.transport.name(), &event.channel, &event.sender)
            .command(command)
            .outcome(outcome, started.elapsed())
            .emit();
    }
}

fn error_chain(err: &CommandError) -> String {
    let mut text = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}
