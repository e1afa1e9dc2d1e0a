/// Command dispatch: route a parsed command to its registered handler.
use std::sync::Arc;

use async_trait::async_trait;
use shart_core::{ChatTransport, CommandError, ReplyPayload};
use tracing::info;
use uuid::Uuid;

use crate::format::ReplyFormatter;
use crate::registry::CommandRegistry;
use crate::types::ParsedInput;

// ---------------------------------------------------------------------------
// Handler trait
// ---------------------------------------------------------------------------

/// Context passed to every command handler.
#[derive(Clone)]
pub struct CommandContext {
    pub request_id: Uuid,
    pub channel: String,
    pub sender: String,
    /// The transport the command arrived on; replies and history operations go here.
    pub transport: Arc<dyn ChatTransport>,
}

impl CommandContext {
    /// A formatter sized for this context's transport.
    pub fn formatter(&self) -> ReplyFormatter {
        ReplyFormatter::new(self.transport.max_message_len())
    }
}

impl std::fmt::Debug for CommandContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandContext")
            .field("request_id", &self.request_id)
            .field("channel", &self.channel)
            .field("sender", &self.sender)
            .field("transport", &self.transport.name())
            .finish()
    }
}

#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Run the command. `args` are the lowercased tokens after the command name.
    async fn handle(&self, ctx: &CommandContext, args: &[String]) -> Result<ReplyPayload, CommandError>;
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct CommandDispatcher {
    registry: Arc<CommandRegistry>,
}

impl CommandDispatcher {
    pub fn new(registry: Arc<CommandRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Run the handler for `input`. Unknown commands are a usage error.
    pub async fn dispatch(
        &self,
        ctx: &CommandContext,
        input: &ParsedInput,
    ) -> Result<ReplyPayload, CommandError> {
        let Some(command) = self.registry.lookup(&input.command) else {
            return Err(CommandError::usage(format!(
                "Invalid command `{}`. Type `help` to see the available commands.",
                input.command
            )));
        };
        info!(
            request_id = %ctx.request_id,
            command = %command.def.key,
            channel = %ctx.channel,
            "[Commands] Dispatching"
        );
        let reply = command.handler.handle(ctx, &input.args).await?;
        Ok(reply.to(ctx.channel.clone()))
    }
}
