//! Command Audit
//!
//! One structured record per handled event, emitted on the `shart::audit`
//! target so it can be routed or filtered separately from diagnostics.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::redact::redact_sensitive_data;

pub const AUDIT_TARGET: &str = "shart::audit";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AuditOutcome {
    /// The handler produced a reply.
    Replied,
    /// Help was shown instead of running a handler.
    Help,
    /// Authentication failed; nothing ran.
    Rejected,
    /// The command failed; `kind` is the error category.
    Failed { kind: String, message: String },
}

impl AuditOutcome {
    pub fn failed(kind: impl Into<String>, message: impl AsRef<str>) -> Self {
        AuditOutcome::Failed {
            kind: kind.into(),
            message: redact_sensitive_data(message.as_ref()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CommandAudit {
    pub request_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub transport: String,
    pub channel: String,
    pub sender: String,
    /// Canonical command name, empty when no command was parsed.
    pub command: String,
    pub outcome: AuditOutcome,
    pub elapsed_ms: u64,
}

impl CommandAudit {
    pub fn new(
        request_id: Uuid,
        transport: impl Into<String>,
        channel: impl Into<String>,
        sender: impl Into<String>,
    ) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
            transport: transport.into(),
            channel: channel.into(),
            sender: sender.into(),
            command: String::new(),
            outcome: AuditOutcome::Replied,
            elapsed_ms: 0,
        }
    }

    pub fn command(mut self, command: impl Into<String>) -> Self {
        self.command = command.into();
        self
    }

    pub fn outcome(mut self, outcome: AuditOutcome, elapsed: std::time::Duration) -> Self {
        self.outcome = outcome;
        self.elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Serialize the record and hand it to the tracing system.
    pub fn emit(&self) {
        let entry = serde_json::to_string(self).unwrap_or_else(|e| format!("{{\"error\":\"{e}\"}}"));
        info!(
            target: AUDIT_TARGET,
            request_id = %self.request_id,
            command = %self.command,
            audit = %entry,
            "Command handled"
        );
    }
}
