//! Shart runtime configuration schema.
//!
//! Typed for serde TOML/JSON deserialization. Every leaf is optional so a
//! partially written file still parses; [`crate::apply_all_defaults`] fills
//! the gaps and [`crate::validate`] reports what is still missing.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::defaults::{
    DEFAULT_BACKEND_TIMEOUT_SECS, DEFAULT_BOT_NAME, DEFAULT_COMMAND_TIMEOUT_SECS, DEFAULT_HOST,
    DEFAULT_LOG_LEVEL, DEFAULT_TRIGGER, DEFAULT_WEBHOOK_PATH,
};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShartConfig {
    /// Process-wide settings.
    #[serde(default)]
    pub shart: ShartSection,

    /// Slack outgoing webhook + incoming webhook transport.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slack: Option<SlackSection>,

    /// Discord gateway transport.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discord: Option<DiscordSection>,

    /// Movie backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radarr: Option<BackendSection>,

    /// Show backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sonarr: Option<BackendSection>,

    /// Movie backend used when Radarr is not configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub couchpotato: Option<BackendSection>,
}

impl ShartConfig {
    pub fn radarr(&self) -> Option<&BackendSection> {
        self.radarr.as_ref().filter(|b| b.is_configured())
    }

    pub fn sonarr(&self) -> Option<&BackendSection> {
        self.sonarr.as_ref().filter(|b| b.is_configured())
    }

    /// CouchPotato, unless Radarr already serves movies.
    pub fn couchpotato(&self) -> Option<&BackendSection> {
        if self.radarr().is_some() {
            return None;
        }
        self.couchpotato.as_ref().filter(|b| b.is_configured())
    }
}

// ---------------------------------------------------------------------------
// [shart]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShartSection {
    /// Bind address of the webhook listener, e.g. "0.0.0.0:4040".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    /// Keyword that must open a chat message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_timeout_secs: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend_timeout_secs: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// Directory for the rolling JSON log. Console only when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
}

impl ShartSection {
    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_HOST)
    }

    pub fn trigger(&self) -> &str {
        self.trigger.as_deref().unwrap_or(DEFAULT_TRIGGER)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs.unwrap_or(DEFAULT_COMMAND_TIMEOUT_SECS))
    }

    pub fn backend_timeout(&self) -> Duration {
        Duration::from_secs(self.backend_timeout_secs.unwrap_or(DEFAULT_BACKEND_TIMEOUT_SECS))
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }
}

// ---------------------------------------------------------------------------
// [slack]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlackSection {
    /// Shared token Slack includes in every outgoing-webhook post.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Enables `X-Slack-Signature` verification when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signing_secret: Option<String>,

    /// Incoming webhook URL replies are posted to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incoming_webhook: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_name: Option<String>,
}

impl SlackSection {
    pub fn webhook_path(&self) -> &str {
        self.webhook_path.as_deref().unwrap_or(DEFAULT_WEBHOOK_PATH)
    }

    pub fn bot_name(&self) -> &str {
        self.bot_name.as_deref().unwrap_or(DEFAULT_BOT_NAME)
    }
}

// ---------------------------------------------------------------------------
// [discord]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscordSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Channel ids the bot answers in. Empty means every channel.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_channels: Vec<String>,
}

// ---------------------------------------------------------------------------
// [radarr] / [sonarr]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackendSection {
    /// Base URL, e.g. "http://localhost:7878".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl BackendSection {
    pub fn is_configured(&self) -> bool {
        is_set(&self.host)
    }
}

/// `Some` and not blank.
pub(crate) fn is_set(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_partial_toml() {
        let cfg: ShartConfig = toml::from_str(
            r#"
            [shart]
            trigger = "bot"

            [radarr]
            host = "http://localhost:7878"
            api_key = "abc"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.shart.trigger(), "bot");
        assert_eq!(cfg.shart.host(), DEFAULT_HOST);
        assert!(cfg.radarr().is_some());
        assert!(cfg.sonarr().is_none());
        assert!(cfg.slack.is_none());
    }

    #[test]
    fn blank_backend_host_is_not_configured() {
        let cfg = ShartConfig {
            sonarr: Some(BackendSection {
                host: Some("  ".into()),
                api_key: Some("k".into()),
            }),
            ..Default::default()
        };
        assert!(cfg.sonarr().is_none());
    }

    #[test]
    fn timeouts_fall_back_to_defaults() {
        let section = ShartSection::default();
        assert_eq!(section.command_timeout(), Duration::from_secs(DEFAULT_COMMAND_TIMEOUT_SECS));
        assert_eq!(section.backend_timeout(), Duration::from_secs(DEFAULT_BACKEND_TIMEOUT_SECS));
    }
}
