//! Config defaults: fills unset values in a freshly loaded config.

use crate::schema::ShartConfig;

pub const DEFAULT_HOST: &str = "0.0.0.0:4040";

pub const DEFAULT_TRIGGER: &str = "shart";

/// Upper bound on one command, backend round-trips included.
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 15;

/// Per-request timeout for Radarr/Sonarr calls.
pub const DEFAULT_BACKEND_TIMEOUT_SECS: u64 = 3;

pub const DEFAULT_LOG_LEVEL: &str = "info";

pub const DEFAULT_WEBHOOK_PATH: &str = "/v1/media";

pub const DEFAULT_BOT_NAME: &str = "ShartBot";

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: ShartConfig) -> ShartConfig {
    let config = apply_shart_defaults(config);
    apply_slack_defaults(config)
}

fn apply_shart_defaults(mut config: ShartConfig) -> ShartConfig {
    let shart = &mut config.shart;
    shart.host.get_or_insert_with(|| DEFAULT_HOST.to_string());
    shart.trigger.get_or_insert_with(|| DEFAULT_TRIGGER.to_string());
    shart.command_timeout_secs.get_or_insert(DEFAULT_COMMAND_TIMEOUT_SECS);
    shart.backend_timeout_secs.get_or_insert(DEFAULT_BACKEND_TIMEOUT_SECS);
    shart.log_level.get_or_insert_with(|| DEFAULT_LOG_LEVEL.to_string());
    config
}

/// Only touches an existing `[slack]` table; defaults never enable a transport.
fn apply_slack_defaults(mut config: ShartConfig) -> ShartConfig {
    if let Some(slack) = &mut config.slack {
        slack.webhook_path.get_or_insert_with(|| DEFAULT_WEBHOOK_PATH.to_string());
        slack.bot_name.get_or_insert_with(|| DEFAULT_BOT_NAME.to_string());
    }
    config
}
