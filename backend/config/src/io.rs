//! Config file location, loading, and first-run template.

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Config file name, both in the working directory and in [`config_dir`].
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Env var that points at an explicit config file.
pub const CONFIG_ENV_VAR: &str = "SHART_CONFIG";

/// Written on first run. Placeholder values fail validation until edited.
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# Shart configuration.
#
# String values may reference environment variables as ${VAR};
# write $${VAR} for a literal.

[shart]
host = "0.0.0.0:4040"
trigger = "shart"
# command_timeout_secs = 15
# backend_timeout_secs = 3
# log_level = "info"
# log_dir = "/var/log/shart"

# Slack: point an outgoing webhook (or slash command) at
# http://<host>/v1/media and paste its token below.
[slack]
token = ""
incoming_webhook = "https://hooks.slack.com/services"
# signing_secret = ""
# webhook_path = "/v1/media"
# bot_name = "ShartBot"

# Discord: uncomment to run the gateway bot instead of (or alongside) Slack.
# [discord]
# token = ""
# allowed_channels = []

[radarr]
host = "http://localhost:7878"
api_key = ""

[sonarr]
host = "http://localhost:8989"
api_key = ""

# CouchPotato serves movies when [radarr] is left out.
# [couchpotato]
# host = "http://localhost:5050"
# api_key = ""
"#;

/// `~/.shart`, or `.shart` when there is no home directory.
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".shart"))
        .unwrap_or_else(|| PathBuf::from(".shart"))
}

/// Resolve the config file path.
/// Priority: explicit flag > `SHART_CONFIG` > `./config.toml` if present > `~/.shart/config.toml`.
pub fn resolve_config_path(flag: Option<&Path>) -> PathBuf {
    let env = std::env::var(CONFIG_ENV_VAR).ok();
    resolve_config_path_with(flag, env.as_deref(), Path::new("."), &config_dir())
}

pub(crate) fn resolve_config_path_with(
    flag: Option<&Path>,
    env: Option<&str>,
    cwd: &Path,
    config_dir: &Path,
) -> PathBuf {
    if let Some(path) = flag {
        return path.to_path_buf();
    }
    if let Some(path) = env.filter(|p| !p.trim().is_empty()) {
        return PathBuf::from(path);
    }
    let local = cwd.join(CONFIG_FILE_NAME);
    if local.is_file() {
        return local;
    }
    config_dir.join(CONFIG_FILE_NAME)
}

/// Read and parse a TOML config into a JSON value tree for the substitution pass.
pub async fn load_config(path: &Path) -> Result<Value> {
    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let parsed = parse_config(&raw)
        .with_context(|| format!("Failed to parse config TOML at: {}", path.display()))?;
    debug!(path = %path.display(), "Loaded config");
    Ok(parsed)
}

pub(crate) fn parse_config(raw: &str) -> Result<Value> {
    let table: toml::Table = toml::from_str(raw)?;
    Ok(serde_json::to_value(table)?)
}

/// Write [`DEFAULT_CONFIG_TEMPLATE`] to `path` (temp file, then rename).
pub async fn write_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await.with_context(|| {
            format!("Failed to create config directory: {}", parent.display())
        })?;
    }

    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, DEFAULT_CONFIG_TEMPLATE.as_bytes())
        .await
        .with_context(|| format!("Failed to write temp config: {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path)
        .await
        .with_context(|| format!("Failed to rename temp config to: {}", path.display()))?;

    info!(path = %path.display(), "Wrote default config");
    Ok(())
}
