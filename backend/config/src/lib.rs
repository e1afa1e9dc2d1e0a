//! `shart-config`: Shart runtime configuration management.
//!
//! Provides:
//! - Typed config schema (`[shart]`, `[slack]`, `[discord]`, `[radarr]`, `[sonarr]`, `[couchpotato]`)
//! - TOML loading and the first-run default file
//! - `${ENV_VAR}` substitution
//! - Command-line overrides
//! - Default value application
//! - Validation with field paths
//! - Config redaction for safe logging

pub mod defaults;
pub mod env;
pub mod io;
pub mod overrides;
pub mod redact;
pub mod schema;
pub mod validation;

pub use defaults::apply_all_defaults;
pub use env::{resolve_env_vars, resolve_env_vars_with, MissingEnvVarError};
pub use io::{config_dir, load_config, resolve_config_path, write_default_config, DEFAULT_CONFIG_TEMPLATE};
pub use overrides::ConfigOverrides;
pub use redact::redact;
pub use schema::{BackendSection, DiscordSection, ShartConfig, ShartSection, SlackSection};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Result of [`load`].
#[derive(Debug)]
pub enum Loaded {
    Config(ShartConfig),
    /// No file existed; a default one was written here and must be edited first.
    Created(PathBuf),
}

/// Load a config file and substitute env vars. Writes the default template when missing.
pub async fn load(path: &Path) -> Result<Loaded> {
    if !path.exists() {
        write_default_config(path).await?;
        return Ok(Loaded::Created(path.to_path_buf()));
    }

    let value = load_config(path).await?;
    Ok(Loaded::Config(from_value(value)?))
}

fn from_value(value: Value) -> Result<ShartConfig> {
    let value = resolve_env_vars(&value).context("Failed to resolve env vars in config")?;
    serde_json::from_value(value).context("Failed to deserialize config")
}

/// Apply defaults and validate. Warnings are logged; any error fails with every problem listed.
pub fn prepare(config: ShartConfig) -> Result<ShartConfig> {
    let config = apply_all_defaults(config);

    let report = validate(&config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }
    if !report.is_valid() {
        let problems: Vec<String> = report.errors.iter().map(ToString::to_string).collect();
        bail!("Invalid configuration:\n  {}", problems.join("\n  "));
    }

    Ok(config)
}

/// JSON snapshot with secrets masked.
pub fn redacted_snapshot(config: &ShartConfig) -> Value {
    serde_json::to_value(config)
        .map(|value| redact(&value))
        .unwrap_or(Value::Null)
}
