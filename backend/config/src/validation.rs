//! Config validation: collects every problem in one pass with field paths.

use crate::schema::{is_set, BackendSection, ShartConfig};
use thiserror::Error;

/// Incoming-webhook URL shipped in the default template.
pub const PLACEHOLDER_WEBHOOK: &str = "https://hooks.slack.com/services";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &ShartConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_shart(config, &mut report);
    validate_transports(config, &mut report);
    let couchpotato = config.couchpotato.as_ref().filter(|s| has_values(s));
    if couchpotato.is_some() {
        validate_backend("couchpotato", "movie", couchpotato, &mut report);
    }
    if couchpotato.is_none() || config.radarr.as_ref().is_some_and(has_values) {
        validate_backend("radarr", "movie", config.radarr.as_ref(), &mut report);
    }
    if couchpotato.is_some() && config.radarr.as_ref().is_some_and(has_values) {
        report.warn("couchpotato", "radarr serves movies; couchpotato is ignored");
    }
    validate_backend("sonarr", "show", config.sonarr.as_ref(), &mut report);
    report
}

fn has_values(section: &BackendSection) -> bool {
    is_set(&section.host) || is_set(&section.api_key)
}

fn validate_shart(config: &ShartConfig, report: &mut ValidationReport) {
    let shart = &config.shart;
    if shart.trigger.as_deref().is_some_and(|t| t.trim().is_empty()) {
        report.error("shart.trigger", "Trigger cannot be empty");
    }
    if shart.command_timeout_secs == Some(0) {
        report.error("shart.command_timeout_secs", "command_timeout_secs must be >= 1");
    }
    if shart.backend_timeout_secs == Some(0) {
        report.error("shart.backend_timeout_secs", "backend_timeout_secs must be >= 1");
    }
    if let Some(level) = &shart.log_level {
        if !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
            report.warn(
                "shart.log_level",
                format!("Unknown log level '{level}'. Use one of {}", LOG_LEVELS.join(", ")),
            );
        }
    }
}

fn validate_transports(config: &ShartConfig, report: &mut ValidationReport) {
    if config.slack.is_none() && config.discord.is_none() {
        report.error("", "No chat transport configured; add a [slack] or [discord] section");
    }

    if let Some(slack) = &config.slack {
        if !is_set(&slack.token) {
            report.error("slack.token", "Slack verification token is required");
        }
        match slack.incoming_webhook.as_deref().map(str::trim) {
            None | Some("") => {
                report.error("slack.incoming_webhook", "Slack incoming webhook URL is required")
            }
            Some(url) if url.trim_end_matches('/') == PLACEHOLDER_WEBHOOK => report.error(
                "slack.incoming_webhook",
                "Replace the placeholder incoming webhook URL with your own",
            ),
            Some(_) => {}
        }
        if let Some(path) = &slack.webhook_path {
            if !path.starts_with('/') {
                report.error("slack.webhook_path", "webhook_path must start with '/'");
            }
        }
    }

    if let Some(discord) = &config.discord {
        if !is_set(&discord.token) {
            report.error("discord.token", "Discord bot token is required");
        }
    }
}

fn validate_backend(
    name: &str,
    media: &str,
    section: Option<&BackendSection>,
    report: &mut ValidationReport,
) {
    let Some(section) = section.filter(|s| has_values(s)) else {
        report.warn(name, format!("{name} is not configured; {media} commands are unavailable"));
        return;
    };

    match section.host.as_deref().map(str::trim) {
        None | Some("") => report.error(format!("{name}.host"), "host is required when api_key is set"),
        Some(host) if !(host.starts_with("http://") || host.starts_with("https://")) => report.error(
            format!("{name}.host"),
            format!("host '{host}' must start with http:// or https://"),
        ),
        Some(_) => {}
    }
    if !is_set(&section.api_key) {
        report.error(format!("{name}.api_key"), "api_key is required");
    }
}
