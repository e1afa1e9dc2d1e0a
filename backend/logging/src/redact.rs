//! Log Redaction Layer
//!
//! Scrubs backend API keys, chat tokens and webhook URLs from strings prior to logging.

use regex::Regex;
use std::sync::LazyLock;

static QUERY_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)((?:apikey|api_key|token)=)[^&\s]+").unwrap()
});
static HEADER_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)((?:x-api-key|authorization)\s*[:=]\s*)\S+").unwrap());
static SLACK_HOOK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https://hooks\.slack\.com/services/[A-Za-z0-9/_-]+").unwrap()
});
static SLACK_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"xox[abposr]-[A-Za-z0-9-]+").unwrap());
static DISCORD_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[MNO][A-Za-z0-9_-]{23,27}\.[A-Za-z0-9_-]{6}\.[A-Za-z0-9_-]{27,}").unwrap()
});

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    let mut redacted = SLACK_HOOK_RE
        .replace_all(input, "https://hooks.slack.com/services/[REDACTED]")
        .to_string();
    redacted = QUERY_KEY_RE.replace_all(&redacted, "${1}[REDACTED]").to_string();
    redacted = HEADER_KEY_RE.replace_all(&redacted, "${1}[REDACTED]").to_string();
    redacted = SLACK_TOKEN_RE.replace_all(&redacted, "[REDACTED_TOKEN]").to_string();
    redacted = DISCORD_TOKEN_RE.replace_all(&redacted, "[REDACTED_TOKEN]").to_string();
    redacted
}

/// Mask a secret for display: keeps the first four characters.
pub fn mask_secret(secret: &str) -> String {
    if secret.is_empty() {
        return String::new();
    }
    let head: String = secret.chars().take(4).collect();
    format!("{head}****")
}
