//! Config redaction: produce safe-to-log config snapshots by masking secrets.

use serde_json::Value;

/// Keys whose string values are secrets.
static SENSITIVE_KEYS: &[&str] = &[
    "api_key",
    "apiKey",
    "token",
    "signing_secret",
    "incoming_webhook",
    "secret",
    "password",
];

/// Redact a config value tree, replacing sensitive strings with a short hint.
pub fn redact(value: &Value) -> Value {
    redact_recursive(value, "")
}

fn is_sensitive_key(key: &str) -> bool {
    SENSITIVE_KEYS.iter().any(|k| k.eq_ignore_ascii_case(key))
}

fn redact_string(s: &str, key: &str) -> Value {
    if !is_sensitive_key(key) || s.is_empty() {
        return Value::String(s.to_string());
    }
    // First 4 chars as a hint.
    let hint = if s.chars().count() > 4 {
        format!("{}***", s.chars().take(4).collect::<String>())
    } else {
        "***".to_string()
    };
    Value::String(hint)
}

fn redact_recursive(value: &Value, key: &str) -> Value {
    match value {
        Value::String(s) => redact_string(s, key),
        Value::Array(arr) => Value::Array(arr.iter().map(|v| redact_recursive(v, key)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), redact_recursive(v, k)))
                .collect(),
        ),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn redacts_api_key() {
        let v = json!({ "radarr": { "host": "http://nas:7878", "api_key": "0123456789abcdef" } });
        let redacted = redact(&v);
        assert_eq!(redacted["radarr"]["api_key"], "0123***");
        assert_eq!(redacted["radarr"]["host"], "http://nas:7878");
    }

    #[test]
    fn redacts_slack_secrets() {
        let v = json!({ "slack": {
            "token": "abc",
            "incoming_webhook": "https://hooks.slack.com/services/T0/B0/xyz",
            "bot_name": "ShartBot",
        }});
        let redacted = redact(&v);
        assert_eq!(redacted["slack"]["token"], "***");
        assert_eq!(redacted["slack"]["incoming_webhook"], "http***");
        assert_eq!(redacted["slack"]["bot_name"], "ShartBot");
    }

    #[test]
    fn leaves_empty_secrets_empty() {
        let redacted = redact(&json!({ "discord": { "token": "" } }));
        assert_eq!(redacted["discord"]["token"], "");
    }
}
