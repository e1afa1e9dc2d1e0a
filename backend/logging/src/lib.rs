//! Logging for the Shart media bot.
//!
//! Global subscriber setup (console plus rolling NDJSON file), secret
//! redaction, and the per-command audit record.

pub mod audit;
pub mod logger;
pub mod redact;

pub use audit::{AuditOutcome, CommandAudit, AUDIT_TARGET};
pub use logger::init_logger;
pub use redact::{mask_secret, redact_sensitive_data};
