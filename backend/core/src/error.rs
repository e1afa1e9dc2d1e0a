use thiserror::Error;

use crate::types::Capability;

/// Failure talking to a media backend (Radarr, Sonarr, ...).
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("{backend} returned HTTP {status}: {body}")]
    Http {
        backend: String,
        status: u16,
        body: String,
    },

    #[error("{backend} request failed: {message}")]
    Network { backend: String, message: String },

    #[error("{backend} returned an unreadable response: {message}")]
    Decode { backend: String, message: String },

    #[error("{backend} did not respond within {secs}s")]
    Timeout { backend: String, secs: u64 },

    #[error("{backend} does not support {capability}")]
    Unsupported {
        backend: String,
        capability: Capability,
    },

    #[error("{0}")]
    NotFound(String),
}

/// Failure delivering a reply or touching message history on the chat platform.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("chat platform returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("chat platform request failed: {0}")]
    Network(String),

    #[error("invalid channel id `{0}`")]
    InvalidChannel(String),

    #[error("{0} is not supported by this chat platform")]
    Unsupported(&'static str),

    #[error("chat platform did not respond within {0}s")]
    Timeout(u64),
}

/// Recoverable outcome of a command; always turned into a reply, never fatal.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Missing or malformed arguments, unknown media type/filter/command.
    #[error("{0}")]
    Usage(String),

    /// A setup step (quality profile, root folder) has not been run yet.
    #[error("{0}")]
    Precondition(String),

    #[error("{message}")]
    Backend {
        message: String,
        #[source]
        source: BackendError,
    },

    #[error("{0}")]
    Unsupported(String),

    #[error("not authorized")]
    Unauthorized,

    #[error("command did not finish within {0}s")]
    Timeout(u64),

    #[error("{message}")]
    Transport {
        message: String,
        #[source]
        source: TransportError,
    },
}

impl CommandError {
    pub fn usage(message: impl Into<String>) -> Self {
        CommandError::Usage(message.into())
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        CommandError::Precondition(message.into())
    }

    /// Short tag for logs and audit records.
    pub fn kind(&self) -> &'static str {
        match self {
            CommandError::Usage(_) => "usage",
            CommandError::Precondition(_) => "precondition",
            CommandError::Backend { .. } => "backend",
            CommandError::Unsupported(_) => "unsupported",
            CommandError::Unauthorized => "auth",
            CommandError::Timeout(_) => "timeout",
            CommandError::Transport { .. } => "transport",
        }
    }

    /// Whether operators should see this in the error log. User mistakes are not faults.
    pub fn is_fault(&self) -> bool {
        matches!(
            self,
            CommandError::Backend { .. } | CommandError::Timeout(_) | CommandError::Transport { .. }
        )
    }
}

impl From<BackendError> for CommandError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Unsupported { .. } => CommandError::Unsupported(err.to_string()),
            BackendError::NotFound(message) => CommandError::Usage(message),
            BackendError::Timeout { ref backend, .. } => CommandError::Backend {
                message: format!("{backend} took too long to answer, try again later"),
                source: err,
            },
            other => {
                let message = match &other {
                    BackendError::Http { backend, .. }
                    | BackendError::Network { backend, .. }
                    | BackendError::Decode { backend, .. } => {
                        format!("Request to {backend} failed")
                    }
                    _ => "Request to the media server failed".to_string(),
                };
                CommandError::Backend {
                    message,
                    source: other,
                }
            }
        }
    }
}

impl From<TransportError> for CommandError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Unsupported(what) => {
                CommandError::Unsupported(format!("{what} is not supported on this chat platform"))
            }
            other => CommandError::Transport {
                message: "The chat platform rejected the request".to_string(),
                source: other,
            },
        }
    }
}
