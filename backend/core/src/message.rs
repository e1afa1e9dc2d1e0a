use serde::{Deserialize, Serialize};

/// Colour hint for an attachment. Each transport maps it to its own palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Good,
    Warning,
    Danger,
}

impl Color {
    /// Slack's named attachment colours.
    pub fn slack_name(&self) -> &'static str {
        match self {
            Color::Good => "good",
            Color::Warning => "warning",
            Color::Danger => "danger",
        }
    }

    pub fn rgb(&self) -> u32 {
        match self {
            Color::Good => 0x2EB886,
            Color::Warning => 0xDAA038,
            Color::Danger => 0xA30200,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub title: String,
    pub value: String,
    pub short: bool,
}

/// A presentational button. `command` is the text a user would type to do the same thing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub label: String,
    pub command: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub title: String,
    pub text: String,
    pub color: Option<Color>,
    pub fields: Vec<Field>,
    pub actions: Vec<Action>,
}

impl Attachment {
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_field(mut self, title: impl Into<String>, value: impl Into<String>, short: bool) -> Self {
        self.fields.push(Field {
            title: title.into(),
            value: value.into(),
            short,
        });
        self
    }

    pub fn with_action(mut self, label: impl Into<String>, command: impl Into<String>) -> Self {
        self.actions.push(Action {
            label: label.into(),
            command: command.into(),
        });
        self
    }
}

/// Transport-neutral outbound message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplyPayload {
    /// Destination channel id or name, filled in by the dispatcher.
    pub channel: String,
    pub title: Option<String>,
    pub text: String,
    pub attachments: Vec<Attachment>,
}

impl ReplyPayload {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn to(mut self, channel: impl Into<String>) -> Self {
        self.channel = channel.into();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }
}

/// Result of a bulk message deletion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteReport {
    pub deleted: usize,
    pub failed: usize,
}
