/// Command types.
///
/// The built-in command set is closed (`CommandKind`); the registry itself is
/// keyed by name so extra commands can still be plugged in at startup.

// ---------------------------------------------------------------------------
// Built-in commands
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Search,
    Add,
    Library,
    Quality,
    SetQuality,
    Folders,
    SetFolder,
    Discover,
    Remove,
    Clear,
    Test,
}

impl CommandKind {
    pub const ALL: [CommandKind; 11] = [
        CommandKind::Search,
        CommandKind::Add,
        CommandKind::Library,
        CommandKind::Quality,
        CommandKind::SetQuality,
        CommandKind::Folders,
        CommandKind::SetFolder,
        CommandKind::Discover,
        CommandKind::Remove,
        CommandKind::Clear,
        CommandKind::Test,
    ];

    /// Canonical lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            CommandKind::Search => "search",
            CommandKind::Add => "add",
            CommandKind::Library => "show",
            CommandKind::Quality => "quality",
            CommandKind::SetQuality => "set-quality",
            CommandKind::Folders => "folders",
            CommandKind::SetFolder => "set-folder",
            CommandKind::Discover => "discover",
            CommandKind::Remove => "remove",
            CommandKind::Clear => "clear",
            CommandKind::Test => "test",
        }
    }

    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            CommandKind::Library => &["list", "library"],
            CommandKind::Clear => &["delete-messages"],
            _ => &[],
        }
    }

    pub fn usage(&self) -> &'static str {
        match self {
            CommandKind::Search => "search <movie|show> <title>",
            CommandKind::Add => "add <movie|show> <id>",
            CommandKind::Library => "show <movie|show> [filter] [page]",
            CommandKind::Quality => "quality <movie|show>",
            CommandKind::SetQuality => "set-quality <movie|show> <profile-id>",
            CommandKind::Folders => "folders <movie|show>",
            CommandKind::SetFolder => "set-folder <movie|show> <path|folder-id>",
            CommandKind::Discover => "discover <movie|show>",
            CommandKind::Remove => "remove <movie|show> <id>",
            CommandKind::Clear => "clear [count]",
            CommandKind::Test => "test [movie|show]",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            CommandKind::Search => "Search for a title by name.",
            CommandKind::Add => "Add a title using the default quality profile and root folder.",
            CommandKind::Library => "List your library, optionally filtered and paged.",
            CommandKind::Quality => "List the available quality profiles.",
            CommandKind::SetQuality => "Set the default quality profile used by `add`.",
            CommandKind::Folders => "List the configured root folders.",
            CommandKind::SetFolder => "Set the default root folder used by `add`.",
            CommandKind::Discover => "Show recommended titles.",
            CommandKind::Remove => "Remove a title from your library (files are kept).",
            CommandKind::Clear => "Delete recent messages in this channel.",
            CommandKind::Test => "Check the connection to your media servers.",
        }
    }
}

// ---------------------------------------------------------------------------
// Command definition
// ---------------------------------------------------------------------------

/// Registry entry metadata, used for lookup and help text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDef {
    /// Unique canonical name (e.g. "search", "set-quality").
    pub key: String,
    pub aliases: Vec<String>,
    pub usage: String,
    pub description: String,
}

impl CommandDef {
    pub fn new(key: impl Into<String>, usage: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            aliases: Vec::new(),
            usage: usage.into(),
            description: description.into(),
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Key followed by aliases.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.key.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}

impl From<CommandKind> for CommandDef {
    fn from(kind: CommandKind) -> Self {
        kind.aliases().iter().fold(
            CommandDef::new(kind.name(), kind.usage(), kind.description()),
            |def, alias| def.with_alias(*alias),
        )
    }
}

// ---------------------------------------------------------------------------
// Parsed input
// ---------------------------------------------------------------------------

/// A command token plus its ordered arguments, all lowercased.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedInput {
    pub command: String,
    pub args: Vec<String>,
}

impl ParsedInput {
    pub fn is_empty(&self) -> bool {
        self.command.is_empty()
    }

    /// Everything after the command, re-joined with single spaces.
    pub fn rest(&self) -> String {
        self.args.join(" ")
    }
}
