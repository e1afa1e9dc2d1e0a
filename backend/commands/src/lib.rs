pub mod detection;
pub mod dispatch;
pub mod format;
pub mod handlers;
pub mod orchestrator;
pub mod registry;
pub mod services;
pub mod settings;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use detection::{match_optional_trigger, match_trigger, parse, TriggerMatch};
pub use dispatch::{CommandContext, CommandDispatcher, CommandHandler};
pub use format::ReplyFormatter;
pub use handlers::{
    AddHandler, ClearHandler, DiscoverHandler, FoldersHandler, LibraryHandler, QualityHandler,
    RemoveHandler, SearchHandler, SetFolderHandler, SetQualityHandler, TestHandler,
};
pub use orchestrator::{Ack, Disposition, Orchestrator, OrchestratorConfig};
pub use registry::{CommandRegistry, CommandRegistryBuilder, RegisteredCommand, RegistryError};
pub use services::MediaServices;
pub use settings::{DefaultSettings, MediaDefaults};
pub use types::{CommandDef, CommandKind, ParsedInput};

use std::sync::Arc;

/// Build a registry pre-wired with every built-in command.
pub fn build_default_registry(
    services: Arc<MediaServices>,
    settings: Arc<DefaultSettings>,
) -> Result<CommandRegistry, RegistryError> {
    let mut builder = CommandRegistry::builder();
    for kind in CommandKind::ALL {
        builder = builder.register(CommandDef::from(kind), handler_for(kind, &services, &settings))?;
    }
    Ok(builder.build())
}

fn handler_for(
    kind: CommandKind,
    services: &Arc<MediaServices>,
    settings: &Arc<DefaultSettings>,
) -> Arc<dyn CommandHandler> {
    let services = Arc::clone(services);
    let settings = Arc::clone(settings);
    match kind {
        CommandKind::Search => Arc::new(SearchHandler { services }),
        CommandKind::Add => Arc::new(AddHandler { services, settings }),
        CommandKind::Library => Arc::new(LibraryHandler { services }),
        CommandKind::Quality => Arc::new(QualityHandler { services }),
        CommandKind::SetQuality => Arc::new(SetQualityHandler { settings }),
        CommandKind::Folders => Arc::new(FoldersHandler { services }),
        CommandKind::SetFolder => Arc::new(SetFolderHandler { services, settings }),
        CommandKind::Discover => Arc::new(DiscoverHandler { services }),
        CommandKind::Remove => Arc::new(RemoveHandler { services }),
        CommandKind::Clear => Arc::new(ClearHandler),
        CommandKind::Test => Arc::new(TestHandler { services }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_builtin_kind_is_reachable() {
        let registry = build_default_registry(
            Arc::new(MediaServices::new()),
            Arc::new(DefaultSettings::new()),
        )
        .unwrap();
        for kind in CommandKind::ALL {
            assert!(registry.is_valid(kind.name()), "{} missing", kind.name());
            for alias in kind.aliases() {
                assert!(registry.is_valid(alias), "alias {alias} missing");
            }
        }
        assert_eq!(registry.names().len(), CommandKind::ALL.len());
    }
}
