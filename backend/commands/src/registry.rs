/// Command registry: name and alias lookup for every registered handler.
///
/// Built once at startup through [`CommandRegistryBuilder`] and read-only
/// afterwards, so it can be shared behind an `Arc` without locking.
use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::dispatch::CommandHandler;
use crate::types::CommandDef;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("command name `{name}` is registered twice")]
    DuplicateCommand { name: String },
    #[error("command name must not be empty")]
    EmptyName,
}

/// A definition paired with the handler that executes it.
#[derive(Clone)]
pub struct RegisteredCommand {
    pub def: CommandDef,
    pub handler: Arc<dyn CommandHandler>,
}

impl std::fmt::Debug for RegisteredCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredCommand").field("def", &self.def).finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct CommandRegistryBuilder {
    commands: Vec<RegisteredCommand>,
    index: HashMap<String, usize>,
}

impl CommandRegistryBuilder {
    /// Add a command. Fails if its key or any alias is already taken.
    pub fn register(
        mut self,
        def: CommandDef,
        handler: Arc<dyn CommandHandler>,
    ) -> Result<Self, RegistryError> {
        let names: Vec<String> = def.names().map(str::to_lowercase).collect();
        for (i, name) in names.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(RegistryError::EmptyName);
            }
            if self.index.contains_key(name) || names[..i].contains(name) {
                return Err(RegistryError::DuplicateCommand { name: name.clone() });
            }
        }

        let slot = self.commands.len();
        for name in names {
            self.index.insert(name, slot);
        }
        self.commands.push(RegisteredCommand { def, handler });
        Ok(self)
    }

    pub fn build(self) -> CommandRegistry {
        CommandRegistry {
            commands: self.commands,
            index: self.index,
        }
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

pub struct CommandRegistry {
    commands: Vec<RegisteredCommand>,
    index: HashMap<String, usize>,
}

impl CommandRegistry {
    pub fn builder() -> CommandRegistryBuilder {
        CommandRegistryBuilder::default()
    }

    /// Find a command by canonical name or alias, ignoring case.
    pub fn lookup(&self, name: &str) -> Option<&RegisteredCommand> {
        self.index
            .get(&name.to_lowercase())
            .and_then(|slot| self.commands.get(*slot))
    }

    pub fn is_valid(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Canonical names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.commands.iter().map(|c| c.def.key.as_str()).collect()
    }

    pub fn all(&self) -> &[RegisteredCommand] {
        &self.commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::EchoHandler;

    fn def(key: &str) -> CommandDef {
        CommandDef::new(key, key, "test command")
    }

    #[test]
    fn duplicate_key_fails_at_build_time() {
        let result = CommandRegistry::builder()
            .register(def("search"), Arc::new(EchoHandler))
            .and_then(|b| b.register(def("search"), Arc::new(EchoHandler)));
        assert_eq!(
            result.err(),
            Some(RegistryError::DuplicateCommand { name: "search".into() })
        );
    }

    #[test]
    fn alias_colliding_with_key_fails() {
        let result = CommandRegistry::builder()
            .register(def("show"), Arc::new(EchoHandler))
            .and_then(|b| b.register(def("library").with_alias("SHOW"), Arc::new(EchoHandler)));
        assert!(matches!(result, Err(RegistryError::DuplicateCommand { name }) if name == "show"));
    }

    #[test]
    fn empty_name_is_rejected() {
        let result = CommandRegistry::builder().register(def(" "), Arc::new(EchoHandler));
        assert_eq!(result.err(), Some(RegistryError::EmptyName));
    }

    #[test]
    fn alias_and_key_resolve_to_the_same_handler() {
        let registry = CommandRegistry::builder()
            .register(def("show").with_alias("list"), Arc::new(EchoHandler))
            .unwrap()
            .build();
        let by_key = registry.lookup("show").unwrap();
        let by_alias = registry.lookup("LIST").unwrap();
        assert!(Arc::ptr_eq(&by_key.handler, &by_alias.handler));
        assert_eq!(by_alias.def.key, "show");
        assert_eq!(registry.names(), vec!["show"]);
        assert!(!registry.is_valid("frobnicate"));
    }
}
