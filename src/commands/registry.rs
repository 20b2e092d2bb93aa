// src/commands/registry.rs
use std::collections::HashMap;
use std::sync::Arc;

use super::types::Command;

pub struct CommandRegistry {
    commands: HashMap<String, Arc<dyn Command>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            commands: HashMap::new(),
        }
    }

    /// Register a command, replacing any command of the same name.
    pub fn register(&mut self, cmd: Arc<dyn Command>) {
        self.commands.insert(cmd.name().to_string(), cmd);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Command>> {
        self.commands.get(name).cloned()
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.commands.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

use super::echo::EchoCommand;
use super::env::EnvCommand;
use super::let_cmd::LetCommand;

/// Register the built-in commands
pub fn register_builtins(registry: &mut CommandRegistry) {
    registry.register(Arc::new(EchoCommand));
    registry.register(Arc::new(LetCommand));
    registry.register(Arc::new(EnvCommand));
}

/// Create a registry holding the built-in commands
pub fn create_default_registry() -> CommandRegistry {
    let mut registry = CommandRegistry::new();
    register_builtins(&mut registry);
    registry
}
