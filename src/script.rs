//! Script Environment
//!
//! Main entry point for running ntscript files.
//! Ties together the command registry, the parser and the VM.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use crate::ast::types::CommandNode;
use crate::commands::registry::{create_default_registry, CommandRegistry};
use crate::interpreter::environment::Environment;
use crate::interpreter::errors::RunError;
use crate::interpreter::execution_engine::Vm;
use crate::interpreter::namespace::InternalNamespace;
use crate::parser::parser::Parser;
use crate::parser::types::{ParseException, ParseLimits};

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("parse err: {0}")]
    Parse(#[from] ParseException),

    #[error("run err: {0}")]
    Run(#[from] RunError),
}

/// Options for creating a [`Script`].
#[derive(Default)]
pub struct ScriptOptions {
    /// Internal namespace (defaults to [`InternalNamespace::default`])
    pub namespace: Option<InternalNamespace>,
    /// Parser limits
    pub limits: Option<ParseLimits>,
    /// Command registry (defaults to the built-in commands)
    pub registry: Option<CommandRegistry>,
}

/// Parses and runs scripts. Each call gets a fresh symbol table and a
/// fresh environment; nothing carries over between runs.
pub struct Script {
    registry: CommandRegistry,
    namespace: Arc<InternalNamespace>,
    limits: ParseLimits,
}

impl Script {
    pub fn new(options: ScriptOptions) -> Self {
        Self {
            registry: options.registry.unwrap_or_else(create_default_registry),
            namespace: Arc::new(options.namespace.unwrap_or_default()),
            limits: options.limits.unwrap_or_default(),
        }
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn namespace(&self) -> &InternalNamespace {
        &self.namespace
    }

    pub fn parse(&self, text: &str) -> Result<Vec<CommandNode>, ParseException> {
        self.parse_reader(text.as_bytes())
    }

    pub fn parse_reader<R: BufRead>(&self, reader: R) -> Result<Vec<CommandNode>, ParseException> {
        Parser::new(&self.registry, &self.namespace)
            .with_limits(self.limits)
            .parse_reader(reader)
    }

    /// Parse and run `text`, returning the final environment.
    pub fn exec(&self, text: &str, out: &mut dyn Write) -> Result<Environment, Error> {
        let commands = self.parse(text)?;
        self.run(commands, out)
    }

    /// Parse and run a script file.
    pub fn exec_file(&self, path: impl AsRef<Path>, out: &mut dyn Write) -> Result<Environment, Error> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let commands = self.parse_reader(BufReader::new(file))?;
        tracing::debug!(file = %path.display(), commands = commands.len(), "loaded script");
        self.run(commands, out)
    }

    fn run(&self, commands: Vec<CommandNode>, out: &mut dyn Write) -> Result<Environment, Error> {
        let mut vm = Vm::new(commands, Arc::clone(&self.namespace));
        vm.run(out)?;
        Ok(vm.into_env())
    }
}

impl Default for Script {
    fn default() -> Self {
        Self::new(ScriptOptions::default())
    }
}
