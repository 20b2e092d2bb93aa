//! Execution Engine
//!
//! Runs a parsed script: each command in file order, against one
//! environment, stopping at the first failure.
//!
//! Ready -> run -> Completed | Failed(line, command)

use std::io::Write;
use std::sync::Arc;

use crate::ast::types::CommandNode;
use crate::commands::types::CommandContext;
use crate::interpreter::environment::Environment;
use crate::interpreter::errors::{EvalError, RunError, VmState};
use crate::interpreter::namespace::InternalNamespace;

/// Owns the runtime environment of one script run.
pub struct Vm {
    commands: Vec<CommandNode>,
    env: Environment,
    state: VmState,
}

impl Vm {
    /// Create a VM whose environment is seeded with `namespace`.
    pub fn new(commands: Vec<CommandNode>, namespace: Arc<InternalNamespace>) -> Self {
        Self {
            commands,
            env: Environment::new(namespace),
            state: VmState::Ready,
        }
    }

    pub fn state(&self) -> &VmState {
        &self.state
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn into_env(self) -> Environment {
        self.env
    }

    pub fn commands(&self) -> &[CommandNode] {
        &self.commands
    }

    /// Execute every command in order, writing command output to `out`.
    pub fn run(&mut self, out: &mut dyn Write) -> Result<(), RunError> {
        if self.state != VmState::Ready {
            return Err(RunError::NotReady(self.state.clone()));
        }

        for cmd in &self.commands {
            tracing::debug!(line = cmd.line, command = %cmd.name, "exec");
            if let Err(source) = execute_command(cmd, &mut self.env, out) {
                tracing::warn!(line = cmd.line, command = %cmd.name, error = %source, "run failed");
                self.state = VmState::Failed {
                    line: cmd.line,
                    command: cmd.name.clone(),
                };
                return Err(RunError::Command {
                    line: cmd.line,
                    command: cmd.name.clone(),
                    source,
                });
            }
        }

        tracing::debug!(commands = self.commands.len(), "run completed");
        self.state = VmState::Completed;
        Ok(())
    }
}

fn execute_command(
    cmd: &CommandNode,
    env: &mut Environment,
    out: &mut dyn Write,
) -> Result<(), EvalError> {
    let output = cmd
        .handler
        .execute(CommandContext::new(cmd.line, &cmd.args, env))?;
    if !output.stdout.is_empty() {
        out.write_all(output.stdout.as_bytes())?;
    }
    Ok(())
}
