// src/commands/env/mod.rs
use crate::commands::types::{Arity, Command, CommandContext, CommandKind, CommandOutput, Contract, Param};
use crate::interpreter::errors::EvalError;
use crate::interpreter::types::{Value, ValueType};

/// `` `env "NAME"` `` reads a process environment variable. Unset
/// variables read as the empty string.
pub struct EnvCommand;

impl Command for EnvCommand {
    fn name(&self) -> &'static str {
        "env"
    }

    fn usage(&self) -> &'static str {
        "env <name>"
    }

    fn contract(&self) -> Contract {
        Contract::new(Arity::OneOf(&[1]), &[Param::Of(ValueType::String)])
    }

    fn kind(&self) -> CommandKind {
        CommandKind::SubCommand(ValueType::String)
    }

    fn execute(&self, mut ctx: CommandContext<'_>) -> Result<CommandOutput, EvalError> {
        let name = ctx.arg(0)?.to_string();
        let value = std::env::var(&name).unwrap_or_default();
        Ok(CommandOutput::value(Value::String(value)))
    }
}
