// src/commands/echo/mod.rs
use crate::commands::types::{Arity, Command, CommandContext, CommandOutput, Contract};
use crate::interpreter::errors::EvalError;

pub struct EchoCommand;

impl Command for EchoCommand {
    fn name(&self) -> &'static str {
        "echo"
    }

    fn usage(&self) -> &'static str {
        "echo <object1> <object2>..."
    }

    fn contract(&self) -> Contract {
        Contract::new(Arity::AtLeast(1), &[])
    }

    fn execute(&self, mut ctx: CommandContext<'_>) -> Result<CommandOutput, EvalError> {
        let values = ctx.args()?;
        let mut output = values
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        output.push('\n');
        Ok(CommandOutput::stdout(output))
    }
}
