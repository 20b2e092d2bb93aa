// src/commands/let_cmd.rs
use crate::ast::types::{ExprNode, ExprType};
use crate::commands::types::{Arity, Command, CommandContext, CommandKind, CommandOutput, Contract, Param};
use crate::interpreter::errors::EvalError;
use crate::parser::symbols::SymbolTable;
use crate::parser::types::ParseErrorKind;

/// `let @name <value>` binds a variable.
///
/// The first binding of a name fixes its type, both in the symbol table at
/// parse time and in the environment at runtime.
pub struct LetCommand;

const LET_CONTRACT: Contract = Contract::new(
    Arity::OneOf(&[2]),
    &[Param::Is(ExprType::Identity), Param::Value],
);

impl Command for LetCommand {
    fn name(&self) -> &'static str {
        "let"
    }

    fn usage(&self) -> &'static str {
        "let @ID <object>"
    }

    fn contract(&self) -> Contract {
        LET_CONTRACT
    }

    fn kind(&self) -> CommandKind {
        CommandKind::Binding
    }

    fn check(&self, args: &[ExprNode], symbols: &mut SymbolTable) -> Result<(), ParseErrorKind> {
        self.contract().check(self.usage(), args)?;

        let (ExprNode::Identity(name), Some(ty)) = (&args[0], args[1].value_type()) else {
            return Err(ParseErrorKind::InvalidExpression("let @ID <object>".to_string()));
        };
        symbols.bind(name, ty)
    }

    fn execute(&self, mut ctx: CommandContext<'_>) -> Result<CommandOutput, EvalError> {
        let name = ctx.arg(0)?.to_string();
        let value = ctx.arg(1)?;

        if let Some(old) = ctx.env.get(&name) {
            if old.value_type() != value.value_type() {
                return Err(EvalError::TypeMismatch {
                    name,
                    actual: value.value_type(),
                    expected: old.value_type(),
                });
            }
        }

        ctx.env.set(name, value);
        Ok(CommandOutput::none())
    }
}
