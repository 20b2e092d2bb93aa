// src/commands/types.rs
use crate::ast::types::{ExprNode, ExprType};
use crate::interpreter::environment::Environment;
use crate::interpreter::errors::EvalError;
use crate::interpreter::types::{Value, ValueType};
use crate::parser::symbols::SymbolTable;
use crate::parser::types::ParseErrorKind;

/// How a command participates in a script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// A top-level line run for its side effect.
    Statement,
    /// A top-level line whose static check records a variable type.
    Binding,
    /// Callable only inside back-quotes; evaluates to a value of this type.
    SubCommand(ValueType),
}

/// Accepted argument counts.
#[derive(Debug, Clone, Copy)]
pub enum Arity {
    OneOf(&'static [usize]),
    AtLeast(usize),
}

/// Requirement on one argument position.
#[derive(Debug, Clone, Copy)]
pub enum Param {
    Is(ExprType),
    /// Any expression whose static value type is this one.
    Of(ValueType),
    /// Anything that evaluates to a value (everything but `@name`).
    Value,
    Any,
}

impl Param {
    fn accepts(&self, expr: &ExprNode) -> bool {
        match self {
            Param::Is(ty) => expr.expr_type() == *ty,
            Param::Of(ty) => expr.value_type() == Some(*ty),
            Param::Value => expr.value_type().is_some(),
            Param::Any => true,
        }
    }

    fn describe(&self) -> String {
        match self {
            Param::Is(ty) => ty.to_string(),
            Param::Of(ty) => format!("a {} value", ty),
            Param::Value => "a value".to_string(),
            Param::Any => "anything".to_string(),
        }
    }
}

/// Static argument contract: arity plus the type of the leading positions.
/// Positions past `params` only need to produce a value.
#[derive(Debug, Clone, Copy)]
pub struct Contract {
    pub arity: Arity,
    pub params: &'static [Param],
}

impl Contract {
    pub const fn new(arity: Arity, params: &'static [Param]) -> Self {
        Self { arity, params }
    }

    pub fn check(&self, usage: &'static str, args: &[ExprNode]) -> Result<(), ParseErrorKind> {
        match self.arity {
            Arity::OneOf(counts) if !counts.contains(&args.len()) => {
                return Err(ParseErrorKind::Arity {
                    expected: counts.to_vec(),
                    actual: args.len(),
                    usage,
                });
            }
            Arity::AtLeast(min) if args.len() < min => {
                return Err(ParseErrorKind::TooFewArguments {
                    min,
                    actual: args.len(),
                    usage,
                });
            }
            _ => {}
        }

        for (index, arg) in args.iter().enumerate() {
            let param = self.params.get(index).copied().unwrap_or(Param::Value);
            if !param.accepts(arg) {
                return Err(ParseErrorKind::ArgumentType {
                    index,
                    expected: param.describe(),
                    actual: arg.expr_type(),
                });
            }
        }
        Ok(())
    }
}

/// What a command hands back to the engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandOutput {
    /// Text for the run's output sink.
    pub stdout: String,
    /// Result of a sub-command.
    pub value: Option<Value>,
}

impl CommandOutput {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn stdout(stdout: String) -> Self {
        Self { stdout, value: None }
    }

    pub fn value(value: Value) -> Self {
        Self { stdout: String::new(), value: Some(value) }
    }
}

/// 命令执行上下文
pub struct CommandContext<'a> {
    pub line: usize,
    pub args: &'a [ExprNode],
    pub env: &'a mut Environment,
}

impl<'a> CommandContext<'a> {
    pub fn new(line: usize, args: &'a [ExprNode], env: &'a mut Environment) -> Self {
        Self { line, args, env }
    }

    /// Evaluate the argument at `index`.
    ///
    /// The contract was checked at parse time, so `index` is in range for
    /// every position the contract requires.
    pub fn arg(&mut self, index: usize) -> Result<Value, EvalError> {
        match self.args.get(index) {
            Some(expr) => expr.run(self.env),
            None => Err(EvalError::collaborator(format!("missing argument {}", index))),
        }
    }

    pub fn args(&mut self) -> Result<Vec<Value>, EvalError> {
        let args = self.args;
        args.iter().map(|expr| expr.run(self.env)).collect()
    }
}

/// The contract between the interpreter and a command implementation.
///
/// The parser validates a command's arguments with [`Command::check`]
/// before any of them runs, so [`Command::execute`] may rely on the
/// declared arity and types.
pub trait Command: Send + Sync {
    fn name(&self) -> &'static str;

    /// One-line usage, quoted in arity errors.
    fn usage(&self) -> &'static str;

    fn contract(&self) -> Contract;

    fn kind(&self) -> CommandKind {
        CommandKind::Statement
    }

    /// Static check. Binding commands also record their variable here.
    fn check(&self, args: &[ExprNode], _symbols: &mut SymbolTable) -> Result<(), ParseErrorKind> {
        self.contract().check(self.usage(), args)
    }

    fn execute(&self, ctx: CommandContext<'_>) -> Result<CommandOutput, EvalError>;
}
