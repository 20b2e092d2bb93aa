//! Expression Evaluation
//!
//! `run` resolves one expression node against the runtime environment.
//! Static checks already ran, so the only failures left are the ones that
//! depend on runtime values: a variable holding a value of another type, a
//! string marker naming a variable that was never set, or a sub-command
//! failing.

use crate::ast::types::{as_reference, variable_markers, CommandNode, ExprNode};
use crate::commands::types::CommandContext;
use crate::interpreter::environment::Environment;
use crate::interpreter::errors::EvalError;
use crate::interpreter::types::{Value, ValueType};

impl ExprNode {
    pub fn run(&self, env: &mut Environment) -> Result<Value, EvalError> {
        match self {
            ExprNode::BoolLiteral(text) => {
                if let Some(name) = as_reference(text) {
                    return env.get_typed(name, ValueType::Bool);
                }
                Ok(Value::Bool(text == "true"))
            }
            ExprNode::FloatLiteral(text) => {
                if let Some(name) = as_reference(text) {
                    return env.get_typed(name, ValueType::Float);
                }
                text.parse::<f64>()
                    .map(Value::Float)
                    .map_err(|_| EvalError::InvalidLiteral {
                        text: text.clone(),
                        expected: ValueType::Float,
                    })
            }
            ExprNode::StringLiteral(text) => interpolate(text, env).map(Value::String),
            ExprNode::Identity(name) => Ok(Value::String(name.clone())),
            ExprNode::SubCommand(cmd) => run_sub_command(cmd, env),
            ExprNode::InternalRef { path, .. } => env
                .internal(path)
                .ok_or_else(|| EvalError::UndefinedVariable(path.clone())),
        }
    }
}

/// Replace every `$(name)` marker in `text` with the string form of `name`.
pub fn interpolate(text: &str, env: &Environment) -> Result<String, EvalError> {
    let markers = variable_markers(text);
    if markers.is_empty() {
        return Ok(text.to_string());
    }

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for (range, name) in markers {
        let value = env
            .get_string(name)
            .ok_or_else(|| EvalError::UndefinedVariable(name.to_string()))?;
        out.push_str(&text[last..range.start]);
        out.push_str(&value);
        last = range.end;
    }
    out.push_str(&text[last..]);
    Ok(out)
}

fn run_sub_command(cmd: &CommandNode, env: &mut Environment) -> Result<Value, EvalError> {
    tracing::trace!(line = cmd.line, command = %cmd.name, "sub-command");
    let output = cmd
        .handler
        .execute(CommandContext::new(cmd.line, &cmd.args, env))?;
    let value = output
        .value
        .ok_or_else(|| EvalError::NoValue(cmd.name.clone()))?;

    // The parser typed this node by the declared result type.
    match cmd.result_type() {
        Some(expected) if expected != value.value_type() => Err(EvalError::TypeMismatch {
            name: cmd.name.clone(),
            actual: value.value_type(),
            expected,
        }),
        _ => Ok(value),
    }
}
