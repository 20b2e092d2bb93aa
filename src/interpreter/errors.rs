//! Runtime Errors
//!
//! Errors raised while evaluating expressions and executing commands. Every
//! one of them terminates the run; the execution engine wraps the first one
//! with the failing command's line and name.

use std::fmt;

use thiserror::Error;

use crate::interpreter::types::ValueType;

/// Error produced by evaluating an expression or executing a command.
#[derive(Debug, Error)]
pub enum EvalError {
    /// A variable's dynamic type differs from the type the script expects.
    #[error("cannot use '{name}' (type {actual}) as {expected}")]
    TypeMismatch {
        name: String,
        actual: ValueType,
        expected: ValueType,
    },

    #[error("undefined variable: {0}")]
    UndefinedVariable(String),

    #[error("invalid {expected} literal: {text}")]
    InvalidLiteral { text: String, expected: ValueType },

    #[error("sub-command `{0}` produced no value")]
    NoValue(String),

    #[error("write output: {0}")]
    Output(#[from] std::io::Error),

    /// Failure reported by a command's own I/O, passed through unchanged.
    #[error(transparent)]
    Collaborator(Box<dyn std::error::Error + Send + Sync>),
}

impl EvalError {
    pub fn collaborator(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        EvalError::Collaborator(err.into())
    }
}

/// Lifecycle of a [`crate::interpreter::Vm`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VmState {
    Ready,
    Completed,
    Failed { line: usize, command: String },
}

impl fmt::Display for VmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VmState::Ready => write!(f, "ready"),
            VmState::Completed => write!(f, "completed"),
            VmState::Failed { line, command } => write!(f, "failed at line {} ({})", line, command),
        }
    }
}

/// Error that stopped a run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("line {line}: exec {command} err: {source}")]
    Command {
        line: usize,
        command: String,
        #[source]
        source: EvalError,
    },

    #[error("vm cannot run: already {0}")]
    NotReady(VmState),
}

impl RunError {
    /// Line of the failing command, if the error came from one.
    pub fn line(&self) -> Option<usize> {
        match self {
            RunError::Command { line, .. } => Some(*line),
            RunError::NotReady(_) => None,
        }
    }
}
