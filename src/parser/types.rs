//! Parser Types and Constants
//!
//! Shared types, limits, and error kinds used across parser modules.

use thiserror::Error;

use crate::ast::types::ExprType;
use crate::interpreter::types::ValueType;

// Parser limits to prevent hangs and resource exhaustion
pub const MAX_INPUT_SIZE: usize = 1_000_000; // 1MB max input
pub const MAX_PARSER_DEPTH: usize = 16; // Max back-quote nesting

/// Limits applied to one parse.
#[derive(Debug, Clone, Copy)]
pub struct ParseLimits {
    /// Maximum number of bytes read from one script
    pub max_input_size: usize,
    /// Maximum nesting depth of back-quoted sub-commands
    pub max_depth: usize,
}

impl Default for ParseLimits {
    fn default() -> Self {
        Self {
            max_input_size: MAX_INPUT_SIZE,
            max_depth: MAX_PARSER_DEPTH,
        }
    }
}

/// Why a command line failed to parse.
#[derive(Debug, Error)]
pub enum ParseErrorKind {
    #[error("unknown cmd: {0}")]
    UnknownCommand(String),

    #[error("sub-command `{0}` can only be called inside back-quotes")]
    SubCommandAtTopLevel(String),

    #[error("`{0}` is not a sub-command and cannot be called inside back-quotes")]
    NotASubCommand(String),

    #[error("empty expression")]
    EmptyExpression,

    #[error("invalid expression: {0}")]
    InvalidExpression(String),

    #[error("invalid ID: {0}")]
    InvalidIdentifier(String),

    #[error("invalid variable: {0}")]
    InvalidVariable(String),

    #[error("variable undefined: {0}")]
    UndefinedVariable(String),

    #[error("unknown internal variable: {0}")]
    UnknownInternal(String),

    #[error("num of expr must be {}, but it is {actual} (usage: {usage})", format_counts(.expected))]
    Arity {
        expected: Vec<usize>,
        actual: usize,
        usage: &'static str,
    },

    #[error("num of expr must be at least {min}, but it is {actual} (usage: {usage})")]
    TooFewArguments {
        min: usize,
        actual: usize,
        usage: &'static str,
    },

    #[error("index of expr at {index} must be {expected}, but it is {actual}")]
    ArgumentType {
        index: usize,
        expected: String,
        actual: ExprType,
    },

    #[error("cannot bind '{name}' as {new}: already bound as {previous}")]
    Rebinding {
        name: String,
        previous: ValueType,
        new: ValueType,
    },

    #[error("sub-commands nested deeper than {0} levels")]
    TooDeep(usize),

    #[error("input exceeds {0} bytes")]
    InputTooLarge(usize),

    #[error("read script: {0}")]
    Read(#[from] std::io::Error),
}

fn format_counts(counts: &[usize]) -> String {
    counts
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(" or ")
}

/// A parse failure located at a 1-based source line.
#[derive(Debug, Error)]
#[error("line {line}: {kind}")]
pub struct ParseException {
    pub line: usize,
    #[source]
    pub kind: ParseErrorKind,
}

impl ParseException {
    pub fn new(line: usize, kind: ParseErrorKind) -> Self {
        Self { line, kind }
    }
}
