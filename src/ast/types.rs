//! AST Node Types for ntscript
//!
//! A parsed script is an ordered list of [`CommandNode`]s. Each command owns
//! its argument expressions, which are immutable once the parser built them.

use std::fmt;
use std::sync::Arc;

use crate::commands::types::{Command, CommandKind};
use crate::interpreter::types::ValueType;

// =============================================================================
// EXPRESSION TYPES
// =============================================================================

/// Static type of an expression node, fixed at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExprType {
    Bool,
    Float,
    String,
    Identity,
    SubCommand,
    InternalVar,
}

impl ExprType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Float => "float",
            Self::String => "string",
            Self::Identity => "identity",
            Self::SubCommand => "sub-command",
            Self::InternalVar => "internal",
        }
    }
}

impl fmt::Display for ExprType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One argument of a command.
///
/// Literal variants keep their source text: `BoolLiteral("$(flag)")` is a
/// typed reference to the variable `flag`, resolved when the node runs.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprNode {
    BoolLiteral(String),
    FloatLiteral(String),
    /// Quotes already stripped; may contain `$(name)` markers.
    StringLiteral(String),
    /// `@name`, the target of a binding command.
    Identity(String),
    /// A back-quoted nested command.
    SubCommand(Box<CommandNode>),
    /// `$(namespace.field)`; the value type was resolved against the
    /// internal namespace at parse time.
    InternalRef { path: String, value_type: ValueType },
}

impl ExprNode {
    pub fn expr_type(&self) -> ExprType {
        match self {
            ExprNode::BoolLiteral(_) => ExprType::Bool,
            ExprNode::FloatLiteral(_) => ExprType::Float,
            ExprNode::StringLiteral(_) => ExprType::String,
            ExprNode::Identity(_) => ExprType::Identity,
            ExprNode::SubCommand(_) => ExprType::SubCommand,
            ExprNode::InternalRef { .. } => ExprType::InternalVar,
        }
    }

    /// Static type of the value this node evaluates to, if it produces one.
    pub fn value_type(&self) -> Option<ValueType> {
        match self {
            ExprNode::BoolLiteral(_) => Some(ValueType::Bool),
            ExprNode::FloatLiteral(_) => Some(ValueType::Float),
            ExprNode::StringLiteral(_) => Some(ValueType::String),
            ExprNode::Identity(_) => None,
            ExprNode::SubCommand(cmd) => cmd.result_type(),
            ExprNode::InternalRef { value_type, .. } => Some(*value_type),
        }
    }

    /// Names referenced through `$(name)` markers, in order of appearance.
    pub fn variables(&self) -> Vec<String> {
        match self {
            ExprNode::BoolLiteral(text)
            | ExprNode::FloatLiteral(text)
            | ExprNode::StringLiteral(text) => variable_markers(text)
                .into_iter()
                .map(|(_, name)| name.to_string())
                .collect(),
            ExprNode::Identity(_) => Vec::new(),
            ExprNode::SubCommand(cmd) => cmd.args.iter().flat_map(|a| a.variables()).collect(),
            ExprNode::InternalRef { path, .. } => vec![path.clone()],
        }
    }
}

lazy_static::lazy_static! {
    /// A well-formed `$(name)` or `$(namespace.field)` marker.
    static ref VARIABLE_MARKER: regex_lite::Regex =
        regex_lite::Regex::new(r"\$\(([A-Za-z_][A-Za-z0-9_.]*)\)").unwrap();
}

/// Find every well-formed `$(name)` marker in `text`.
///
/// Returns the byte range of each whole marker together with the name inside
/// it. Matches are non-overlapping, left to right.
pub fn variable_markers(text: &str) -> Vec<(std::ops::Range<usize>, &str)> {
    VARIABLE_MARKER
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let name = caps.get(1)?;
            Some((whole.range(), name.as_str()))
        })
        .collect()
}

/// If `text` is exactly one `$(...)` reference, return the text inside.
pub fn as_reference(text: &str) -> Option<&str> {
    text.strip_prefix("$(")?.strip_suffix(')')
}

// =============================================================================
// COMMANDS
// =============================================================================

/// A parsed command line (or a back-quoted sub-command).
#[derive(Clone)]
pub struct CommandNode {
    pub name: String,
    /// 1-based source line of the first physical line of the command.
    pub line: usize,
    pub args: Vec<ExprNode>,
    pub handler: Arc<dyn Command>,
}

impl CommandNode {
    pub fn new(handler: Arc<dyn Command>, line: usize, args: Vec<ExprNode>) -> Self {
        Self {
            name: handler.name().to_string(),
            line,
            args,
            handler,
        }
    }

    pub fn kind(&self) -> CommandKind {
        self.handler.kind()
    }

    /// Declared result type for sub-commands, `None` for statements.
    pub fn result_type(&self) -> Option<ValueType> {
        match self.handler.kind() {
            CommandKind::SubCommand(ty) => Some(ty),
            CommandKind::Statement | CommandKind::Binding => None,
        }
    }
}

impl fmt::Debug for CommandNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandNode")
            .field("name", &self.name)
            .field("line", &self.line)
            .field("args", &self.args)
            .finish()
    }
}

impl PartialEq for CommandNode {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.line == other.line && self.args == other.args
    }
}
