//! ntscript - an interpreter for line-oriented test scenario scripts
//!
//! A script is a list of commands, one per line, whose arguments are typed
//! expressions: literals, interpolated strings, back-quoted sub-commands and
//! variable references. Scripts are checked statically while they are
//! parsed, then run command by command against one environment.
//!
//! ```text
//! let @host `env "HOST"`
//! let @url "http://$(host)/hello"
//! echo $(url) $(ntscript.version)
//! ```

pub mod ast;
pub mod commands;
pub mod interpreter;
pub mod parser;
pub mod script;

pub use ast::types::*;
pub use commands::{create_default_registry, Command, CommandRegistry};
pub use interpreter::{Environment, EvalError, InternalNamespace, RunError, Value, ValueType, Vm};
pub use parser::{parse, ParseException, Parser};
pub use script::{Error, Script, ScriptOptions};
