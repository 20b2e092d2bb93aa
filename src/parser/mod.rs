//! Parser module for ntscript
//!
//! This module contains the scanner, the symbol table and the command
//! parser.

pub mod types;
pub mod scanner;
pub mod symbols;
pub mod parser;

// Re-exports
pub use types::{ParseErrorKind, ParseException, ParseLimits};
pub use scanner::{
    split_args, split_argument, split_command, split_command_lines, split_command_resume, CommandScanner,
    CommandSplit, Split,
};
pub use symbols::SymbolTable;
pub use parser::{parse, Parser};
