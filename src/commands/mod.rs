// src/commands/mod.rs
pub mod echo;
pub mod env;
pub mod let_cmd;
pub mod registry;
pub mod types;

pub use registry::{create_default_registry, CommandRegistry};
pub use types::{Arity, Command, CommandContext, CommandKind, CommandOutput, Contract, Param};
