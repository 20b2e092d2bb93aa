//! Interpreter module for ntscript
//!
//! Evaluates expressions and runs parsed commands against a runtime
//! environment.

pub mod environment;
pub mod errors;
pub mod eval;
pub mod execution_engine;
pub mod namespace;
pub mod types;

pub use environment::Environment;
pub use errors::{EvalError, RunError, VmState};
pub use execution_engine::Vm;
pub use namespace::InternalNamespace;
pub use types::{Value, ValueType};
