pub mod types;

pub use types::{CommandNode, ExprNode, ExprType};
