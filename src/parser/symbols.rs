//! Symbol Table
//!
//! Parse-time record of every bound variable's static type. A name's type
//! is fixed by its first binding; later bindings must agree. The table
//! lives for one parse and is never consulted at runtime.

use std::collections::HashMap;

use crate::interpreter::types::ValueType;
use crate::parser::types::ParseErrorKind;

#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    types: HashMap<String, ValueType>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<ValueType> {
        self.types.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Record `name` as `ty`, or confirm an earlier binding of the same type.
    pub fn bind(&mut self, name: &str, ty: ValueType) -> Result<(), ParseErrorKind> {
        match self.types.get(name) {
            Some(&previous) if previous != ty => Err(ParseErrorKind::Rebinding {
                name: name.to_string(),
                previous,
                new: ty,
            }),
            Some(_) => Ok(()),
            None => {
                self.types.insert(name.to_string(), ty);
                Ok(())
            }
        }
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_binding_fixes_type() {
        let mut symbols = SymbolTable::new();
        symbols.bind("x", ValueType::Float).unwrap();
        assert_eq!(symbols.get("x"), Some(ValueType::Float));
        assert!(symbols.bind("x", ValueType::Float).is_ok());

        let err = symbols.bind("x", ValueType::String).unwrap_err();
        assert!(matches!(
            err,
            ParseErrorKind::Rebinding { previous: ValueType::Float, new: ValueType::String, .. }
        ));
        assert_eq!(symbols.get("x"), Some(ValueType::Float));
        assert_eq!(symbols.len(), 1);
    }

    #[test]
    fn test_unknown_name() {
        let symbols = SymbolTable::new();
        assert!(symbols.is_empty());
        assert!(!symbols.contains("y"));
        assert_eq!(symbols.get("y"), None);
    }
}
