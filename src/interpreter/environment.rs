//! Runtime Environment
//!
//! Variables bound by `let` live in a flat, insertion-ordered map. Dotted
//! names never name a variable; they address the read-only internal
//! namespace the environment was seeded with.
//!
//! The environment does not check types on write. Keeping a variable's
//! type stable is the binding command's job.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::interpreter::errors::EvalError;
use crate::interpreter::namespace::InternalNamespace;
use crate::interpreter::types::{Value, ValueType};

#[derive(Debug, Clone)]
pub struct Environment {
    vars: IndexMap<String, Value>,
    internal: Arc<InternalNamespace>,
}

impl Environment {
    pub fn new(internal: Arc<InternalNamespace>) -> Self {
        Self {
            vars: IndexMap::new(),
            internal,
        }
    }

    /// Raw value of a variable or of an internal `ns.field` path.
    pub fn get(&self, name: &str) -> Option<Value> {
        if name.contains('.') {
            return self.internal.lookup(name);
        }
        self.vars.get(name).cloned()
    }

    pub fn get_string(&self, name: &str) -> Option<String> {
        self.get(name).map(|v| v.to_string())
    }

    pub fn get_float(&self, name: &str) -> Option<f64> {
        match self.get(name)? {
            Value::Float(n) => Some(n),
            Value::Bool(b) => Some(if b { 1.0 } else { 0.0 }),
            Value::String(s) => s.trim().parse().ok(),
        }
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            Value::Bool(b) => Some(b),
            Value::Float(n) => Some(n != 0.0),
            Value::String(s) => s.parse().ok(),
        }
    }

    /// Value of `name`, required to have dynamic type `expected`.
    pub fn get_typed(&self, name: &str, expected: ValueType) -> Result<Value, EvalError> {
        let value = self
            .get(name)
            .ok_or_else(|| EvalError::UndefinedVariable(name.to_string()))?;
        let actual = value.value_type();
        if actual != expected {
            return Err(EvalError::TypeMismatch {
                name: name.to_string(),
                actual,
                expected,
            });
        }
        Ok(value)
    }

    /// Store a variable, overwriting any previous value.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.vars.insert(name.into(), value);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn internal(&self, path: &str) -> Option<Value> {
        self.internal.lookup(path)
    }

    pub fn namespace(&self) -> &InternalNamespace {
        &self.internal
    }

    /// Bound variables in binding order.
    pub fn variables(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.vars).unwrap_or(serde_json::Value::Null)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new(Arc::new(InternalNamespace::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_reads() {
        let mut env = Environment::default();
        env.set("a", Value::Bool(true));
        env.set("b", Value::Float(1.1));
        env.set("c", Value::from("world"));

        assert_eq!(env.get_string("a"), Some("true".to_string()));
        assert_eq!(env.get_string("b"), Some("1.1".to_string()));
        assert_eq!(env.get_float("b"), Some(1.1));
        assert_eq!(env.get_bool("a"), Some(true));
        assert_eq!(env.get_string("missing"), None);
        assert_eq!(env.get_float("c"), None);
    }

    #[test]
    fn test_set_overwrites_without_type_check() {
        let mut env = Environment::default();
        env.set("x", Value::Float(1.0));
        env.set("x", Value::from("now a string"));
        assert_eq!(env.get("x"), Some(Value::from("now a string")));
    }

    #[test]
    fn test_get_typed() {
        let mut env = Environment::default();
        env.set("flag", Value::Bool(false));
        assert_eq!(env.get_typed("flag", ValueType::Bool).unwrap(), Value::Bool(false));

        let err = env.get_typed("flag", ValueType::Float).unwrap_err();
        assert!(matches!(
            err,
            EvalError::TypeMismatch { actual: ValueType::Bool, expected: ValueType::Float, .. }
        ));

        let err = env.get_typed("nope", ValueType::Bool).unwrap_err();
        assert!(matches!(err, EvalError::UndefinedVariable(name) if name == "nope"));
    }

    #[test]
    fn test_dotted_names_read_namespace() {
        let env = Environment::default();
        assert_eq!(env.get_string("ntscript.name"), Some("ntscript".to_string()));
        assert_eq!(env.internal("ntscript.nothing"), None);
        assert!(env.variables().next().is_none());
    }

    #[test]
    fn test_variables_keep_binding_order() {
        let mut env = Environment::default();
        env.set("z", Value::Float(1.0));
        env.set("a", Value::Float(2.0));
        let names: Vec<&str> = env.variables().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["z", "a"]);
        assert_eq!(env.to_json(), serde_json::json!({"z": 1.0, "a": 2.0}));
    }
}
