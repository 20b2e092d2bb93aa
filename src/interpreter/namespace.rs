//! Internal Namespace
//!
//! A read-only JSON document every script can read through
//! `$(namespace.field)` without binding it first. The parser resolves
//! references against it, so it must be fixed before parsing starts.

use serde_json::{Map, Value as Json};

use crate::interpreter::types::{Value, ValueType};

/// Name of the namespace seeded by [`InternalNamespace::default`].
pub const DEFAULT_NAMESPACE: &str = "ntscript";

#[derive(Debug, Clone, PartialEq)]
pub struct InternalNamespace {
    root: Map<String, Json>,
}

impl InternalNamespace {
    /// An empty namespace.
    pub fn empty() -> Self {
        Self { root: Map::new() }
    }

    /// Build a namespace from a JSON object. Non-object input yields an
    /// empty namespace.
    pub fn from_json(json: Json) -> Self {
        match json {
            Json::Object(root) => Self { root },
            _ => Self::empty(),
        }
    }

    /// Add (or replace) `namespace.field`.
    pub fn with_field(mut self, namespace: &str, field: &str, value: impl Into<Json>) -> Self {
        let entry = self
            .root
            .entry(namespace.to_string())
            .or_insert_with(|| Json::Object(Map::new()));
        if !entry.is_object() {
            *entry = Json::Object(Map::new());
        }
        if let Json::Object(fields) = entry {
            fields.insert(field.to_string(), value.into());
        }
        self
    }

    pub fn has_namespace(&self, namespace: &str) -> bool {
        self.root.contains_key(namespace)
    }

    /// Walk a dotted path (`ns.field.sub`) into the document.
    pub fn lookup_json(&self, path: &str) -> Option<&Json> {
        let mut parts = path.split('.');
        let mut current = self.root.get(parts.next()?)?;
        for part in parts {
            current = match current {
                Json::Object(map) => map.get(part)?,
                Json::Array(items) => items.get(part.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    pub fn lookup(&self, path: &str) -> Option<Value> {
        self.lookup_json(path).map(Value::from_json)
    }

    pub fn value_type(&self, path: &str) -> Option<ValueType> {
        self.lookup(path).map(|v| v.value_type())
    }

    pub fn as_json(&self) -> Json {
        Json::Object(self.root.clone())
    }
}

impl Default for InternalNamespace {
    fn default() -> Self {
        Self::empty()
            .with_field(DEFAULT_NAMESPACE, "name", env!("CARGO_PKG_NAME"))
            .with_field(DEFAULT_NAMESPACE, "version", env!("CARGO_PKG_VERSION"))
    }
}
