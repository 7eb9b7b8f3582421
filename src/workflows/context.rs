// Accumulated session context

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Raw key/value payload submitted with a single transition
pub type FormData = Map<String, Value>;

/// Key under which a client may echo back the context a step displayed.
pub const ECHOED_CONTEXT_KEY: &str = "context";

/// Immutable snapshot of everything a session has collected so far.
///
/// Snapshots are never edited in place. [`WorkflowContext::merge`] returns a
/// new value, so two requests never alias the same map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkflowContext(Map<String, Value>);

impl WorkflowContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// New snapshot with `data` laid over `self`; incoming keys win.
    pub fn merge(&self, data: &FormData) -> WorkflowContext {
        let mut merged = self.0.clone();
        for (key, value) in data {
            merged.insert(key.clone(), value.clone());
        }
        WorkflowContext(merged)
    }

    /// New snapshot with a single key set.
    pub fn with(&self, key: &str, value: Value) -> WorkflowContext {
        let mut merged = self.0.clone();
        merged.insert(key.to_string(), value);
        WorkflowContext(merged)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Look a key up at the top level, then inside an echoed `context` object.
    pub fn lookup(&self, key: &str) -> Option<&Value> {
        self.0.get(key).or_else(|| {
            self.0
                .get(ECHOED_CONTEXT_KEY)
                .and_then(Value::as_object)
                .and_then(|echoed| echoed.get(key))
        })
    }

    pub fn lookup_str(&self, key: &str) -> Option<&str> {
        self.lookup(key).and_then(Value::as_str)
    }

    /// `outer.inner` as a string, with `outer` found via [`Self::lookup`].
    pub fn lookup_nested_str(&self, outer: &str, inner: &str) -> Option<&str> {
        self.lookup(outer)
            .and_then(Value::as_object)
            .and_then(|obj| obj.get(inner))
            .and_then(Value::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for WorkflowContext {
    fn from(map: Map<String, Value>) -> Self {
        WorkflowContext(map)
    }
}

/// String value of a top-level form field.
pub fn field_str<'a>(data: &'a FormData, key: &str) -> Option<&'a str> {
    data.get(key).and_then(Value::as_str)
}
