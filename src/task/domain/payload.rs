//! Opaque structured payload carried by tasks and copied onto task runs.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// JSON payload whose contents are interpreted by the task executor, not by
/// this crate.
///
/// Absent or empty payloads normalise to an empty JSON object so persisted
/// rows never hold `null` or `""`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskPayload(Value);

impl TaskPayload {
    /// Wraps a JSON value, normalising `null` and `""` to `{}`.
    #[must_use]
    pub fn new(value: Value) -> Self {
        match value {
            Value::Null => Self::empty(),
            Value::String(ref text) if text.trim().is_empty() => Self::empty(),
            other => Self(other),
        }
    }

    /// Returns an empty JSON object payload.
    #[must_use]
    pub fn empty() -> Self {
        Self(Value::Object(Map::new()))
    }

    /// Returns `true` when the payload is an empty JSON object.
    #[must_use]
    pub fn is_empty_object(&self) -> bool {
        self.0.as_object().is_some_and(Map::is_empty)
    }

    /// Borrows the JSON value.
    #[must_use]
    pub const fn as_value(&self) -> &Value {
        &self.0
    }

    /// Returns the JSON value.
    #[must_use]
    pub fn into_value(self) -> Value {
        self.0
    }
}

impl Default for TaskPayload {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Value> for TaskPayload {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}
