use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error code used when an utterance fails in the engine or the sink.
pub const SPEAK_FAILED: &str = "SPEAK_FAILED";
/// Error code used when a deferred result was dropped without being resolved.
pub const COMPLETION_DROPPED: &str = "COMPLETION_DROPPED";
/// Error code used when the service shut down while a caller was waiting.
pub const SERVICE_DISPOSED: &str = "SERVICE_DISPOSED";
/// Error code used when the playback controller cannot be reached.
pub const CONTROLLER_UNAVAILABLE: &str = "CONTROLLER_UNAVAILABLE";

/// Outcome of a single command.
///
/// Boolean-style commands answer `Success` with `1` (accepted) or `0`
/// (rejected but handled). `NotImplemented` is reserved for method names the
/// service does not understand at all.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MethodResponse {
    Success { result: Value },
    Error { code: String, message: String },
    NotImplemented,
}

impl MethodResponse {
    pub fn success(result: impl Into<Value>) -> Self {
        Self::Success {
            result: result.into(),
        }
    }

    pub fn accepted() -> Self {
        Self::success(1)
    }

    pub fn rejected() -> Self {
        Self::success(0)
    }

    pub fn flag(accepted: bool) -> Self {
        if accepted {
            Self::accepted()
        } else {
            Self::rejected()
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Error {
            code: code.into(),
            message: message.into(),
        }
    }

    /// True for a `Success` whose value reads as accepted.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Success { result } => match result {
                Value::Null => false,
                Value::Bool(b) => *b,
                Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
                Value::String(_) | Value::Array(_) | Value::Object(_) => true,
            },
            _ => false,
        }
    }

    pub fn result(&self) -> Option<&Value> {
        match self {
            Self::Success { result } => Some(result),
            _ => None,
        }
    }

    pub fn error_code(&self) -> Option<&str> {
        match self {
            Self::Error { code, .. } => Some(code),
            _ => None,
        }
    }

    pub fn is_not_implemented(&self) -> bool {
        matches!(self, Self::NotImplemented)
    }
}
