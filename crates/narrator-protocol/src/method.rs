use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Every command understood by the speech service.
///
/// Names are matched case-sensitively against the camelCase wire form, so
/// `"setSpeechRate"` parses and `"SetSpeechRate"` does not.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, EnumIter)]
#[strum(serialize_all = "camelCase")]
pub enum Method {
    GetPlatformVersion,
    AwaitSpeakCompletion,
    Speak,
    Pause,
    Continue,
    Stop,
    SetLanguage,
    SetVoice,
    SetVolume,
    SetSpeechRate,
    SetPitch,
    GetLanguages,
    GetVoices,
}

/// A named command plus its single argument value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: String,
    #[serde(default)]
    pub arguments: Value,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, arguments: impl Into<Value>) -> Self {
        Self {
            method: method.into(),
            arguments: arguments.into(),
        }
    }

    /// A call that carries no argument.
    pub fn bare(method: impl Into<String>) -> Self {
        Self::new(method, Value::Null)
    }

    /// Resolve the method name, `None` for names the service does not know.
    pub fn resolve(&self) -> Option<Method> {
        self.method.parse().ok()
    }
}

impl From<Method> for MethodCall {
    fn from(method: Method) -> Self {
        Self::bare(method.as_ref())
    }
}
