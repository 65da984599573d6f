use serde::{Serialize, Serializer};

/// Push notification emitted by the playback controller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SpeechEvent {
    Start,
    Pause,
    Continue,
    Cancel,
    Complete,
    /// Synthesis or playback failed; carries the reason.
    Error(String),
}

impl SpeechEvent {
    /// Wire name of the notification, e.g. `speak.onStart`.
    pub fn method_name(&self) -> &'static str {
        match self {
            SpeechEvent::Start => "speak.onStart",
            SpeechEvent::Pause => "speak.onPause",
            SpeechEvent::Continue => "speak.onContinue",
            SpeechEvent::Cancel => "speak.onCancel",
            SpeechEvent::Complete => "speak.onComplete",
            SpeechEvent::Error(_) => "speak.onError",
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            SpeechEvent::Error(reason) => Some(reason),
            _ => None,
        }
    }

    /// Terminal events end an utterance; exactly one is emitted per utterance.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SpeechEvent::Cancel | SpeechEvent::Complete | SpeechEvent::Error(_)
        )
    }
}

impl std::fmt::Display for SpeechEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.message() {
            Some(reason) => write!(f, "{} ({})", self.method_name(), reason),
            None => f.write_str(self.method_name()),
        }
    }
}

impl Serialize for SpeechEvent {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeStruct;

        let fields = if self.message().is_some() { 2 } else { 1 };
        let mut state = serializer.serialize_struct("SpeechEvent", fields)?;
        state.serialize_field("method", self.method_name())?;
        if let Some(reason) = self.message() {
            state.serialize_field("message", reason)?;
        }
        state.end()
    }
}
