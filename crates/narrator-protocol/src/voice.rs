use serde::{Deserialize, Serialize};

/// Wire form of a voice as returned by `getVoices`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceRecord {
    pub locale: String,
    pub name: String,
    pub gender: String,
    pub identifier: String,
}
