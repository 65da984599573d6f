use crate::config::{ParameterRanges, SynthesizerConfig};
use crate::error::TTSResult;
use crate::types::{AudioData, VoiceDescriptor};
use async_trait::async_trait;

/// Marker trait for synthesis engines
///
/// This trait combines the engine capabilities into a single interface.
/// Engines implement this marker trait along with the capability traits.
pub trait SpeechEngine: SynthesisProvider + VoicesProvider + Send + Sync {
    /// Engine name used in log lines and error messages
    fn engine_name(&self) -> &str;
}

/// Trait for turning text into audio
#[async_trait]
pub trait SynthesisProvider: Send + Sync {
    /// Synthesize `text` under the given configuration snapshot
    ///
    /// # Arguments
    /// * `text` - Utterance text
    /// * `config` - Volume, rate, pitch and voice to apply
    ///
    /// # Returns
    /// The complete audio for the utterance
    async fn synthesize(&self, text: &str, config: &SynthesizerConfig) -> TTSResult<AudioData>;
}

/// Trait for the engine's voice list and parameter contract
pub trait VoicesProvider: Send + Sync {
    /// Every voice the engine can speak with, in engine order
    fn list_voices(&self) -> Vec<VoiceDescriptor>;

    /// Accepted ranges for volume, rate and pitch
    fn parameter_ranges(&self) -> ParameterRanges {
        ParameterRanges::default()
    }
}
