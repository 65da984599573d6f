//! Text to audio, off the controller's message loop.

use crate::config::SynthesizerConfig;
use crate::controller::ControllerMessage;
use crate::engine::SpeechEngine;
use crate::error::{SinkResult, TTSError, TTSResult};
use crate::sink::{EndOfStream, Generation, PlaybackSink};
use crate::types::AudioData;
use ractor::ActorRef;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Runs the engine for one utterance at a time and binds the result to a sink.
#[derive(Clone)]
pub struct SynthesisPipeline {
    engine: Arc<dyn SpeechEngine>,
    timeout: Duration,
}

impl SynthesisPipeline {
    pub fn new(engine: Arc<dyn SpeechEngine>, timeout: Duration) -> Self {
        Self { engine, timeout }
    }

    pub fn engine_name(&self) -> &str {
        self.engine.engine_name()
    }

    /// Spawn synthesis for `text` and post the result back to `controller`.
    ///
    /// The returned handle is aborted when the utterance is stopped.
    pub fn start(
        &self,
        generation: Generation,
        text: String,
        config: SynthesizerConfig,
        controller: ActorRef<ControllerMessage>,
    ) -> JoinHandle<()> {
        let engine = self.engine.clone();
        let timeout = self.timeout;

        tokio::spawn(async move {
            let message = match Self::synthesize(engine.as_ref(), &text, &config, timeout).await {
                Ok(audio) => {
                    log::debug!(
                        target: "narrator::pipeline",
                        "Synthesized generation {} ({:?} of audio)",
                        generation,
                        audio.duration()
                    );
                    ControllerMessage::Synthesized { generation, audio }
                }
                Err(err) => {
                    log::warn!(
                        target: "narrator::pipeline",
                        "Synthesis failed for generation {}: {}",
                        generation,
                        err
                    );
                    ControllerMessage::SynthesisFailed {
                        generation,
                        reason: err.to_string(),
                    }
                }
            };

            if let Err(err) = controller.cast(message) {
                log::debug!(
                    target: "narrator::pipeline",
                    "Controller gone before synthesis result was delivered: {}",
                    err
                );
            }
        })
    }

    /// Run the engine once under `timeout`. Empty audio counts as a failure.
    pub async fn synthesize(
        engine: &dyn SpeechEngine,
        text: &str,
        config: &SynthesizerConfig,
        timeout: Duration,
    ) -> TTSResult<AudioData> {
        match tokio::time::timeout(timeout, engine.synthesize(text, config)).await {
            Ok(Ok(audio)) if audio.is_empty() => Err(TTSError::GenerationFailed(
                format!("{} returned no audio", engine.engine_name()),
                text.chars().count(),
            )),
            Ok(result) => result,
            Err(_) => Err(TTSError::Timeout(timeout.as_millis() as u64)),
        }
    }

    /// Load `audio` into the sink, starting it unless the utterance is paused.
    pub fn bind(
        sink: &mut dyn PlaybackSink,
        audio: AudioData,
        end_of_stream: EndOfStream,
        play_now: bool,
    ) -> SinkResult<()> {
        sink.load(audio, end_of_stream)?;
        if play_now {
            sink.play()?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for SynthesisPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SynthesisPipeline")
            .field("engine", &self.engine.engine_name())
            .field("timeout", &self.timeout)
            .finish()
    }
}
