use crate::error::SinkResult;
use crate::types::AudioData;
use std::fmt::Debug;

/// Utterance generation token; bumped every time a new utterance starts.
pub type Generation = u64;

/// How playback of a loaded stream ended
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlaybackEnd {
    Finished,
    Failed(String),
}

type Notify = Box<dyn FnOnce(Generation, PlaybackEnd) + Send>;

/// Single-use end-of-stream notifier handed to the sink with each stream.
///
/// Consuming `finished`/`failed` guarantees at most one notification per
/// stream. Dropping it without calling either sends nothing, which is what a
/// sink does after `stop`.
pub struct EndOfStream {
    generation: Generation,
    notify: Notify,
}

impl EndOfStream {
    pub fn new(
        generation: Generation,
        notify: impl FnOnce(Generation, PlaybackEnd) + Send + 'static,
    ) -> Self {
        Self {
            generation,
            notify: Box::new(notify),
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Report that the stream played to its end.
    pub fn finished(self) {
        (self.notify)(self.generation, PlaybackEnd::Finished)
    }

    /// Report a playback fault.
    pub fn failed(self, reason: impl Into<String>) {
        (self.notify)(self.generation, PlaybackEnd::Failed(reason.into()))
    }
}

impl Debug for EndOfStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndOfStream")
            .field("generation", &self.generation)
            .finish()
    }
}

/// Audio output the playback controller drives.
///
/// All calls are made from the controller, one at a time. `stop` must halt
/// output before returning and must discard the pending `EndOfStream`.
pub trait PlaybackSink: Send {
    /// Replace whatever is loaded with `audio`; playback does not start yet.
    fn load(&mut self, audio: AudioData, end_of_stream: EndOfStream) -> SinkResult<()>;

    fn play(&mut self) -> SinkResult<()>;

    fn pause(&mut self) -> SinkResult<()>;

    fn stop(&mut self) -> SinkResult<()>;
}
