use anyhow::Result;
use clap::ValueEnum;
use narrator_core::backends::{SimulatedEngine, TimedSink};
use narrator_core::{PlaybackSink, SpeechEngine};
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum EngineKind {
    /// Built-in tone generator, no external dependencies
    Simulated,
    /// espeak-ng command-line synthesizer
    Espeak,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SinkKind {
    /// Waits out the audio duration without producing sound
    Timed,
    /// Default audio output device
    Rodio,
}

pub fn engine(kind: EngineKind) -> Result<Arc<dyn SpeechEngine>> {
    match kind {
        EngineKind::Simulated => Ok(Arc::new(SimulatedEngine::new())),
        #[cfg(feature = "espeak")]
        EngineKind::Espeak => Ok(Arc::new(narrator_core::backends::EspeakEngine::detect()?)),
        #[cfg(not(feature = "espeak"))]
        EngineKind::Espeak => anyhow::bail!("narrator was built without the `espeak` feature"),
    }
}

pub fn sink(kind: SinkKind) -> Result<Box<dyn PlaybackSink>> {
    match kind {
        SinkKind::Timed => Ok(Box::new(TimedSink::new())),
        #[cfg(feature = "playback")]
        SinkKind::Rodio => Ok(Box::new(narrator_core::backends::RodioSink::try_new()?)),
        #[cfg(not(feature = "playback"))]
        SinkKind::Rodio => anyhow::bail!("narrator was built without the `playback` feature"),
    }
}
