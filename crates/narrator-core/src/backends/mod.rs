//! Bundled engines and sinks.

#[cfg(feature = "espeak")]
pub mod espeak;
#[cfg(feature = "playback")]
pub mod playback;
pub mod simulated;

#[cfg(feature = "espeak")]
pub use espeak::EspeakEngine;
#[cfg(feature = "playback")]
pub use playback::RodioSink;
pub use simulated::{SimulatedEngine, TimedSink};
