//! Speech synthesis control: playback state machine, voice catalog and command dispatch.

pub mod backends;
pub mod catalog;
pub mod config;
pub mod controller;
pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod service;
pub mod settings;
pub mod sink;
pub mod types;
pub mod utils;

#[cfg(test)]
mod tests;

pub use catalog::VoiceCatalog;
pub use config::{ConfigUpdate, ParameterRange, ParameterRanges, SynthesizerConfig};
pub use controller::{PlaybackState, UtteranceOutcome};
pub use dispatcher::{CommandDispatcher, Dispatch, PendingResponse};
pub use engine::{SpeechEngine, SynthesisProvider, VoicesProvider};
pub use error::{ConfigError, ServiceError, SettingsError, SinkError, SinkResult, TTSError, TTSResult};
pub use service::SpeechService;
pub use settings::ServiceSettings;
pub use sink::{EndOfStream, Generation, PlaybackEnd, PlaybackSink};
pub use types::{AudioData, VoiceDescriptor, VoiceGender};

pub use narrator_protocol as protocol;
