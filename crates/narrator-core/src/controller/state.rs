use crate::sink::Generation;
use serde::Serialize;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Where the controller is in the utterance lifecycle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    #[default]
    Idle,
    Speaking,
    Paused,
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PlaybackState::Idle => "idle",
            PlaybackState::Speaking => "speaking",
            PlaybackState::Paused => "paused",
        };
        f.write_str(name)
    }
}

/// The utterance currently owned by the controller; only exists outside Idle.
#[derive(Debug)]
pub(crate) struct Utterance {
    pub(crate) id: Uuid,
    pub(crate) generation: Generation,
    pub(crate) text: String,
    pub(crate) audio_loaded: bool,
    synthesis: Option<JoinHandle<()>>,
}

impl Utterance {
    pub(crate) fn new(generation: Generation, text: String, synthesis: JoinHandle<()>) -> Self {
        Self {
            id: Uuid::new_v4(),
            generation,
            text,
            audio_loaded: false,
            synthesis: Some(synthesis),
        }
    }

    /// Called once the synthesis task has reported back.
    pub(crate) fn synthesis_done(&mut self) {
        self.synthesis = None;
    }

    pub(crate) fn abort_synthesis(&mut self) {
        if let Some(task) = self.synthesis.take() {
            task.abort();
        }
    }
}

/// Point-in-time view of the controller, for callers and tests
#[derive(Clone, Debug)]
pub struct ControllerSnapshot {
    pub state: PlaybackState,
    pub await_completion: bool,
    pub pending_completion: bool,
    /// Text of the active utterance, if any
    pub utterance: Option<String>,
    pub config: crate::config::SynthesizerConfig,
}
