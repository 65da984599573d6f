mod actor;
mod completion;
mod state;

pub use actor::{ControllerArgs, ControllerMessage, PlaybackController, SpeakAck};
pub use completion::{CompletionDropped, CompletionHandle, UtteranceOutcome};
pub use state::{ControllerSnapshot, PlaybackState};
