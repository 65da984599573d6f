pub mod event;
pub mod method;
pub mod response;
pub mod voice;

pub use event::SpeechEvent;
pub use method::{Method, MethodCall};
pub use response::MethodResponse;
pub use voice::VoiceRecord;
