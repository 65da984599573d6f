use futures::Stream;
use std::pin::Pin;

// -----------------------------
// Channel aliases
// -----------------------------
pub use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use narrator_protocol::SpeechEvent;

/// Outbound side of the event channel held by the controller
pub type EventSender = UnboundedSender<SpeechEvent>;

// -----------------------------
// Unified boxed stream type
// -----------------------------
pub type BoxEventStream<T> = Pin<Box<dyn Stream<Item = T> + Send + Sync>>;

// -----------------------------
// Conversion helpers
// -----------------------------
pub(crate) fn receiver_into_stream<T: 'static + Send>(
    rx: UnboundedReceiver<T>,
) -> BoxEventStream<T> {
    use tokio_stream::wrappers::UnboundedReceiverStream;
    Box::pin(UnboundedReceiverStream::new(rx))
}
