use narrator_protocol::MethodResponse;
use narrator_protocol::response::{COMPLETION_DROPPED, SERVICE_DISPOSED, SPEAK_FAILED};
use tokio::sync::oneshot;

/// How an utterance ended, as seen by a caller awaiting it
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UtteranceOutcome {
    Completed,
    Cancelled,
    Failed(String),
    /// The service shut down before the utterance ended
    Disposed,
}

impl From<UtteranceOutcome> for MethodResponse {
    fn from(outcome: UtteranceOutcome) -> Self {
        match outcome {
            UtteranceOutcome::Completed | UtteranceOutcome::Cancelled => MethodResponse::accepted(),
            UtteranceOutcome::Failed(reason) => MethodResponse::error(SPEAK_FAILED, reason),
            UtteranceOutcome::Disposed => MethodResponse::error(
                SERVICE_DISPOSED,
                "speech service shut down before the utterance ended",
            ),
        }
    }
}

/// The deferred-result handle was dropped without being resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("pending completion was dropped without being resolved")]
pub struct CompletionDropped;

impl From<CompletionDropped> for MethodResponse {
    fn from(err: CompletionDropped) -> Self {
        MethodResponse::error(COMPLETION_DROPPED, err.to_string())
    }
}

/// Create the controller-side slot and the caller-side handle for one utterance.
pub(crate) fn completion_pair() -> (PendingCompletion, CompletionHandle) {
    let (tx, rx) = oneshot::channel();
    (PendingCompletion { tx: Some(tx) }, CompletionHandle { rx })
}

/// Controller-side slot; resolving consumes it, so it resolves at most once.
#[derive(Debug)]
pub(crate) struct PendingCompletion {
    tx: Option<oneshot::Sender<UtteranceOutcome>>,
}

impl PendingCompletion {
    pub(crate) fn resolve(mut self, outcome: UtteranceOutcome) {
        if let Some(tx) = self.tx.take() {
            if tx.send(outcome).is_err() {
                log::debug!(target: "narrator::controller", "Completion resolved after the caller stopped waiting");
            }
        }
    }
}

impl Drop for PendingCompletion {
    fn drop(&mut self) {
        if self.tx.is_some() {
            log::error!(target: "narrator::controller", "Pending completion dropped without being resolved");
        }
    }
}

/// Caller-side half of a deferred `speak` result
#[derive(Debug)]
pub struct CompletionHandle {
    rx: oneshot::Receiver<UtteranceOutcome>,
}

impl CompletionHandle {
    /// Wait for the utterance to end.
    pub async fn wait(self) -> Result<UtteranceOutcome, CompletionDropped> {
        self.rx.await.map_err(|_| CompletionDropped)
    }
}
