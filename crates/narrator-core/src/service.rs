use crate::catalog::VoiceCatalog;
use crate::controller::{ControllerArgs, ControllerMessage, ControllerSnapshot, PlaybackController};
use crate::dispatcher::{CommandDispatcher, Dispatch};
use crate::engine::SpeechEngine;
use crate::error::ServiceError;
use crate::settings::ServiceSettings;
use crate::sink::PlaybackSink;
use crate::utils::{BoxEventStream, UnboundedReceiver, receiver_into_stream, unbounded_channel};
use narrator_protocol::{MethodCall, SpeechEvent};
use ractor::{Actor, ActorRef};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// The assembled service: controller actor, dispatcher and event stream.
///
/// Call [`SpeechService::shutdown`] to stop the controller and wait for it.
/// Dropping the service stops the controller as well. Either way a caller
/// still waiting on a deferred `speak` receives `SERVICE_DISPOSED`.
pub struct SpeechService {
    dispatcher: CommandDispatcher,
    controller: ActorRef<ControllerMessage>,
    handle: Option<JoinHandle<()>>,
    events: Option<UnboundedReceiver<SpeechEvent>>,
}

impl SpeechService {
    pub async fn start(
        engine: Arc<dyn SpeechEngine>,
        sink: Box<dyn PlaybackSink>,
        settings: ServiceSettings,
    ) -> Result<Self, ServiceError> {
        settings.validate()?;
        let (events_tx, events_rx) = unbounded_channel();

        let args = ControllerArgs {
            engine: engine.clone(),
            sink,
            events: events_tx,
            await_completion: settings.await_speak_completion,
            synthesis_timeout: settings.synthesis_timeout(),
        };
        let (controller, handle) = Actor::spawn(None, PlaybackController, args).await?;
        let dispatcher =
            CommandDispatcher::new(controller.clone(), VoiceCatalog::new(engine), &settings);

        log::info!(target: "narrator::service", "Speech service started");
        Ok(Self {
            dispatcher,
            controller,
            handle: Some(handle),
            events: Some(events_rx),
        })
    }

    pub async fn dispatch(&self, call: MethodCall) -> Dispatch {
        self.dispatcher.dispatch(call).await
    }

    /// A cloneable handle for serving commands concurrently.
    pub fn dispatcher(&self) -> CommandDispatcher {
        self.dispatcher.clone()
    }

    pub fn catalog(&self) -> &VoiceCatalog {
        self.dispatcher.catalog()
    }

    pub async fn snapshot(&self) -> Result<ControllerSnapshot, ServiceError> {
        self.dispatcher.snapshot().await
    }

    /// Outbound events; available once.
    pub fn take_event_stream(&mut self) -> Option<BoxEventStream<SpeechEvent>> {
        self.events.take().map(receiver_into_stream)
    }

    pub async fn shutdown(mut self) -> Result<(), ServiceError> {
        self.controller.stop(Some("speech service shutdown".to_string()));
        if let Some(handle) = self.handle.take() {
            handle.await?;
        }
        log::info!(target: "narrator::service", "Speech service stopped");
        Ok(())
    }
}

impl Drop for SpeechService {
    fn drop(&mut self) {
        if self.handle.is_some() {
            log::debug!(target: "narrator::service", "Speech service dropped; stopping controller");
            self.controller.stop(Some("speech service dropped".to_string()));
        }
    }
}

impl std::fmt::Debug for SpeechService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechService")
            .field("dispatcher", &self.dispatcher)
            .finish()
    }
}
