use super::completion::{CompletionHandle, PendingCompletion, UtteranceOutcome, completion_pair};
use super::state::{ControllerSnapshot, PlaybackState, Utterance};
use crate::config::{ConfigUpdate, SynthesizerConfig};
use crate::engine::SpeechEngine;
use crate::error::ConfigError;
use crate::pipeline::SynthesisPipeline;
use crate::sink::{EndOfStream, Generation, PlaybackEnd, PlaybackSink};
use crate::types::AudioData;
use crate::utils::EventSender;
use async_trait::async_trait;
use narrator_protocol::SpeechEvent;
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use std::sync::Arc;
use std::time::Duration;

const TARGET: &str = "narrator::controller";

/// Messages handled by the playback controller.
///
/// Commands carry a reply port; engine and sink notifications are cast and
/// tagged with the generation they belong to.
pub enum ControllerMessage {
    Speak {
        text: String,
        reply: RpcReplyPort<SpeakAck>,
    },
    Pause(RpcReplyPort<bool>),
    Continue(RpcReplyPort<bool>),
    Stop(RpcReplyPort<bool>),
    AwaitCompletion(bool, RpcReplyPort<bool>),
    Configure(ConfigUpdate, RpcReplyPort<Result<(), ConfigError>>),
    Snapshot(RpcReplyPort<ControllerSnapshot>),
    Synthesized {
        generation: Generation,
        audio: AudioData,
    },
    SynthesisFailed {
        generation: Generation,
        reason: String,
    },
    PlaybackEnded {
        generation: Generation,
        end: PlaybackEnd,
    },
}

/// Immediate answer to `speak`
#[derive(Debug)]
pub enum SpeakAck {
    /// A new utterance started and nobody waits for it
    Started,
    /// A paused utterance resumed; the text was ignored
    Resumed,
    /// Another utterance is speaking; nothing changed
    Busy,
    /// A new utterance started; the handle resolves when it ends
    Deferred(CompletionHandle),
}

pub struct ControllerArgs {
    pub engine: Arc<dyn SpeechEngine>,
    pub sink: Box<dyn PlaybackSink>,
    pub events: EventSender,
    pub await_completion: bool,
    pub synthesis_timeout: Duration,
}

/// Actor owning playback state, the active utterance and the pending completion
pub struct PlaybackController;

pub struct ControllerState {
    playback: PlaybackState,
    utterance: Option<Utterance>,
    pending: Option<PendingCompletion>,
    await_completion: bool,
    config: SynthesizerConfig,
    sink: Box<dyn PlaybackSink>,
    pipeline: SynthesisPipeline,
    events: EventSender,
    last_generation: Generation,
}

impl ControllerState {
    fn new(args: ControllerArgs) -> Self {
        let config = SynthesizerConfig::new(args.engine.parameter_ranges());
        Self {
            playback: PlaybackState::Idle,
            utterance: None,
            pending: None,
            await_completion: args.await_completion,
            config,
            sink: args.sink,
            pipeline: SynthesisPipeline::new(args.engine, args.synthesis_timeout),
            events: args.events,
            last_generation: 0,
        }
    }

    fn emit(&self, event: SpeechEvent) {
        log::debug!(target: TARGET, "Event {}", event.method_name());
        if self.events.send(event).is_err() {
            log::debug!(target: TARGET, "No event listener attached");
        }
    }

    fn is_current(&self, generation: Generation) -> bool {
        self.playback != PlaybackState::Idle
            && self
                .utterance
                .as_ref()
                .is_some_and(|utterance| utterance.generation == generation)
    }

    fn audio_loaded(&self) -> bool {
        self.utterance
            .as_ref()
            .is_some_and(|utterance| utterance.audio_loaded)
    }

    fn speak(&mut self, text: String, myself: &ActorRef<ControllerMessage>) -> SpeakAck {
        match self.playback {
            PlaybackState::Speaking => {
                log::debug!(target: TARGET, "Rejecting speak while another utterance is speaking");
                SpeakAck::Busy
            }
            PlaybackState::Paused => {
                self.resume();
                SpeakAck::Resumed
            }
            PlaybackState::Idle => {
                self.last_generation += 1;
                let generation = self.last_generation;
                let task = self.pipeline.start(
                    generation,
                    text.clone(),
                    self.config.clone(),
                    myself.clone(),
                );
                let utterance = Utterance::new(generation, text, task);
                log::info!(
                    target: TARGET,
                    "Utterance {} started (generation {}, {} chars)",
                    utterance.id,
                    generation,
                    utterance.text.chars().count()
                );

                self.utterance = Some(utterance);
                self.playback = PlaybackState::Speaking;
                self.emit(SpeechEvent::Start);

                if self.await_completion {
                    let (pending, handle) = completion_pair();
                    self.pending = Some(pending);
                    SpeakAck::Deferred(handle)
                } else {
                    SpeakAck::Started
                }
            }
        }
    }

    fn pause(&mut self) -> bool {
        if self.playback != PlaybackState::Speaking {
            return true;
        }
        if self.audio_loaded() {
            if let Err(err) = self.sink.pause() {
                self.fail(format!("Failed to pause playback: {err}"));
                return false;
            }
        }
        self.playback = PlaybackState::Paused;
        self.emit(SpeechEvent::Pause);
        true
    }

    fn resume(&mut self) -> bool {
        if self.playback != PlaybackState::Paused {
            return true;
        }
        if self.audio_loaded() {
            if let Err(err) = self.sink.play() {
                self.fail(format!("Failed to resume playback: {err}"));
                return false;
            }
        }
        self.playback = PlaybackState::Speaking;
        self.emit(SpeechEvent::Continue);
        true
    }

    fn stop(&mut self, outcome: UtteranceOutcome) -> bool {
        if self.playback == PlaybackState::Idle {
            return true;
        }
        if let Err(err) = self.sink.stop() {
            log::warn!(target: TARGET, "Sink failed to stop cleanly: {}", err);
        }
        self.finish(SpeechEvent::Cancel, outcome);
        true
    }

    fn fail(&mut self, reason: String) {
        log::error!(target: TARGET, "Utterance failed: {}", reason);
        if let Err(err) = self.sink.stop() {
            log::warn!(target: TARGET, "Sink failed to stop after error: {}", err);
        }
        self.finish(SpeechEvent::Error(reason.clone()), UtteranceOutcome::Failed(reason));
    }

    /// The only way back to Idle: emit the terminal event, then resolve.
    fn finish(&mut self, event: SpeechEvent, outcome: UtteranceOutcome) {
        if let Some(mut utterance) = self.utterance.take() {
            utterance.abort_synthesis();
            log::info!(
                target: TARGET,
                "Utterance {} ended with {}",
                utterance.id,
                event.method_name()
            );
        }
        self.playback = PlaybackState::Idle;
        self.emit(event);
        if let Some(pending) = self.pending.take() {
            pending.resolve(outcome);
        }
    }

    fn end_of_stream(generation: Generation, myself: &ActorRef<ControllerMessage>) -> EndOfStream {
        let controller = myself.clone();
        EndOfStream::new(generation, move |generation, end| {
            if let Err(err) = controller.cast(ControllerMessage::PlaybackEnded { generation, end }) {
                log::debug!(target: TARGET, "End of stream after controller stopped: {}", err);
            }
        })
    }

    fn on_synthesized(
        &mut self,
        generation: Generation,
        audio: AudioData,
        myself: &ActorRef<ControllerMessage>,
    ) {
        if !self.is_current(generation) {
            log::debug!(target: TARGET, "Discarding audio for stale generation {}", generation);
            return;
        }
        let play_now = self.playback == PlaybackState::Speaking;
        let end_of_stream = Self::end_of_stream(generation, myself);

        match SynthesisPipeline::bind(self.sink.as_mut(), audio, end_of_stream, play_now) {
            Ok(()) => {
                if let Some(utterance) = self.utterance.as_mut() {
                    utterance.synthesis_done();
                    utterance.audio_loaded = true;
                }
            }
            Err(err) => self.fail(format!("Sink rejected audio: {err}")),
        }
    }

    fn on_synthesis_failed(&mut self, generation: Generation, reason: String) {
        if !self.is_current(generation) {
            log::debug!(target: TARGET, "Discarding synthesis failure for stale generation {}", generation);
            return;
        }
        if let Some(utterance) = self.utterance.as_mut() {
            utterance.synthesis_done();
        }
        self.fail(reason);
    }

    fn on_playback_ended(&mut self, generation: Generation, end: PlaybackEnd) {
        if !self.is_current(generation) {
            log::debug!(target: TARGET, "Discarding end of stream for stale generation {}", generation);
            return;
        }
        match end {
            // A stream can drain in the instant between pause and the sink
            // acting on it; the audio is over either way.
            PlaybackEnd::Finished => self.finish(SpeechEvent::Complete, UtteranceOutcome::Completed),
            PlaybackEnd::Failed(reason) => self.fail(reason),
        }
    }

    fn configure(&mut self, update: ConfigUpdate) -> Result<(), ConfigError> {
        let result = update.apply(&mut self.config);
        if let Err(err) = &result {
            log::debug!(target: TARGET, "Configuration rejected: {}", err);
        }
        result
    }

    fn snapshot(&self) -> ControllerSnapshot {
        ControllerSnapshot {
            state: self.playback,
            await_completion: self.await_completion,
            pending_completion: self.pending.is_some(),
            utterance: self.utterance.as_ref().map(|u| u.text.clone()),
            config: self.config.clone(),
        }
    }
}

fn respond<T>(reply: RpcReplyPort<T>, value: T) {
    if reply.send(value).is_err() {
        log::debug!(target: TARGET, "Caller stopped waiting for a reply");
    }
}

#[async_trait]
impl Actor for PlaybackController {
    type Msg = ControllerMessage;
    type State = ControllerState;
    type Arguments = ControllerArgs;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        let state = ControllerState::new(args);
        log::info!(
            target: TARGET,
            "Playback controller started with engine {}",
            state.pipeline.engine_name()
        );
        Ok(state)
    }

    async fn post_stop(
        &self,
        _myself: ActorRef<Self::Msg>,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        state.stop(UtteranceOutcome::Disposed);
        log::info!(target: TARGET, "Playback controller stopped");
        Ok(())
    }

    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            ControllerMessage::Speak { text, reply } => {
                let ack = state.speak(text, &myself);
                respond(reply, ack);
            }
            ControllerMessage::Pause(reply) => respond(reply, state.pause()),
            ControllerMessage::Continue(reply) => respond(reply, state.resume()),
            ControllerMessage::Stop(reply) => {
                respond(reply, state.stop(UtteranceOutcome::Cancelled))
            }
            ControllerMessage::AwaitCompletion(enabled, reply) => {
                state.await_completion = enabled;
                respond(reply, true);
            }
            ControllerMessage::Configure(update, reply) => respond(reply, state.configure(update)),
            ControllerMessage::Snapshot(reply) => respond(reply, state.snapshot()),
            ControllerMessage::Synthesized { generation, audio } => {
                state.on_synthesized(generation, audio, &myself)
            }
            ControllerMessage::SynthesisFailed { generation, reason } => {
                state.on_synthesis_failed(generation, reason)
            }
            ControllerMessage::PlaybackEnded { generation, end } => {
                state.on_playback_ended(generation, end)
            }
        }
        Ok(())
    }
}
