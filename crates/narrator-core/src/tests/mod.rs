
use async_trait::async_trait;
use futures::StreamExt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::SynthesizerConfig;
use crate::engine::{SpeechEngine, SynthesisProvider, VoicesProvider};
use crate::error::{SinkError, SinkResult, TTSError, TTSResult};
use crate::service::SpeechService;
use crate::settings::ServiceSettings;
use crate::sink::{EndOfStream, PlaybackSink};
use crate::types::{AudioData, VoiceDescriptor, VoiceGender};
use crate::utils::BoxEventStream;
use narrator_protocol::SpeechEvent;

pub(crate) fn sample_voices() -> Vec<VoiceDescriptor> {
    vec![
        VoiceDescriptor::new("en-US", "David", VoiceGender::Male, "en-us-david"),
        VoiceDescriptor::new("en-US", "Zira", VoiceGender::Female, "en-us-zira"),
        VoiceDescriptor::new("en-GB", "Hazel", VoiceGender::Female, "en-gb-hazel"),
        VoiceDescriptor::new("de-DE", "Katja", VoiceGender::Female, "de-de-katja"),
        VoiceDescriptor::new("en-US", "David", VoiceGender::Male, "en-us-david-legacy"),
    ]
}

/// Engine whose behaviour per text is fixed up front
pub(crate) struct ScriptedEngine {
    voices: Vec<VoiceDescriptor>,
    failing: Vec<String>,
    silent: Vec<String>,
    delay: Option<Duration>,
    requests: Arc<Mutex<Vec<(String, SynthesizerConfig)>>>,
}

impl ScriptedEngine {
    pub(crate) fn new(voices: Vec<VoiceDescriptor>) -> Self {
        Self {
            voices,
            failing: Vec::new(),
            silent: Vec::new(),
            delay: None,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn failing_on(mut self, text: &str) -> Self {
        self.failing.push(text.to_string());
        self
    }

    pub(crate) fn silent_on(mut self, text: &str) -> Self {
        self.silent.push(text.to_string());
        self
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every synthesize call seen so far, with the config it was given.
    pub(crate) fn requests(&self) -> Arc<Mutex<Vec<(String, SynthesizerConfig)>>> {
        self.requests.clone()
    }
}

#[async_trait]
impl SynthesisProvider for ScriptedEngine {
    async fn synthesize(&self, text: &str, config: &SynthesizerConfig) -> TTSResult<AudioData> {
        self.requests
            .lock()
            .unwrap()
            .push((text.to_string(), config.clone()));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.iter().any(|t| t == text) {
            return Err(TTSError::EngineError(
                format!("cannot say {text:?}"),
                "scripted".to_string(),
            ));
        }
        if self.silent.iter().any(|t| t == text) {
            return Ok(AudioData::new(Vec::new(), 1, 16_000));
        }
        Ok(AudioData::silence(Duration::from_millis(50), 16_000))
    }
}

impl VoicesProvider for ScriptedEngine {
    fn list_voices(&self) -> Vec<VoiceDescriptor> {
        self.voices.clone()
    }
}

impl SpeechEngine for ScriptedEngine {
    fn engine_name(&self) -> &str {
        "scripted"
    }
}

#[derive(Default)]
struct SinkLog {
    calls: Vec<&'static str>,
    end_of_stream: Option<EndOfStream>,
    fail_play: bool,
}

/// Sink that never ends on its own; tests end streams through a [`SinkProbe`].
pub(crate) struct ManualSink {
    log: Arc<Mutex<SinkLog>>,
}

impl ManualSink {
    pub(crate) fn new() -> Self {
        Self {
            log: Arc::new(Mutex::new(SinkLog::default())),
        }
    }

    pub(crate) fn probe(&self) -> SinkProbe {
        SinkProbe {
            log: self.log.clone(),
        }
    }
}

impl PlaybackSink for ManualSink {
    fn load(&mut self, _audio: AudioData, end_of_stream: EndOfStream) -> SinkResult<()> {
        let mut log = self.log.lock().unwrap();
        log.calls.push("load");
        log.end_of_stream = Some(end_of_stream);
        Ok(())
    }

    fn play(&mut self) -> SinkResult<()> {
        let mut log = self.log.lock().unwrap();
        log.calls.push("play");
        if log.fail_play {
            return Err(SinkError::Playback("output device lost".to_string()));
        }
        Ok(())
    }

    fn pause(&mut self) -> SinkResult<()> {
        self.log.lock().unwrap().calls.push("pause");
        Ok(())
    }

    fn stop(&mut self) -> SinkResult<()> {
        let mut log = self.log.lock().unwrap();
        log.calls.push("stop");
        log.end_of_stream = None;
        Ok(())
    }
}

#[derive(Clone)]
pub(crate) struct SinkProbe {
    log: Arc<Mutex<SinkLog>>,
}

impl SinkProbe {
    pub(crate) fn calls(&self) -> Vec<&'static str> {
        self.log.lock().unwrap().calls.clone()
    }

    pub(crate) fn is_loaded(&self) -> bool {
        self.log.lock().unwrap().end_of_stream.is_some()
    }

    pub(crate) fn fail_play(&self) {
        self.log.lock().unwrap().fail_play = true;
    }

    /// Remove the pending notifier without firing it.
    pub(crate) fn take_end_of_stream(&self) -> Option<EndOfStream> {
        self.log.lock().unwrap().end_of_stream.take()
    }

    /// Play the loaded stream to its end.
    pub(crate) fn finish(&self) {
        let end = self.take_end_of_stream().expect("no stream loaded");
        end.finished();
    }

    pub(crate) fn fail(&self, reason: &str) {
        let end = self.take_end_of_stream().expect("no stream loaded");
        end.failed(reason);
    }
}

pub(crate) fn test_settings(await_completion: bool) -> ServiceSettings {
    ServiceSettings {
        platform_version: "narrator-test".to_string(),
        await_speak_completion: await_completion,
        ..ServiceSettings::default()
    }
}

pub(crate) async fn start_service(
    engine: ScriptedEngine,
    sink: ManualSink,
    settings: ServiceSettings,
) -> (SpeechService, BoxEventStream<SpeechEvent>) {
    let mut service = SpeechService::start(Arc::new(engine), Box::new(sink), settings)
        .await
        .unwrap();
    let events = service.take_event_stream().unwrap();
    (service, events)
}

pub(crate) async fn next_event(events: &mut BoxEventStream<SpeechEvent>) -> SpeechEvent {
    tokio::time::timeout(Duration::from_secs(2), events.next())
        .await
        .expect("timed out waiting for an event")
        .expect("event stream closed")
}

/// Assert no event arrives within a short window.
pub(crate) async fn assert_quiet(events: &mut BoxEventStream<SpeechEvent>) {
    let next = tokio::time::timeout(Duration::from_millis(100), events.next()).await;
    assert!(next.is_err(), "unexpected event: {:?}", next);
}

pub(crate) async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not met in time");
}
