//! Engine and sink that need no audio hardware.
//!
//! `SimulatedEngine` renders a short tone whose length follows the text and
//! the rate; `TimedSink` "plays" audio by waiting out its duration.

use crate::config::SynthesizerConfig;
use crate::engine::{SpeechEngine, SynthesisProvider, VoicesProvider};
use crate::error::SinkResult;
use crate::error::TTSResult;
use crate::sink::{EndOfStream, PlaybackSink};
use crate::types::{AudioData, VoiceDescriptor, VoiceGender};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

const SAMPLE_RATE: u32 = 16_000;
const MILLIS_PER_CHAR: f64 = 60.0;
const MIN_MILLIS: f64 = 120.0;

/// Deterministic engine with a fixed voice list
#[derive(Debug, Clone)]
pub struct SimulatedEngine {
    voices: Vec<VoiceDescriptor>,
    latency: Duration,
}

impl SimulatedEngine {
    pub fn new() -> Self {
        Self {
            voices: vec![
                VoiceDescriptor::new("en-US", "Ava", VoiceGender::Female, "simulated/en-US/ava"),
                VoiceDescriptor::new("en-US", "Guy", VoiceGender::Male, "simulated/en-US/guy"),
                VoiceDescriptor::new("en-GB", "Libby", VoiceGender::Female, "simulated/en-GB/libby"),
                VoiceDescriptor::new("fr-FR", "Henri", VoiceGender::Male, "simulated/fr-FR/henri"),
                VoiceDescriptor::new("de-DE", "Kim", VoiceGender::Unknown, "simulated/de-DE/kim"),
            ],
            latency: Duration::ZERO,
        }
    }

    pub fn with_voices(mut self, voices: Vec<VoiceDescriptor>) -> Self {
        self.voices = voices;
        self
    }

    /// Delay every synthesis by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Length of the audio produced for `text` at `rate`.
    pub fn utterance_length(text: &str, rate: f64) -> Duration {
        let chars = text.chars().count() as f64;
        let millis = (chars * MILLIS_PER_CHAR / rate.max(0.1)).max(MIN_MILLIS);
        Duration::from_secs_f64(millis / 1000.0)
    }
}

impl Default for SimulatedEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SynthesisProvider for SimulatedEngine {
    async fn synthesize(&self, text: &str, config: &SynthesizerConfig) -> TTSResult<AudioData> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let length = Self::utterance_length(text, config.rate());
        let frames = (length.as_secs_f64() * f64::from(SAMPLE_RATE)).round() as usize;
        let frequency = 220.0 * config.pitch().max(0.1);
        let amplitude = (0.2 * config.volume()) as f32;

        let samples = (0..frames)
            .map(|i| {
                let t = i as f64 / f64::from(SAMPLE_RATE);
                amplitude * (2.0 * std::f64::consts::PI * frequency * t).sin() as f32
            })
            .collect();
        Ok(AudioData::new(samples, 1, SAMPLE_RATE))
    }
}

impl VoicesProvider for SimulatedEngine {
    fn list_voices(&self) -> Vec<VoiceDescriptor> {
        self.voices.clone()
    }
}

impl SpeechEngine for SimulatedEngine {
    fn engine_name(&self) -> &str {
        "simulated"
    }
}

type Slot = Arc<Mutex<Option<EndOfStream>>>;

struct Stream {
    remaining: Duration,
    end_of_stream: Slot,
    timer: Option<(JoinHandle<()>, Instant)>,
}

/// Sink that reports end of stream once the audio's duration has elapsed.
///
/// Must be driven from inside a tokio runtime.
#[derive(Default)]
pub struct TimedSink {
    stream: Option<Stream>,
    speed: Option<f64>,
}

impl TimedSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Play faster than real time, e.g. `10.0` for a tenth of the duration.
    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }

    fn halt_timer(stream: &mut Stream) {
        if let Some((timer, started)) = stream.timer.take() {
            timer.abort();
            stream.remaining = stream.remaining.saturating_sub(started.elapsed());
        }
    }
}

impl PlaybackSink for TimedSink {
    fn load(&mut self, audio: AudioData, end_of_stream: EndOfStream) -> SinkResult<()> {
        self.stop()?;
        let mut remaining = audio.duration();
        if let Some(speed) = self.speed.filter(|s| *s > 0.0) {
            remaining = remaining.div_f64(speed);
        }
        self.stream = Some(Stream {
            remaining,
            end_of_stream: Arc::new(Mutex::new(Some(end_of_stream))),
            timer: None,
        });
        Ok(())
    }

    fn play(&mut self) -> SinkResult<()> {
        let Some(stream) = self.stream.as_mut() else {
            return Err(crate::error::SinkError::NothingLoaded);
        };
        if stream.timer.is_some() {
            return Ok(());
        }
        let remaining = stream.remaining;
        let slot = stream.end_of_stream.clone();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(remaining).await;
            let end = slot.lock().unwrap_or_else(PoisonError::into_inner).take();
            if let Some(end) = end {
                end.finished();
            }
        });
        stream.timer = Some((timer, Instant::now()));
        Ok(())
    }

    fn pause(&mut self) -> SinkResult<()> {
        if let Some(stream) = self.stream.as_mut() {
            Self::halt_timer(stream);
        }
        Ok(())
    }

    fn stop(&mut self) -> SinkResult<()> {
        if let Some(mut stream) = self.stream.take() {
            Self::halt_timer(&mut stream);
            stream
                .end_of_stream
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::PlaybackEnd;
    use tokio::sync::mpsc;

    fn notifier(generation: u64) -> (EndOfStream, mpsc::UnboundedReceiver<(u64, PlaybackEnd)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let end = EndOfStream::new(generation, move |generation, end| {
            let _ = tx.send((generation, end));
        });
        (end, rx)
    }

    #[tokio::test]
    async fn test_engine_length_follows_text_and_rate() {
        let engine = SimulatedEngine::new();
        let mut config = SynthesizerConfig::default();
        let normal = engine.synthesize("hello world", &config).await.unwrap();
        config.set_rate(2.0).unwrap();
        let fast = engine.synthesize("hello world", &config).await.unwrap();

        assert!(fast.duration() < normal.duration());
        let empty = engine.synthesize("", &config).await.unwrap();
        assert!((empty.duration().as_secs_f64() - 0.12).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_volume_scales_amplitude() {
        let engine = SimulatedEngine::new();
        let mut config = SynthesizerConfig::default();
        config.set_volume(0.0).unwrap();
        let audio = engine.synthesize("quiet", &config).await.unwrap();
        assert!(audio.samples.iter().all(|s| *s == 0.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_sink_reports_end() {
        let mut sink = TimedSink::new();
        let (end, mut rx) = notifier(3);
        sink.load(AudioData::silence(Duration::from_millis(500), 8_000), end)
            .unwrap();
        sink.play().unwrap();

        assert_eq!(rx.recv().await, Some((3, PlaybackEnd::Finished)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_sink_pause_holds_remaining_time() {
        let mut sink = TimedSink::new();
        let (end, mut rx) = notifier(1);
        sink.load(AudioData::silence(Duration::from_millis(500), 8_000), end)
            .unwrap();
        sink.play().unwrap();

        tokio::time::sleep(Duration::from_millis(200)).await;
        sink.pause().unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(rx.try_recv().is_err());

        sink.play().unwrap();
        let started = Instant::now();
        assert_eq!(rx.recv().await, Some((1, PlaybackEnd::Finished)));
        assert!(started.elapsed() >= Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_sink_stop_discards_notification() {
        let mut sink = TimedSink::new();
        let (end, mut rx) = notifier(1);
        sink.load(AudioData::silence(Duration::from_millis(100), 8_000), end)
            .unwrap();
        sink.play().unwrap();
        sink.stop().unwrap();

        assert_eq!(rx.recv().await, None);
        assert!(matches!(
            sink.play(),
            Err(crate::error::SinkError::NothingLoaded)
        ));
    }
}
