use crate::error::{SinkError, SinkResult};
use crate::sink::{EndOfStream, PlaybackSink};
use crate::types::AudioData;
use rodio::{OutputStreamBuilder, Sink};
use std::sync::mpsc;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::thread;
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

struct Shared {
    sink: Sink,
    end_of_stream: Mutex<Option<EndOfStream>>,
}

/// Sink playing through the default audio device
///
/// The output stream lives on its own thread for as long as the sink exists;
/// a watcher thread reports when the loaded audio has drained.
pub struct RodioSink {
    shared: Arc<Shared>,
    _keep_alive: mpsc::Sender<()>,
}

impl RodioSink {
    /// Try to open the default output device
    pub fn try_new() -> SinkResult<Self> {
        let (sink_tx, sink_rx) = mpsc::channel();
        let (keep_alive, keep_alive_rx) = mpsc::channel::<()>();

        thread::Builder::new()
            .name("narrator-audio-output".to_string())
            .spawn(move || {
                let stream = match OutputStreamBuilder::open_default_stream() {
                    Ok(s) => s,
                    Err(_) => {
                        let _ = sink_tx.send(Err(SinkError::InitFailed));
                        return;
                    }
                };
                let sink = Sink::connect_new(stream.mixer());
                sink.pause();
                if sink_tx.send(Ok(sink)).is_err() {
                    return;
                }
                // Hold the stream until the sink is dropped.
                let _ = keep_alive_rx.recv();
                drop(stream);
            })
            .map_err(|err| SinkError::Playback(err.to_string()))?;

        let sink = sink_rx.recv().map_err(|_| SinkError::InitFailed)??;
        let shared = Arc::new(Shared {
            sink,
            end_of_stream: Mutex::new(None),
        });
        Self::spawn_watcher(Arc::downgrade(&shared))?;

        log::info!(target: "narrator::playback", "Opened default audio output");
        Ok(Self {
            shared,
            _keep_alive: keep_alive,
        })
    }

    fn spawn_watcher(shared: Weak<Shared>) -> SinkResult<()> {
        thread::Builder::new()
            .name("narrator-audio-watcher".to_string())
            .spawn(move || {
                loop {
                    thread::sleep(POLL_INTERVAL);
                    let Some(shared) = shared.upgrade() else {
                        break;
                    };
                    let drained = {
                        let mut slot = shared
                            .end_of_stream
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner);
                        if slot.is_some() && shared.sink.empty() {
                            slot.take()
                        } else {
                            None
                        }
                    };
                    if let Some(end) = drained {
                        end.finished();
                    }
                }
            })
            .map(|_| ())
            .map_err(|err| SinkError::Playback(err.to_string()))
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<EndOfStream>> {
        self.shared
            .end_of_stream
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl PlaybackSink for RodioSink {
    fn load(&mut self, audio: AudioData, end_of_stream: EndOfStream) -> SinkResult<()> {
        let source = rodio::buffer::SamplesBuffer::new(
            audio.channels as u16,
            audio.sample_rate,
            audio.samples,
        );
        // Swap under the lock so the watcher never sees an empty sink with a
        // live notifier.
        let mut slot = self.slot();
        self.shared.sink.clear();
        self.shared.sink.append(source);
        *slot = Some(end_of_stream);
        Ok(())
    }

    fn play(&mut self) -> SinkResult<()> {
        self.shared.sink.play();
        Ok(())
    }

    fn pause(&mut self) -> SinkResult<()> {
        self.shared.sink.pause();
        Ok(())
    }

    fn stop(&mut self) -> SinkResult<()> {
        let mut slot = self.slot();
        slot.take();
        self.shared.sink.clear();
        Ok(())
    }
}
