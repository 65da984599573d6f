//! JSON-lines transport: one request per stdin line, one frame per stdout line.

use anyhow::Result;
use futures::StreamExt;
use narrator_core::dispatcher::{CommandDispatcher, Dispatch};
use narrator_core::protocol::{MethodCall, MethodResponse, SpeechEvent};
use narrator_core::SpeechService;
use narrator_core::utils::BoxEventStream;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::task::JoinSet;

/// Error code for lines that are not a valid request
pub const INVALID_REQUEST: &str = "INVALID_REQUEST";

#[derive(Debug, Deserialize)]
struct Request {
    #[serde(default)]
    id: Value,
    #[serde(flatten)]
    call: MethodCall,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum Frame {
    Response {
        id: Value,
        result: Value,
    },
    Error {
        id: Value,
        code: String,
        message: String,
    },
    NotImplemented {
        id: Value,
    },
    Event {
        method: &'static str,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
}

impl Frame {
    fn reply(id: Value, response: MethodResponse) -> Self {
        match response {
            MethodResponse::Success { result } => Frame::Response { id, result },
            MethodResponse::Error { code, message } => Frame::Error { id, code, message },
            MethodResponse::NotImplemented => Frame::NotImplemented { id },
        }
    }

    fn event(event: SpeechEvent) -> Self {
        Frame::Event {
            method: event.method_name(),
            message: event.message().map(str::to_string),
        }
    }
}

/// Serve requests from `input` until it closes, then shut the service down.
///
/// Deferred `speak` answers are written when they resolve, so the loop keeps
/// reading (and can serve `stop`) while a caller waits.
pub async fn serve<R, W>(mut service: SpeechService, input: R, output: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (frames, outbound) = unbounded_channel::<Frame>();
    let events = service
        .take_event_stream()
        .unwrap_or_else(|| Box::pin(futures::stream::empty()));
    let writer = tokio::spawn(write_frames(events, outbound, output));

    let dispatcher = service.dispatcher();
    let mut waiting = JoinSet::new();
    let mut lines = input.lines();
    let mut interrupted = false;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                handle_line(&dispatcher, &line, &frames, &mut waiting).await;
            }
            _ = tokio::signal::ctrl_c() => {
                log::info!("Interrupted, shutting down");
                interrupted = true;
                break;
            }
        }
    }

    // On a clean end of input, let awaited utterances finish first.
    if !interrupted {
        while waiting.join_next().await.is_some() {}
    }
    service.shutdown().await?;
    while waiting.join_next().await.is_some() {}

    drop(frames);
    writer.await??;
    Ok(())
}

/// Events are preferred over replies, so an utterance's terminal event is
/// always written before the deferred answer it resolves.
async fn write_frames<W>(
    mut events: BoxEventStream<SpeechEvent>,
    mut outbound: UnboundedReceiver<Frame>,
    mut output: W,
) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    loop {
        let frame = tokio::select! {
            biased;
            Some(event) = events.next() => Frame::event(event),
            frame = outbound.recv() => match frame {
                Some(frame) => frame,
                None => break,
            },
        };
        write_frame(&mut output, &frame).await?;
    }
    while let Some(event) = events.next().await {
        write_frame(&mut output, &Frame::event(event)).await?;
    }
    Ok(())
}

async fn write_frame<W: AsyncWrite + Unpin>(output: &mut W, frame: &Frame) -> Result<()> {
    let mut line = serde_json::to_string(frame)?;
    line.push('\n');
    output.write_all(line.as_bytes()).await?;
    output.flush().await?;
    Ok(())
}

async fn handle_line(
    dispatcher: &CommandDispatcher,
    line: &str,
    frames: &UnboundedSender<Frame>,
    waiting: &mut JoinSet<()>,
) {
    let request: Request = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(err) => {
            log::warn!("Ignoring malformed request: {}", err);
            let _ = frames.send(Frame::Error {
                id: Value::Null,
                code: INVALID_REQUEST.to_string(),
                message: err.to_string(),
            });
            return;
        }
    };

    match dispatcher.dispatch(request.call).await {
        Dispatch::Ready(response) => {
            let _ = frames.send(Frame::reply(request.id, response));
        }
        Dispatch::Deferred(pending) => {
            let frames = frames.clone();
            let id = request.id;
            waiting.spawn(async move {
                let response = pending.wait().await;
                let _ = frames.send(Frame::reply(id, response));
            });
        }
    }
}
