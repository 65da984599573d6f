use futures::StreamExt;
use narrator_core::backends::{SimulatedEngine, TimedSink};
use narrator_core::protocol::{MethodCall, MethodResponse, SpeechEvent};
use narrator_core::utils::BoxEventStream;
use narrator_core::{PlaybackState, ServiceSettings, SpeechService};
use serde_json::{Value, json};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

const LONG_TEXT: &str = "This sentence is long enough to keep the simulated sink busy for a while.";

async fn service(await_completion: bool, speed: f64) -> (SpeechService, BoxEventStream<SpeechEvent>) {
    let settings = ServiceSettings {
        await_speak_completion: await_completion,
        ..ServiceSettings::default()
    };
    let mut service = SpeechService::start(
        Arc::new(SimulatedEngine::new()),
        Box::new(TimedSink::new().with_speed(speed)),
        settings,
    )
    .await
    .unwrap();
    let events = service.take_event_stream().unwrap();
    (service, events)
}

async fn send(service: &SpeechService, method: &str, arguments: Value) -> MethodResponse {
    service
        .dispatch(MethodCall::new(method, arguments))
        .await
        .into_response()
        .await
}

async fn next_event(events: &mut BoxEventStream<SpeechEvent>) -> SpeechEvent {
    tokio::time::timeout(Duration::from_secs(5), events.next())
        .await
        .expect("timed out waiting for an event")
        .expect("event stream closed")
}

#[tokio::test]
async fn scenario_speak_without_waiting() {
    let (service, mut events) = service(false, 50.0).await;

    assert_eq!(send(&service, "speak", json!("Hello")).await, MethodResponse::accepted());
    assert_eq!(next_event(&mut events).await, SpeechEvent::Start);
    assert_eq!(next_event(&mut events).await, SpeechEvent::Complete);

    service.shutdown().await.unwrap();
}

#[tokio::test]
async fn scenario_speak_and_wait() {
    let (service, mut events) = service(false, 50.0).await;

    assert!(send(&service, "awaitSpeakCompletion", json!(true)).await.is_truthy());
    let response = send(&service, "speak", json!("Hello")).await;
    assert_eq!(response, MethodResponse::accepted());

    assert_eq!(next_event(&mut events).await, SpeechEvent::Start);
    assert_eq!(next_event(&mut events).await, SpeechEvent::Complete);

    service.shutdown().await.unwrap();
}

#[tokio::test]
async fn scenario_stop_before_completion() {
    let (service, mut events) = service(true, 1.0).await;

    let pending = service.dispatch(MethodCall::new("speak", LONG_TEXT)).await;
    assert!(pending.is_deferred());
    assert_eq!(next_event(&mut events).await, SpeechEvent::Start);

    assert_eq!(send(&service, "stop", Value::Null).await, MethodResponse::accepted());
    assert_eq!(pending.into_response().await, MethodResponse::accepted());
    assert_eq!(next_event(&mut events).await, SpeechEvent::Cancel);

    let snapshot = service.snapshot().await.unwrap();
    assert_eq!(snapshot.state, PlaybackState::Idle);
    assert!(!snapshot.pending_completion);

    service.shutdown().await.unwrap();
}

#[tokio::test]
async fn scenario_pause_and_continue() {
    let (service, mut events) = service(false, 1.0).await;

    send(&service, "speak", json!(LONG_TEXT)).await;
    assert!(send(&service, "pause", Value::Null).await.is_truthy());
    assert!(send(&service, "continue", Value::Null).await.is_truthy());
    assert!(send(&service, "stop", Value::Null).await.is_truthy());

    let mut seen = Vec::new();
    for _ in 0..4 {
        seen.push(next_event(&mut events).await);
    }
    assert_eq!(
        seen,
        vec![
            SpeechEvent::Start,
            SpeechEvent::Pause,
            SpeechEvent::Continue,
            SpeechEvent::Cancel
        ]
    );

    service.shutdown().await.unwrap();
}

#[tokio::test]
async fn scenario_unknown_voice() {
    let (service, _events) = service(false, 50.0).await;

    let response = send(
        &service,
        "setVoice",
        json!({"locale": "xx-XX", "name": "Nobody"}),
    )
    .await;
    assert_eq!(response, MethodResponse::rejected());

    let snapshot = service.snapshot().await.unwrap();
    assert_eq!(snapshot.state, PlaybackState::Idle);
    assert!(snapshot.config.voice().is_none());

    service.shutdown().await.unwrap();
}

#[tokio::test]
async fn scenario_unknown_command() {
    let (service, _events) = service(false, 50.0).await;

    let response = send(&service, "frobnicate", Value::Null).await;
    assert_eq!(response, MethodResponse::NotImplemented);
    assert_eq!(
        service.snapshot().await.unwrap().state,
        PlaybackState::Idle
    );

    service.shutdown().await.unwrap();
}

#[tokio::test]
async fn voices_and_languages_agree() {
    let (service, _events) = service(false, 50.0).await;

    let voices = send(&service, "getVoices", Value::Null).await;
    let languages = send(&service, "getLanguages", Value::Null).await;

    let from_voices: BTreeSet<String> = voices
        .result()
        .and_then(Value::as_array)
        .unwrap()
        .iter()
        .map(|voice| voice["locale"].as_str().unwrap().to_string())
        .collect();
    let languages: Vec<String> = serde_json::from_value(languages.result().unwrap().clone()).unwrap();

    assert_eq!(languages, from_voices.into_iter().collect::<Vec<_>>());

    service.shutdown().await.unwrap();
}

#[tokio::test]
async fn back_to_back_utterances() {
    let (service, mut events) = service(true, 50.0).await;

    for text in ["one", "two", "three"] {
        assert_eq!(send(&service, "speak", json!(text)).await, MethodResponse::accepted());
        assert_eq!(next_event(&mut events).await, SpeechEvent::Start);
        assert_eq!(next_event(&mut events).await, SpeechEvent::Complete);
    }

    service.shutdown().await.unwrap();
}
