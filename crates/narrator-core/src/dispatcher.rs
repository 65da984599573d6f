//! Maps named commands onto the catalog and the playback controller.

use crate::catalog::VoiceCatalog;
use crate::config::ConfigUpdate;
use crate::controller::{CompletionHandle, ControllerMessage, ControllerSnapshot, SpeakAck};
use crate::error::ServiceError;
use crate::settings::ServiceSettings;
use narrator_protocol::response::CONTROLLER_UNAVAILABLE;
use narrator_protocol::{Method, MethodCall, MethodResponse, VoiceRecord};
use ractor::rpc::CallResult;
use ractor::{ActorRef, RpcReplyPort};
use serde_json::Value;

const TARGET: &str = "narrator::dispatcher";

/// Answer to a single command
#[derive(Debug)]
pub enum Dispatch {
    Ready(MethodResponse),
    /// `speak` with await-completion on; resolves when the utterance ends
    Deferred(PendingResponse),
}

impl Dispatch {
    /// Wait for the final response, however long the utterance takes.
    pub async fn into_response(self) -> MethodResponse {
        match self {
            Dispatch::Ready(response) => response,
            Dispatch::Deferred(pending) => pending.wait().await,
        }
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, Dispatch::Deferred(_))
    }
}

/// A `speak` result that is not known yet
#[derive(Debug)]
pub struct PendingResponse {
    handle: CompletionHandle,
}

impl PendingResponse {
    pub async fn wait(self) -> MethodResponse {
        match self.handle.wait().await {
            Ok(outcome) => outcome.into(),
            Err(dropped) => {
                log::error!(target: TARGET, "{}", dropped);
                dropped.into()
            }
        }
    }
}

/// Routes commands; reads go straight to the catalog, everything else to the controller.
#[derive(Clone, Debug)]
pub struct CommandDispatcher {
    controller: ActorRef<ControllerMessage>,
    catalog: VoiceCatalog,
    platform_version: String,
    rate_offset: f64,
}

impl CommandDispatcher {
    pub fn new(
        controller: ActorRef<ControllerMessage>,
        catalog: VoiceCatalog,
        settings: &ServiceSettings,
    ) -> Self {
        Self {
            controller,
            catalog,
            platform_version: settings.platform_version.clone(),
            rate_offset: settings.rate_offset,
        }
    }

    pub fn catalog(&self) -> &VoiceCatalog {
        &self.catalog
    }

    pub async fn dispatch(&self, call: MethodCall) -> Dispatch {
        let Some(method) = call.resolve() else {
            log::debug!(target: TARGET, "Unknown method {}", call.method);
            return Dispatch::Ready(MethodResponse::NotImplemented);
        };
        log::debug!(target: TARGET, "Dispatching {}", method);

        match self.route(method, call.arguments).await {
            Ok(dispatch) => dispatch,
            Err(err) => {
                log::error!(target: TARGET, "{} failed: {}", method, err);
                Dispatch::Ready(MethodResponse::error(CONTROLLER_UNAVAILABLE, err.to_string()))
            }
        }
    }

    /// Current controller state, mainly for diagnostics.
    pub async fn snapshot(&self) -> Result<ControllerSnapshot, ServiceError> {
        self.ask(ControllerMessage::Snapshot).await
    }

    async fn route(&self, method: Method, arguments: Value) -> Result<Dispatch, ServiceError> {
        let response = match method {
            Method::GetPlatformVersion => MethodResponse::success(self.platform_version.clone()),
            Method::AwaitSpeakCompletion => match arguments {
                Value::Bool(enabled) => {
                    let accepted = self
                        .ask(|reply| ControllerMessage::AwaitCompletion(enabled, reply))
                        .await?;
                    MethodResponse::flag(accepted)
                }
                other => reject(method, &other),
            },
            Method::Speak => match arguments {
                Value::String(text) => {
                    let ack = self
                        .ask(|reply| ControllerMessage::Speak { text, reply })
                        .await?;
                    return Ok(match ack {
                        SpeakAck::Started | SpeakAck::Resumed => {
                            Dispatch::Ready(MethodResponse::accepted())
                        }
                        SpeakAck::Busy => Dispatch::Ready(MethodResponse::rejected()),
                        SpeakAck::Deferred(handle) => {
                            Dispatch::Deferred(PendingResponse { handle })
                        }
                    });
                }
                other => reject(method, &other),
            },
            Method::Pause => MethodResponse::flag(self.ask(ControllerMessage::Pause).await?),
            Method::Continue => MethodResponse::flag(self.ask(ControllerMessage::Continue).await?),
            Method::Stop => MethodResponse::flag(self.ask(ControllerMessage::Stop).await?),
            Method::SetLanguage => match arguments {
                Value::String(language) => match self.catalog.find_voice_by_language(&language) {
                    Some(voice) => self.configure(ConfigUpdate::Voice(voice)).await?,
                    None => {
                        log::debug!(target: TARGET, "No voice for language {}", language);
                        MethodResponse::rejected()
                    }
                },
                other => reject(method, &other),
            },
            Method::SetVoice => match voice_query(&arguments) {
                Some((locale, name)) => match self.catalog.find_voice(locale, name) {
                    Some(voice) => self.configure(ConfigUpdate::Voice(voice)).await?,
                    None => {
                        log::debug!(target: TARGET, "No voice named {:?} for {:?}", name, locale);
                        MethodResponse::rejected()
                    }
                },
                None => reject(method, &arguments),
            },
            Method::SetVolume => match arguments.as_f64() {
                Some(volume) => self.configure(ConfigUpdate::Volume(volume)).await?,
                None => reject(method, &arguments),
            },
            Method::SetSpeechRate => match arguments.as_f64() {
                Some(rate) => {
                    self.configure(ConfigUpdate::Rate(rate + self.rate_offset))
                        .await?
                }
                None => reject(method, &arguments),
            },
            Method::SetPitch => match arguments.as_f64() {
                Some(pitch) => self.configure(ConfigUpdate::Pitch(pitch)).await?,
                None => reject(method, &arguments),
            },
            Method::GetLanguages => MethodResponse::success(self.catalog.list_languages()),
            Method::GetVoices => {
                let voices: Vec<VoiceRecord> =
                    self.catalog.list_voices().iter().map(VoiceRecord::from).collect();
                MethodResponse::success(serde_json::to_value(voices).unwrap_or_default())
            }
        };
        Ok(Dispatch::Ready(response))
    }

    async fn configure(&self, update: ConfigUpdate) -> Result<MethodResponse, ServiceError> {
        let applied = self
            .ask(|reply| ControllerMessage::Configure(update, reply))
            .await?;
        Ok(MethodResponse::flag(applied.is_ok()))
    }

    async fn ask<T, F>(&self, build: F) -> Result<T, ServiceError>
    where
        T: Send + 'static,
        F: FnOnce(RpcReplyPort<T>) -> ControllerMessage,
    {
        match self.controller.call(build, None).await {
            Ok(CallResult::Success(value)) => Ok(value),
            Ok(CallResult::Timeout) => Err(ServiceError::ControllerUnavailable(
                "request timed out".to_string(),
            )),
            Ok(CallResult::SenderError) => Err(ServiceError::ControllerUnavailable(
                "controller dropped the request".to_string(),
            )),
            Err(err) => Err(ServiceError::ControllerUnavailable(err.to_string())),
        }
    }
}

fn reject(method: Method, arguments: &Value) -> MethodResponse {
    log::debug!(target: TARGET, "Invalid argument for {}: {}", method, arguments);
    MethodResponse::rejected()
}

/// `{"locale": .., "name": ..}` with both fields present as strings.
fn voice_query(arguments: &Value) -> Option<(&str, &str)> {
    match arguments {
        Value::Object(fields) => {
            let locale = fields.get("locale")?.as_str()?;
            let name = fields.get("name")?.as_str()?;
            Some((locale, name))
        }
        _ => None,
    }
}
