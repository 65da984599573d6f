mod backend;
mod transport;

use anyhow::{Context, Result};
use backend::{EngineKind, SinkKind};
use clap::{Parser, Subcommand};
use futures::StreamExt;
use narrator_core::protocol::{MethodCall, MethodResponse};
use narrator_core::{ServiceSettings, SpeechService, VoiceCatalog};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "narrator")]
#[command(about = "Narrator - speech synthesis control service", long_about = None)]
struct Cli {
    /// Path to a YAML settings file
    #[arg(short, long, env = "NARRATOR_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Synthesis engine
    #[arg(long, value_enum, default_value_t = EngineKind::Simulated, global = true)]
    engine: EngineKind,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve JSON-lines commands on stdin, writing responses and events to stdout
    Serve {
        /// Audio output
        #[arg(long, value_enum, default_value_t = SinkKind::Timed)]
        sink: SinkKind,
    },
    /// Speak a single utterance and wait for it to finish
    Say {
        /// Text to speak
        text: String,

        /// Language tag used to pick a voice
        #[arg(short, long)]
        language: Option<String>,

        /// Audio output
        #[arg(long, value_enum, default_value_t = SinkKind::Timed)]
        sink: SinkKind,
    },
    /// List the engine's voices
    Voices {
        /// Print distinct language tags instead of voices
        #[arg(long)]
        languages: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { sink } => {
            let service = start(cli.engine, sink, settings).await?;
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            transport::serve(service, stdin, tokio::io::stdout()).await?;
        }
        Commands::Say {
            text,
            language,
            sink,
        } => {
            let settings = ServiceSettings {
                await_speak_completion: true,
                ..settings
            };
            say(start(cli.engine, sink, settings).await?, text, language).await?;
        }
        Commands::Voices { languages } => {
            let catalog = VoiceCatalog::new(backend::engine(cli.engine)?);
            if languages {
                for language in catalog.list_languages() {
                    println!("{language}");
                }
            } else {
                for voice in catalog.list_voices() {
                    println!(
                        "{:<12} {:<28} {:<8} {}",
                        voice.language, voice.name, voice.gender, voice.identifier
                    );
                }
            }
        }
    }

    Ok(())
}

fn load_settings(path: Option<&Path>) -> Result<ServiceSettings> {
    match path {
        Some(path) => {
            log::info!("Loading settings from {:?}", path);
            ServiceSettings::from_yaml_file(path)
                .with_context(|| format!("Failed to load settings from {}", path.display()))
        }
        None => Ok(ServiceSettings::default()),
    }
}

async fn start(engine: EngineKind, sink: SinkKind, settings: ServiceSettings) -> Result<SpeechService> {
    let service = SpeechService::start(backend::engine(engine)?, backend::sink(sink)?, settings)
        .await
        .context("Failed to start speech service")?;
    Ok(service)
}

async fn say(mut service: SpeechService, text: String, language: Option<String>) -> Result<()> {
    if let Some(language) = language {
        let response = service
            .dispatch(MethodCall::new("setLanguage", language.clone()))
            .await
            .into_response()
            .await;
        if !response.is_truthy() {
            log::warn!("No voice for {}, using the engine default", language);
        }
    }

    let events = service.take_event_stream().map(|mut events| {
        tokio::spawn(async move {
            while let Some(event) = events.next().await {
                log::info!("{}", event);
            }
        })
    });

    let response = service
        .dispatch(MethodCall::new("speak", text))
        .await
        .into_response()
        .await;
    service.shutdown().await?;
    if let Some(events) = events {
        events.await?;
    }

    match response {
        MethodResponse::Error { code, message } => anyhow::bail!("{code}: {message}"),
        response if !response.is_truthy() => anyhow::bail!("Speech service was busy"),
        _ => Ok(()),
    }
}
