use thiserror::Error;

/// Errors raised by a synthesis engine
#[derive(Error, Debug)]
pub enum TTSError {
    /// Engine-specific failure
    #[error("TTS engine error: {0}\nEngine: {1}")]
    EngineError(String, String),

    /// The engine cannot synthesize this text
    #[error("Unsupported text: {0}")]
    UnsupportedText(String),

    /// Audio generation failed
    #[error("Audio generation failed: {0}\nInput text length: {1} characters")]
    GenerationFailed(String, usize),

    /// Synthesis did not finish in time
    #[error("Synthesis timed out after {0} ms")]
    Timeout(u64),

    /// IO error while talking to the engine
    #[error("IO error during TTS operation: {0}\nOperation: {1}")]
    IoError(std::io::Error, String),
}

/// Result type for engine operations
pub type TTSResult<T> = Result<T, TTSError>;

/// Errors raised by a playback sink
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Failed to initialize audio output stream")]
    InitFailed,

    #[error("Sink has no audio loaded")]
    NothingLoaded,

    #[error("Playback error: {0}")]
    Playback(String),
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Rejected synthesizer parameter
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{parameter} must be within [{min}, {max}], got {value}")]
    OutOfRange {
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{parameter} must be a finite number")]
    NotFinite { parameter: &'static str },
}

/// Errors while loading or validating service settings
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Service lifecycle and controller messaging errors
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Failed to spawn playback controller: {0}")]
    SpawnError(#[from] ractor::SpawnErr),

    #[error("Playback controller unavailable: {0}")]
    ControllerUnavailable(String),

    #[error("Playback controller did not shut down cleanly: {0}")]
    JoinError(#[from] tokio::task::JoinError),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),
}
