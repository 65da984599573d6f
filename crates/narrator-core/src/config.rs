//! Mutable synthesizer parameters applied at the start of each utterance.

use crate::error::ConfigError;
use crate::types::VoiceDescriptor;
use serde::{Deserialize, Serialize};

/// Inclusive range accepted for a numeric parameter
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterRange {
    pub min: f64,
    pub max: f64,
}

impl ParameterRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    fn check(&self, parameter: &'static str, value: f64) -> Result<f64, ConfigError> {
        if !value.is_finite() {
            return Err(ConfigError::NotFinite { parameter });
        }
        if !self.contains(value) {
            return Err(ConfigError::OutOfRange {
                parameter,
                value,
                min: self.min,
                max: self.max,
            });
        }
        Ok(value)
    }
}

/// Ranges an engine accepts for volume, rate and pitch
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterRanges {
    pub volume: ParameterRange,
    pub rate: ParameterRange,
    pub pitch: ParameterRange,
}

impl Default for ParameterRanges {
    fn default() -> Self {
        Self {
            volume: ParameterRange::new(0.0, 1.0),
            rate: ParameterRange::new(0.5, 6.0),
            pitch: ParameterRange::new(0.0, 2.0),
        }
    }
}

/// Playback parameters read by the synthesis pipeline.
///
/// Last write wins; a snapshot is taken when an utterance starts, so changes
/// never reach audio that is already in flight.
#[derive(Clone, Debug, PartialEq)]
pub struct SynthesizerConfig {
    volume: f64,
    rate: f64,
    pitch: f64,
    voice: Option<VoiceDescriptor>,
    ranges: ParameterRanges,
}

impl SynthesizerConfig {
    pub fn new(ranges: ParameterRanges) -> Self {
        Self {
            volume: 1.0,
            rate: 1.0,
            pitch: 1.0,
            voice: None,
            ranges,
        }
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn pitch(&self) -> f64 {
        self.pitch
    }

    /// Selected voice, `None` means the engine default.
    pub fn voice(&self) -> Option<&VoiceDescriptor> {
        self.voice.as_ref()
    }

    pub fn ranges(&self) -> &ParameterRanges {
        &self.ranges
    }

    pub fn set_volume(&mut self, volume: f64) -> Result<(), ConfigError> {
        self.volume = self.ranges.volume.check("volume", volume)?;
        Ok(())
    }

    pub fn set_rate(&mut self, rate: f64) -> Result<(), ConfigError> {
        self.rate = self.ranges.rate.check("rate", rate)?;
        Ok(())
    }

    pub fn set_pitch(&mut self, pitch: f64) -> Result<(), ConfigError> {
        self.pitch = self.ranges.pitch.check("pitch", pitch)?;
        Ok(())
    }

    /// Select a voice that has already been resolved through the catalog.
    pub fn set_voice(&mut self, voice: VoiceDescriptor) {
        self.voice = Some(voice);
    }
}

impl Default for SynthesizerConfig {
    fn default() -> Self {
        Self::new(ParameterRanges::default())
    }
}

/// A single configuration change routed through the playback controller
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigUpdate {
    Volume(f64),
    Rate(f64),
    Pitch(f64),
    Voice(VoiceDescriptor),
}

impl ConfigUpdate {
    pub fn apply(self, config: &mut SynthesizerConfig) -> Result<(), ConfigError> {
        match self {
            ConfigUpdate::Volume(v) => config.set_volume(v),
            ConfigUpdate::Rate(r) => config.set_rate(r),
            ConfigUpdate::Pitch(p) => config.set_pitch(p),
            ConfigUpdate::Voice(voice) => {
                config.set_voice(voice);
                Ok(())
            }
        }
    }
}
