use narrator_protocol::VoiceRecord;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Audio data with normalized samples
#[derive(Clone, Debug, PartialEq)]
pub struct AudioData {
    /// Audio samples normalized to [-1.0, 1.0], interleaved when multi-channel
    pub samples: Vec<f32>,
    /// Number of audio channels (typically 1 for mono)
    pub channels: usize,
    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl AudioData {
    pub fn new(samples: Vec<f32>, channels: usize, sample_rate: u32) -> Self {
        Self {
            samples,
            channels,
            sample_rate,
        }
    }

    /// Silent mono audio of the given length.
    pub fn silence(duration: Duration, sample_rate: u32) -> Self {
        let frames = (duration.as_secs_f64() * f64::from(sample_rate)).round() as usize;
        Self::new(vec![0.0; frames], 1, sample_rate)
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Playback length derived from sample count, channels and rate.
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 || self.channels == 0 {
            return Duration::ZERO;
        }
        let frames = self.samples.len() / self.channels;
        Duration::from_secs_f64(frames as f64 / f64::from(self.sample_rate))
    }
}

/// Gender category reported by the engine for a voice
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceGender {
    Male,
    Female,
    #[default]
    Unknown,
}

impl VoiceGender {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoiceGender::Male => "male",
            VoiceGender::Female => "female",
            VoiceGender::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for VoiceGender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Catalog entry identifying a synthesizer voice
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoiceDescriptor {
    /// BCP-47 style language tag, e.g. `en-US`
    pub language: String,
    /// Human readable name shown to callers
    pub name: String,
    pub gender: VoiceGender,
    /// Engine-specific identifier (registry token, voice file, ...)
    pub identifier: String,
}

impl VoiceDescriptor {
    pub fn new(
        language: impl Into<String>,
        name: impl Into<String>,
        gender: VoiceGender,
        identifier: impl Into<String>,
    ) -> Self {
        Self {
            language: language.into(),
            name: name.into(),
            gender,
            identifier: identifier.into(),
        }
    }
}

impl From<&VoiceDescriptor> for VoiceRecord {
    fn from(voice: &VoiceDescriptor) -> Self {
        VoiceRecord {
            locale: voice.language.clone(),
            name: voice.name.clone(),
            gender: voice.gender.to_string(),
            identifier: voice.identifier.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_duration() {
        let audio = AudioData::new(vec![0.0; 48_000], 2, 24_000);
        assert_eq!(audio.duration(), Duration::from_secs(1));

        let empty = AudioData::new(Vec::new(), 1, 0);
        assert_eq!(empty.duration(), Duration::ZERO);
    }

    #[test]
    fn test_silence_length() {
        let audio = AudioData::silence(Duration::from_millis(250), 16_000);
        assert_eq!(audio.samples.len(), 4_000);
        assert_eq!(audio.channels, 1);
    }

    #[test]
    fn test_voice_record_conversion() {
        let voice = VoiceDescriptor::new("en-US", "Mark", VoiceGender::Male, "MSTTS_V110_enUS_MarkM");
        let record = VoiceRecord::from(&voice);
        assert_eq!(record.locale, "en-US");
        assert_eq!(record.name, "Mark");
        assert_eq!(record.gender, "male");
        assert_eq!(record.identifier, "MSTTS_V110_enUS_MarkM");
    }
}
