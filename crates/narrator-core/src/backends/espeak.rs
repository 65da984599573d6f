//! espeak-ng command-line engine.

use crate::config::SynthesizerConfig;
use crate::engine::{SpeechEngine, SynthesisProvider, VoicesProvider};
use crate::error::{TTSError, TTSResult};
use crate::types::{AudioData, VoiceDescriptor, VoiceGender};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

const ENGINE: &str = "espeak-ng";
const BASE_WPM: f64 = 175.0;

/// Engine shelling out to `espeak-ng`, reading back its WAV output
#[derive(Debug, Clone)]
pub struct EspeakEngine {
    program: PathBuf,
    voices: Vec<VoiceDescriptor>,
}

impl EspeakEngine {
    /// Locate `espeak-ng` (or `espeak`) via `ESPEAK_BIN` or `PATH` and load its voice list.
    pub fn detect() -> TTSResult<Self> {
        let program = find_program().ok_or_else(|| {
            TTSError::EngineError("espeak-ng not found on PATH".to_string(), ENGINE.to_string())
        })?;
        Self::with_program(program)
    }

    pub fn with_program(program: impl Into<PathBuf>) -> TTSResult<Self> {
        let program = program.into();
        let output = std::process::Command::new(&program)
            .arg("--voices")
            .output()
            .map_err(|e| TTSError::IoError(e, "listing espeak-ng voices".to_string()))?;
        if !output.status.success() {
            return Err(TTSError::EngineError(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
                ENGINE.to_string(),
            ));
        }
        let voices = parse_voice_list(&String::from_utf8_lossy(&output.stdout));
        log::info!(
            target: "narrator::espeak",
            "Using {} with {} voices",
            program.display(),
            voices.len()
        );
        Ok(Self { program, voices })
    }

    fn arguments(text: &str, config: &SynthesizerConfig, wav: &Path) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(voice) = config.voice() {
            args.push("-v".to_string());
            args.push(voice.identifier.clone());
        }
        let wpm = (BASE_WPM * config.rate()).round().clamp(80.0, 450.0) as i32;
        let amplitude = (100.0 * config.volume()).round().clamp(0.0, 100.0) as i32;
        let pitch = (50.0 * config.pitch()).round().clamp(0.0, 99.0) as i32;
        args.extend([
            "-s".to_string(),
            wpm.to_string(),
            "-a".to_string(),
            amplitude.to_string(),
            "-p".to_string(),
            pitch.to_string(),
            "-w".to_string(),
            wav.display().to_string(),
            "--".to_string(),
            text.to_string(),
        ]);
        args
    }
}

#[async_trait]
impl SynthesisProvider for EspeakEngine {
    async fn synthesize(&self, text: &str, config: &SynthesizerConfig) -> TTSResult<AudioData> {
        let wav = std::env::temp_dir().join(format!("narrator-{}.wav", uuid::Uuid::new_v4()));
        let args = Self::arguments(text, config, &wav);
        log::debug!(target: "narrator::espeak", "Running {} {:?}", self.program.display(), args);

        let output = tokio::process::Command::new(&self.program)
            .args(&args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| TTSError::IoError(e, "running espeak-ng".to_string()))?;
        if !output.status.success() {
            let _ = tokio::fs::remove_file(&wav).await;
            return Err(TTSError::EngineError(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
                ENGINE.to_string(),
            ));
        }

        let decoded = read_wav(&wav);
        if let Err(err) = tokio::fs::remove_file(&wav).await {
            log::warn!(target: "narrator::espeak", "Could not remove {}: {}", wav.display(), err);
        }
        decoded.map_err(|reason| TTSError::GenerationFailed(reason, text.chars().count()))
    }
}

impl VoicesProvider for EspeakEngine {
    fn list_voices(&self) -> Vec<VoiceDescriptor> {
        self.voices.clone()
    }
}

impl SpeechEngine for EspeakEngine {
    fn engine_name(&self) -> &str {
        ENGINE
    }
}

fn find_program() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("ESPEAK_BIN").map(PathBuf::from) {
        if path.exists() {
            return Some(path);
        }
    }
    let paths = std::env::var_os("PATH")?;
    ["espeak-ng", "espeak"].into_iter().find_map(|bin| {
        std::env::split_paths(&paths)
            .map(|dir| dir.join(bin))
            .find(|candidate| candidate.exists())
    })
}

fn read_wav(path: &Path) -> Result<AudioData, String> {
    let mut reader = hound::WavReader::open(path).map_err(|e| e.to_string())?;
    let spec = reader.spec();
    let samples = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| e.to_string())?,
        hound::SampleFormat::Int => {
            let scale = (1_i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| e.to_string())?
        }
    };
    Ok(AudioData::new(
        samples,
        usize::from(spec.channels),
        spec.sample_rate,
    ))
}

/// Parse `espeak-ng --voices` output into descriptors.
fn parse_voice_list(listing: &str) -> Vec<VoiceDescriptor> {
    listing
        .lines()
        .skip(1)
        .filter_map(|line| {
            let columns: Vec<&str> = line.split_whitespace().collect();
            let [_, language, age_gender, name, ..] = columns.as_slice() else {
                return None;
            };
            let gender = match age_gender.rsplit('/').next() {
                Some("M") => VoiceGender::Male,
                Some("F") => VoiceGender::Female,
                _ => VoiceGender::Unknown,
            };
            Some(VoiceDescriptor::new(
                language_tag(language),
                name.replace('_', " "),
                gender,
                *language,
            ))
        })
        .collect()
}

/// `en-us` -> `en-US`; other subtags are left alone.
fn language_tag(code: &str) -> String {
    code.split('-')
        .enumerate()
        .map(|(i, part)| {
            if i > 0 && part.len() == 2 {
                part.to_ascii_uppercase()
            } else {
                part.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "\
Pty Language       Age/Gender VoiceName          File                 Other Languages
 5  af              --/M      Afrikaans          gmw/af
 5  en-gb           --/M      English_(Great_Britain) gmw/en            (en 2)
 2  en-us           --/F      English_(America)  gmw/en-US            (en 3)
 5  cmn-latn-pinyin --/-      Chinese_Pinyin     sit/cmn-Latn-pinyin
";

    #[test]
    fn test_parse_voice_list() {
        let voices = parse_voice_list(LISTING);
        assert_eq!(voices.len(), 4);
        assert_eq!(voices[1].language, "en-GB");
        assert_eq!(voices[1].name, "English (Great Britain)");
        assert_eq!(voices[1].identifier, "en-gb");
        assert_eq!(voices[2].gender, VoiceGender::Female);
        assert_eq!(voices[3].gender, VoiceGender::Unknown);
        assert_eq!(voices[3].language, "cmn-latn-pinyin");
    }

    #[test]
    fn test_arguments_map_config() {
        let mut config = SynthesizerConfig::default();
        config.set_rate(2.0).unwrap();
        config.set_volume(0.5).unwrap();
        config.set_voice(VoiceDescriptor::new("en-US", "America", VoiceGender::Female, "en-us"));

        let args = EspeakEngine::arguments("hi", &config, Path::new("/tmp/out.wav"));
        assert_eq!(
            args,
            vec!["-v", "en-us", "-s", "350", "-a", "50", "-p", "50", "-w", "/tmp/out.wav", "--", "hi"]
        );
    }

    #[test]
    fn test_read_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 22_050,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for sample in [0_i16, 16_384, -32_768] {
            writer.write_sample(sample).unwrap();
        }
        writer.finalize().unwrap();

        let audio = read_wav(&path).unwrap();
        assert_eq!(audio.sample_rate, 22_050);
        assert_eq!(audio.samples, vec![0.0, 0.5, -1.0]);
    }
}
