//! Service settings loaded from YAML.

use crate::error::SettingsError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

type Result<T> = std::result::Result<T, SettingsError>;

/// Settings for a [`SpeechService`](crate::SpeechService)
///
/// ```yaml
/// platform_version: "narrator on linux"
/// await_speak_completion: true
/// rate_offset: 0.5
/// synthesis_timeout_ms: 30000
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceSettings {
    /// String answered to `getPlatformVersion`
    #[serde(default = "default_platform_version")]
    pub platform_version: String,

    /// Initial value of the await-completion flag (default: false)
    #[serde(default)]
    pub await_speak_completion: bool,

    /// Added to every `setSpeechRate` value before it reaches the engine (default: 0.5)
    #[serde(default = "default_rate_offset")]
    pub rate_offset: f64,

    /// Upper bound on a single synthesis (default: 30s)
    #[serde(default = "default_synthesis_timeout_ms")]
    pub synthesis_timeout_ms: u64,
}

// Default value functions
fn default_platform_version() -> String {
    format!("{} {}", std::env::consts::OS, std::env::consts::ARCH)
}

fn default_rate_offset() -> f64 {
    0.5
}

fn default_synthesis_timeout_ms() -> u64 {
    30_000
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            platform_version: default_platform_version(),
            await_speak_completion: false,
            rate_offset: default_rate_offset(),
            synthesis_timeout_ms: default_synthesis_timeout_ms(),
        }
    }
}

impl ServiceSettings {
    /// Load and validate settings from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The YAML is malformed
    /// - A value is invalid
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&content)
    }

    /// Parse and validate settings from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let settings: ServiceSettings = serde_yaml::from_str(yaml)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.platform_version.trim().is_empty() {
            return Err(SettingsError::ValidationError(
                "platform_version must not be empty".to_string(),
            ));
        }
        if !self.rate_offset.is_finite() {
            return Err(SettingsError::ValidationError(
                "rate_offset must be a finite number".to_string(),
            ));
        }
        if self.synthesis_timeout_ms == 0 {
            return Err(SettingsError::ValidationError(
                "synthesis_timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn synthesis_timeout(&self) -> Duration {
        Duration::from_millis(self.synthesis_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_document_uses_defaults() {
        let settings = ServiceSettings::from_yaml_str("{}").unwrap();
        assert_eq!(settings, ServiceSettings::default());
        assert_eq!(settings.rate_offset, 0.5);
        assert!(!settings.await_speak_completion);
        assert_eq!(settings.synthesis_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_partial_document() {
        let yaml = r#"
await_speak_completion: true
synthesis_timeout_ms: 1500
"#;
        let settings = ServiceSettings::from_yaml_str(yaml).unwrap();
        assert!(settings.await_speak_completion);
        assert_eq!(settings.synthesis_timeout_ms, 1500);
        assert_eq!(settings.rate_offset, 0.5);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = ServiceSettings::from_yaml_str("synthesis_timeout_ms: 0").unwrap_err();
        assert!(matches!(err, SettingsError::ValidationError(_)));

        let err = ServiceSettings::from_yaml_str("platform_version: '  '").unwrap_err();
        assert!(matches!(err, SettingsError::ValidationError(_)));
    }

    #[test]
    fn test_malformed_yaml() {
        let err = ServiceSettings::from_yaml_str("rate_offset: [1, 2").unwrap_err();
        assert!(matches!(err, SettingsError::YamlError(_)));
    }

    #[test]
    fn test_from_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "platform_version: Narrator 1.0").unwrap();
        writeln!(file, "rate_offset: 0.0").unwrap();

        let settings = ServiceSettings::from_yaml_file(file.path()).unwrap();
        assert_eq!(settings.platform_version, "Narrator 1.0");
        assert_eq!(settings.rate_offset, 0.0);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ServiceSettings::from_yaml_file(dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, SettingsError::IoError(_)));
    }
}
