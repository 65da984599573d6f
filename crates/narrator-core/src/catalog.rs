//! Read-only view over the engine's voices.

use crate::engine::SpeechEngine;
use crate::types::VoiceDescriptor;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Voice catalog backed by the synthesis engine.
///
/// Queries never touch playback state, so the dispatcher answers them
/// directly instead of going through the controller.
#[derive(Clone)]
pub struct VoiceCatalog {
    engine: Arc<dyn SpeechEngine>,
}

impl VoiceCatalog {
    pub fn new(engine: Arc<dyn SpeechEngine>) -> Self {
        Self { engine }
    }

    pub fn list_voices(&self) -> Vec<VoiceDescriptor> {
        self.engine.list_voices()
    }

    /// Distinct language tags, sorted.
    pub fn list_languages(&self) -> Vec<String> {
        self.list_voices()
            .into_iter()
            .map(|voice| voice.language)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Exact, case-sensitive match on language and name. First match wins.
    pub fn find_voice(&self, language: &str, name: &str) -> Option<VoiceDescriptor> {
        self.list_voices()
            .into_iter()
            .find(|voice| voice.language == language && voice.name == name)
    }

    pub fn find_voice_by_language(&self, language: &str) -> Option<VoiceDescriptor> {
        self.list_voices()
            .into_iter()
            .find(|voice| voice.language == language)
    }
}

impl std::fmt::Debug for VoiceCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoiceCatalog")
            .field("engine", &self.engine.engine_name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{ScriptedEngine, sample_voices};

    fn catalog() -> VoiceCatalog {
        VoiceCatalog::new(Arc::new(ScriptedEngine::new(sample_voices())))
    }

    #[test]
    fn test_languages_are_distinct_and_sorted() {
        let languages = catalog().list_languages();
        assert_eq!(languages, vec!["de-DE", "en-GB", "en-US"]);
    }

    #[test]
    fn test_languages_match_voice_projection() {
        let catalog = catalog();
        let languages = catalog.list_languages();
        let voices = catalog.list_voices();

        for voice in &voices {
            assert!(languages.contains(&voice.language));
        }
        for language in &languages {
            assert!(voices.iter().any(|v| &v.language == language));
        }
    }

    #[test]
    fn test_find_voice_is_exact_and_case_sensitive() {
        let catalog = catalog();
        let voice = catalog.find_voice("en-US", "Zira").unwrap();
        assert_eq!(voice.identifier, "en-us-zira");

        assert!(catalog.find_voice("en-us", "Zira").is_none());
        assert!(catalog.find_voice("en-US", "zira").is_none());
        assert!(catalog.find_voice("en-US", "DoesNotExist").is_none());
    }

    #[test]
    fn test_find_by_language_returns_first_match() {
        let voice = catalog().find_voice_by_language("en-US").unwrap();
        assert_eq!(voice.name, "David");
    }

    #[test]
    fn test_empty_engine() {
        let catalog = VoiceCatalog::new(Arc::new(ScriptedEngine::new(Vec::new())));
        assert!(catalog.list_voices().is_empty());
        assert!(catalog.list_languages().is_empty());
        assert!(catalog.find_voice_by_language("en-US").is_none());
    }
}
