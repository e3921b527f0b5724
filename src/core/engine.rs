// File: src/core/engine.rs
use crate::config::EngineConfig;
use crate::core::dictionary::DictionaryIndex;
use crate::core::geometry::Point;
use crate::core::gesture::{GestureClassifier, SwipeResult};
use crate::core::layout::KeyboardLayout;
use crate::core::sequence::{letters_of, KeySequenceExtractor};
use crate::learning::BoostProvider;
use crate::ranking::{Candidate, LexicalRanker, ShapeRanker, ShapeTemplates, Strategy};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Output of one recognition: the keys the path crossed and the ranked words.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recognition {
    pub key_sequence: Vec<String>,
    pub candidates: Vec<Candidate>,
}

impl Recognition {
    pub fn best(&self) -> Option<&Candidate> {
        self.candidates.first()
    }
}

/// Owns the loaded layout and dictionary and runs the recognition pipeline.
///
/// Layout and dictionary are immutable once loaded and held behind `Arc`, so
/// classifiers created by [`SwipeEngine::gesture_classifier`] can share them.
/// Loads either fully replace the current resource or leave it untouched.
pub struct SwipeEngine {
    config: EngineConfig,
    strategy: Strategy,
    layout: Option<Arc<KeyboardLayout>>,
    dictionary: Option<Arc<DictionaryIndex>>,
    templates: ShapeTemplates,
}

impl Default for SwipeEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl SwipeEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            strategy: config.ranking.strategy,
            config,
            layout: None,
            dictionary: None,
            templates: ShapeTemplates::default(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn set_strategy(&mut self, strategy: Strategy) {
        if strategy != self.strategy {
            info!("Switching ranking strategy to {}", strategy);
        }
        self.strategy = strategy;
    }

    pub fn layout(&self) -> Option<&Arc<KeyboardLayout>> {
        self.layout.as_ref()
    }

    pub fn dictionary(&self) -> Option<&Arc<DictionaryIndex>> {
        self.dictionary.as_ref()
    }

    pub fn templates(&self) -> &ShapeTemplates {
        &self.templates
    }

    /// True once both a layout and a dictionary are loaded.
    pub fn is_ready(&self) -> bool {
        self.layout.is_some() && self.dictionary.is_some()
    }

    // --- Loading ---

    pub fn set_layout(&mut self, layout: KeyboardLayout) {
        info!("Layout loaded: {} keys", layout.len());
        self.layout = Some(Arc::new(layout));
        self.rebuild_templates();
    }

    pub fn set_dictionary(&mut self, dictionary: DictionaryIndex) {
        info!("Dictionary loaded: {} words", dictionary.len());
        self.dictionary = Some(Arc::new(dictionary));
        self.rebuild_templates();
    }

    /// Parses a JSON layout. On failure the current layout is kept.
    pub fn load_layout_json(&mut self, json: &str) -> bool {
        self.accept_layout(KeyboardLayout::from_json(json), "<inline>")
    }

    pub fn load_layout_file(&mut self, path: &Path) -> bool {
        self.accept_layout(KeyboardLayout::from_file(path), &path.display().to_string())
    }

    /// Word list plus optional frequency table, as text.
    pub fn load_dictionary_sources(&mut self, words: &str, frequencies: Option<&str>) -> bool {
        let result = DictionaryIndex::from_sources(words, frequencies, self.config.dictionary.default_frequency);
        self.accept_dictionary(result, "<inline>")
    }

    pub fn load_dictionary_files(&mut self, words: &Path, frequencies: Option<&Path>) -> bool {
        let result = DictionaryIndex::from_files(words, frequencies, self.config.dictionary.default_frequency);
        self.accept_dictionary(result, &words.display().to_string())
    }

    /// One word per line, line number as rank.
    pub fn load_ranked_list(&mut self, text: &str) -> bool {
        self.accept_dictionary(DictionaryIndex::from_ranked_list(text), "<ranked list>")
    }

    fn accept_layout(&mut self, result: crate::Result<KeyboardLayout>, source: &str) -> bool {
        match result {
            Ok(layout) => {
                self.set_layout(layout);
                true
            }
            Err(e) => {
                warn!("Failed to load layout from {}: {}", source, e);
                false
            }
        }
    }

    fn accept_dictionary(&mut self, result: crate::Result<DictionaryIndex>, source: &str) -> bool {
        match result {
            Ok(dictionary) => {
                self.set_dictionary(dictionary);
                true
            }
            Err(e) => {
                warn!("Failed to load dictionary from {}: {}", source, e);
                false
            }
        }
    }

    fn rebuild_templates(&mut self) {
        self.templates = match (&self.layout, &self.dictionary) {
            (Some(layout), Some(dictionary)) => {
                ShapeTemplates::build(layout, dictionary, self.config.shape.sample_points)
            }
            _ => ShapeTemplates::default(),
        };
    }

    // --- Recognition ---

    /// A fresh classifier bound to the current layout. Each input source
    /// should own its own.
    pub fn gesture_classifier(&self) -> GestureClassifier {
        GestureClassifier::new(
            self.config.gesture.clone(),
            self.config.sequence.clone(),
            self.layout.clone(),
        )
    }

    /// Keys crossed by a layout-space path. Empty without a layout.
    pub fn map_path_to_sequence(&self, path: &[Point]) -> Vec<String> {
        match &self.layout {
            Some(layout) => KeySequenceExtractor::new(layout, &self.config.sequence).extract(path),
            None => Vec::new(),
        }
    }

    /// Lexical candidates for a key string, whatever the active strategy.
    /// `previous_word` is handed to the boost provider with each word.
    pub fn generate_candidates(
        &self,
        key_sequence: &str,
        boost: Option<&dyn BoostProvider>,
        previous_word: Option<&str>,
    ) -> Vec<Candidate> {
        let (Some(layout), Some(dictionary)) = (&self.layout, &self.dictionary) else {
            return Vec::new();
        };
        LexicalRanker::new(
            layout,
            dictionary,
            &self.config.lexical,
            &self.config.ranking,
            &self.config.dictionary,
        )
        .rank(key_sequence, boost, previous_word)
    }

    /// Shape-channel candidates for a path, whatever the active strategy.
    pub fn shape_candidates(
        &self,
        path: &[Point],
        boost: Option<&dyn BoostProvider>,
        previous_word: Option<&str>,
    ) -> Vec<Candidate> {
        let (Some(layout), Some(dictionary)) = (&self.layout, &self.dictionary) else {
            return Vec::new();
        };
        ShapeRanker::new(
            layout,
            dictionary,
            &self.templates,
            &self.config.shape,
            &self.config.ranking,
        )
        .rank(path, boost, previous_word)
    }

    /// Runs the active strategy on a layout-space path.
    pub fn recognize_path(
        &self,
        path: &[Point],
        boost: Option<&dyn BoostProvider>,
        previous_word: Option<&str>,
    ) -> Recognition {
        let key_sequence = self.map_path_to_sequence(path);
        let candidates = match self.strategy {
            Strategy::Lexical => self.generate_candidates(&letters_of(&key_sequence), boost, previous_word),
            Strategy::Shape => self.shape_candidates(path, boost, previous_word),
        };
        Recognition { key_sequence, candidates }
    }

    pub fn recognize_swipe(
        &self,
        swipe: &SwipeResult,
        boost: Option<&dyn BoostProvider>,
        previous_word: Option<&str>,
    ) -> Recognition {
        self.recognize_path(&swipe.layout_points(), boost, previous_word)
    }
}
