// File: src/learning.rs
use crate::config::LearningConfig;
use crate::core::context::ContextModel;
use crate::persistence::{load_from_disk, save_to_disk};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const CONTEXT_WINDOW_SIZE: usize = 3;

/// Supplies a score bonus for a word given the word typed before it.
pub trait BoostProvider {
    fn boost(&self, word: &str, previous_word: Option<&str>) -> f64;
}

impl<F> BoostProvider for F
where
    F: Fn(&str, Option<&str>) -> f64,
{
    fn boost(&self, word: &str, previous_word: Option<&str>) -> f64 {
        self(word, previous_word)
    }
}

/// Adds nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBoost;

impl BoostProvider for NoBoost {
    fn boost(&self, _word: &str, _previous_word: Option<&str>) -> f64 {
        0.0
    }
}

/// Learns from committed words and boosts them in later rankings.
///
/// Constructed explicitly and passed where needed; there is no shared
/// global instance.
#[derive(Debug, Clone)]
pub struct LearningStore {
    context_model: ContextModel,
    config: LearningConfig,
    path: Option<PathBuf>,
    commits_since_save: usize,
}

impl LearningStore {
    /// A store that never touches the disk.
    pub fn in_memory(config: LearningConfig) -> Self {
        Self {
            context_model: ContextModel::new(CONTEXT_WINDOW_SIZE),
            config,
            path: None,
            commits_since_save: 0,
        }
    }

    /// Loads learned data from `path` and applies decay. A missing or
    /// unreadable file yields an empty store bound to the same path.
    pub fn open(path: impl Into<PathBuf>, config: LearningConfig) -> Self {
        let path = path.into();
        let mut store = Self::in_memory(config);

        match load_from_disk(&path) {
            Ok(model) => {
                store.context_model = model;
                store.context_model.decay(store.config.decay_factor);
                info!(
                    "Loaded learning data from {} ({} words, {} bigrams)",
                    path.display(),
                    store.context_model.unigram_len(),
                    store.context_model.bigram_len()
                );
            }
            Err(crate::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No learning data at {}, starting fresh", path.display());
            }
            Err(e) => {
                warn!("Discarding learning data at {}: {}", path.display(), e);
            }
        }

        store.path = Some(path);
        store
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Records a committed word. `previous` defaults to the last committed
    /// word. Prunes oversized tables and auto-saves every
    /// `auto_save_interval` commits.
    pub fn record_commit(&mut self, word: &str, previous: Option<&str>) {
        if word.trim().is_empty() {
            return;
        }
        self.context_model.add_word(word, previous);
        self.commits_since_save += 1;
        self.context_model.prune(self.config.max_unigrams, self.config.max_bigrams);

        let interval = self.config.auto_save_interval;
        if interval > 0 && self.commits_since_save >= interval && self.path.is_some() {
            if let Err(e) = self.save() {
                warn!("Auto-save of learning data failed: {}", e);
            }
        }
    }

    /// `ln(1 + count) * unigram_weight`, 0 for unseen words.
    pub fn unigram_boost(&self, word: &str) -> f64 {
        let count = self.context_model.unigram_count(word);
        f64::from(count).ln_1p() * self.config.unigram_weight
    }

    /// `ln(1 + count) * bigram_weight` for the `previous word` pair.
    pub fn bigram_boost(&self, word: &str, previous: &str) -> f64 {
        if word.is_empty() || previous.is_empty() {
            return 0.0;
        }
        let count = self.context_model.bigram_count(previous, word);
        f64::from(count).ln_1p() * self.config.bigram_weight
    }

    /// Unigram boost plus the bigram boost against `previous`, or against the
    /// last committed word when `previous` is `None`.
    pub fn learning_boost(&self, word: &str, previous: Option<&str>) -> f64 {
        if word.is_empty() {
            return 0.0;
        }
        let context = previous.or_else(|| self.context_model.last_word());
        self.unigram_boost(word) + context.map_or(0.0, |prev| self.bigram_boost(word, prev))
    }

    pub fn last_word(&self) -> Option<&str> {
        self.context_model.last_word()
    }

    pub fn unigram_count(&self) -> usize {
        self.context_model.unigram_len()
    }

    pub fn bigram_count(&self) -> usize {
        self.context_model.bigram_len()
    }

    /// Forgets everything and deletes the backing file.
    pub fn reset(&mut self) {
        self.context_model.clear();
        self.commits_since_save = 0;
        if let Some(path) = &self.path {
            match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!("Could not remove {}: {}", path.display(), e),
            }
        }
    }

    /// Writes the store to its path. A store without a path saves nothing.
    pub fn save(&mut self) -> Result<(), crate::Error> {
        if let Some(path) = &self.path {
            save_to_disk(&self.context_model, path)?;
            debug!("Saved learning data to {}", path.display());
        }
        self.commits_since_save = 0;
        Ok(())
    }
}

impl BoostProvider for LearningStore {
    fn boost(&self, word: &str, previous_word: Option<&str>) -> f64 {
        self.learning_boost(word, previous_word)
    }
}
