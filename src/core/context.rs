// File: src/core/context.rs
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

/// Commit history and word/bigram counts learned from the user.
///
/// Words are stored lowercase. The recent-word history is session state and
/// is not persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextModel {
    window_size: usize,
    #[serde(skip)]
    history: VecDeque<String>,
    unigrams: HashMap<String, u32>,
    /// Maps (previous word, word) -> count
    bigrams: HashMap<(String, String), u32>,
}

impl ContextModel {
    pub fn new(window_size: usize) -> Self {
        Self {
            window_size: window_size.max(1),
            history: VecDeque::with_capacity(window_size),
            unigrams: HashMap::new(),
            bigrams: HashMap::new(),
        }
    }

    /// Counts a committed word, and the bigram it forms with `previous` (or
    /// with the last committed word when `previous` is `None`).
    /// O(1) amortized complexity.
    pub fn add_word(&mut self, word: &str, previous: Option<&str>) {
        let word = word.trim().to_lowercase();
        if word.is_empty() {
            return;
        }

        let prev = previous
            .map(|p| p.trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .or_else(|| self.history.back().cloned());

        *self.unigrams.entry(word.clone()).or_insert(0) += 1;
        if let Some(prev) = prev {
            *self.bigrams.entry((prev, word.clone())).or_insert(0) += 1;
        }

        if self.history.len() >= self.window_size.max(1) {
            self.history.pop_front();
        }
        self.history.push_back(word);
    }

    pub fn last_word(&self) -> Option<&str> {
        self.history.back().map(String::as_str)
    }

    pub fn unigram_count(&self, word: &str) -> u32 {
        self.unigrams.get(&word.to_lowercase()).copied().unwrap_or(0)
    }

    pub fn bigram_count(&self, previous: &str, word: &str) -> u32 {
        self.bigrams
            .get(&(previous.to_lowercase(), word.to_lowercase()))
            .copied()
            .unwrap_or(0)
    }

    pub fn unigram_len(&self) -> usize {
        self.unigrams.len()
    }

    pub fn bigram_len(&self) -> usize {
        self.bigrams.len()
    }

    /// Scales every count by `factor` (floored), dropping entries left at 1
    /// or below.
    pub fn decay(&mut self, factor: f64) {
        let scale = |count: u32| (f64::from(count) * factor) as u32;
        self.unigrams.retain(|_, c| {
            *c = scale(*c);
            *c > 1
        });
        self.bigrams.retain(|_, c| {
            *c = scale(*c);
            *c > 1
        });
    }

    /// When a table grows past its cap, keeps the most frequent 90% of the
    /// cap. Ties are broken by key so the result does not depend on hash
    /// order.
    pub fn prune(&mut self, max_unigrams: usize, max_bigrams: usize) {
        prune_table(&mut self.unigrams, max_unigrams);
        prune_table(&mut self.bigrams, max_bigrams);
    }

    /// Forgets counts and history.
    pub fn clear(&mut self) {
        self.history.clear();
        self.unigrams.clear();
        self.bigrams.clear();
    }
}

fn prune_table<K: Ord + Clone + std::hash::Hash + Eq>(table: &mut HashMap<K, u32>, cap: usize) {
    if table.len() <= cap {
        return;
    }
    let mut sorted: Vec<(K, u32)> = table.drain().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    sorted.truncate(cap * 9 / 10);
    table.extend(sorted);
}
