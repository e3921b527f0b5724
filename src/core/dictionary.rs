// --- File: src/core/dictionary.rs
use crate::core::types::{DictionaryWord, WordId};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

const ALPHABET: usize = 26;

fn letter_index(c: char) -> Option<usize> {
    let c = c.to_ascii_lowercase();
    c.is_ascii_lowercase().then(|| (c as u8 - b'a') as usize)
}

/// Word list bucketed by (first letter, last letter).
///
/// Built wholesale from its sources and never mutated afterwards; a reload
/// produces a fresh index.
#[derive(Debug, Clone)]
pub struct DictionaryIndex {
    words: Vec<DictionaryWord>,
    /// 26x26 buckets, flattened as `first * 26 + last`.
    buckets: Vec<Vec<WordId>>,
    lookup: HashMap<String, WordId>,
}

impl DictionaryIndex {
    /// Builds the index from `(word, rank)` pairs.
    ///
    /// Words are lowercased; empty words, words with non-letters and repeats
    /// are skipped.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, u32)>,
        S: AsRef<str>,
    {
        let mut index = Self {
            words: Vec::new(),
            buckets: vec![Vec::new(); ALPHABET * ALPHABET],
            lookup: HashMap::new(),
        };
        let mut rejected = 0usize;

        for (raw, rank) in entries {
            let raw = raw.as_ref().trim();
            if raw.is_empty() {
                continue;
            }
            if !raw.chars().all(|c| c.is_ascii_alphabetic()) {
                rejected += 1;
                continue;
            }
            let word = raw.to_ascii_lowercase();
            if index.lookup.contains_key(&word) {
                continue;
            }

            let entry = DictionaryWord::new(word, rank);
            let id = index.words.len();
            if let (Some(f), Some(l)) = (letter_index(entry.first_char), letter_index(entry.last_char)) {
                index.buckets[f * ALPHABET + l].push(id);
            }
            index.lookup.insert(entry.word.clone(), id);
            index.words.push(entry);
        }

        if rejected > 0 {
            debug!("Skipped {} non-alphabetic dictionary entries", rejected);
        }
        index
    }

    /// Word list plus an optional `word<TAB>rank` table. Words missing from
    /// the table get `default_frequency`.
    pub fn from_sources(
        words_text: &str,
        freq_text: Option<&str>,
        default_frequency: u32,
    ) -> Result<Self, crate::Error> {
        let freqs = freq_text.map(parse_frequency_table).unwrap_or_default();
        let entries = words_text.lines().map(|line| {
            let word = line.trim();
            let rank = freqs.get(word).copied().unwrap_or(default_frequency);
            (word, rank)
        });
        Self::non_empty(Self::from_entries(entries))
    }

    /// One word per line where the line number is the frequency rank.
    /// Invalid lines still consume a rank.
    pub fn from_ranked_list(text: &str) -> Result<Self, crate::Error> {
        let entries = text
            .lines()
            .enumerate()
            .map(|(i, line)| (line, u32::try_from(i + 1).unwrap_or(u32::MAX)));
        Self::non_empty(Self::from_entries(entries))
    }

    /// Reads the word list, and the frequency table when given. An unreadable
    /// frequency table is logged and ignored; an unreadable word list fails.
    pub fn from_files(
        words_path: &Path,
        freq_path: Option<&Path>,
        default_frequency: u32,
    ) -> Result<Self, crate::Error> {
        let words_text = std::fs::read_to_string(words_path)?;
        let freq_text = freq_path.and_then(|p| match std::fs::read_to_string(p) {
            Ok(text) => Some(text),
            Err(e) => {
                warn!("Ignoring frequency table {}: {}", p.display(), e);
                None
            }
        });
        Self::from_sources(&words_text, freq_text.as_deref(), default_frequency)
    }

    fn non_empty(index: Self) -> Result<Self, crate::Error> {
        if index.is_empty() {
            Err(crate::Error::Dictionary("no usable words".to_string()))
        } else {
            Ok(index)
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn words(&self) -> &[DictionaryWord] {
        &self.words
    }

    pub fn word(&self, id: WordId) -> Option<&DictionaryWord> {
        self.words.get(id)
    }

    /// Exact, case-insensitive membership test.
    pub fn contains(&self, word: &str) -> bool {
        self.lookup.contains_key(&word.to_ascii_lowercase())
    }

    /// All word ids sharing a (first, last) letter pair, in load order.
    pub fn bucket(&self, first: char, last: char) -> &[WordId] {
        match (letter_index(first), letter_index(last)) {
            (Some(f), Some(l)) => &self.buckets[f * ALPHABET + l],
            _ => &[],
        }
    }

    /// Words whose first/last letters match the key sequence and whose length
    /// is within `tolerance` of it. Empty when the sequence does not start and
    /// end with a letter.
    pub fn shortlist(&self, keys: &str, tolerance: usize) -> Vec<&DictionaryWord> {
        let (Some(first), Some(last)) = (keys.chars().next(), keys.chars().last()) else {
            return Vec::new();
        };
        let target = keys.chars().count();
        self.bucket(first, last)
            .iter()
            .map(|&id| &self.words[id])
            .filter(|w| w.length.abs_diff(target) <= tolerance)
            .collect()
    }
}

/// Parses `word<TAB>rank` lines; malformed lines are skipped.
fn parse_frequency_table(text: &str) -> HashMap<String, u32> {
    text.lines()
        .filter_map(|line| {
            let (word, rank) = line.split_once('\t')?;
            let rank = rank.trim().parse().ok()?;
            Some((word.trim().to_string(), rank))
        })
        .collect()
}
