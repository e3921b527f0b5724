// File: src/ranking/lexical.rs
use crate::config::{DictionaryConfig, LexicalConfig, RankingConfig};
use crate::core::dictionary::DictionaryIndex;
use crate::core::layout::KeyboardLayout;
use crate::core::types::DictionaryWord;
use crate::fuzzy::{bigram_overlap, levenshtein};
use crate::learning::BoostProvider;
use crate::ranking::{finalize, Candidate, ScoreBreakdown};

/// Geometric/lexical strategy: edit distance, bigram overlap, frequency and
/// key-center proximity between the key string and each shortlisted word.
pub struct LexicalRanker<'a> {
    layout: &'a KeyboardLayout,
    dictionary: &'a DictionaryIndex,
    weights: &'a LexicalConfig,
    ranking: &'a RankingConfig,
    dictionary_config: &'a DictionaryConfig,
}

impl<'a> LexicalRanker<'a> {
    pub fn new(
        layout: &'a KeyboardLayout,
        dictionary: &'a DictionaryIndex,
        weights: &'a LexicalConfig,
        ranking: &'a RankingConfig,
        dictionary_config: &'a DictionaryConfig,
    ) -> Self {
        Self { layout, dictionary, weights, ranking, dictionary_config }
    }

    /// Ranked candidates for a key string such as `"helo"`.
    pub fn rank(
        &self,
        keys: &str,
        boost: Option<&dyn BoostProvider>,
        previous_word: Option<&str>,
    ) -> Vec<Candidate> {
        let keys = keys.to_ascii_lowercase();
        if keys.chars().count() < self.ranking.min_key_sequence_length {
            return Vec::new();
        }

        let candidates = self
            .dictionary
            .shortlist(&keys, self.dictionary_config.length_tolerance)
            .into_iter()
            .map(|word| self.score(&keys, word))
            .filter(|c| c.score >= self.weights.min_candidate_score)
            .collect();

        finalize(candidates, boost, previous_word, self.ranking.max_candidates)
    }

    /// Scores one word without thresholding.
    pub fn score(&self, keys: &str, word: &DictionaryWord) -> Candidate {
        let w = self.weights;
        let edit_distance = levenshtein(keys, &word.word, w.edit_distance_limit);
        let overlap = bigram_overlap(keys, &word.word);
        let frequency = w.frequency_weight * frequency_bonus(word.frequency_rank);
        let spatial = w.spatial_weight * self.spatial_score(keys, &word.word);

        let score = w.edit_distance_weight * edit_distance as f64
            + w.bigram_weight * overlap as f64
            + frequency
            + spatial;

        Candidate::new(
            word.word.clone(),
            score,
            ScoreBreakdown::Lexical {
                edit_distance,
                bigram_overlap: overlap,
                frequency,
                spatial,
            },
        )
    }

    /// Average center distance between aligned letters, mapped to
    /// `[-1, 1]`: 1 at zero distance, 0 at the norm distance.
    ///
    /// Alignment walks both strings, advancing whichever has more letters
    /// left (both when equal). Letters without a key are skipped.
    pub fn spatial_score(&self, keys: &str, word: &str) -> f64 {
        let keys: Vec<char> = keys.chars().collect();
        let word: Vec<char> = word.chars().collect();

        let (mut ki, mut wi) = (0usize, 0usize);
        let mut total = 0.0;
        let mut pairs = 0usize;

        while ki < keys.len() && wi < word.len() {
            if let (Some(a), Some(b)) = (self.layout.letter_center(keys[ki]), self.layout.letter_center(word[wi])) {
                total += a.distance_to(&b);
                pairs += 1;
            }

            let keys_left = keys.len() - ki;
            let word_left = word.len() - wi;
            if keys_left > word_left {
                ki += 1;
            } else if word_left > keys_left {
                wi += 1;
            } else {
                ki += 1;
                wi += 1;
            }
        }

        if pairs == 0 {
            return 0.0;
        }
        let avg = total / pairs as f64;
        (1.0 - avg / self.weights.spatial_norm_distance).max(-1.0)
    }
}

/// `ln(1 + 1000 / (rank + 1))`: common words (low rank) score higher.
pub fn frequency_bonus(rank: u32) -> f64 {
    (1000.0 / (f64::from(rank) + 1.0)).ln_1p()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;

    struct Fixture {
        layout: KeyboardLayout,
        dictionary: DictionaryIndex,
        config: EngineConfig,
    }

    impl Fixture {
        fn new(words: &str, freqs: Option<&str>) -> Self {
            Self {
                layout: KeyboardLayout::qwerty(),
                dictionary: DictionaryIndex::from_sources(words, freqs, 1000).unwrap(),
                config: EngineConfig::default(),
            }
        }

        fn ranker(&self) -> LexicalRanker<'_> {
            LexicalRanker::new(
                &self.layout,
                &self.dictionary,
                &self.config.lexical,
                &self.config.ranking,
                &self.config.dictionary,
            )
        }
    }

    #[test]
    fn test_exact_word_ranks_first() {
        let f = Fixture::new("the\ntie\ntoe\nthee\nthere\n", Some("the\t1\n"));
        let out = f.ranker().rank("the", None, None);
        assert_eq!(out[0].word, "the");
        match &out[0].breakdown {
            ScoreBreakdown::Lexical { edit_distance, bigram_overlap, spatial, .. } => {
                assert_eq!(*edit_distance, 0);
                assert_eq!(*bigram_overlap, 2);
                assert!((spatial - 1.5).abs() < 1e-9);
            }
            other => panic!("unexpected breakdown {other:?}"),
        }
    }

    #[test]
    fn test_short_sequence_yields_nothing() {
        let f = Fixture::new("the\na\n", None);
        assert!(f.ranker().rank("t", None, None).is_empty());
        assert!(f.ranker().rank("", None, None).is_empty());
    }

    #[test]
    fn test_scores_non_increasing_and_capped() {
        let words = "hello\nhelp\nhell\nhero\nhalo\nhole\nhullo\nhallo\nhelio\nhobo\nhippo\nhello\n";
        let f = Fixture::new(words, None);
        let out = f.ranker().rank("helo", None, None);
        assert!(out.len() <= 8);
        assert!(out.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_min_score_filters() {
        let mut f = Fixture::new("the\nthrough\n", None);
        f.config.lexical.min_candidate_score = 100.0;
        assert!(f.ranker().rank("the", None, None).is_empty());
    }

    #[test]
    fn test_spatial_score_bounds() {
        let f = Fixture::new("the\n", None);
        let r = f.ranker();
        assert_eq!(r.spatial_score("the", "the"), 1.0);
        // q and p sit 594px apart; the floor holds.
        assert_eq!(r.spatial_score("q", "p"), -1.0);
        // Neighbouring keys (66px apart) land just under zero.
        let s = r.spatial_score("q", "w");
        assert!((s - (1.0 - 66.0 / 60.0)).abs() < 1e-9);
    }

    #[test]
    fn test_spatial_alignment_walks_longer_side() {
        let f = Fixture::new("the\n", None);
        let r = f.ranker();
        // The word side is longer, so it advances alone first and the walk
        // pairs h-e and e-l before realigning: the score hits the floor.
        assert_eq!(r.spatial_score("helo", "hello"), -1.0);
        // Equal lengths pair letters one to one.
        let s = r.spatial_score("tie", "toe");
        assert!((s - (1.0 - 22.0 / 60.0)).abs() < 1e-9);
    }

    #[test]
    fn test_frequency_bonus() {
        assert!((frequency_bonus(1) - (501.0f64).ln()).abs() < 1e-9);
        assert!(frequency_bonus(1) > frequency_bonus(1000));
    }

    #[test]
    fn test_boost_reorders() {
        let f = Fixture::new("toe\ntie\n", None);
        let plain = f.ranker().rank("tie", None, None);
        assert_eq!(plain[0].word, "tie");

        let boost = |word: &str, _: Option<&str>| if word == "toe" { 20.0 } else { 0.0 };
        let boosted = f.ranker().rank("tie", Some(&boost), None);
        assert_eq!(boosted[0].word, "toe");
        assert_eq!(boosted[0].learning_boost, 20.0);
    }
}
