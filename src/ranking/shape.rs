// File: src/ranking/shape.rs
use crate::config::{RankingConfig, ShapeConfig};
use crate::core::dictionary::DictionaryIndex;
use crate::core::geometry::{mean_pointwise_distance, normalize_shape, resample_uniform, Point};
use crate::core::layout::KeyboardLayout;
use crate::core::types::WordId;
use crate::learning::BoostProvider;
use crate::ranking::{finalize, Candidate, ScoreBreakdown};
use tracing::debug;

/// Very common words accepted on start/end proximity alone.
const COMMON_WORDS: &[&str] = &[
    "the", "be", "to", "of", "and", "a", "in", "that", "have", "i", "it", "for", "not", "on",
    "with", "he", "as", "you", "do", "at", "this", "but", "his", "by", "from", "they", "we",
    "say", "her", "she", "or", "an", "will", "my", "one", "all", "would", "there", "their",
];

/// Ideal gesture for a word: the polyline through its letters' key centers.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureTemplate {
    pub word: String,
    pub start: Point,
    pub end: Point,
    /// Uniformly resampled key-center path (location channel).
    pub sampled: Vec<Point>,
    /// `sampled`, centered and scaled to unit radius (shape channel).
    pub normalized: Vec<Point>,
}

impl GestureTemplate {
    /// `None` when no letter of the word has a key on this layout.
    pub fn build(word: &str, layout: &KeyboardLayout, sample_points: usize) -> Option<Self> {
        let raw: Vec<Point> = word.chars().filter_map(|c| layout.letter_center(c)).collect();
        let (&start, &end) = (raw.first()?, raw.last()?);
        let sampled = resample_uniform(&raw, sample_points);
        let normalized = normalize_shape(&sampled);
        Some(Self {
            word: word.to_string(),
            start,
            end,
            sampled,
            normalized,
        })
    }
}

/// Templates for a whole dictionary, indexed by [`WordId`].
///
/// Depends on both the layout and the dictionary; rebuild when either
/// changes.
#[derive(Debug, Clone, Default)]
pub struct ShapeTemplates {
    templates: Vec<Option<GestureTemplate>>,
    built: usize,
}

impl ShapeTemplates {
    /// Words shorter than two letters get no template.
    pub fn build(layout: &KeyboardLayout, dictionary: &DictionaryIndex, sample_points: usize) -> Self {
        let templates: Vec<Option<GestureTemplate>> = dictionary
            .words()
            .iter()
            .map(|w| {
                if w.length < 2 {
                    None
                } else {
                    GestureTemplate::build(&w.word, layout, sample_points)
                }
            })
            .collect();
        let built = templates.iter().filter(|t| t.is_some()).count();
        debug!("Built {} gesture templates for {} words", built, dictionary.len());
        Self { templates, built }
    }

    pub fn get(&self, id: WordId) -> Option<&GestureTemplate> {
        self.templates.get(id).and_then(Option::as_ref)
    }

    /// Number of words that have a template.
    pub fn len(&self) -> usize {
        self.built
    }

    pub fn is_empty(&self) -> bool {
        self.built == 0
    }
}

/// Shape/location-channel strategy: compares the raw gesture with every
/// template surviving start/end pruning.
pub struct ShapeRanker<'a> {
    layout: &'a KeyboardLayout,
    dictionary: &'a DictionaryIndex,
    templates: &'a ShapeTemplates,
    config: &'a ShapeConfig,
    ranking: &'a RankingConfig,
}

impl<'a> ShapeRanker<'a> {
    pub fn new(
        layout: &'a KeyboardLayout,
        dictionary: &'a DictionaryIndex,
        templates: &'a ShapeTemplates,
        config: &'a ShapeConfig,
        ranking: &'a RankingConfig,
    ) -> Self {
        Self { layout, dictionary, templates, config, ranking }
    }

    /// Ranked candidates for a layout-space gesture path.
    pub fn rank(
        &self,
        points: &[Point],
        boost: Option<&dyn BoostProvider>,
        previous_word: Option<&str>,
    ) -> Vec<Candidate> {
        let (Some(&start), Some(&end)) = (points.first(), points.last()) else {
            return Vec::new();
        };
        if points.len() < 2 || self.templates.is_empty() {
            return Vec::new();
        }

        let quick = self.fast_path(start, end);

        let sampled = resample_uniform(points, self.config.sample_points);
        let normalized = normalize_shape(&sampled);

        let mut estimated = (points.len() / self.config.points_per_char.max(1)).max(2);
        let mut ids = self.prune(start, end, estimated);
        if ids.len() < self.config.min_prune_results {
            estimated = estimated.saturating_sub(1).max(2);
            ids = self.prune(start, end, estimated);
        }

        let results: Vec<Candidate> = ids
            .into_iter()
            .filter_map(|id| {
                let template = self.templates.get(id)?;
                let rank = self.dictionary.word(id)?.frequency_rank;
                self.score(template, rank, &sampled, &normalized, start, end)
            })
            .collect();

        finalize(
            merge_fast_path(results, quick),
            boost,
            previous_word,
            self.ranking.max_candidates,
        )
    }

    /// Common dictionary words whose first and last keys lie within the
    /// fast-path radius of the gesture's endpoints.
    pub fn fast_path(&self, start: Point, end: Point) -> Vec<Candidate> {
        let radius = self.config.fast_path_radius;
        COMMON_WORDS
            .iter()
            .filter(|w| w.len() >= 2 && self.dictionary.contains(w))
            .filter_map(|&word| {
                let first = self.layout.letter_center(word.chars().next()?)?;
                let last = self.layout.letter_center(word.chars().last()?)?;
                let start_distance = start.distance_to(&first);
                let end_distance = end.distance_to(&last);
                (start_distance < radius && end_distance < radius).then(|| {
                    Candidate::new(
                        word,
                        0.75 - (start_distance + end_distance) / 300.0,
                        ScoreBreakdown::FastPath { start_distance, end_distance },
                    )
                })
            })
            .collect()
    }

    /// Word ids whose first/last letters lie near the gesture endpoints
    /// (or the nearest letter, plus layout neighbors) and whose length is
    /// within tolerance of `estimated_len`. Ordered by bucket, then load
    /// order; no duplicates.
    pub fn prune(&self, start: Point, end: Point, estimated_len: usize) -> Vec<WordId> {
        let start_keys = self.expand(self.keys_near(start));
        let end_keys = self.expand(self.keys_near(end));

        let mut seen = vec![false; self.dictionary.len()];
        let mut ids = Vec::new();
        for &s in &start_keys {
            for &e in &end_keys {
                for &id in self.dictionary.bucket(s, e) {
                    if seen[id] {
                        continue;
                    }
                    let Some(word) = self.dictionary.word(id) else { continue };
                    if word.length.abs_diff(estimated_len) <= self.config.length_tolerance {
                        seen[id] = true;
                        ids.push(id);
                    }
                }
            }
        }
        ids
    }

    fn keys_near(&self, p: Point) -> Vec<char> {
        let mut near = Vec::new();
        let mut closest: Option<(char, f64)> = None;
        for key in self.layout.keys() {
            let Some(c) = key.letter() else { continue };
            let d = p.distance_to(&key.center);
            if closest.map_or(true, |(_, best)| d < best) {
                closest = Some((c, d));
            }
            if d <= self.config.pruning_radius {
                near.push(c);
            }
        }
        if near.is_empty() {
            near.extend(closest.map(|(c, _)| c));
        }
        near
    }

    fn expand(&self, keys: Vec<char>) -> Vec<char> {
        let mut expanded = keys.clone();
        for c in keys {
            for &n in self.layout.neighbors(c) {
                if !expanded.contains(&n) {
                    expanded.push(n);
                }
            }
        }
        expanded
    }

    fn score(
        &self,
        template: &GestureTemplate,
        rank: u32,
        sampled: &[Point],
        normalized: &[Point],
        start: Point,
        end: Point,
    ) -> Option<Candidate> {
        let cfg = self.config;
        let shape_distance = mean_pointwise_distance(normalized, &template.normalized)?;
        let location_distance = mean_pointwise_distance(sampled, &template.sampled)?;

        let shape_score = 1.0 / (1.0 + shape_distance * cfg.shape_scale);
        let location_score = 1.0 / (1.0 + location_distance / cfg.location_scale);
        let frequency = frequency_score(rank);

        let mut endpoint_bonus = 0.0;
        if start.distance_to(&template.start) < cfg.endpoint_radius {
            endpoint_bonus += cfg.endpoint_bonus;
        }
        if end.distance_to(&template.end) < cfg.endpoint_radius {
            endpoint_bonus += cfg.endpoint_bonus;
        }
        let length_bonus = (template.word.len() as f64 * cfg.length_bonus_per_char).min(cfg.length_bonus_cap);

        let score = cfg.shape_weight * shape_score
            + cfg.location_weight * location_score
            + cfg.frequency_weight * frequency
            + endpoint_bonus
            + length_bonus;

        Some(Candidate::new(
            template.word.clone(),
            score,
            ScoreBreakdown::Shape {
                shape_distance,
                location_distance,
                frequency,
                endpoint_bonus,
                length_bonus,
            },
        ))
    }
}

/// `1 / log2(rank + 1)`, treating rank 0 as 1.
pub fn frequency_score(rank: u32) -> f64 {
    let rank = f64::from(rank.max(1));
    1.0 / (rank + 1.0).log2()
}

/// Folds fast-path matches into the full results: a word present in both
/// keeps the higher-scoring entry, new words are appended.
fn merge_fast_path(mut results: Vec<Candidate>, quick: Vec<Candidate>) -> Vec<Candidate> {
    for q in quick {
        match results.iter_mut().find(|r| r.word == q.word) {
            Some(existing) => {
                if q.score > existing.score {
                    *existing = q;
                }
            }
            None => results.push(q),
        }
    }
    results
}
