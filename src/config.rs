//! Engine configuration
//!
//! Every tunable of the pipeline lives here. The config is built explicitly
//! and handed to [`crate::SwipeEngine`]; nothing reads it from a global.

use crate::ranking::Strategy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Tap/swipe classification and path smoothing
    pub gesture: GestureConfig,
    /// Path to key-sequence hysteresis
    pub sequence: SequenceConfig,
    /// Dictionary loading and shortlisting
    pub dictionary: DictionaryConfig,
    /// Strategy selection and result caps
    pub ranking: RankingConfig,
    /// Geometric/lexical scoring weights
    pub lexical: LexicalConfig,
    /// Shape/location channel scoring
    pub shape: ShapeConfig,
    /// Adaptive learning boosts
    pub learning: LearningConfig,
}

/// Gesture classifier configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Movement (px) required before a press can become a swipe
    pub deadzone_radius: f64,
    /// Time (ms) that must elapse before a press can become a swipe
    pub time_threshold_ms: f64,
    /// EMA factor: 1.0 = raw input, lower = smoother
    pub smoothing_alpha: f64,
    /// Minimum spacing (px) between accepted path samples
    pub resample_distance: f64,
}

/// Key-sequence extractor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceConfig {
    /// A competing key must be this much closer (ratio) to win outright
    pub hysteresis_ratio: f64,
    /// ...and at least this many pixels closer
    pub min_distance_gap: f64,
    /// Consecutive best-match samples that force a key switch
    pub min_consecutive_samples: usize,
    /// Runs shorter than this between two identical keys are bounces
    pub min_dwell_for_bounce: usize,
    /// Samples farther than this from every key center are noise
    pub max_key_distance: f64,
}

/// Dictionary configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DictionaryConfig {
    /// Allowed length difference between key sequence and word
    pub length_tolerance: usize,
    /// Rank assigned to words missing from the frequency table
    pub default_frequency: u32,
}

/// Ranking configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// Active scoring strategy for this deployment
    pub strategy: Strategy,
    /// Maximum number of candidates returned
    pub max_candidates: usize,
    /// Key sequences shorter than this produce no candidates
    pub min_key_sequence_length: usize,
}

/// Geometric/lexical strategy configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LexicalConfig {
    pub edit_distance_weight: f64,
    pub bigram_weight: f64,
    pub frequency_weight: f64,
    pub spatial_weight: f64,
    /// Candidates scoring below this are dropped
    pub min_candidate_score: f64,
    pub edit_distance_limit: usize,
    /// Average key distance (px) at which the spatial score reaches zero
    pub spatial_norm_distance: f64,
}

/// Shape/location channel strategy configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeConfig {
    /// Points per resampled gesture
    pub sample_points: usize,
    pub shape_weight: f64,
    pub location_weight: f64,
    pub frequency_weight: f64,
    /// Keys within this radius (px) of the gesture start/end seed pruning
    pub pruning_radius: f64,
    pub length_tolerance: usize,
    /// `k` in `1 / (1 + shape_distance * k)`
    pub shape_scale: f64,
    /// Divisor in `1 / (1 + location_distance / d)`
    pub location_scale: f64,
    /// Added for each of start/end landing within `endpoint_radius`
    pub endpoint_bonus: f64,
    /// Start/end distance (px) to a template that earns `endpoint_bonus`
    pub endpoint_radius: f64,
    pub length_bonus_per_char: f64,
    pub length_bonus_cap: f64,
    /// Start/end radius (px) for the common-word fast path
    pub fast_path_radius: f64,
    /// Below this many pruned templates, retry with a shorter length estimate
    pub min_prune_results: usize,
    /// Path samples per letter when estimating word length
    pub points_per_char: usize,
}

/// Learning boost configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningConfig {
    pub unigram_weight: f64,
    pub bigram_weight: f64,
    pub max_unigrams: usize,
    pub max_bigrams: usize,
    /// Applied to all counts on load to fade stale data
    pub decay_factor: f64,
    /// Commits between automatic saves (0 = never)
    pub auto_save_interval: usize,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            deadzone_radius: 10.0,
            time_threshold_ms: 35.0,
            smoothing_alpha: 0.40,
            resample_distance: 7.0,
        }
    }
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            hysteresis_ratio: 0.72,
            min_distance_gap: 6.0,
            min_consecutive_samples: 2,
            min_dwell_for_bounce: 2,
            max_key_distance: 100.0,
        }
    }
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            length_tolerance: 3,
            default_frequency: 1000,
        }
    }
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::Lexical,
            max_candidates: 8,
            min_key_sequence_length: 2,
        }
    }
}

impl Default for LexicalConfig {
    fn default() -> Self {
        Self {
            edit_distance_weight: -2.2,
            bigram_weight: 1.0,
            frequency_weight: 0.8,
            spatial_weight: 1.5,
            min_candidate_score: -5.0,
            edit_distance_limit: 7,
            spatial_norm_distance: 60.0,
        }
    }
}

impl Default for ShapeConfig {
    fn default() -> Self {
        Self {
            sample_points: 100,
            shape_weight: 0.5,
            location_weight: 0.5,
            frequency_weight: 0.3,
            pruning_radius: 40.0,
            length_tolerance: 3,
            shape_scale: 10.0,
            location_scale: 50.0,
            endpoint_bonus: 0.15,
            endpoint_radius: 40.0,
            length_bonus_per_char: 0.03,
            length_bonus_cap: 0.2,
            fast_path_radius: 60.0,
            min_prune_results: 10,
            points_per_char: 10,
        }
    }
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            unigram_weight: 2.5,
            bigram_weight: 1.8,
            max_unigrams: 10_000,
            max_bigrams: 5_000,
            decay_factor: 0.95,
            auto_save_interval: 10,
        }
    }
}

impl EngineConfig {
    /// Validate config values are within acceptable ranges.
    /// Returns Ok(()) if valid, or Err with a description of the first invalid field.
    pub fn validate(&self) -> Result<(), crate::Error> {
        let g = &self.gesture;
        if !(g.smoothing_alpha > 0.0 && g.smoothing_alpha <= 1.0) {
            return Err(crate::Error::Config(format!(
                "smoothing_alpha must be in (0, 1], got {}", g.smoothing_alpha
            )));
        }
        if g.deadzone_radius < 0.0 || g.time_threshold_ms < 0.0 || g.resample_distance < 0.0 {
            return Err(crate::Error::Config(
                "gesture thresholds must not be negative".to_string(),
            ));
        }

        let s = &self.sequence;
        if !(s.hysteresis_ratio > 0.0 && s.hysteresis_ratio <= 1.0) {
            return Err(crate::Error::Config(format!(
                "hysteresis_ratio must be in (0, 1], got {}", s.hysteresis_ratio
            )));
        }
        if s.min_consecutive_samples == 0 {
            return Err(crate::Error::Config("min_consecutive_samples must be > 0".to_string()));
        }
        if s.max_key_distance <= 0.0 {
            return Err(crate::Error::Config(format!(
                "max_key_distance must be > 0, got {}", s.max_key_distance
            )));
        }

        if self.ranking.max_candidates == 0 {
            return Err(crate::Error::Config("max_candidates must be > 0".to_string()));
        }
        if self.lexical.spatial_norm_distance <= 0.0 {
            return Err(crate::Error::Config(format!(
                "spatial_norm_distance must be > 0, got {}", self.lexical.spatial_norm_distance
            )));
        }

        let sh = &self.shape;
        if sh.sample_points < 2 {
            return Err(crate::Error::Config(format!(
                "sample_points must be >= 2, got {}", sh.sample_points
            )));
        }
        if sh.location_scale <= 0.0 || sh.points_per_char == 0 {
            return Err(crate::Error::Config(
                "location_scale and points_per_char must be > 0".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.learning.decay_factor) {
            return Err(crate::Error::Config(format!(
                "decay_factor must be in [0, 1], got {}", self.learning.decay_factor
            )));
        }
        Ok(())
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, crate::Error> {
        let config: Self =
            toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from file
    pub fn load(path: &Path) -> Result<Self, crate::Error> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load config from default location, or defaults if no file exists
    pub fn load_default() -> Result<Self, crate::Error> {
        let path = Self::default_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<(), crate::Error> {
        let content = self.to_toml()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("magic-keyboard").join("engine.toml"))
            .unwrap_or_else(|| PathBuf::from("engine.toml"))
    }

    /// Generate TOML representation
    pub fn to_toml(&self) -> Result<String, crate::Error> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.gesture.deadzone_radius, 10.0);
        assert_eq!(config.sequence.hysteresis_ratio, 0.72);
        assert_eq!(config.ranking.max_candidates, 8);
        assert_eq!(config.ranking.strategy, Strategy::Lexical);
        assert_eq!(config.shape.sample_points, 100);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml(
            "[ranking]\nstrategy = \"shape\"\nmax_candidates = 5\n",
        )
        .unwrap();
        assert_eq!(config.ranking.strategy, Strategy::Shape);
        assert_eq!(config.ranking.max_candidates, 5);
        assert_eq!(config.ranking.min_key_sequence_length, 2);
        assert_eq!(config.lexical.edit_distance_limit, 7);
    }

    #[test]
    fn test_rejects_bad_alpha() {
        let err = EngineConfig::from_toml("[gesture]\nsmoothing_alpha = 0.0\n").unwrap_err();
        assert!(err.to_string().contains("smoothing_alpha"));
    }

    #[test]
    fn test_rejects_zero_cap() {
        let mut config = EngineConfig::default();
        config.ranking.max_candidates = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("engine.toml");
        let mut config = EngineConfig::default();
        config.shape.pruning_radius = 55.0;
        config.save(&path).unwrap();

        let loaded = EngineConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_toml_sections() {
        let toml = EngineConfig::default().to_toml().unwrap();
        assert!(toml.contains("[gesture]"));
        assert!(toml.contains("[sequence]"));
        assert!(toml.contains("[shape]"));
    }
}
