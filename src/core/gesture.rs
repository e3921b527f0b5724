// File: src/core/gesture.rs
use crate::config::{GestureConfig, SequenceConfig};
use crate::core::geometry::Point;
use crate::core::layout::KeyboardLayout;
use crate::core::sequence::KeySequenceExtractor;
use crate::core::types::PathPoint;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Classifier state. `Completed` and `Tapped` are transient: they are entered
/// while a result is produced and immediately left for `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureState {
    Idle,
    TapPending,
    Swiping,
    Completed,
    Tapped,
}

impl GestureState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::TapPending => "TapPending",
            Self::Swiping => "Swiping",
            Self::Completed => "Completed",
            Self::Tapped => "Tapped",
        }
    }
}

impl fmt::Display for GestureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TapResult {
    /// Nearest key to the press position; `None` without a layout.
    pub key_id: Option<String>,
    pub position: Point,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwipeResult {
    pub path: Vec<PathPoint>,
    pub key_sequence: Vec<String>,
    pub duration_ms: f64,
}

impl SwipeResult {
    /// Layout-space positions of the path.
    pub fn layout_points(&self) -> Vec<Point> {
        self.path.iter().map(|p| p.layout).collect()
    }
}

/// What a finished gesture turned out to be.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureOutcome {
    Tap(TapResult),
    Swipe(SwipeResult),
}

/// Tap/swipe state machine for one input source.
///
/// Each pointer owns its own classifier; the layout is shared read-only.
#[derive(Debug, Clone)]
pub struct GestureClassifier {
    config: GestureConfig,
    sequence_config: SequenceConfig,
    layout: Option<Arc<KeyboardLayout>>,

    state: GestureState,
    start_window: Point,
    start_layout: Point,
    start_time: u64,
    last_smoothed_window: Point,
    last_smoothed_layout: Point,
    path: Vec<PathPoint>,
}

impl GestureClassifier {
    pub fn new(
        config: GestureConfig,
        sequence_config: SequenceConfig,
        layout: Option<Arc<KeyboardLayout>>,
    ) -> Self {
        Self {
            config,
            sequence_config,
            layout,
            state: GestureState::Idle,
            start_window: Point::default(),
            start_layout: Point::default(),
            start_time: 0,
            last_smoothed_window: Point::default(),
            last_smoothed_layout: Point::default(),
            path: Vec::new(),
        }
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    pub fn set_layout(&mut self, layout: Option<Arc<KeyboardLayout>>) {
        self.layout = layout;
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn is_swiping(&self) -> bool {
        self.state == GestureState::Swiping
    }

    /// Samples accepted so far in the active swipe.
    pub fn current_path(&self) -> &[PathPoint] {
        &self.path
    }

    pub fn pointer_down(&mut self, window: Point, layout: Point, timestamp: u64) {
        self.reset();
        self.start_window = window;
        self.start_layout = layout;
        self.start_time = timestamp;
        self.last_smoothed_window = window;
        self.last_smoothed_layout = layout;
        self.transition_to(GestureState::TapPending);
    }

    pub fn pointer_move(&mut self, window: Point, layout: Point, timestamp: u64) {
        if self.state == GestureState::Idle {
            return;
        }

        if self.state == GestureState::TapPending {
            let moved = self.start_window.distance_to(&window);
            let elapsed = timestamp.saturating_sub(self.start_time) as f64;
            if moved > self.config.deadzone_radius && elapsed > self.config.time_threshold_ms {
                self.transition_to(GestureState::Swiping);
                self.path.push(PathPoint {
                    window: self.start_window,
                    layout: self.start_layout,
                    timestamp: self.start_time,
                });
            }
        }

        if self.state == GestureState::Swiping {
            let sample = PathPoint {
                window: self.smooth(window, self.last_smoothed_window),
                layout: self.smooth(layout, self.last_smoothed_layout),
                timestamp,
            };
            if self.should_add_sample(&sample) {
                self.path.push(sample);
            }
            self.last_smoothed_window = sample.window;
            self.last_smoothed_layout = sample.layout;
        }
    }

    /// Ends the gesture. Returns the tap or swipe it resolved to, or `None`
    /// if no press was in progress.
    pub fn pointer_up(&mut self, window: Point, layout: Point, timestamp: u64) -> Option<GestureOutcome> {
        match self.state {
            GestureState::TapPending => {
                self.transition_to(GestureState::Tapped);
                let key_id = self.layout.as_deref().and_then(|l| {
                    l.nearest_key(&self.start_layout)
                        .and_then(|(i, _)| l.key(i))
                        .map(|k| k.id.clone())
                });
                let result = TapResult { key_id, position: self.start_layout };
                self.transition_to(GestureState::Idle);
                Some(GestureOutcome::Tap(result))
            }
            GestureState::Swiping => {
                let last = PathPoint {
                    window: self.smooth(window, self.last_smoothed_window),
                    layout: self.smooth(layout, self.last_smoothed_layout),
                    timestamp,
                };
                self.path.push(last);
                self.transition_to(GestureState::Completed);

                let points: Vec<Point> = self.path.iter().map(|p| p.layout).collect();
                let key_sequence = self
                    .layout
                    .as_deref()
                    .map(|l| KeySequenceExtractor::new(l, &self.sequence_config).extract(&points))
                    .unwrap_or_default();
                let result = SwipeResult {
                    path: std::mem::take(&mut self.path),
                    key_sequence,
                    duration_ms: timestamp.saturating_sub(self.start_time) as f64,
                };
                self.transition_to(GestureState::Idle);
                Some(GestureOutcome::Swipe(result))
            }
            _ => {
                self.transition_to(GestureState::Idle);
                None
            }
        }
    }

    /// Abandons any gesture in progress.
    pub fn reset(&mut self) {
        self.state = GestureState::Idle;
        self.path.clear();
    }

    fn transition_to(&mut self, next: GestureState) {
        if self.state != next {
            debug!("gesture {} -> {}", self.state, next);
        }
        self.state = next;
    }

    fn smooth(&self, raw: Point, previous: Point) -> Point {
        let a = self.config.smoothing_alpha;
        raw * a + previous * (1.0 - a)
    }

    fn should_add_sample(&self, sample: &PathPoint) -> bool {
        self.path
            .last()
            .map_or(true, |last| sample.window.distance_to(&last.window) >= self.config.resample_distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> GestureClassifier {
        GestureClassifier::new(
            GestureConfig::default(),
            SequenceConfig::default(),
            Some(Arc::new(KeyboardLayout::qwerty())),
        )
    }

    fn at(x: f64, y: f64) -> (Point, Point) {
        (Point::new(x, y), Point::new(x, y))
    }

    #[test]
    fn test_short_press_is_tap() {
        let mut g = classifier();
        let (w, l) = at(30.0, 25.0);
        g.pointer_down(w, l, 0);
        assert_eq!(g.state(), GestureState::TapPending);
        let (w2, l2) = at(33.0, 27.0);
        g.pointer_move(w2, l2, 500);
        assert_eq!(g.state(), GestureState::TapPending);

        match g.pointer_up(w2, l2, 900) {
            Some(GestureOutcome::Tap(tap)) => {
                assert_eq!(tap.key_id.as_deref(), Some("q"));
                assert_eq!(tap.position, l);
            }
            other => panic!("expected tap, got {other:?}"),
        }
        assert_eq!(g.state(), GestureState::Idle);
    }

    #[test]
    fn test_fast_movement_waits_for_time_threshold() {
        let mut g = classifier();
        let (w, l) = at(30.0, 25.0);
        g.pointer_down(w, l, 0);
        let (w2, l2) = at(80.0, 25.0);
        g.pointer_move(w2, l2, 10);
        assert_eq!(g.state(), GestureState::TapPending);
        g.pointer_move(w2, l2, 40);
        assert!(g.is_swiping());
        assert_eq!(g.current_path()[0].layout, l);
    }

    #[test]
    fn test_swipe_smoothing_and_resampling() {
        let mut g = classifier();
        let (w, l) = at(0.0, 0.0);
        g.pointer_down(w, l, 0);
        let (w1, l1) = at(100.0, 0.0);
        g.pointer_move(w1, l1, 50);
        // start + smoothed 0.4 * 100
        assert_eq!(g.current_path().len(), 2);
        assert!((g.current_path()[1].window.x - 40.0).abs() < 1e-9);

        // Smoothed step of 1.2px is below the resample distance.
        let (w2, l2) = at(43.0, 0.0);
        g.pointer_move(w2, l2, 60);
        assert_eq!(g.current_path().len(), 2);
    }

    #[test]
    fn test_swipe_produces_sequence() {
        let mut g = classifier();
        let layout = KeyboardLayout::qwerty();
        let h = layout.letter_center('h').unwrap();
        let i = layout.letter_center('i').unwrap();

        g.pointer_down(h, h, 0);
        let mut t = 40;
        for step in 1..=20 {
            let p = h + (i - h) * (step as f64 / 20.0);
            g.pointer_move(p, p, t);
            t += 16;
        }
        for _ in 0..8 {
            g.pointer_move(i, i, t);
            t += 16;
        }
        let outcome = g.pointer_up(i, i, t);
        let Some(GestureOutcome::Swipe(swipe)) = outcome else {
            panic!("expected swipe");
        };
        assert_eq!(swipe.key_sequence.first().map(String::as_str), Some("h"));
        assert_eq!(swipe.key_sequence.last().map(String::as_str), Some("i"));
        assert_eq!(swipe.duration_ms, t as f64);
        assert!(g.current_path().is_empty());
    }

    #[test]
    fn test_up_without_down_is_ignored() {
        let mut g = classifier();
        let (w, l) = at(10.0, 10.0);
        g.pointer_move(w, l, 5);
        assert_eq!(g.state(), GestureState::Idle);
        assert!(g.pointer_up(w, l, 10).is_none());
    }

    #[test]
    fn test_reset_abandons_swipe() {
        let mut g = classifier();
        let (w, l) = at(0.0, 0.0);
        g.pointer_down(w, l, 0);
        let (w1, l1) = at(100.0, 0.0);
        g.pointer_move(w1, l1, 50);
        assert!(g.is_swiping());
        g.reset();
        assert_eq!(g.state(), GestureState::Idle);
        assert!(g.current_path().is_empty());
    }

    #[test]
    fn test_without_layout_tap_has_no_key() {
        let mut g = GestureClassifier::new(GestureConfig::default(), SequenceConfig::default(), None);
        let (w, l) = at(30.0, 25.0);
        g.pointer_down(w, l, 0);
        match g.pointer_up(w, l, 100) {
            Some(GestureOutcome::Tap(tap)) => assert!(tap.key_id.is_none()),
            other => panic!("expected tap, got {other:?}"),
        }
    }
}
