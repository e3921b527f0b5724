// File: src/core/sequence.rs
use crate::config::SequenceConfig;
use crate::core::geometry::Point;
use crate::core::layout::KeyboardLayout;

/// A run of consecutive samples attributed to one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRun {
    pub key: String,
    /// Number of samples in the run.
    pub dwell: usize,
}

/// Per-gesture hysteresis state. Lives only for one extraction; nothing is
/// shared between gestures.
#[derive(Debug, Default)]
struct Hysteresis {
    current: Option<usize>,
    candidate: Option<usize>,
    candidate_count: usize,
}

/// Maps a layout-space path to the ordered, de-duplicated keys it traversed.
pub struct KeySequenceExtractor<'a> {
    layout: &'a KeyboardLayout,
    config: &'a SequenceConfig,
}

impl<'a> KeySequenceExtractor<'a> {
    pub fn new(layout: &'a KeyboardLayout, config: &'a SequenceConfig) -> Self {
        Self { layout, config }
    }

    /// Full pipeline: hysteresis, collapse, bounce removal.
    pub fn extract(&self, path: &[Point]) -> Vec<String> {
        let runs = refine_runs(collapse_runs(self.raw_samples(path)), self.config.min_dwell_for_bounce);
        runs.into_iter().map(|r| r.key).collect()
    }

    /// One key id per accepted sample, after hysteresis. Samples too far
    /// from every key are dropped.
    pub fn raw_samples(&self, path: &[Point]) -> Vec<String> {
        let mut state = Hysteresis::default();
        let mut raw = Vec::with_capacity(path.len());

        for p in path {
            let Some((best, _)) = self.layout.nearest_key_within(p, self.config.max_key_distance) else {
                continue;
            };
            let current = match state.current {
                None => best,
                Some(cur) if cur == best => {
                    state.candidate = None;
                    state.candidate_count = 0;
                    cur
                }
                Some(cur) => {
                    if self.should_switch(cur, best, p, &mut state) {
                        state.candidate = None;
                        state.candidate_count = 0;
                        best
                    } else {
                        cur
                    }
                }
            };
            state.current = Some(current);
            if let Some(key) = self.layout.key(current) {
                raw.push(key.id.clone());
            }
        }
        raw
    }

    fn should_switch(&self, current: usize, best: usize, p: &Point, state: &mut Hysteresis) -> bool {
        let (Some(cur_key), Some(new_key)) = (self.layout.key(current), self.layout.key(best)) else {
            return false;
        };

        if new_key.bounds.contains(p) {
            return true;
        }

        let d_cur = cur_key.center.distance_to(p);
        let d_new = new_key.center.distance_to(p);
        if d_new <= d_cur * self.config.hysteresis_ratio && d_cur - d_new >= self.config.min_distance_gap {
            return true;
        }

        // Slow drift: the same challenger keeps winning.
        if state.candidate == Some(best) {
            state.candidate_count += 1;
        } else {
            state.candidate = Some(best);
            state.candidate_count = 1;
        }
        state.candidate_count >= self.config.min_consecutive_samples
    }
}

/// Collapses immediate repeats into runs with dwell counts.
pub fn collapse_runs<I, S>(keys: I) -> Vec<KeyRun>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut runs: Vec<KeyRun> = Vec::new();
    for key in keys {
        let key = key.into();
        match runs.last_mut() {
            Some(last) if last.key == key => last.dwell += 1,
            _ => runs.push(KeyRun { key, dwell: 1 }),
        }
    }
    runs
}

/// Merges adjacent runs of the same key, summing their dwell.
pub fn merge_runs(runs: Vec<KeyRun>) -> Vec<KeyRun> {
    let mut merged: Vec<KeyRun> = Vec::with_capacity(runs.len());
    for run in runs {
        match merged.last_mut() {
            Some(last) if last.key == run.key => last.dwell += run.dwell,
            _ => merged.push(run),
        }
    }
    merged
}

/// Drops the middle of every A,B,A pattern where B dwelled for fewer than
/// `min_dwell` samples. Patterns are judged against the input order.
pub fn remove_bounces(runs: &[KeyRun], min_dwell: usize) -> Vec<KeyRun> {
    runs.iter()
        .enumerate()
        .filter(|&(i, run)| {
            let bounce = i > 0
                && i + 1 < runs.len()
                && runs[i - 1].key == runs[i + 1].key
                && run.dwell < min_dwell;
            !bounce
        })
        .map(|(_, run)| run.clone())
        .collect()
}

/// Bounce removal followed by re-collapsing, repeated until stable so the
/// result is a fixed point.
pub fn refine_runs(runs: Vec<KeyRun>, min_dwell: usize) -> Vec<KeyRun> {
    let mut runs = merge_runs(runs);
    loop {
        let next = merge_runs(remove_bounces(&runs, min_dwell));
        if next == runs {
            return runs;
        }
        runs = next;
    }
}

/// Joins the letter keys of a sequence into a lowercase string, dropping
/// action keys such as `"space"`.
pub fn letters_of(sequence: &[String]) -> String {
    sequence
        .iter()
        .filter_map(|id| {
            let mut chars = id.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii_alphabetic() => Some(c.to_ascii_lowercase()),
                _ => None,
            }
        })
        .collect()
}
