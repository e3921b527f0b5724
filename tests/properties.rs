// Invariants checked over generated inputs.

use swipe_core::core::dictionary::DictionaryIndex;
use swipe_core::core::layout::KeyboardLayout;
use swipe_core::core::sequence::{collapse_runs, refine_runs};
use swipe_core::fuzzy::levenshtein;
use swipe_core::{EngineConfig, Point, Strategy, SwipeEngine};

const WORDS: &str = "the\nthen\nthem\nthere\nthese\nthey\nthis\ntie\ntoe\ntree\nthree\n\
hello\nhelp\nhell\nhole\nhero\nhallo\nworld\nword\nwould\nwild\nweird\nkeyboard\nkey\n\
swipe\nswap\nship\nshape\nsleep\nquick\nquack\nquiz\nbrown\nbrain\nfox\nfix\nflux\n";

/// Small deterministic generator so failures are reproducible.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next() % n
    }

    fn word(&mut self, alphabet: &[u8], max_len: u64) -> String {
        let len = self.below(max_len) + 1;
        (0..len)
            .map(|_| alphabet[self.below(alphabet.len() as u64) as usize] as char)
            .collect()
    }
}

fn engine() -> SwipeEngine {
    let mut engine = SwipeEngine::new(EngineConfig::default());
    engine.set_layout(KeyboardLayout::qwerty());
    assert!(engine.load_ranked_list(WORDS));
    engine
}

fn random_path(rng: &mut Lcg, len: usize) -> Vec<Point> {
    (0..len)
        .map(|_| Point::new(rng.below(660) as f64, rng.below(160) as f64))
        .collect()
}

#[test]
fn recognition_is_deterministic() {
    let mut rng = Lcg(7);
    let mut engine = engine();
    for strategy in [Strategy::Lexical, Strategy::Shape] {
        engine.set_strategy(strategy);
        for _ in 0..50 {
            let len = rng.below(40) as usize;
            let path = random_path(&mut rng, len);
            let first = engine.recognize_path(&path, None, None);
            let second = engine.recognize_path(&path, None, None);
            assert_eq!(first, second);
        }
    }
}

#[test]
fn collapsing_is_idempotent() {
    let mut rng = Lcg(11);
    for _ in 0..200 {
        let keys = rng.word(b"abc", 20);
        let runs = collapse_runs(keys.chars().map(String::from));
        for min_dwell in 1..=3 {
            let once = refine_runs(runs.clone(), min_dwell);
            let twice = refine_runs(once.clone(), min_dwell);
            assert_eq!(once, twice, "input {keys} min_dwell {min_dwell}");
            assert!(once.windows(2).all(|w| w[0].key != w[1].key));
        }
    }
}

#[test]
fn shortlist_matches_endpoints_and_length() {
    let dict = DictionaryIndex::from_ranked_list(WORDS).unwrap();
    let mut rng = Lcg(3);
    for _ in 0..500 {
        let mut keys = rng.word(b"thswkqbfelodpxyer", 9);
        if rng.below(2) == 0 {
            keys = keys.to_uppercase();
        }
        let first = keys.chars().next().unwrap().to_ascii_lowercase();
        let last = keys.chars().last().unwrap().to_ascii_lowercase();
        for word in dict.shortlist(&keys, 3) {
            assert_eq!(word.first_char, first);
            assert_eq!(word.last_char, last);
            assert!(word.length.abs_diff(keys.len()) <= 3);
        }
    }
}

#[test]
fn scores_are_sorted_and_capped() {
    let mut rng = Lcg(5);
    let engine = engine();
    let cap = engine.config().ranking.max_candidates;
    for _ in 0..300 {
        let keys = rng.word(b"thswkqbfelodpxyer", 9);
        let candidates = engine.generate_candidates(&keys, None, None);
        assert!(candidates.len() <= cap);
        assert!(candidates.windows(2).all(|w| w[0].score >= w[1].score));
    }
}

#[test]
fn shape_scores_are_sorted_and_capped() {
    let mut rng = Lcg(9);
    let mut engine = engine();
    engine.set_strategy(Strategy::Shape);
    let cap = engine.config().ranking.max_candidates;
    for _ in 0..100 {
        let len = rng.below(60) as usize + 2;
        let path = random_path(&mut rng, len);
        let candidates = engine.recognize_path(&path, None, None).candidates;
        assert!(candidates.len() <= cap);
        assert!(candidates.windows(2).all(|w| w[0].score >= w[1].score));
    }
}

#[test]
fn short_key_sequences_yield_nothing() {
    let engine = engine();
    for keys in ["", "t", "h", "q", "T"] {
        assert!(engine.generate_candidates(keys, None, None).is_empty(), "{keys:?}");
    }
}

fn reference_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();
    for i in 1..=a.len() {
        let mut prev_diag = row[0];
        row[0] = i;
        for j in 1..=b.len() {
            let above = row[j];
            let cost = usize::from(a[i - 1] != b[j - 1]);
            row[j] = (above + 1).min(row[j - 1] + 1).min(prev_diag + cost);
            prev_diag = above;
        }
    }
    row[b.len()]
}

#[test]
fn levenshtein_respects_limit() {
    let mut rng = Lcg(13);
    for _ in 0..1000 {
        let a = rng.word(b"abcd", 10);
        let b = rng.word(b"abcd", 10);
        let truth = reference_distance(&a, &b);
        for limit in 0..=7 {
            let got = levenshtein(&a, &b, limit);
            if truth > limit {
                assert_eq!(got, limit + 1, "{a} / {b} limit {limit}");
            } else {
                assert_eq!(got, truth, "{a} / {b} limit {limit}");
            }
        }
    }
}
