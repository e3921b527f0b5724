// End-to-end recognition scenarios on the built-in QWERTY layout.

use swipe_core::core::gesture::{GestureOutcome, GestureState};
use swipe_core::core::layout::KeyboardLayout;
use swipe_core::core::sequence::KeySequenceExtractor;
use swipe_core::ranking::ScoreBreakdown;
use swipe_core::{EngineConfig, Point, Strategy, SwipeEngine};

const WORDS: &str = "the\nthey\nthere\ntie\ntoe\nthee\nhello\nhelp\nhell\nhole\nhero\nworld\nword\n";
const FREQS: &str = "the\t1\nhello\t30\nworld\t60\nthere\t40\n";

fn engine() -> SwipeEngine {
    engine_with(EngineConfig::default())
}

fn engine_with(config: EngineConfig) -> SwipeEngine {
    let mut engine = SwipeEngine::new(config);
    engine.set_layout(KeyboardLayout::qwerty());
    assert!(engine.load_dictionary_sources(WORDS, Some(FREQS)));
    engine
}

fn center(c: char) -> Point {
    KeyboardLayout::qwerty().letter_center(c).unwrap()
}

/// Dwells `samples` points on each letter's key, jittered inside the key.
fn dwell_path(word: &str, samples: usize) -> Vec<Point> {
    word.chars()
        .flat_map(|c| {
            let p = center(c);
            (0..samples).map(move |i| Point::new(p.x + i as f64 * 2.0 - 2.0, p.y + (i % 2) as f64))
        })
        .collect()
}

#[test]
fn path_inside_one_key_maps_to_that_key() {
    let engine = engine();
    let path = [
        Point::new(20.0, 15.0),
        Point::new(25.0, 20.0),
        Point::new(35.0, 30.0),
        Point::new(40.0, 35.0),
    ];
    assert_eq!(engine.map_path_to_sequence(&path), vec!["q"]);
}

#[test]
fn hello_path_collapses_double_letter() {
    let engine = engine();
    let path = dwell_path("hello", 3);
    assert_eq!(engine.map_path_to_sequence(&path), vec!["h", "e", "l", "o"]);

    let recognition = engine.recognize_path(&path, None, None);
    assert_eq!(recognition.key_sequence, vec!["h", "e", "l", "o"]);
    assert_eq!(recognition.best().map(|c| c.word.as_str()), Some("hello"));
}

#[test]
fn continuous_hello_trace_absorbs_transitions() {
    let engine = engine();
    let (h, e, l, o) = (center('h'), center('e'), center('l'), center('o'));
    let at = |p: Point, dx: f64, dy: f64| Point::new(p.x + dx, p.y + dy);
    let path = vec![
        at(h, -2.0, -1.0),
        h,
        at(h, 2.0, 1.0),
        // Row gap, a little nearer y than h.
        Point::new(370.0, 53.0),
        at(e, -2.0, -1.0),
        e,
        at(e, 2.0, 1.0),
        // Row gap, a little nearer d than e.
        Point::new(180.0, 52.0),
        at(l, -2.0, -1.0),
        l,
        // Slips onto k for one sample.
        at(l, -40.0, 0.0),
        at(l, 0.0, 1.0),
        at(l, 2.0, 0.0),
        at(l, -1.0, -1.0),
        // Row gap, a little nearer o than l.
        Point::new(565.0, 53.0),
        at(o, -2.0, -1.0),
        o,
        at(o, 2.0, 1.0),
    ];

    let layout = KeyboardLayout::qwerty();
    let raw = KeySequenceExtractor::new(&layout, &engine.config().sequence).raw_samples(&path);
    assert!(raw.iter().any(|k| k == "k"));
    assert!(!raw.iter().any(|k| k == "y" || k == "d"));

    assert_eq!(engine.map_path_to_sequence(&path), vec!["h", "e", "l", "o"]);
    let recognition = engine.recognize_path(&path, None, None);
    assert_eq!(recognition.best().map(|c| c.word.as_str()), Some("hello"));
}

#[test]
fn common_word_ranks_first_for_exact_keys() {
    let engine = engine();
    let candidates = engine.generate_candidates("the", None, None);
    assert_eq!(candidates[0].word, "the");

    let overlaps: Vec<usize> = candidates
        .iter()
        .map(|c| match c.breakdown {
            ScoreBreakdown::Lexical { bigram_overlap, .. } => bigram_overlap,
            _ => panic!("lexical breakdown expected"),
        })
        .collect();
    let max_overlap = overlaps.iter().copied().max().unwrap();
    assert_eq!(overlaps[0], max_overlap);
    match candidates[0].breakdown {
        ScoreBreakdown::Lexical { edit_distance, .. } => assert_eq!(edit_distance, 0),
        _ => unreachable!(),
    }
}

#[test]
fn small_movement_is_always_a_tap() {
    let engine = engine();
    for duration in [10u64, 200, 5_000] {
        let mut classifier = engine.gesture_classifier();
        let start = center('g');
        classifier.pointer_down(start, start, 0);
        for step in 1..=10u64 {
            let p = Point::new(start.x + (step % 3) as f64 * 3.0, start.y + (step % 2) as f64 * 4.0);
            classifier.pointer_move(p, p, duration * step / 10);
            assert_ne!(classifier.state(), GestureState::Swiping);
        }
        match classifier.pointer_up(start, start, duration) {
            Some(GestureOutcome::Tap(tap)) => assert_eq!(tap.key_id.as_deref(), Some("g")),
            other => panic!("expected tap after {duration}ms, got {other:?}"),
        }
    }
}

#[test]
fn classified_swipe_recognizes_word() {
    // Unsmoothed input, so the trail jumps straight between key clusters.
    let mut config = EngineConfig::default();
    config.gesture.smoothing_alpha = 1.0;
    let engine = engine_with(config);
    let mut classifier = engine.gesture_classifier();

    let path = dwell_path("world", 4);
    let mut t = 0u64;
    classifier.pointer_down(path[0], path[0], t);
    for p in &path[1..] {
        t += 40;
        classifier.pointer_move(*p, *p, t);
    }
    let last = *path.last().unwrap();
    let Some(GestureOutcome::Swipe(swipe)) = classifier.pointer_up(last, last, t + 40) else {
        panic!("expected swipe");
    };
    assert_eq!(swipe.key_sequence, vec!["w", "o", "r", "l", "d"]);

    let recognition = engine.recognize_swipe(&swipe, None, None);
    assert_eq!(recognition.key_sequence, swipe.key_sequence);
    assert_eq!(recognition.best().map(|c| c.word.as_str()), Some("world"));
}

#[test]
fn shape_strategy_recognizes_traced_word() {
    let mut engine = engine();
    engine.set_strategy(Strategy::Shape);

    let letters: Vec<Point> = "hello".chars().map(center).collect();
    let mut path = vec![letters[0]];
    for pair in letters.windows(2) {
        for step in 1..=10 {
            path.push(pair[0] + (pair[1] - pair[0]) * (step as f64 / 10.0));
        }
    }

    let recognition = engine.recognize_path(&path, None, None);
    assert_eq!(recognition.best().map(|c| c.word.as_str()), Some("hello"));
    assert!(matches!(
        recognition.candidates[0].breakdown,
        ScoreBreakdown::Shape { .. } | ScoreBreakdown::FastPath { .. }
    ));
}

#[test]
fn degenerate_inputs_are_empty_not_errors() {
    let engine = engine();
    assert!(engine.map_path_to_sequence(&[]).is_empty());
    assert!(engine.map_path_to_sequence(&[Point::new(-500.0, -500.0)]).is_empty());
    assert!(engine.recognize_path(&[], None, None).candidates.is_empty());
    assert!(engine.generate_candidates("zq", None, None).is_empty());
    assert!(engine.generate_candidates("t", None, None).is_empty());
}
