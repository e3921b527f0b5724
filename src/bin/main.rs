//! Swipe engine simulator
//!
//! Reads pointer events and commands from stdin, one per line, and prints
//! the recognized key sequence and candidates.

use clap::Parser;
use crossterm::style::Stylize;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use swipe_core::core::gesture::{GestureClassifier, GestureOutcome};
use swipe_core::core::layout::KeyboardLayout;
use swipe_core::ranking::confidence;
use swipe_core::{Candidate, EngineConfig, LearningStore, Point, Recognition, Strategy, SwipeEngine};
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Built-in word list used when no dictionary is given, most common first.
const BUILTIN_WORDS: &str = "the\nbe\nto\nof\nand\nin\nthat\nhave\nit\nfor\nnot\non\nwith\nhe\nas\n\
you\ndo\nat\nthis\nbut\nhis\nby\nfrom\nthey\nwe\nsay\nher\nshe\nor\nan\nwill\nmy\none\nall\n\
would\nthere\ntheir\nwhat\nso\nup\nout\nif\nabout\nwho\nget\nwhich\ngo\nme\nwhen\nmake\ncan\n\
like\ntime\nno\njust\nhim\nknow\ntake\npeople\ninto\nyear\nyour\ngood\nsome\ncould\nthem\nsee\n\
other\nthan\nthen\nnow\nlook\nonly\ncome\nits\nover\nthink\nalso\nback\nafter\nuse\ntwo\nhow\n\
our\nwork\nfirst\nwell\nway\neven\nnew\nwant\nbecause\nany\nthese\ngive\nday\nmost\nhello\n\
help\nworld\nword\nkeyboard\nswipe\ntype\nquick\nbrown\nfox\n";

/// Swipe keyboard recognition simulator
#[derive(Parser, Debug)]
#[command(name = "swipe-engine")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file path (defaults to the user config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON layout file (built-in QWERTY if omitted)
    #[arg(short, long)]
    layout: Option<PathBuf>,

    /// Word list, one word per line
    #[arg(short, long)]
    words: Option<PathBuf>,

    /// Frequency table, `word<TAB>rank` per line
    #[arg(short, long, requires = "words")]
    freq: Option<PathBuf>,

    /// Learning data file (in-memory learning if omitted)
    #[arg(long)]
    learned: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> swipe_core::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::load_default()?,
    };
    let learning_config = config.learning.clone();

    let mut engine = SwipeEngine::new(config);
    let layout_loaded = cli.layout.as_deref().is_some_and(|p| engine.load_layout_file(p));
    if !layout_loaded {
        engine.set_layout(KeyboardLayout::qwerty());
    }
    let words_loaded = cli
        .words
        .as_deref()
        .is_some_and(|p| engine.load_dictionary_files(p, cli.freq.as_deref()));
    if !words_loaded && !engine.load_ranked_list(BUILTIN_WORDS) {
        warn!("Built-in word list failed to load");
    }

    let mut learning = match &cli.learned {
        Some(path) => LearningStore::open(path.clone(), learning_config),
        None => LearningStore::in_memory(learning_config),
    };

    let mut classifier = engine.gesture_classifier();
    let mut last: Option<Recognition> = None;

    print_banner(&engine);
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let input = line?;
        let parts: Vec<&str> = input.split_whitespace().collect();
        let Some(&command) = parts.first() else { continue };

        match command {
            "down" | "move" | "up" => match parse_event(&parts) {
                Some((p, t)) => {
                    if let Some(r) = handle_pointer(command, p, t, &engine, &mut classifier, &learning) {
                        print_recognition(&r);
                        last = Some(r);
                    }
                }
                None => println!("{}", format!("usage: {command} <x> <y> <t>").yellow()),
            },
            "keys" => match parts.get(1) {
                Some(keys) => {
                    let candidates = engine.generate_candidates(keys, Some(&learning), learning.last_word());
                    let r = Recognition {
                        key_sequence: keys.chars().map(|c| c.to_string()).collect(),
                        candidates,
                    };
                    print_recognition(&r);
                    last = Some(r);
                }
                None => println!("{}", "usage: keys <letters>".yellow()),
            },
            "commit" => {
                let word = parts
                    .get(1)
                    .map(|w| w.to_string())
                    .or_else(|| last.as_ref().and_then(|r| r.best()).map(|c| c.word.clone()));
                match word {
                    Some(word) => {
                        learning.record_commit(&word, None);
                        println!("Committed {}", word.as_str().bold().green());
                    }
                    None => println!("{}", "nothing to commit".yellow()),
                }
            }
            "strategy" => match parts.get(1).and_then(|s| Strategy::parse(s)) {
                Some(strategy) => {
                    engine.set_strategy(strategy);
                    println!("Strategy: {}", strategy.to_string().cyan());
                }
                None => println!("{}", "usage: strategy lexical|shape".yellow()),
            },
            "reset" => {
                classifier.reset();
                last = None;
            }
            "exit" | "quit" => break,
            other => println!("{}", format!("unknown command '{other}'").red()),
        }
        stdout.flush()?;
    }

    if learning.path().is_some() {
        if let Err(e) = learning.save() {
            eprintln!("[ERROR] Could not save learning data: {}", e);
        }
    }
    Ok(())
}

fn parse_event(parts: &[&str]) -> Option<(Point, u64)> {
    let x = parts.get(1)?.parse().ok()?;
    let y = parts.get(2)?.parse().ok()?;
    let t = parts.get(3).map_or(Some(0), |s| s.parse().ok())?;
    Some((Point::new(x, y), t))
}

/// Feeds one pointer event; returns a recognition when a swipe completes.
fn handle_pointer(
    command: &str,
    p: Point,
    t: u64,
    engine: &SwipeEngine,
    classifier: &mut GestureClassifier,
    learning: &LearningStore,
) -> Option<Recognition> {
    match command {
        "down" => {
            classifier.pointer_down(p, p, t);
            None
        }
        "move" => {
            classifier.pointer_move(p, p, t);
            None
        }
        _ => match classifier.pointer_up(p, p, t)? {
            GestureOutcome::Tap(tap) => {
                let key = tap.key_id.unwrap_or_else(|| "?".to_string());
                println!("Tap: {}", key.bold());
                None
            }
            GestureOutcome::Swipe(swipe) => Some(engine.recognize_swipe(&swipe, Some(learning), learning.last_word())),
        },
    }
}

fn print_banner(engine: &SwipeEngine) {
    println!("{}", "Swipe Engine Simulator".bold());
    println!("---------------------------------------------------------------");
    println!(
        "Layout: {} keys, dictionary: {} words, strategy: {}",
        engine.layout().map_or(0, |l| l.len()),
        engine.dictionary().map_or(0, |d| d.len()),
        engine.strategy()
    );
    println!("Commands: down|move|up <x> <y> <t>, keys <seq>, commit [word],");
    println!("          strategy lexical|shape, reset, exit\n");
}

fn print_recognition(r: &Recognition) {
    println!("Keys: [{}]", r.key_sequence.join(" ").cyan());
    if r.candidates.is_empty() {
        println!("{}", "No candidates.".dim());
        return;
    }
    println!("Confidence: {:?}", confidence(&r.candidates));
    for (i, c) in r.candidates.iter().enumerate() {
        print_candidate(i, c);
    }
}

fn print_candidate(i: usize, c: &Candidate) {
    let word = if i == 0 { c.word.as_str().bold().green() } else { c.word.as_str().stylize() };
    if c.learning_boost != 0.0 {
        println!("  {}: {} ({:.3}, learned +{:.2})", i + 1, word, c.score, c.learning_boost);
    } else {
        println!("  {}: {} ({:.3})", i + 1, word, c.score);
    }
}
