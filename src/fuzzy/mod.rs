// File: src/fuzzy/mod.rs
pub mod edit_distance;

pub use edit_distance::{bigram_overlap, levenshtein};
