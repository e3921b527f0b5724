// src/lib.rs

//! Gesture-to-word recognition for an on-screen swipe keyboard.
//!
//! Pointer events go through [`core::gesture::GestureClassifier`], the
//! resulting path is turned into a key sequence by
//! [`core::sequence::KeySequenceExtractor`], and [`ranking`] scores
//! dictionary words against it. [`SwipeEngine`] ties the pieces together.

pub mod config;
pub mod core;
pub mod fuzzy;
pub mod learning;
pub mod persistence;
pub mod ranking;

pub use crate::config::EngineConfig;
pub use crate::core::engine::{Recognition, SwipeEngine};
pub use crate::core::geometry::{Point, Rect};
pub use crate::learning::{BoostProvider, LearningStore, NoBoost};
pub use crate::ranking::{Candidate, Confidence, Strategy};

/// Result type alias for the recognition core.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the recognition core.
///
/// Only load and persistence paths produce errors; recognition itself
/// degrades to empty results.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Layout error: {0}")]
    Layout(String),

    #[error("Dictionary error: {0}")]
    Dictionary(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Persistence error: {0}")]
    Persistence(String),
}
