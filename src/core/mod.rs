// src/core/mod.rs
pub mod context;
pub mod dictionary;
pub mod engine;
pub mod geometry;
pub mod gesture;
pub mod layout;
pub mod sequence;
pub mod types;
