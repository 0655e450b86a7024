//! Capture, defense and coin rules that vary by race and terrain.

pub mod features;

pub use features::{Feature, GameFeatures};
