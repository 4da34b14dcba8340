//! Helpers that sit outside the tracing pipeline.

pub mod easing;

pub use easing::{ease_vec2, keyframes, lerp, Easing};
