//! Completion effects.
//!
//! The session only knows the [`CompletionEffect`] trait: start it with a
//! one-shot callback, advance it each tick, and optionally let it draw into
//! the overlay. What it looks like is up to the implementation.

pub mod star_burst;

use glam::Vec2;

#[cfg(feature = "vectors")]
use crate::render::vector::VectorState;

pub use star_burst::StarBurst;

/// A fire-and-forget celebration.
pub trait CompletionEffect {
    /// Start playing. `on_done` must be invoked exactly once, after a bounded time.
    fn play(&mut self, on_done: Box<dyn FnOnce()>);

    /// Advance by `dt` seconds.
    fn tick(&mut self, _dt: f32) {}

    /// Point the effect radiates from, in logical px.
    fn set_anchor(&mut self, _anchor: Vec2) {}

    fn is_playing(&self) -> bool {
        false
    }

    /// Draw the current frame.
    #[cfg(feature = "vectors")]
    fn render(&self, _out: &mut VectorState) {}
}
