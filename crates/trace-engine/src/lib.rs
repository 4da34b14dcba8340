pub mod api;
pub mod core;
pub mod effects;
pub mod extensions;
pub mod glyph;
pub mod input;
#[cfg(feature = "vectors")]
pub mod render;
pub mod tracing;

// Re-export key types at crate root for convenience
pub use api::config::TraceConfig;
pub use api::error::TraceError;
pub use api::types::{
    EventRecord, PointerEvent, PointerPhase, SessionEvent, SurfaceGeometry, TraceMode,
};
pub use core::mask::Mask;
pub use core::time::FrameClock;
pub use effects::{CompletionEffect, StarBurst};
pub use glyph::outline_font::OutlineFont;
pub use glyph::rasterizer::{CharBound, GlyphRasterizer, GuideLayout};
pub use glyph::source::GlyphSource;
pub use glyph::stroke_font::StrokeFont;
pub use input::capture::{StrokeAction, StrokeCapture};
pub use input::queue::InputQueue;
pub use tracing::controller::{CompletionController, CompletionState, Phase, Verdict};
pub use tracing::coverage::{Coverage, CoverageCount, CoverageParams};
pub use tracing::session::TracingSession;

#[cfg(feature = "vectors")]
pub use render::vector::{VectorColor, VectorState, VectorVertex};

// Extensions: helpers outside the tracing pipeline
pub use extensions::{ease_vec2, keyframes, lerp, Easing};
