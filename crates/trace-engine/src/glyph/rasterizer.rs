//! Renders target text into a guide mask.
//!
//! One layout pass computes the fitted font size, the centered pen origin,
//! the per-character column bounds and the centerline skeleton together, so
//! the hidden guide and the cosmetic overlay never drift apart.

use glam::Vec2;

use crate::api::config::TraceConfig;
use crate::api::types::{SurfaceGeometry, TraceMode};
use crate::core::mask::Mask;
use crate::glyph::source::GlyphSource;

/// Half-open device-pixel column interval `[start, end)` owned by one character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharBound {
    pub start: u32,
    pub end: u32,
}

impl CharBound {
    pub fn contains(&self, column: u32) -> bool {
        column >= self.start && column < self.end
    }

    pub fn width(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }
}

/// Everything produced by rasterizing one target for one geometry.
#[derive(Debug, Clone)]
pub struct GuideLayout {
    pub text: String,
    pub mode: TraceMode,
    /// Font size actually used after fitting.
    pub font_size: f32,
    /// Pen origin of the first character (left edge, baseline), logical px.
    pub origin: Vec2,
    pub mask: Mask,
    /// Per-character columns. `None` in letter mode.
    pub bounds: Option<Vec<CharBound>>,
    /// Centerline polylines in logical px, empty for outline fonts.
    pub skeleton: Vec<Vec<Vec2>>,
}

pub struct GlyphRasterizer {
    source: Box<dyn GlyphSource>,
}

impl GlyphRasterizer {
    pub fn new(source: Box<dyn GlyphSource>) -> Self {
        Self { source }
    }

    pub fn set_source(&mut self, source: Box<dyn GlyphSource>) {
        self.source = source;
    }

    pub fn source(&self) -> &dyn GlyphSource {
        self.source.as_ref()
    }

    /// Shrink `nominal` so the text spans at most `fit_ratio` of the surface
    /// width, never going below `min_font_ratio` of nominal.
    pub fn fit_font_size(&self, text: &str, nominal: f32, width: f32, config: &TraceConfig) -> f32 {
        let natural = self.source.measure(text, nominal);
        let max_width = width * config.fit_ratio;
        if natural <= max_width || natural <= 0.0 {
            return nominal;
        }
        let fitted = nominal * max_width / natural;
        fitted.max(nominal * config.min_font_ratio)
    }

    /// Rasterize `text` centered on a surface. Returns `None` when the surface
    /// isn't ready or there is nothing to draw; callers retry on the next
    /// geometry or target change.
    pub fn layout(
        &self,
        text: &str,
        nominal: f32,
        geometry: &SurfaceGeometry,
        config: &TraceConfig,
    ) -> Option<GuideLayout> {
        if text.is_empty() {
            log::debug!("Skipping rasterization: empty target");
            return None;
        }
        let Some(mut mask) = Mask::for_geometry(geometry) else {
            log::debug!("Skipping rasterization: surface not ready ({geometry:?})");
            return None;
        };

        let missing: String = text
            .chars()
            .filter(|&c| !c.is_whitespace() && !self.source.has_char(c))
            .collect();
        if !missing.is_empty() {
            log::warn!("No glyphs for {missing:?}; those characters are left blank");
        }

        let mode = TraceMode::for_text(text);
        let font_size = self.fit_font_size(text, nominal, geometry.width, config);
        let text_width = self.source.measure(text, font_size);
        let center = geometry.center();
        let origin = Vec2::new(
            center.x - text_width / 2.0,
            center.y + self.source.baseline_offset(font_size),
        );

        let mut bounds = Vec::with_capacity(text.chars().count());
        let mut skeleton = Vec::new();
        let mut pen_x = origin.x;
        for ch in text.chars() {
            let advance = self.source.advance(ch, font_size);
            let pen = Vec2::new(pen_x, origin.y);
            self.source.draw(ch, font_size, pen, &mut mask);
            skeleton.extend(self.source.skeleton(ch, font_size, pen));
            bounds.push(CharBound {
                start: device_column(pen_x, &mask),
                end: device_column(pen_x + advance, &mask),
            });
            pen_x += advance;
        }

        log::debug!(
            "Rasterized {text:?} at {font_size:.1}px into {}x{} mask ({} ink px)",
            mask.width(),
            mask.height(),
            mask.ink_count(config.ink_threshold)
        );

        Some(GuideLayout {
            text: text.to_string(),
            mode,
            font_size,
            origin,
            mask,
            bounds: (mode == TraceMode::Word).then_some(bounds),
            skeleton,
        })
    }
}

/// Logical x to a device column, clamped to `[0, width]`.
fn device_column(x: f32, mask: &Mask) -> u32 {
    let col = (x * mask.scale()).floor();
    col.clamp(0.0, mask.width() as f32) as u32
}
