use glam::Vec2;

use crate::core::mask::Mask;

/// Something that can measure and draw glyphs into a [`Mask`].
///
/// All sizes and positions are logical pixels; implementations convert to
/// device pixels with the mask's scale.
pub trait GlyphSource {
    /// Whether the source can draw `ch`. Missing glyphs still advance the pen.
    fn has_char(&self, _ch: char) -> bool {
        true
    }

    /// Horizontal advance of `ch` at `font_size`.
    fn advance(&self, ch: char, font_size: f32) -> f32;

    /// Distance from the vertical middle of the em box down to the baseline.
    /// Placing the baseline at `center_y + baseline_offset` centers text
    /// the way a "middle" text baseline does.
    fn baseline_offset(&self, font_size: f32) -> f32;

    /// Draw `ch` with its pen origin (left edge, baseline) at `origin`.
    fn draw(&self, ch: char, font_size: f32, origin: Vec2, mask: &mut Mask);

    /// Centerline polylines of `ch` placed at `origin`, if the source knows them.
    fn skeleton(&self, _ch: char, _font_size: f32, _origin: Vec2) -> Vec<Vec<Vec2>> {
        Vec::new()
    }

    /// Natural width of a whole string.
    fn measure(&self, text: &str, font_size: f32) -> f32 {
        text.chars().map(|c| self.advance(c, font_size)).sum()
    }
}
