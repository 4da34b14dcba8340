use fontdue::{Font, FontSettings};
use glam::Vec2;

use crate::api::error::TraceError;
use crate::core::mask::Mask;
use crate::glyph::source::GlyphSource;

/// Glyphs rasterized from a TrueType/OpenType face with fontdue.
///
/// Outline fonts have no centerline, so [`GlyphSource::skeleton`] stays empty
/// and the overlay falls back to a dot grid sampled from the mask.
pub struct OutlineFont {
    font: Font,
}

impl OutlineFont {
    /// Parse a font file. Fails with [`TraceError::FontLoad`] on malformed data.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TraceError> {
        let font = Font::from_bytes(bytes, FontSettings::default())
            .map_err(|e| TraceError::FontLoad(e.to_string()))?;
        log::info!("Loaded outline font ({} bytes)", bytes.len());
        Ok(Self { font })
    }
}

impl GlyphSource for OutlineFont {
    fn has_char(&self, ch: char) -> bool {
        self.font.lookup_glyph_index(ch) != 0
    }

    fn advance(&self, ch: char, font_size: f32) -> f32 {
        self.font.metrics(ch, font_size).advance_width
    }

    fn baseline_offset(&self, font_size: f32) -> f32 {
        match self.font.horizontal_line_metrics(font_size) {
            // descent is negative
            Some(line) => (line.ascent + line.descent) / 2.0,
            None => font_size * 0.35,
        }
    }

    fn draw(&self, ch: char, font_size: f32, origin: Vec2, mask: &mut Mask) {
        let scale = mask.scale();
        let (metrics, coverage) = self.font.rasterize(ch, font_size * scale);
        if metrics.width == 0 || metrics.height == 0 {
            return;
        }

        let pen = mask.to_device(origin);
        let left = pen.x.round() as i32 + metrics.xmin;
        let top = pen.y.round() as i32 - metrics.ymin - metrics.height as i32;

        for (row, line) in coverage.chunks_exact(metrics.width).enumerate() {
            for (col, &a) in line.iter().enumerate() {
                if a > 0 {
                    mask.blend_max(left + col as i32, top + row as i32, a);
                }
            }
        }
    }
}
