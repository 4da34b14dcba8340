//! Cosmetic overlay: dotted guide, user strokes and the completion glow.
//!
//! Purely visual. Nothing here reads back into the masks used for scoring.

use glam::Vec2;

use crate::core::mask::Mask;
use crate::glyph::rasterizer::GuideLayout;
use crate::render::vector::{VectorColor, VectorState};

/// Glow width relative to the pen.
const GLOW_SCALE: f32 = 2.5;

/// Overlay appearance.
#[derive(Debug, Clone, Copy)]
pub struct OverlayStyle {
    pub dot_spacing: f32,
    pub dot_radius: f32,
    pub pen_width: f32,
    pub ink_threshold: u8,
}

/// Points spaced `spacing` apart along a polyline, starting at its first point.
pub fn dots_along(polyline: &[Vec2], spacing: f32) -> Vec<Vec2> {
    let Some(&first) = polyline.first() else {
        return Vec::new();
    };
    if spacing <= 0.0 {
        return vec![first];
    }
    let mut dots = vec![first];
    // Distance still to travel before the next dot
    let mut until_next = spacing;
    for pair in polyline.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let len = a.distance(b);
        if len == 0.0 {
            continue;
        }
        let mut along = until_next;
        while along <= len {
            dots.push(a.lerp(b, along / len));
            along += spacing;
        }
        until_next = along - len;
    }
    dots
}

/// Logical-pixel centers of inked guide pixels on a `spacing` grid.
pub fn dots_from_mask(mask: &Mask, spacing: f32, threshold: u8) -> Vec<Vec2> {
    let step = (spacing * mask.scale()).round().max(1.0) as usize;
    let mut dots = Vec::new();
    for y in (0..mask.height()).step_by(step) {
        for x in (0..mask.width()).step_by(step) {
            if mask.is_inked(x as i32, y as i32, threshold) {
                dots.push(Vec2::new(x as f32 + 0.5, y as f32 + 0.5) / mask.scale());
            }
        }
    }
    dots
}

/// Draw the dotted guide for a layout.
pub fn draw_guide(out: &mut VectorState, guide: &GuideLayout, style: &OverlayStyle) {
    let dots = if guide.skeleton.is_empty() {
        dots_from_mask(&guide.mask, style.dot_spacing, style.ink_threshold)
    } else {
        guide
            .skeleton
            .iter()
            .flat_map(|line| dots_along(line, style.dot_spacing))
            .collect()
    };
    for dot in dots {
        out.fill_circle(dot, style.dot_radius, VectorColor::GUIDE);
    }
}

/// Draw user strokes, with the glow pass underneath when highlighted.
pub fn draw_strokes<'a>(
    out: &mut VectorState,
    paths: impl Iterator<Item = &'a [Vec2]> + Clone,
    style: &OverlayStyle,
    highlighted: bool,
) {
    if highlighted {
        for path in paths.clone() {
            out.stroke_polyline(path, style.pen_width * GLOW_SCALE, VectorColor::GLOW);
        }
    }
    for path in paths {
        out.stroke_polyline(path, style.pen_width, VectorColor::STROKE);
    }
}
