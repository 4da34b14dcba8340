//! Built-in single-line vector font.
//!
//! Each glyph is a handful of polylines and elliptical arcs in font units:
//! x grows right from the pen origin, y grows down from the cap line
//! (`y = 0`) to the baseline (`y = 100`). Lowercase letters sit between the
//! x-height (`y = 44`) and the baseline, descenders reach `y = 130`.
//! The em square is 140 units tall (105 above the baseline, 35 below).

use glam::Vec2;

use crate::core::mask::Mask;
use crate::glyph::source::GlyphSource;

const UNITS_PER_EM: f32 = 140.0;
const BASELINE: f32 = 100.0;
const ASCENT: f32 = 105.0;
const DESCENT: f32 = 35.0;
/// Advance used for characters the font doesn't define.
const FALLBACK_ADVANCE: i16 = 60;
/// Degrees per flattened arc segment.
const ARC_STEP_DEG: f32 = 10.0;

/// One pen movement of a glyph.
#[derive(Debug, Clone, Copy)]
enum Stroke {
    /// Polyline through the given points.
    Line(&'static [(i16, i16)]),
    /// Elliptical arc: center, radii, start angle and sweep in degrees.
    /// Angles follow screen space (0° right, 90° down); positive sweeps run clockwise.
    Arc((i16, i16), (i16, i16), i16, i16),
}

#[derive(Debug, Clone, Copy)]
struct StrokeGlyph {
    advance: i16,
    strokes: &'static [Stroke],
}

use Stroke::{Arc, Line};

const fn g(advance: i16, strokes: &'static [Stroke]) -> Option<StrokeGlyph> {
    Some(StrokeGlyph { advance, strokes })
}

fn glyph(ch: char) -> Option<StrokeGlyph> {
    match ch {
        ' ' => g(36, &[]),

        'A' => g(80, &[Line(&[(8, 100), (40, 0), (72, 100)]), Line(&[(20, 64), (60, 64)])]),
        'B' => g(76, &[
            Line(&[(12, 100), (12, 0), (40, 0)]),
            Arc((40, 24), (22, 24), -90, 180),
            Line(&[(12, 48), (42, 48)]),
            Arc((42, 74), (24, 26), -90, 180),
            Line(&[(42, 100), (12, 100)]),
        ]),
        'C' => g(78, &[Arc((42, 50), (32, 50), -40, -280)]),
        'D' => g(78, &[
            Line(&[(28, 0), (12, 0), (12, 100), (28, 100)]),
            Arc((28, 50), (38, 50), -90, 180),
        ]),
        'E' => g(68, &[Line(&[(58, 0), (12, 0), (12, 100), (58, 100)]), Line(&[(12, 50), (50, 50)])]),
        'F' => g(64, &[Line(&[(56, 0), (12, 0), (12, 100)]), Line(&[(12, 50), (48, 50)])]),
        'G' => g(84, &[Arc((44, 50), (34, 50), -40, -315), Line(&[(78, 54), (48, 54)])]),
        'H' => g(78, &[Line(&[(12, 0), (12, 100)]), Line(&[(66, 0), (66, 100)]), Line(&[(12, 50), (66, 50)])]),
        'I' => g(36, &[Line(&[(18, 0), (18, 100)])]),
        'J' => g(64, &[Line(&[(50, 0), (50, 70)]), Arc((30, 70), (20, 28), 0, 150)]),
        'K' => g(74, &[Line(&[(12, 0), (12, 100)]), Line(&[(64, 0), (12, 62)]), Line(&[(30, 42), (66, 100)])]),
        'L' => g(62, &[Line(&[(12, 0), (12, 100), (56, 100)])]),
        'M' => g(92, &[Line(&[(12, 100), (12, 0), (46, 70), (80, 0), (80, 100)])]),
        'N' => g(78, &[Line(&[(12, 100), (12, 0), (66, 100), (66, 0)])]),
        'O' => g(84, &[Arc((42, 50), (32, 50), 0, 360)]),
        'P' => g(72, &[
            Line(&[(12, 100), (12, 0), (38, 0)]),
            Arc((38, 26), (24, 26), -90, 180),
            Line(&[(38, 52), (12, 52)]),
        ]),
        'Q' => g(84, &[Arc((42, 50), (32, 50), 0, 360), Line(&[(52, 76), (76, 104)])]),
        'R' => g(74, &[
            Line(&[(12, 100), (12, 0), (38, 0)]),
            Arc((38, 26), (24, 26), -90, 180),
            Line(&[(38, 52), (12, 52)]),
            Line(&[(36, 52), (64, 100)]),
        ]),
        'S' => g(72, &[Arc((36, 26), (24, 26), -20, -250), Arc((36, 76), (26, 24), -90, 250)]),
        'T' => g(72, &[Line(&[(6, 0), (66, 0)]), Line(&[(36, 0), (36, 100)])]),
        'U' => g(78, &[
            Line(&[(12, 0), (12, 64)]),
            Arc((39, 64), (27, 36), 180, -180),
            Line(&[(66, 64), (66, 0)]),
        ]),
        'V' => g(78, &[Line(&[(6, 0), (39, 100), (72, 0)])]),
        'W' => g(104, &[Line(&[(6, 0), (28, 100), (52, 20), (76, 100), (98, 0)])]),
        'X' => g(74, &[Line(&[(8, 0), (66, 100)]), Line(&[(66, 0), (8, 100)])]),
        'Y' => g(74, &[Line(&[(6, 0), (37, 50), (68, 0)]), Line(&[(37, 50), (37, 100)])]),
        'Z' => g(70, &[Line(&[(10, 0), (60, 0), (10, 100), (62, 100)])]),

        'a' => g(66, &[Arc((32, 72), (22, 28), 0, 360), Line(&[(54, 44), (54, 100)])]),
        'b' => g(66, &[Line(&[(12, 0), (12, 100)]), Arc((34, 72), (22, 28), 0, 360)]),
        'c' => g(60, &[Arc((32, 72), (22, 28), -40, -280)]),
        'd' => g(64, &[Arc((30, 72), (22, 28), 0, 360), Line(&[(52, 0), (52, 100)])]),
        'e' => g(62, &[Line(&[(10, 72), (54, 72)]), Arc((32, 72), (22, 28), 0, -320)]),
        'f' => g(42, &[
            Arc((30, 16), (12, 16), -30, -150),
            Line(&[(18, 16), (18, 100)]),
            Line(&[(6, 44), (36, 44)]),
        ]),
        'g' => g(66, &[
            Arc((32, 72), (22, 28), 0, 360),
            Line(&[(54, 44), (54, 108)]),
            Arc((33, 108), (21, 22), 0, 150),
        ]),
        'h' => g(66, &[
            Line(&[(12, 0), (12, 100)]),
            Arc((33, 66), (21, 22), 180, 180),
            Line(&[(54, 66), (54, 100)]),
        ]),
        'i' => g(26, &[Line(&[(13, 44), (13, 100)]), Line(&[(13, 20), (13, 22)])]),
        'j' => g(30, &[
            Line(&[(18, 44), (18, 112)]),
            Arc((8, 112), (10, 18), 0, 140),
            Line(&[(18, 20), (18, 22)]),
        ]),
        'k' => g(58, &[Line(&[(12, 0), (12, 100)]), Line(&[(50, 44), (12, 80)]), Line(&[(26, 67), (52, 100)])]),
        'l' => g(26, &[Line(&[(13, 0), (13, 100)])]),
        'm' => g(92, &[
            Line(&[(12, 44), (12, 100)]),
            Arc((29, 64), (17, 20), 180, 180),
            Line(&[(46, 64), (46, 100)]),
            Arc((63, 64), (17, 20), 180, 180),
            Line(&[(80, 64), (80, 100)]),
        ]),
        'n' => g(66, &[
            Line(&[(12, 44), (12, 100)]),
            Arc((33, 66), (21, 22), 180, 180),
            Line(&[(54, 66), (54, 100)]),
        ]),
        'o' => g(64, &[Arc((32, 72), (22, 28), 0, 360)]),
        'p' => g(66, &[Line(&[(12, 44), (12, 130)]), Arc((34, 72), (22, 28), 0, 360)]),
        'q' => g(64, &[Arc((30, 72), (22, 28), 0, 360), Line(&[(52, 44), (52, 130)])]),
        'r' => g(46, &[Line(&[(12, 44), (12, 100)]), Arc((30, 66), (18, 22), 180, 130)]),
        's' => g(56, &[Arc((28, 58), (17, 14), -20, -250), Arc((28, 86), (18, 14), -90, 250)]),
        't' => g(42, &[Line(&[(18, 16), (18, 92), (22, 98), (28, 100), (36, 100)]), Line(&[(6, 44), (34, 44)])]),
        'u' => g(64, &[
            Line(&[(12, 44), (12, 80)]),
            Arc((32, 80), (20, 20), 180, -180),
            Line(&[(52, 44), (52, 100)]),
        ]),
        'v' => g(58, &[Line(&[(6, 44), (29, 100), (52, 44)])]),
        'w' => g(86, &[Line(&[(6, 44), (24, 100), (43, 56), (62, 100), (80, 44)])]),
        'x' => g(58, &[Line(&[(8, 44), (50, 100)]), Line(&[(50, 44), (8, 100)])]),
        'y' => g(58, &[Line(&[(6, 44), (29, 100)]), Line(&[(52, 44), (22, 122), (10, 130)])]),
        'z' => g(56, &[Line(&[(8, 44), (48, 44), (8, 100), (50, 100)])]),

        '0' => g(70, &[Arc((35, 50), (25, 50), 0, 360)]),
        '1' => g(70, &[Line(&[(18, 20), (38, 0), (38, 100)])]),
        '2' => g(70, &[Arc((35, 28), (24, 26), -160, 190), Line(&[(56, 41), (10, 100), (62, 100)])]),
        '3' => g(70, &[Arc((34, 25), (23, 25), -160, 250), Arc((34, 75), (25, 25), -90, 250)]),
        '4' => g(70, &[Line(&[(48, 100), (48, 0), (6, 70), (64, 70)])]),
        '5' => g(70, &[Line(&[(58, 0), (18, 0), (20, 42)]), Arc((34, 68), (25, 32), -125, 275)]),
        '6' => g(70, &[Arc((36, 70), (24, 30), 0, 360), Line(&[(54, 4), (14, 64)])]),
        '7' => g(70, &[Line(&[(8, 0), (62, 0), (26, 100)])]),
        '8' => g(70, &[Arc((35, 25), (20, 25), 0, 360), Arc((35, 75), (25, 25), 0, 360)]),
        '9' => g(70, &[Arc((34, 30), (24, 30), 0, 360), Line(&[(58, 34), (24, 100)])]),

        _ => None,
    }
}

impl Stroke {
    /// Flatten into a polyline in font units.
    fn points(&self) -> Vec<Vec2> {
        match *self {
            Line(pts) => pts.iter().map(|&(x, y)| Vec2::new(x as f32, y as f32)).collect(),
            Arc((cx, cy), (rx, ry), from, sweep) => {
                let steps = ((sweep as f32).abs() / ARC_STEP_DEG).ceil().max(2.0) as usize;
                (0..=steps)
                    .map(|i| {
                        let deg = from as f32 + sweep as f32 * i as f32 / steps as f32;
                        let rad = deg.to_radians();
                        Vec2::new(
                            cx as f32 + rx as f32 * rad.cos(),
                            cy as f32 + ry as f32 * rad.sin(),
                        )
                    })
                    .collect()
            }
        }
    }
}

/// Single-line font stroked with a fixed guide weight.
#[derive(Debug, Clone)]
pub struct StrokeFont {
    /// Guide pen width in font units.
    weight: f32,
}

impl StrokeFont {
    /// Default guide weight, in font units (~0.086 em).
    pub const DEFAULT_WEIGHT: f32 = 12.0;

    pub fn new() -> Self {
        Self {
            weight: Self::DEFAULT_WEIGHT,
        }
    }

    /// Guide pen width in logical pixels at `font_size`.
    pub fn stroke_width(&self, font_size: f32) -> f32 {
        self.weight * font_size / UNITS_PER_EM
    }

    fn placed_strokes(&self, ch: char, font_size: f32, origin: Vec2) -> Vec<Vec<Vec2>> {
        let Some(glyph) = glyph(ch) else {
            return Vec::new();
        };
        let s = font_size / UNITS_PER_EM;
        glyph
            .strokes
            .iter()
            .map(|stroke| {
                stroke
                    .points()
                    .into_iter()
                    .map(|p| origin + Vec2::new(p.x, p.y - BASELINE) * s)
                    .collect()
            })
            .collect()
    }
}

impl Default for StrokeFont {
    fn default() -> Self {
        Self::new()
    }
}

impl GlyphSource for StrokeFont {
    fn has_char(&self, ch: char) -> bool {
        glyph(ch).is_some()
    }

    fn advance(&self, ch: char, font_size: f32) -> f32 {
        let units = glyph(ch).map(|g| g.advance).unwrap_or_else(|| {
            log::debug!("stroke font has no glyph for {ch:?}, leaving a blank advance");
            FALLBACK_ADVANCE
        });
        units as f32 * font_size / UNITS_PER_EM
    }

    fn baseline_offset(&self, font_size: f32) -> f32 {
        (ASCENT - DESCENT) / 2.0 * font_size / UNITS_PER_EM
    }

    fn draw(&self, ch: char, font_size: f32, origin: Vec2, mask: &mut Mask) {
        let radius = self.stroke_width(font_size) * mask.scale() / 2.0;
        for polyline in self.placed_strokes(ch, font_size, origin) {
            let device: Vec<Vec2> = polyline.iter().map(|&p| mask.to_device(p)).collect();
            match device.as_slice() {
                [] => {}
                [single] => mask.fill_disc(*single, radius, 255),
                _ => {
                    for pair in device.windows(2) {
                        mask.fill_capsule(pair[0], pair[1], radius, 255);
                    }
                }
            }
        }
    }

    fn skeleton(&self, ch: char, font_size: f32, origin: Vec2) -> Vec<Vec<Vec2>> {
        self.placed_strokes(ch, font_size, origin)
    }
}
