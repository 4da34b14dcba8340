use serde::Deserialize;

use crate::api::error::TraceError;

/// Tunables for a tracing session, provided by the embedding app.
///
/// Every field has a default, so a partial JSON object is valid input.
/// Pixel quantities are logical pixels; the engine scales them by the
/// device pixel ratio before touching a mask.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    /// Nominal font size for single-letter targets (default: 200).
    pub letter_font_size: f32,
    /// Nominal font size for multi-character targets (default: 120).
    pub word_font_size: f32,
    /// Widest fraction of the surface the text may span before shrinking (default: 0.9).
    pub fit_ratio: f32,
    /// Shrinking never goes below this fraction of the nominal size (default: 1/3).
    pub min_font_ratio: f32,
    /// Width of the user's pen (default: 8).
    pub pen_width: f32,
    /// Alpha strictly above this counts as ink (default: 50).
    pub ink_threshold: u8,
    /// Decimation stride when sampling guide pixels (default: 4).
    pub sample_stride: f32,
    /// Half-size of the square searched around each guide pixel (default: 12).
    pub tolerance_radius: f32,
    /// Stride of the inner neighborhood search (default: 3).
    pub search_stride: f32,
    /// Coverage a letter (or every letter of a word) must reach (default: 0.85).
    pub pass_ratio: f32,
    /// Chance that a pen-move schedules a check. Higher values react faster
    /// at the cost of more coverage passes while drawing (default: 0.1).
    pub move_check_probability: f32,
    /// Delay between a check request and the evaluation, in ms (default: 150).
    pub eval_delay_ms: f64,
    /// Seed for the move-sampling RNG (default: 42).
    pub rng_seed: u64,
    /// Distance between dots of the cosmetic guide overlay (default: 10).
    pub guide_dot_spacing: f32,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            letter_font_size: 200.0,
            word_font_size: 120.0,
            fit_ratio: 0.9,
            min_font_ratio: 1.0 / 3.0,
            pen_width: 8.0,
            ink_threshold: 50,
            sample_stride: 4.0,
            tolerance_radius: 12.0,
            search_stride: 3.0,
            pass_ratio: 0.85,
            move_check_probability: 0.1,
            eval_delay_ms: 150.0,
            rng_seed: 42,
            guide_dot_spacing: 10.0,
        }
    }
}

impl TraceConfig {
    /// Upper bound on `tolerance_radius`, logical px.
    pub const MAX_TOLERANCE_RADIUS: f32 = 256.0;

    /// Parse a (possibly partial) JSON config.
    pub fn from_json(json: &str) -> Result<Self, TraceError> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config.validated())
    }

    /// Clamp values that would break sampling or scheduling.
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();
        if !(self.letter_font_size > 0.0) {
            self.letter_font_size = defaults.letter_font_size;
        }
        if !(self.word_font_size > 0.0) {
            self.word_font_size = defaults.word_font_size;
        }
        self.fit_ratio = clamp_unit(self.fit_ratio, defaults.fit_ratio);
        self.min_font_ratio = clamp_unit(self.min_font_ratio, defaults.min_font_ratio);
        self.pass_ratio = clamp_unit(self.pass_ratio, defaults.pass_ratio);
        if !(self.pen_width > 0.0) {
            self.pen_width = defaults.pen_width;
        }
        self.sample_stride = self.sample_stride.max(1.0);
        self.search_stride = self.search_stride.max(1.0);
        self.tolerance_radius = if self.tolerance_radius.is_nan() {
            defaults.tolerance_radius
        } else {
            self.tolerance_radius.clamp(0.0, Self::MAX_TOLERANCE_RADIUS)
        };
        self.move_check_probability = if self.move_check_probability.is_nan() {
            defaults.move_check_probability
        } else {
            self.move_check_probability.clamp(0.0, 1.0)
        };
        if !(self.eval_delay_ms >= 0.0) {
            self.eval_delay_ms = defaults.eval_delay_ms;
        }
        if !(self.guide_dot_spacing > 0.0) {
            self.guide_dot_spacing = defaults.guide_dot_spacing;
        }
        self
    }

    /// Nominal font size for a target with `chars` characters.
    pub fn font_size_for(&self, chars: usize) -> f32 {
        if chars > 1 {
            self.word_font_size
        } else {
            self.letter_font_size
        }
    }
}

/// Keep a ratio inside (0, 1], falling back when it is out of range or NaN.
fn clamp_unit(value: f32, fallback: f32) -> f32 {
    if value > 0.0 && value <= 1.0 {
        value
    } else {
        fallback
    }
}
