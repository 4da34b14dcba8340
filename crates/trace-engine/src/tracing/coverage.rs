//! Coverage estimation.
//!
//! Walks the guide mask on a coarse grid. Each inked sample is a guide
//! pixel; it is matched when the stroke mask has ink somewhere inside a
//! square window around it. The window is searched on its own (coarser)
//! stride and the search stops at the first hit.

use crate::api::config::TraceConfig;
use crate::api::error::TraceError;
use crate::core::mask::Mask;
use crate::glyph::rasterizer::CharBound;

/// Matched and total guide samples for one region.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoverageCount {
    pub matched: u32,
    pub total: u32,
}

impl CoverageCount {
    /// `None` when the region has no guide samples (vacuous).
    pub fn ratio(&self) -> Option<f32> {
        (self.total > 0).then(|| self.matched as f32 / self.total as f32)
    }

    fn add(&mut self, matched: bool) {
        self.total += 1;
        if matched {
            self.matched += 1;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Coverage {
    /// One ratio over the whole mask (letter mode).
    Global(CoverageCount),
    /// One count per character interval (word mode).
    PerChar(Vec<CoverageCount>),
}

impl Coverage {
    /// Aggregate ratio over every counted sample, for display.
    pub fn overall(&self) -> f32 {
        let sum = match self {
            Coverage::Global(count) => *count,
            Coverage::PerChar(counts) => counts.iter().fold(CoverageCount::default(), |acc, c| {
                CoverageCount {
                    matched: acc.matched + c.matched,
                    total: acc.total + c.total,
                }
            }),
        };
        sum.ratio().unwrap_or(0.0)
    }

    /// Lowest ratio among non-vacuous regions.
    pub fn weakest(&self) -> Option<f32> {
        match self {
            Coverage::Global(count) => count.ratio(),
            Coverage::PerChar(counts) => counts
                .iter()
                .filter_map(CoverageCount::ratio)
                .min_by(|a, b| a.total_cmp(b)),
        }
    }

    /// Every non-vacuous region must reach `threshold`; at least one must exist.
    pub fn passes(&self, threshold: f32) -> bool {
        self.weakest().is_some_and(|r| r >= threshold)
    }
}

/// Largest search half-size in device pixels, whatever the config says.
const MAX_DEVICE_TOLERANCE: f32 = 4096.0;

/// Sampling parameters in device pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverageParams {
    pub sample_stride: u32,
    pub search_stride: u32,
    pub tolerance: i32,
    pub ink_threshold: u8,
}

impl CoverageParams {
    /// Scale the logical-pixel settings of `config` to a device pixel ratio.
    pub fn for_scale(config: &TraceConfig, scale: f32) -> Self {
        let device = |v: f32| (v * scale).round().max(1.0);
        Self {
            sample_stride: device(config.sample_stride) as u32,
            search_stride: device(config.search_stride) as u32,
            tolerance: (config.tolerance_radius * scale)
                .round()
                .clamp(0.0, MAX_DEVICE_TOLERANCE) as i32,
            ink_threshold: config.ink_threshold,
        }
    }
}

/// Compare the guide against the stroke mask.
///
/// `bounds` switches to per-character mode; samples outside every interval
/// are not counted. Returns `Ok(None)` if the guide has no sampled ink and
/// an error if the masks disagree on size or scale. Neither mask is modified.
pub fn estimate(
    guide: &Mask,
    stroke: &Mask,
    bounds: Option<&[CharBound]>,
    params: &CoverageParams,
) -> Result<Option<Coverage>, TraceError> {
    if !guide.same_shape(stroke) {
        return Err(TraceError::MaskMismatch {
            guide: (guide.width(), guide.height(), guide.scale()),
            stroke: (stroke.width(), stroke.height(), stroke.scale()),
        });
    }

    let step = params.sample_stride.max(1) as usize;
    let mut global = CoverageCount::default();
    let mut per_char = bounds.map(|b| vec![CoverageCount::default(); b.len()]);

    for y in (0..guide.height()).step_by(step) {
        for x in (0..guide.width()).step_by(step) {
            if !guide.is_inked(x as i32, y as i32, params.ink_threshold) {
                continue;
            }
            match (bounds, per_char.as_mut()) {
                (Some(bounds), Some(counts)) => {
                    let Some(idx) = interval_of(bounds, x) else {
                        continue;
                    };
                    counts[idx].add(has_ink_near(stroke, x as i32, y as i32, params));
                }
                _ => global.add(has_ink_near(stroke, x as i32, y as i32, params)),
            }
        }
    }

    let coverage = match per_char {
        Some(counts) => {
            if counts.iter().all(|c| c.total == 0) {
                return Ok(None);
            }
            Coverage::PerChar(counts)
        }
        None => {
            if global.total == 0 {
                return Ok(None);
            }
            Coverage::Global(global)
        }
    };
    Ok(Some(coverage))
}

/// Index of the half-open interval containing `column`. Bounds are sorted.
fn interval_of(bounds: &[CharBound], column: u32) -> Option<usize> {
    let idx = bounds.partition_point(|b| b.end <= column);
    bounds
        .get(idx)
        .filter(|b| b.contains(column))
        .map(|_| idx)
}

/// Existence check for stroke ink in the tolerance window around (x, y).
/// The window is clipped to the mask before it is walked.
fn has_ink_near(stroke: &Mask, x: i32, y: i32, params: &CoverageParams) -> bool {
    let r = i64::from(params.tolerance.max(0));
    let step = i64::from(params.search_stride.max(1));
    let Some(rows) = window(i64::from(y), r, step, i64::from(stroke.height())) else {
        return false;
    };
    let Some(cols) = window(i64::from(x), r, step, i64::from(stroke.width())) else {
        return false;
    };
    for sy in rows.step_by(step as usize) {
        for sx in cols.clone().step_by(step as usize) {
            if stroke.is_inked(sx as i32, sy as i32, params.ink_threshold) {
                return true;
            }
        }
    }
    false
}

/// Search positions `center - r ..= center + r` on a `step` grid anchored
/// at `center - r`, restricted to `[0, len)`. `None` if nothing is left.
fn window(center: i64, r: i64, step: i64, len: i64) -> Option<std::ops::RangeInclusive<i64>> {
    let start = center - r;
    let first = if start < 0 {
        start + (-start + step - 1) / step * step
    } else {
        start
    };
    let last = (center + r).min(len - 1);
    (first <= last).then_some(first..=last)
}
