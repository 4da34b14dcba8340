//! Timing curves and keyframe sampling for the completion effect.

use glam::Vec2;

/// Shape of progress over normalized time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    #[default]
    Linear,
    /// Decelerates into the end (`1 - (1 - t)²`).
    QuadOut,
}

impl Easing {
    /// Eased progress for `t`, clamped to [0, 1] first.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        let rest = 1.0 - t;
        match self {
            Easing::Linear => t,
            Easing::QuadOut => 1.0 - rest * rest,
        }
    }
}

#[inline]
pub fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

/// Point between `from` and `to` at eased progress `t`.
pub fn ease_vec2(from: Vec2, to: Vec2, t: f32, easing: Easing) -> Vec2 {
    from.lerp(to, easing.apply(t))
}

/// Sample evenly spaced keyframes at progress `t` in [0, 1].
/// `[0, 1, 1, 0]` fades in over the first third and out over the last.
pub fn keyframes(values: &[f32], t: f32) -> f32 {
    match values {
        [] => 0.0,
        [only] => *only,
        _ => {
            let span = (values.len() - 1) as f32;
            let pos = t.clamp(0.0, 1.0) * span;
            let i = (pos.floor() as usize).min(values.len() - 2);
            lerp(values[i], values[i + 1], pos - i as f32)
        }
    }
}
