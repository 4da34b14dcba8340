use glam::Vec2;

use crate::effects::CompletionEffect;
use crate::extensions::easing::{ease_vec2, keyframes, Easing};

#[cfg(feature = "vectors")]
use crate::render::vector::{VectorColor, VectorState};

const STAR_COUNT: usize = 12;
/// Final distance from the anchor (logical px).
const RADIUS: f32 = 150.0;
/// Flight time of one star (seconds).
const STAR_DURATION: f32 = 2.0;
/// Delay between consecutive stars.
const STAGGER: f32 = 0.1;
/// Pause after the last star before reporting done.
const SETTLE: f32 = 0.5;
/// Outer radius of a star at scale 1.
const STAR_SIZE: f32 = 16.0;

const OPACITY_FRAMES: [f32; 4] = [0.0, 1.0, 1.0, 0.0];
const SCALE_FRAMES: [f32; 4] = [0.0, 1.2, 1.0, 0.0];

/// One star's pose at a point in time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StarFrame {
    pub pos: Vec2,
    pub scale: f32,
    pub opacity: f32,
    /// Radians.
    pub rotation: f32,
}

/// Twelve stars flying out from the anchor on evenly spaced headings.
pub struct StarBurst {
    anchor: Vec2,
    elapsed: f32,
    playing: bool,
    on_done: Option<Box<dyn FnOnce()>>,
}

impl StarBurst {
    pub fn new() -> Self {
        Self {
            anchor: Vec2::ZERO,
            elapsed: 0.0,
            playing: false,
            on_done: None,
        }
    }

    /// Seconds from `play` to the `on_done` callback.
    pub fn total_duration() -> f32 {
        (STAR_COUNT - 1) as f32 * STAGGER + STAR_DURATION + SETTLE
    }

    /// Pose of star `index`, or `None` while it is waiting or after it landed.
    pub fn star(&self, index: usize) -> Option<StarFrame> {
        if !self.playing || index >= STAR_COUNT {
            return None;
        }
        let local = (self.elapsed - index as f32 * STAGGER) / STAR_DURATION;
        if !(0.0..=1.0).contains(&local) {
            return None;
        }
        let t = Easing::QuadOut.apply(local);
        let heading = index as f32 * std::f32::consts::TAU / STAR_COUNT as f32;
        let target = self.anchor + Vec2::new(heading.cos(), heading.sin()) * RADIUS;
        Some(StarFrame {
            pos: ease_vec2(self.anchor, target, local, Easing::QuadOut),
            scale: keyframes(&SCALE_FRAMES, t),
            opacity: keyframes(&OPACITY_FRAMES, t),
            rotation: t * std::f32::consts::TAU,
        })
    }

    fn finish(&mut self) {
        self.playing = false;
        if let Some(done) = self.on_done.take() {
            done();
        }
    }
}

impl Default for StarBurst {
    fn default() -> Self {
        Self::new()
    }
}

impl CompletionEffect for StarBurst {
    fn play(&mut self, on_done: Box<dyn FnOnce()>) {
        // A restart still owes the previous caller its callback
        if self.playing {
            self.finish();
        }
        self.elapsed = 0.0;
        self.playing = true;
        self.on_done = Some(on_done);
    }

    fn tick(&mut self, dt: f32) {
        if !self.playing {
            return;
        }
        self.elapsed += dt.max(0.0);
        if self.elapsed >= Self::total_duration() {
            self.finish();
        }
    }

    fn set_anchor(&mut self, anchor: Vec2) {
        self.anchor = anchor;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    #[cfg(feature = "vectors")]
    fn render(&self, out: &mut VectorState) {
        for star in (0..STAR_COUNT).filter_map(|i| self.star(i)) {
            if star.opacity <= 0.0 || star.scale <= 0.0 {
                continue;
            }
            out.fill_star(
                star.pos,
                STAR_SIZE * star.scale,
                star.rotation,
                VectorColor::STAR.with_alpha(star.opacity),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn counting() -> (Rc<Cell<u32>>, Box<dyn FnOnce()>) {
        let calls = Rc::new(Cell::new(0));
        let c = calls.clone();
        (calls, Box::new(move || c.set(c.get() + 1)))
    }

    #[test]
    fn total_duration_matches_last_star() {
        assert!((StarBurst::total_duration() - 3.6).abs() < 1e-5);
    }

    #[test]
    fn on_done_fires_once_after_duration() {
        let mut burst = StarBurst::new();
        let (calls, done) = counting();
        burst.play(done);
        for _ in 0..35 {
            burst.tick(0.1);
        }
        assert_eq!(calls.get(), 0);
        assert!(burst.is_playing());
        burst.tick(0.2);
        assert_eq!(calls.get(), 1);
        assert!(!burst.is_playing());
        burst.tick(5.0);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn replay_settles_previous_callback() {
        let mut burst = StarBurst::new();
        let (first, done1) = counting();
        let (second, done2) = counting();
        burst.play(done1);
        burst.tick(1.0);
        burst.play(done2);
        assert_eq!(first.get(), 1);
        assert_eq!(second.get(), 0);
        burst.tick(4.0);
        assert_eq!(second.get(), 1);
    }

    #[test]
    fn stars_are_staggered() {
        let mut burst = StarBurst::new();
        burst.set_anchor(Vec2::new(200.0, 200.0));
        let (_, done) = counting();
        burst.play(done);
        burst.tick(0.5);
        assert!(burst.star(0).is_some());
        assert!(burst.star(4).is_some());
        // Star 6 starts at 0.6s
        assert!(burst.star(6).is_none());
        burst.tick(1.6);
        // Star 0 landed at 2.0s
        assert!(burst.star(0).is_none());
        assert!(burst.star(11).is_some());
    }

    #[test]
    fn star_flies_outward_and_fades() {
        let mut burst = StarBurst::new();
        let anchor = Vec2::new(100.0, 100.0);
        burst.set_anchor(anchor);
        let (_, done) = counting();
        burst.play(done);

        burst.tick(0.0);
        let start = burst.star(0).unwrap();
        assert_eq!(start.pos, anchor);
        assert_eq!(start.opacity, 0.0);

        burst.tick(1.0);
        let mid = burst.star(0).unwrap();
        // Heading 0 flies to the right
        assert!(mid.pos.x > anchor.x && mid.pos.x < anchor.x + RADIUS);
        assert!((mid.pos.y - anchor.y).abs() < 1e-3);
        assert!(mid.opacity > 0.0);

        burst.tick(0.999);
        let end = burst.star(0).unwrap();
        assert!(end.pos.distance(anchor + Vec2::new(RADIUS, 0.0)) < 1.0);
        assert!(end.opacity < 0.05);
    }

    #[cfg(feature = "vectors")]
    #[test]
    fn renders_only_while_playing() {
        let mut burst = StarBurst::new();
        burst.set_anchor(Vec2::new(200.0, 200.0));
        let mut out = VectorState::new();
        burst.render(&mut out);
        assert_eq!(out.vertex_count(), 0);

        let (_, done) = counting();
        burst.play(done);
        burst.tick(1.0);
        burst.render(&mut out);
        assert!(out.vertex_count() > 0);

        out.clear();
        burst.tick(3.0);
        burst.render(&mut out);
        assert_eq!(out.vertex_count(), 0);
    }
}
