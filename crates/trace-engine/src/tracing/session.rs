//! The tracing session: one target, one surface, one user.
//!
//! Wires the rasterizer, capture surface, estimator, controller and effect
//! together. Time only moves through [`TracingSession::tick`], so scheduling
//! is deterministic under test.

use std::cell::Cell;
use std::rc::Rc;

use crate::api::config::TraceConfig;
use crate::api::error::TraceError;
use crate::api::types::{PointerEvent, PointerPhase, SessionEvent, SurfaceGeometry};
use crate::core::time::FrameClock;
use crate::effects::{CompletionEffect, StarBurst};
use crate::glyph::outline_font::OutlineFont;
use crate::glyph::rasterizer::{GlyphRasterizer, GuideLayout};
use crate::glyph::source::GlyphSource;
use crate::glyph::stroke_font::StrokeFont;
use crate::input::capture::{StrokeAction, StrokeCapture};
use crate::input::queue::InputQueue;
use crate::tracing::controller::{CompletionController, CompletionState, Phase, Verdict};
use crate::tracing::coverage::{self, Coverage, CoverageParams};

#[cfg(feature = "vectors")]
use crate::render::overlay::{self, OverlayStyle};
#[cfg(feature = "vectors")]
use crate::render::vector::VectorState;

pub struct TracingSession {
    config: TraceConfig,
    rasterizer: GlyphRasterizer,
    capture: StrokeCapture,
    controller: CompletionController,
    input: InputQueue,
    clock: FrameClock,
    effect: Box<dyn CompletionEffect>,
    /// Set by the effect's one-shot callback.
    effect_done: Rc<Cell<bool>>,
    geometry: Option<SurfaceGeometry>,
    target: Option<String>,
    guide: Option<GuideLayout>,
    highlighted: bool,
    last_coverage: Option<Coverage>,
    events: Vec<SessionEvent>,
}

impl TracingSession {
    /// Session with the built-in stroke font and star burst.
    pub fn new(config: TraceConfig) -> Self {
        Self::with_parts(config, Box::new(StrokeFont::new()), Box::new(StarBurst::new()))
    }

    pub fn with_parts(
        config: TraceConfig,
        source: Box<dyn GlyphSource>,
        effect: Box<dyn CompletionEffect>,
    ) -> Self {
        let config = config.validated();
        Self {
            rasterizer: GlyphRasterizer::new(source),
            capture: StrokeCapture::new(config.pen_width),
            controller: CompletionController::new(&config),
            input: InputQueue::new(),
            clock: FrameClock::new(),
            effect,
            effect_done: Rc::new(Cell::new(false)),
            geometry: None,
            target: None,
            guide: None,
            highlighted: false,
            last_coverage: None,
            events: Vec::new(),
            config,
        }
    }

    // -- Setup --

    /// New surface size or pixel ratio. Re-rasterizes the guide and, since
    /// both masks are sized from the geometry, discards strokes and resets.
    pub fn set_geometry(&mut self, geometry: SurfaceGeometry) {
        if self.geometry == Some(geometry) {
            return;
        }
        log::debug!("Surface geometry {geometry:?}");
        self.geometry = Some(geometry);
        self.capture.resize(&geometry);
        self.effect.set_anchor(geometry.center());
        self.reset_progress();
        self.rebuild_guide();
    }

    /// New target text. Forces re-rasterization and a reset to `Idle`.
    pub fn set_target(&mut self, text: &str) {
        log::info!("Target {text:?}");
        self.target = (!text.is_empty()).then(|| text.to_string());
        self.capture.clear();
        self.reset_progress();
        self.rebuild_guide();
    }

    /// Swap the glyph source and rebuild the guide for it.
    pub fn set_glyph_source(&mut self, source: Box<dyn GlyphSource>) {
        self.rasterizer.set_source(source);
        self.capture.clear();
        self.reset_progress();
        self.rebuild_guide();
    }

    /// Use an outline font from raw TrueType/OpenType bytes.
    pub fn load_font(&mut self, bytes: &[u8]) -> Result<(), TraceError> {
        let font = OutlineFont::from_bytes(bytes)?;
        self.set_glyph_source(Box::new(font));
        Ok(())
    }

    pub fn set_effect(&mut self, mut effect: Box<dyn CompletionEffect>) {
        if let Some(geometry) = self.geometry {
            effect.set_anchor(geometry.center());
        }
        self.effect = effect;
    }

    fn rebuild_guide(&mut self) {
        self.guide = match (self.target.as_deref(), self.geometry.as_ref()) {
            (Some(text), Some(geometry)) => {
                let nominal = self.config.font_size_for(text.chars().count());
                self.rasterizer.layout(text, nominal, geometry, &self.config)
            }
            _ => None,
        };
        if let Some(guide) = &self.guide {
            log::info!(
                "Guide ready: {:?} in {:?} mode at {:.1}px",
                guide.text,
                guide.mode,
                guide.font_size
            );
        }
    }

    fn reset_progress(&mut self) {
        self.input.clear();
        self.controller.clear();
        self.highlighted = false;
        self.last_coverage = None;
    }

    // -- Input and time --

    /// Queue a pointer event for the next tick.
    pub fn push_input(&mut self, event: PointerEvent) {
        self.input.push(event);
    }

    /// Apply a pointer event immediately.
    pub fn handle_pointer(&mut self, event: PointerEvent, now_ms: f64) {
        match self.capture.apply(&event) {
            StrokeAction::Started => self.controller.on_pen_down(),
            StrokeAction::Inked => {
                self.controller.on_ink();
                self.controller.on_pen_move(now_ms);
            }
            StrokeAction::Ended => {
                self.controller.on_pen_up(now_ms);
            }
            StrokeAction::Ignored => {
                if event.phase != PointerPhase::Move {
                    log::debug!("Ignored {:?} (no surface or no open path)", event.phase);
                }
            }
        }
    }

    /// Advance the effect, drain queued input and run a due check.
    pub fn tick(&mut self, now_ms: f64) {
        let dt = self.clock.advance(now_ms);
        // An effect started during this tick starts from zero
        self.effect.tick(dt);
        if self.effect_done.replace(false) {
            self.events.push(SessionEvent::CelebrationFinished);
        }
        for event in self.input.drain() {
            self.handle_pointer(event, now_ms);
        }
        if self.controller.poll(now_ms) {
            self.evaluate_now();
        }
    }

    // -- Commands --

    /// The user's clear button: wipe ink, back to `Idle`, drop pending checks.
    pub fn clear(&mut self) {
        log::debug!("Clearing strokes");
        self.capture.clear();
        self.reset_progress();
    }

    /// The continue affordance. Never gated on completion.
    pub fn request_advance(&mut self) {
        self.events.push(SessionEvent::AdvanceRequested);
    }

    /// Run the guarded pass-condition check right now.
    pub fn evaluate_now(&mut self) -> Verdict {
        if !self.controller.begin_evaluation() {
            return Verdict::Ignored;
        }
        let coverage = self.coverage();
        let verdict = self.controller.finish_evaluation(coverage.as_ref());
        self.last_coverage = coverage;
        if verdict == Verdict::Completed {
            self.celebrate();
        }
        verdict
    }

    fn celebrate(&mut self) {
        self.highlighted = true;
        self.events.push(SessionEvent::HighlightRequested);
        self.events.push(SessionEvent::Completed);
        let done = Rc::clone(&self.effect_done);
        self.effect.play(Box::new(move || done.set(true)));
    }

    // -- Queries --

    /// Current coverage of the guide by the strokes. `None` without a
    /// guide, without a surface, or when the guide has no sampled ink.
    pub fn coverage(&self) -> Option<Coverage> {
        let guide = self.guide.as_ref()?;
        let stroke = self.capture.mask()?;
        let params = CoverageParams::for_scale(&self.config, guide.mask.scale());
        match coverage::estimate(&guide.mask, stroke, guide.bounds.as_deref(), &params) {
            Ok(coverage) => coverage,
            Err(e) => {
                log::warn!("Coverage unavailable: {e}");
                None
            }
        }
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn state(&self) -> CompletionState {
        self.controller.state()
    }

    pub fn phase(&self) -> Phase {
        self.controller.phase()
    }

    pub fn is_complete(&self) -> bool {
        self.controller.state().is_complete
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    pub fn is_celebrating(&self) -> bool {
        self.effect.is_playing()
    }

    /// Coverage computed by the most recent evaluation.
    pub fn last_coverage(&self) -> Option<&Coverage> {
        self.last_coverage.as_ref()
    }

    pub fn guide(&self) -> Option<&GuideLayout> {
        self.guide.as_ref()
    }

    pub fn capture(&self) -> &StrokeCapture {
        &self.capture
    }

    pub fn config(&self) -> &TraceConfig {
        &self.config
    }

    pub fn pending_check_ms(&self) -> Option<f64> {
        self.controller.pending_due_ms()
    }

    /// Rebuild the overlay: dotted guide, strokes (glowing once complete)
    /// and the current effect frame.
    #[cfg(feature = "vectors")]
    pub fn build_overlay(&self, out: &mut VectorState) {
        out.clear();
        let style = OverlayStyle {
            dot_spacing: self.config.guide_dot_spacing,
            dot_radius: self.config.guide_dot_spacing * 0.3,
            pen_width: self.config.pen_width,
            ink_threshold: self.config.ink_threshold,
        };
        if let Some(guide) = &self.guide {
            overlay::draw_guide(out, guide, &style);
        }
        overlay::draw_strokes(out, self.capture.paths(), &style, self.highlighted);
        self.effect.render(out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    /// Effect double: counts plays, finishes on the next tick.
    struct Recorder {
        plays: Rc<Cell<u32>>,
        pending: Option<Box<dyn FnOnce()>>,
    }

    impl CompletionEffect for Recorder {
        fn play(&mut self, on_done: Box<dyn FnOnce()>) {
            self.plays.set(self.plays.get() + 1);
            self.pending = Some(on_done);
        }

        fn tick(&mut self, _dt: f32) {
            if let Some(done) = self.pending.take() {
                done();
            }
        }

        fn is_playing(&self) -> bool {
            self.pending.is_some()
        }
    }

    fn config() -> TraceConfig {
        TraceConfig {
            move_check_probability: 0.0,
            ..Default::default()
        }
    }

    fn session(text: &str, width: f32) -> (TracingSession, Rc<Cell<u32>>) {
        let plays = Rc::new(Cell::new(0));
        let effect = Recorder {
            plays: Rc::clone(&plays),
            pending: None,
        };
        let mut s = TracingSession::with_parts(config(), Box::new(StrokeFont::new()), Box::new(effect));
        s.set_geometry(SurfaceGeometry::new(width, 400.0, 1.0));
        s.set_target(text);
        (s, plays)
    }

    fn queue_stroke(s: &mut TracingSession, line: &[Vec2]) {
        s.push_input(PointerEvent::down(line[0].x, line[0].y));
        for p in &line[1..] {
            s.push_input(PointerEvent::moved(p.x, p.y));
        }
        let last = line[line.len() - 1];
        s.push_input(PointerEvent::up(last.x, last.y));
    }

    fn skeleton(s: &TracingSession) -> Vec<Vec<Vec2>> {
        s.guide().unwrap().skeleton.clone()
    }

    #[test]
    fn tracing_the_guide_completes_once() {
        let (mut s, plays) = session("I", 400.0);
        for line in skeleton(&s) {
            queue_stroke(&mut s, &line);
        }
        s.tick(0.0);
        assert_eq!(s.phase(), Phase::PendingCheck);
        s.tick(100.0);
        assert!(!s.is_complete());
        s.tick(150.0);

        assert!(s.is_complete());
        let ratio = s.last_coverage().unwrap().overall();
        assert!(ratio >= 0.85, "ratio {ratio}");
        assert_eq!(plays.get(), 1);
        assert!(s.is_highlighted());
        assert_eq!(
            s.drain_events(),
            vec![SessionEvent::HighlightRequested, SessionEvent::Completed]
        );

        // The effect reports back on the following tick
        s.tick(200.0);
        assert_eq!(s.drain_events(), vec![SessionEvent::CelebrationFinished]);
    }

    #[test]
    fn completed_state_never_refires() {
        let (mut s, plays) = session("I", 400.0);
        for line in skeleton(&s) {
            queue_stroke(&mut s, &line);
        }
        s.tick(0.0);
        s.tick(150.0);
        assert!(s.is_complete());

        for _ in 0..5 {
            assert_eq!(s.evaluate_now(), Verdict::Ignored);
        }
        // More strokes after completion schedule nothing
        for line in skeleton(&s) {
            queue_stroke(&mut s, &line);
        }
        s.tick(300.0);
        s.tick(1000.0);
        assert_eq!(plays.get(), 1);
        assert_eq!(s.phase(), Phase::Complete);
    }

    #[test]
    fn unrelated_mark_does_not_complete() {
        let (mut s, plays) = session("I", 400.0);
        queue_stroke(&mut s, &[Vec2::new(20.0, 380.0), Vec2::new(40.0, 380.0)]);
        s.tick(0.0);
        s.tick(150.0);
        assert!(!s.is_complete());
        assert!(s.last_coverage().unwrap().overall() < 0.01);
        assert_eq!(plays.get(), 0);
        assert!(s.drain_events().is_empty());
    }

    #[test]
    fn weak_letter_blocks_word() {
        let (mut s, plays) = session("AT", 600.0);
        let lines = skeleton(&s);
        // A has two strokes, T the next two
        assert_eq!(lines.len(), 4);
        for line in &lines[..2] {
            queue_stroke(&mut s, line);
        }
        s.tick(0.0);
        s.tick(150.0);
        assert!(!s.is_complete());
        let Some(Coverage::PerChar(counts)) = s.last_coverage() else {
            panic!("expected per-character coverage");
        };
        assert!(counts[0].ratio().unwrap() >= 0.85);
        assert_eq!(counts[1].ratio(), Some(0.0));
        assert_eq!(plays.get(), 0);

        // Finishing the T completes the word
        for line in &lines[2..] {
            queue_stroke(&mut s, line);
        }
        s.tick(200.0);
        s.tick(350.0);
        assert!(s.is_complete());
        assert_eq!(plays.get(), 1);
    }

    #[test]
    fn coverage_never_drops_while_drawing() {
        let (mut s, _) = session("AT", 600.0);
        let mut last = 0.0;
        for (i, line) in skeleton(&s).iter().enumerate() {
            queue_stroke(&mut s, line);
            s.tick(i as f64);
            let ratio = s.coverage().unwrap().overall();
            assert!(ratio >= last, "{ratio} < {last}");
            last = ratio;
        }
    }

    #[test]
    fn clear_mid_stroke_cancels_everything() {
        let (mut s, plays) = session("I", 400.0);
        let line = &skeleton(&s)[0];
        s.handle_pointer(PointerEvent::down(line[0].x, line[0].y), 0.0);
        s.handle_pointer(PointerEvent::moved(line[1].x, line[1].y), 10.0);
        assert!(s.state().has_drawn_any_stroke);

        s.clear();
        assert!(!s.state().has_drawn_any_stroke);
        assert!(s.pending_check_ms().is_none());
        assert!(s.capture().mask().unwrap().is_blank());
        assert_eq!(s.phase(), Phase::Idle);

        // The lift that follows has no open path
        s.handle_pointer(PointerEvent::up(line[1].x, line[1].y), 20.0);
        assert!(s.pending_check_ms().is_none());

        assert_eq!(s.coverage().unwrap().overall(), 0.0);
        assert_eq!(s.evaluate_now(), Verdict::Ignored);
        s.tick(1000.0);
        assert!(!s.is_complete());
        assert_eq!(plays.get(), 0);
    }

    #[test]
    fn check_scheduled_before_ink_cannot_complete() {
        let (mut s, plays) = session("I", 400.0);
        let line = skeleton(&s)[0].clone();
        s.clear();
        // A tap arms nothing
        s.handle_pointer(PointerEvent::down(10.0, 10.0), 0.0);
        s.handle_pointer(PointerEvent::up(10.0, 10.0), 0.0);
        assert_eq!(s.pending_check_ms(), Some(150.0));

        // A full trace inside the same window, pen still down at the deadline
        s.handle_pointer(PointerEvent::down(line[0].x, line[0].y), 10.0);
        s.handle_pointer(PointerEvent::moved(line[1].x, line[1].y), 20.0);
        s.tick(150.0);
        assert!(!s.is_complete());

        // Its own pen-up schedules a real check
        s.handle_pointer(PointerEvent::up(line[1].x, line[1].y), 200.0);
        s.tick(350.0);
        assert!(s.is_complete());
        assert_eq!(plays.get(), 1);
    }

    #[test]
    fn rapid_taps_are_harmless() {
        let (mut s, plays) = session("I", 400.0);
        for i in 0..10 {
            s.push_input(PointerEvent::down(200.0, 200.0));
            s.push_input(PointerEvent::up(200.0, 200.0));
            s.push_input(PointerEvent::up(200.0, 200.0));
            s.tick(i as f64 * 20.0);
        }
        s.tick(1000.0);
        assert!(s.capture().mask().unwrap().is_blank());
        assert!(!s.state().has_drawn_any_stroke);
        assert_eq!(plays.get(), 0);
    }

    #[test]
    fn clear_after_completion_allows_another_round() {
        let (mut s, plays) = session("I", 400.0);
        for line in skeleton(&s) {
            queue_stroke(&mut s, &line);
        }
        s.tick(0.0);
        s.tick(150.0);
        assert!(s.is_complete());

        s.clear();
        assert!(!s.is_complete());
        assert!(!s.is_highlighted());
        for line in skeleton(&s) {
            queue_stroke(&mut s, &line);
        }
        s.tick(200.0);
        s.tick(350.0);
        assert!(s.is_complete());
        assert_eq!(plays.get(), 2);
    }

    #[test]
    fn unready_surface_retries_on_geometry() {
        let mut s = TracingSession::new(config());
        s.set_target("I");
        assert!(s.guide().is_none());
        s.set_geometry(SurfaceGeometry::new(0.0, 0.0, 1.0));
        assert!(s.guide().is_none());
        // Drawing without a surface is a no-op
        s.handle_pointer(PointerEvent::down(10.0, 10.0), 0.0);
        s.handle_pointer(PointerEvent::moved(20.0, 10.0), 0.0);
        assert!(!s.state().has_drawn_any_stroke);

        s.set_geometry(SurfaceGeometry::new(300.0, 300.0, 2.0));
        let guide = s.guide().unwrap();
        assert_eq!(guide.mask.width(), 600);
        assert!(guide.mask.same_shape(s.capture().mask().unwrap()));
    }

    #[test]
    fn geometry_change_discards_strokes() {
        let (mut s, _) = session("I", 400.0);
        queue_stroke(&mut s, &[Vec2::new(10.0, 10.0), Vec2::new(100.0, 100.0)]);
        s.tick(0.0);
        assert!(s.state().has_drawn_any_stroke);
        s.set_geometry(SurfaceGeometry::new(500.0, 400.0, 1.0));
        assert!(!s.state().has_drawn_any_stroke);
        assert!(s.capture().mask().unwrap().is_blank());
        assert_eq!(s.guide().unwrap().mask.width(), 500);
    }

    #[test]
    fn new_target_resets_and_rasterizes() {
        let (mut s, _) = session("I", 400.0);
        let first = s.guide().unwrap().mask.clone();
        for line in skeleton(&s) {
            queue_stroke(&mut s, &line);
        }
        s.tick(0.0);
        s.set_target("O");
        assert_eq!(s.phase(), Phase::Idle);
        assert!(s.capture().mask().unwrap().is_blank());
        assert_ne!(s.guide().unwrap().mask, first);

        s.set_target("I");
        assert_eq!(s.guide().unwrap().mask, first);
    }

    #[test]
    fn empty_target_leaves_no_guide() {
        let (mut s, _) = session("I", 400.0);
        s.set_target("");
        assert!(s.guide().is_none());
        assert!(s.coverage().is_none());
    }

    #[test]
    fn advance_is_never_gated() {
        let (mut s, _) = session("CAT", 600.0);
        s.request_advance();
        assert_eq!(s.drain_events(), vec![SessionEvent::AdvanceRequested]);
    }

    #[test]
    fn bad_font_bytes_keep_current_source() {
        let (mut s, _) = session("I", 400.0);
        let before = s.guide().unwrap().mask.clone();
        assert!(matches!(s.load_font(b"not a font"), Err(TraceError::FontLoad(_))));
        assert_eq!(s.guide().unwrap().mask, before);
    }

    #[test]
    fn outline_font_guide_completes() {
        let (mut s, plays) = session("I", 400.0);
        s.set_geometry(SurfaceGeometry::new(400.0, 300.0, 2.0));
        s.load_font(include_bytes!("../../tests/fixtures/DejaVuSans.ttf")).unwrap();
        let guide = s.guide().unwrap();
        assert!(guide.skeleton.is_empty());

        let mask = &guide.mask;
        let (mut left, mut right, mut top, mut bottom) = (u32::MAX, 0, u32::MAX, 0);
        for y in 0..mask.height() {
            for x in 0..mask.width() {
                if mask.is_inked(x as i32, y as i32, 50) {
                    (left, right) = (left.min(x), right.max(x));
                    (top, bottom) = (top.min(y), bottom.max(y));
                }
            }
        }
        let scale = mask.scale();
        let x = (left + right) as f32 / 2.0 / scale;
        let (top, bottom) = (top as f32 / scale, bottom as f32 / scale);
        assert!((x - 200.0).abs() <= 3.0, "stem at {x}");

        let steps = 12;
        let line: Vec<Vec2> = (0..=steps)
            .map(|i| Vec2::new(x, top + (bottom - top) * i as f32 / steps as f32))
            .collect();
        queue_stroke(&mut s, &line);
        s.tick(0.0);
        s.tick(150.0);

        assert!(s.is_complete(), "coverage {:?}", s.last_coverage());
        assert_eq!(plays.get(), 1);
    }

    #[test]
    fn star_burst_reports_back() {
        let mut s = TracingSession::new(config());
        s.set_geometry(SurfaceGeometry::new(400.0, 400.0, 1.0));
        s.set_target("I");
        for line in skeleton(&s) {
            queue_stroke(&mut s, &line);
        }
        s.tick(0.0);
        s.tick(150.0);
        assert!(s.is_celebrating());
        s.drain_events();
        let mut now = 150.0;
        while now < 5000.0 && s.is_celebrating() {
            now += 16.0;
            s.tick(now);
        }
        assert!(!s.is_celebrating());
        assert_eq!(s.drain_events(), vec![SessionEvent::CelebrationFinished]);
        assert!(now >= 150.0 + 3600.0);
    }

    #[cfg(feature = "vectors")]
    #[test]
    fn overlay_shows_guide_strokes_and_glow() {
        let (mut s, _) = session("I", 400.0);
        let mut out = VectorState::new();
        s.build_overlay(&mut out);
        let guide_only = out.vertex_count();
        assert!(guide_only > 0);

        for line in skeleton(&s) {
            queue_stroke(&mut s, &line);
        }
        s.tick(0.0);
        s.build_overlay(&mut out);
        let with_strokes = out.vertex_count();
        assert!(with_strokes > guide_only);

        s.tick(150.0);
        assert!(s.is_highlighted());
        s.build_overlay(&mut out);
        assert!(out.vertex_count() > with_strokes);

        s.clear();
        s.build_overlay(&mut out);
        assert_eq!(out.vertex_count(), guide_only);
    }
}
