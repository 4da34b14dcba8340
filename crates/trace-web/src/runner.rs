#[cfg(feature = "vectors")]
use trace_engine::VectorState;
use trace_engine::{
    EventRecord, PointerEvent, SessionEvent, SurfaceGeometry, TraceConfig, TracingSession,
};

/// Owns the tracing session plus the flat buffers JavaScript reads.
///
/// The browser keeps one runner in a `thread_local!` and drives it through
/// free `#[wasm_bindgen]` functions; everything here is plain Rust so it can
/// be exercised natively.
pub struct TraceRunner {
    session: TracingSession,
    #[cfg(feature = "vectors")]
    vectors: VectorState,
    /// Events packed during the last tick.
    events: Vec<EventRecord>,
}

impl TraceRunner {
    pub fn new(config: TraceConfig) -> Self {
        Self {
            session: TracingSession::new(config),
            #[cfg(feature = "vectors")]
            vectors: VectorState::new(),
            events: Vec::with_capacity(8),
        }
    }

    pub fn session(&self) -> &TracingSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut TracingSession {
        &mut self.session
    }

    pub fn set_geometry(&mut self, width: f32, height: f32, dpr: f32) {
        self.session
            .set_geometry(SurfaceGeometry::new(width, height, dpr));
    }

    pub fn set_target(&mut self, text: &str) {
        self.session.set_target(text);
    }

    /// Switch to an outline font. Keeps the current glyphs on failure.
    pub fn set_font(&mut self, bytes: &[u8]) -> bool {
        match self.session.load_font(bytes) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Keeping current glyph source: {e}");
                false
            }
        }
    }

    pub fn push_input(&mut self, event: PointerEvent) {
        self.session.push_input(event);
    }

    pub fn clear(&mut self) {
        self.session.clear();
    }

    pub fn advance(&mut self) {
        self.session.request_advance();
    }

    /// Run one frame: session tick, event packing and, with `vectors`, the overlay rebuild.
    pub fn tick(&mut self, now_ms: f64) {
        self.session.tick(now_ms);

        self.events.clear();
        for event in self.session.drain_events() {
            let payload = match event {
                SessionEvent::Completed => self.coverage_ratio(),
                _ => 0.0,
            };
            self.events.push(EventRecord::new(event, payload));
        }

        #[cfg(feature = "vectors")]
        self.session.build_overlay(&mut self.vectors);
    }

    /// Ratio from the last evaluation, or 0 if none ran yet.
    pub fn coverage_ratio(&self) -> f32 {
        self.session
            .last_coverage()
            .map(|c| c.overall())
            .unwrap_or(0.0)
    }

    pub fn is_complete(&self) -> bool {
        self.session.is_complete()
    }

    // ---- Pointer accessors for wasm memory reads ----

    #[cfg(feature = "vectors")]
    pub fn vector_vertices_ptr(&self) -> *const f32 {
        self.vectors.buffer_ptr()
    }

    #[cfg(feature = "vectors")]
    pub fn vector_vertex_count(&self) -> u32 {
        self.vectors.vertex_count() as u32
    }

    pub fn events_ptr(&self) -> *const f32 {
        self.events.as_ptr() as *const f32
    }

    /// Number of packed events (each `EventRecord::FLOATS` floats).
    pub fn events_len(&self) -> u32 {
        self.events.len() as u32
    }

    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn traced_runner() -> TraceRunner {
        let mut runner = TraceRunner::new(TraceConfig::default());
        runner.set_geometry(400.0, 400.0, 1.0);
        runner.set_target("I");
        let line = runner.session().guide().unwrap().skeleton[0].clone();
        runner.push_input(PointerEvent::down(line[0].x, line[0].y));
        runner.push_input(PointerEvent::moved(line[1].x, line[1].y));
        runner.push_input(PointerEvent::up(line[1].x, line[1].y));
        runner
    }

    #[test]
    fn completion_is_packed_with_ratio() {
        let mut runner = traced_runner();
        runner.tick(0.0);
        assert!(runner.events().is_empty());
        runner.tick(200.0);
        assert!(runner.is_complete());
        let kinds: Vec<f32> = runner.events().iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![1.0, 2.0]);
        assert!(runner.events()[1].a >= 0.85);
        assert_eq!(runner.events_len(), 2);
    }

    #[test]
    fn events_last_one_tick() {
        let mut runner = traced_runner();
        runner.advance();
        runner.tick(0.0);
        assert_eq!(runner.events_len(), 1);
        assert_eq!(runner.events()[0].kind, 4.0);
        runner.tick(16.0);
        assert_eq!(runner.events_len(), 0);
    }

    #[cfg(feature = "vectors")]
    #[test]
    fn overlay_is_rebuilt_each_tick() {
        let mut runner = traced_runner();
        runner.tick(0.0);
        assert!(runner.vector_vertex_count() > 0);
    }

    #[test]
    fn bad_font_is_reported() {
        let mut runner = TraceRunner::new(TraceConfig::default());
        assert!(!runner.set_font(&[1, 2, 3]));
    }
}
