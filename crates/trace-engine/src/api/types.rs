use bytemuck::{Pod, Zeroable};
use glam::Vec2;

/// Phase of a normalized pointer event.
/// Mouse, touch and pen input all collapse into these three phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
}

/// A pointer event in surface-local logical coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    pub x: f32,
    pub y: f32,
}

impl PointerEvent {
    pub fn down(x: f32, y: f32) -> Self {
        Self { phase: PointerPhase::Down, x, y }
    }

    pub fn moved(x: f32, y: f32) -> Self {
        Self { phase: PointerPhase::Move, x, y }
    }

    pub fn up(x: f32, y: f32) -> Self {
        Self { phase: PointerPhase::Up, x, y }
    }

    pub fn pos(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// Logical size of the drawing surface plus its device pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceGeometry {
    pub width: f32,
    pub height: f32,
    pub scale: f32,
}

impl SurfaceGeometry {
    pub fn new(width: f32, height: f32, scale: f32) -> Self {
        Self { width, height, scale }
    }

    /// Mask dimensions in device pixels, truncated like a canvas backing store.
    pub fn device_size(&self) -> (u32, u32) {
        let w = (self.width * self.scale).max(0.0).floor() as u32;
        let h = (self.height * self.scale).max(0.0).floor() as u32;
        (w, h)
    }

    /// True when the surface has not been laid out yet (or collapsed to nothing).
    pub fn is_empty(&self) -> bool {
        let (w, h) = self.device_size();
        w == 0 || h == 0 || !self.scale.is_finite() || self.scale <= 0.0
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Whether a target is traced as one letter or as a word with per-character bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceMode {
    Letter,
    Word,
}

impl TraceMode {
    pub fn for_text(text: &str) -> Self {
        if text.chars().count() > 1 {
            TraceMode::Word
        } else {
            TraceMode::Letter
        }
    }
}

/// Notifications a session hands back to the embedding UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Strokes should be re-rendered once with the completion glow.
    HighlightRequested,
    /// The guide was covered; the completion effect has been started.
    Completed,
    /// The completion effect reported that it finished.
    CelebrationFinished,
    /// The user asked to move on. Never gated on completion.
    AdvanceRequested,
}

impl SessionEvent {
    /// Numeric code used in the flat event buffer.
    pub fn code(self) -> u32 {
        match self {
            SessionEvent::HighlightRequested => 1,
            SessionEvent::Completed => 2,
            SessionEvent::CelebrationFinished => 3,
            SessionEvent::AdvanceRequested => 4,
        }
    }
}

/// A session event packed for a flat f32 buffer read from JavaScript.
/// `kind` is the event code; `a/b/c` carry payload (coverage ratio, etc.).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, Pod, Zeroable)]
pub struct EventRecord {
    pub kind: f32,
    pub a: f32,
    pub b: f32,
    pub c: f32,
}

impl EventRecord {
    pub const FLOATS: usize = 4;

    pub fn new(event: SessionEvent, a: f32) -> Self {
        Self {
            kind: event.code() as f32,
            a,
            b: 0.0,
            c: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_size_truncates() {
        let g = SurfaceGeometry::new(100.5, 50.0, 1.5);
        assert_eq!(g.device_size(), (150, 75));
    }

    #[test]
    fn empty_geometry() {
        assert!(SurfaceGeometry::new(0.0, 100.0, 1.0).is_empty());
        assert!(SurfaceGeometry::new(100.0, 100.0, 0.0).is_empty());
        assert!(!SurfaceGeometry::new(100.0, 100.0, 2.0).is_empty());
    }

    #[test]
    fn mode_from_text() {
        assert_eq!(TraceMode::for_text("A"), TraceMode::Letter);
        assert_eq!(TraceMode::for_text("CAT"), TraceMode::Word);
        assert_eq!(TraceMode::for_text("é"), TraceMode::Letter);
    }

    #[test]
    fn event_record_is_16_bytes() {
        assert_eq!(std::mem::size_of::<EventRecord>(), 16);
        let r = EventRecord::new(SessionEvent::Completed, 0.9);
        assert_eq!(r.kind, 2.0);
        assert_eq!(r.a, 0.9);
    }
}
