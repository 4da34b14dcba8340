//! Stroke capture surface.
//!
//! Turns normalized pointer events into ink on the stroke mask. Only live
//! pointer input writes here; the guide lives in its own mask and is never
//! composited into this one.

use glam::Vec2;

use crate::api::types::{PointerEvent, PointerPhase, SurfaceGeometry};
use crate::core::mask::Mask;

/// What a pointer event did to the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeAction {
    /// Nothing happened (no surface, or no open path).
    Ignored,
    /// A new path was opened.
    Started,
    /// The open path was extended and ink was committed.
    Inked,
    /// The open path was closed.
    Ended,
}

pub struct StrokeCapture {
    mask: Option<Mask>,
    /// Pen width in logical px.
    pen_width: f32,
    /// The single open path, if the pen is down.
    open: Option<Vec<Vec2>>,
    /// Closed paths since the last clear, logical px.
    closed: Vec<Vec<Vec2>>,
}

impl StrokeCapture {
    pub fn new(pen_width: f32) -> Self {
        Self {
            mask: None,
            pen_width,
            open: None,
            closed: Vec::new(),
        }
    }

    /// Reallocate the mask for a new geometry. In-progress and finished
    /// strokes are discarded since the mask size is tied to the geometry.
    pub fn resize(&mut self, geometry: &SurfaceGeometry) {
        self.mask = Mask::for_geometry(geometry);
        self.open = None;
        self.closed.clear();
    }

    pub fn apply(&mut self, event: &PointerEvent) -> StrokeAction {
        match event.phase {
            PointerPhase::Down => self.pen_down(event.pos()),
            PointerPhase::Move => self.pen_move(event.pos()),
            PointerPhase::Up => self.pen_up(),
        }
    }

    /// Open a new path at `p`, closing any path left open.
    pub fn pen_down(&mut self, p: Vec2) -> StrokeAction {
        if self.mask.is_none() {
            return StrokeAction::Ignored;
        }
        self.close_open_path();
        self.open = Some(vec![p]);
        StrokeAction::Started
    }

    /// Extend the open path to `p` with a round-capped segment.
    pub fn pen_move(&mut self, p: Vec2) -> StrokeAction {
        let (Some(mask), Some(path)) = (self.mask.as_mut(), self.open.as_mut()) else {
            return StrokeAction::Ignored;
        };
        let Some(&last) = path.last() else {
            return StrokeAction::Ignored;
        };
        let radius = self.pen_width * mask.scale() / 2.0;
        let (from, to) = (mask.to_device(last), mask.to_device(p));
        mask.fill_capsule(from, to, radius, 255);
        path.push(p);
        StrokeAction::Inked
    }

    /// Close the open path. A lift without an open path is a no-op.
    pub fn pen_up(&mut self) -> StrokeAction {
        if self.open.is_none() {
            return StrokeAction::Ignored;
        }
        self.close_open_path();
        StrokeAction::Ended
    }

    /// Wipe all ink and forget every path.
    pub fn clear(&mut self) {
        if let Some(mask) = self.mask.as_mut() {
            mask.clear();
        }
        self.open = None;
        self.closed.clear();
    }

    fn close_open_path(&mut self) {
        if let Some(path) = self.open.take() {
            if path.len() > 1 {
                self.closed.push(path);
            }
        }
    }

    pub fn mask(&self) -> Option<&Mask> {
        self.mask.as_ref()
    }

    pub fn is_drawing(&self) -> bool {
        self.open.is_some()
    }

    pub fn pen_width(&self) -> f32 {
        self.pen_width
    }

    /// All paths with ink, closed ones first, then the open one.
    pub fn paths(&self) -> impl Iterator<Item = &[Vec2]> + Clone {
        self.closed
            .iter()
            .map(Vec::as_slice)
            .chain(self.open.iter().filter(|p| p.len() > 1).map(Vec::as_slice))
    }
}
