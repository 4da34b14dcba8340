use crate::api::types::PointerEvent;

/// Pointer events waiting for the next session tick, in arrival order.
///
/// The host may deliver several events per frame (coalesced pointer moves);
/// they are applied in order so a fast stroke keeps its shape.
pub struct InputQueue {
    events: Vec<PointerEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(32),
        }
    }

    pub fn push(&mut self, event: PointerEvent) {
        self.events.push(event);
    }

    /// Take every queued event, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<PointerEvent> {
        std::mem::take(&mut self.events)
    }

    /// Drop pending events without handling them.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}
