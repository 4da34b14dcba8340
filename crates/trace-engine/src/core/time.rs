/// What asked for a coverage check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckTrigger {
    /// The pen was lifted. Always schedules.
    PenUp,
    /// A sampled pen-move while drawing.
    PenMove,
}

/// A scheduled coverage check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingCheck {
    /// Timestamp (ms) at which the check becomes due.
    pub due_ms: f64,
    /// Whether any ink existed when the check was scheduled.
    pub armed: bool,
    pub trigger: CheckTrigger,
}

/// Single-slot deferred check.
///
/// At most one check is outstanding. A pen-up always (re)schedules to
/// `now + delay`, so the evaluation lands after the whole stroke. A sampled
/// pen-move only schedules when nothing is pending, so bursts of moves
/// coalesce into one evaluation.
#[derive(Debug, Clone)]
pub struct DeferredCheck {
    delay_ms: f64,
    pending: Option<PendingCheck>,
}

impl DeferredCheck {
    pub fn new(delay_ms: f64) -> Self {
        Self {
            delay_ms: delay_ms.max(0.0),
            pending: None,
        }
    }

    /// Request a check. Returns true if a deadline was set or moved.
    pub fn schedule(&mut self, now_ms: f64, trigger: CheckTrigger, armed: bool) -> bool {
        let due_ms = now_ms + self.delay_ms;
        match (trigger, self.pending.as_mut()) {
            (CheckTrigger::PenMove, Some(_)) => false,
            (CheckTrigger::PenUp, Some(pending)) => {
                pending.due_ms = pending.due_ms.max(due_ms);
                pending.armed = armed;
                pending.trigger = trigger;
                true
            }
            (_, None) => {
                self.pending = Some(PendingCheck { due_ms, armed, trigger });
                true
            }
        }
    }

    /// Remove and return the pending check if its deadline has passed.
    pub fn take_due(&mut self, now_ms: f64) -> Option<PendingCheck> {
        match self.pending {
            Some(p) if p.due_ms <= now_ms => self.pending.take(),
            _ => None,
        }
    }

    /// Drop any outstanding check.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn due_ms(&self) -> Option<f64> {
        self.pending.map(|p| p.due_ms)
    }
}

/// Turns absolute host timestamps (ms) into per-tick deltas (seconds).
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last_ms: Option<f64>,
}

impl FrameClock {
    /// Longest delta handed out, so a backgrounded tab doesn't jump animations.
    pub const MAX_DT: f32 = 0.25;

    pub fn new() -> Self {
        Self { last_ms: None }
    }

    /// Record `now_ms` and return the elapsed seconds since the previous call.
    pub fn advance(&mut self, now_ms: f64) -> f32 {
        let dt = match self.last_ms {
            Some(last) => ((now_ms - last) / 1000.0) as f32,
            None => 0.0,
        };
        self.last_ms = Some(now_ms);
        dt.clamp(0.0, Self::MAX_DT)
    }
}
