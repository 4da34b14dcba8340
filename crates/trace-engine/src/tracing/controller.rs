//! Completion state machine.
//!
//! `Idle → Drawing → PendingCheck → (Complete | Drawing)`. `Complete` is
//! terminal until [`CompletionController::clear`]. Checks are deferred so
//! a burst of input coalesces into one evaluation after the stroke settles.

use crate::api::config::TraceConfig;
use crate::core::rng::Rng;
use crate::core::time::{CheckTrigger, DeferredCheck};
use crate::tracing::coverage::Coverage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Drawing,
    PendingCheck,
    Complete,
}

/// Flags owned by the controller, reset together on clear.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompletionState {
    pub has_drawn_any_stroke: bool,
    pub is_complete: bool,
    pub is_evaluating: bool,
}

/// Outcome of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Guarded out: already complete, nothing drawn, or re-entrant.
    Ignored,
    /// Coverage could not be computed (degenerate guide, no surface).
    NotReady,
    Failed,
    /// The transition into `Complete`. Returned once per clear cycle.
    Completed,
}

pub struct CompletionController {
    state: CompletionState,
    pen_down: bool,
    check: DeferredCheck,
    rng: Rng,
    pass_ratio: f32,
    move_check_probability: f32,
}

impl CompletionController {
    pub fn new(config: &TraceConfig) -> Self {
        Self {
            state: CompletionState::default(),
            pen_down: false,
            check: DeferredCheck::new(config.eval_delay_ms),
            rng: Rng::new(config.rng_seed),
            pass_ratio: config.pass_ratio,
            move_check_probability: config.move_check_probability,
        }
    }

    pub fn state(&self) -> CompletionState {
        self.state
    }

    pub fn phase(&self) -> Phase {
        if self.state.is_complete {
            Phase::Complete
        } else if self.check.is_pending() {
            Phase::PendingCheck
        } else if self.pen_down || self.state.has_drawn_any_stroke {
            Phase::Drawing
        } else {
            Phase::Idle
        }
    }

    /// Timestamp of the outstanding check, if any.
    pub fn pending_due_ms(&self) -> Option<f64> {
        self.check.due_ms()
    }

    pub fn on_pen_down(&mut self) {
        self.pen_down = true;
    }

    /// Ink was committed to the stroke mask.
    pub fn on_ink(&mut self) {
        self.state.has_drawn_any_stroke = true;
    }

    /// Sampled check while drawing. Returns true if a check was scheduled.
    pub fn on_pen_move(&mut self, now_ms: f64) -> bool {
        if self.state.is_complete || !self.pen_down {
            return false;
        }
        if !self.rng.chance(self.move_check_probability) {
            return false;
        }
        self.check
            .schedule(now_ms, CheckTrigger::PenMove, self.state.has_drawn_any_stroke)
    }

    /// Pen lifted: always (re)schedule unless already complete.
    pub fn on_pen_up(&mut self, now_ms: f64) -> bool {
        self.pen_down = false;
        if self.state.is_complete {
            return false;
        }
        self.check
            .schedule(now_ms, CheckTrigger::PenUp, self.state.has_drawn_any_stroke)
    }

    /// True when a scheduled check is due and should be evaluated now.
    /// Checks scheduled before any ink existed are consumed without effect.
    pub fn poll(&mut self, now_ms: f64) -> bool {
        let Some(due) = self.check.take_due(now_ms) else {
            return false;
        };
        if !due.armed {
            log::debug!("Dropping check scheduled before any ink ({:?})", due.trigger);
            return false;
        }
        true
    }

    /// Enter evaluation if the guards allow it.
    pub fn begin_evaluation(&mut self) -> bool {
        if self.state.is_complete || !self.state.has_drawn_any_stroke || self.state.is_evaluating {
            return false;
        }
        self.state.is_evaluating = true;
        true
    }

    /// Apply the pass condition to a coverage result.
    pub fn finish_evaluation(&mut self, coverage: Option<&Coverage>) -> Verdict {
        if !self.state.is_evaluating {
            return Verdict::Ignored;
        }
        self.state.is_evaluating = false;
        if self.state.is_complete {
            return Verdict::Ignored;
        }
        let Some(coverage) = coverage else {
            return Verdict::NotReady;
        };
        if coverage.passes(self.pass_ratio) {
            self.state.is_complete = true;
            self.check.cancel();
            log::info!("Tracing complete (coverage {:.2})", coverage.overall());
            Verdict::Completed
        } else {
            log::debug!(
                "Coverage {:.2} (weakest {:.2}) below {:.2}",
                coverage.overall(),
                coverage.weakest().unwrap_or(0.0),
                self.pass_ratio
            );
            Verdict::Failed
        }
    }

    /// Guarded evaluation in one step.
    pub fn evaluate(&mut self, coverage: Option<&Coverage>) -> Verdict {
        if !self.begin_evaluation() {
            return Verdict::Ignored;
        }
        self.finish_evaluation(coverage)
    }

    /// Back to `Idle`: flags reset and any outstanding check dropped.
    pub fn clear(&mut self) {
        self.state = CompletionState::default();
        self.pen_down = false;
        self.check.cancel();
    }
}
