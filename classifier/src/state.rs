//! State owned by one classifier instance.
//!
use crate::timer::TimerSlot;

/// Coarse phase of the state machine, derived from [`StabilityState`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Phase {
    Idle,
    Candidate,
    Locked,
}

/// Candidate and lock bookkeeping plus the pending timer slots.
///
/// The candidate always tracks the current run of identical best labels; the
/// locked label only changes when a candidate survives its dwell window or a
/// timer expires.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StabilityState {
    pub(crate) candidate_label: Option<String>,
    pub(crate) candidate_since: Option<u64>,
    pub(crate) locked_label: Option<String>,
    pub(crate) locked_since: Option<u64>,
    pub(crate) grace: TimerSlot,
    pub(crate) completion: TimerSlot,
    pub(crate) last_tick_ms: Option<u64>,
}

impl StabilityState {
    pub fn phase(&self) -> Phase {
        match (&self.locked_label, &self.candidate_label) {
            (Some(_), _) => Phase::Locked,
            (None, Some(_)) => Phase::Candidate,
            (None, None) => Phase::Idle,
        }
    }

    pub fn candidate_label(&self) -> Option<&str> {
        self.candidate_label.as_deref()
    }

    pub fn candidate_since(&self) -> Option<u64> {
        self.candidate_since
    }

    pub fn locked_label(&self) -> Option<&str> {
        self.locked_label.as_deref()
    }

    pub fn locked_since(&self) -> Option<u64> {
        self.locked_since
    }

    pub fn grace(&self) -> &TimerSlot {
        &self.grace
    }

    pub fn completion(&self) -> &TimerSlot {
        &self.completion
    }

    pub fn last_tick_ms(&self) -> Option<u64> {
        self.last_tick_ms
    }

    /// Back to idle. Cancels both timers, keeps the clock.
    pub(crate) fn reset(&mut self) {
        self.candidate_label = None;
        self.candidate_since = None;
        self.locked_label = None;
        self.locked_since = None;
        self.grace.cancel();
        self.completion.cancel();
    }
}
