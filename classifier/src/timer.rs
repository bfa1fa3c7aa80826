//! Deadline slots on the caller's logical clock.
//!
//! A slot holds at most one pending deadline. Arming replaces whatever was
//! pending and cancelling clears it, so a cancelled timer can never fire.

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TimerSlot {
    deadline_ms: Option<u64>,
}

impl TimerSlot {
    pub const fn new() -> Self {
        Self { deadline_ms: None }
    }

    pub fn arm(&mut self, now_ms: u64, duration_ms: u64) {
        self.deadline_ms = Some(now_ms.saturating_add(duration_ms));
    }

    /// Arm only if nothing is pending. Returns whether the slot was armed.
    pub fn arm_if_idle(&mut self, now_ms: u64, duration_ms: u64) -> bool {
        if self.is_armed() {
            return false;
        }
        self.arm(now_ms, duration_ms);
        true
    }

    /// Returns whether a deadline was pending.
    pub fn cancel(&mut self) -> bool {
        self.deadline_ms.take().is_some()
    }

    pub fn is_armed(&self) -> bool {
        self.deadline_ms.is_some()
    }

    pub fn deadline_ms(&self) -> Option<u64> {
        self.deadline_ms
    }

    /// Deadline of the pending timer if it is due at `now_ms`.
    pub fn due(&self, now_ms: u64) -> Option<u64> {
        self.deadline_ms.filter(|deadline| *deadline <= now_ms)
    }
}
