//! The stability state machine.
//!
use crate::{
    config::StabilityConfig,
    error::{Malformed, Result, StabilityError},
    event::{Event, Events},
    prediction::{best_prediction, combine_scores, Prediction},
    state::StabilityState,
    target::TargetPicker,
};

/// Turns a stream of best-class predictions into stable selection events.
///
/// Every call takes the caller's current logical time in milliseconds. Timers
/// are checked at the start of each call, so they fire on the first tick or
/// [`poll_timers`](Self::poll_timers) at or after their deadline and before
/// the tick's own label is looked at.
pub struct StabilityClassifier {
    config: StabilityConfig,
    target_labels: Vec<String>,
    state: StabilityState,
    target: Option<String>,
    picker: TargetPicker,
}

impl StabilityClassifier {
    pub fn new(config: StabilityConfig) -> Result<Self> {
        Self::with_picker(config, TargetPicker::from_entropy())
    }

    pub fn with_picker(config: StabilityConfig, picker: TargetPicker) -> Result<Self> {
        config.validate()?;
        let target_labels = config.target_labels();

        Ok(Self {
            config,
            target_labels,
            state: StabilityState::default(),
            target: None,
            picker,
        })
    }

    pub fn config(&self) -> &StabilityConfig {
        &self.config
    }

    pub fn state(&self) -> &StabilityState {
        &self.state
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// Feed the raw scores of one tick, in label order.
    pub fn on_scores(&mut self, scores: &[f32], now_ms: u64) -> Result<Events> {
        let predictions = combine_scores(&self.config.labels, scores).map_err(|e| {
            log::warn!("Dropping tick at {now_ms}ms: {e}");
            e
        })?;
        let best = best_prediction(&predictions).ok_or(Malformed::Empty)?;

        self.on_tick(best, now_ms)
    }

    /// Feed the best prediction of one tick.
    ///
    /// A non-sentinel prediction scoring below `min_score` is ignored, as if
    /// the tick never happened.
    pub fn on_tick(&mut self, best: &Prediction, now_ms: u64) -> Result<Events> {
        best.validate().map_err(|e| {
            log::warn!("Dropping tick at {now_ms}ms: {e}");
            e
        })?;
        self.check_clock(now_ms)?;

        if best.score < self.config.min_score && !self.config.is_sentinel(&best.label) {
            log::debug!(
                "Ignoring {:?} at {}ms, score {} is below {}",
                &best.label,
                now_ms,
                best.score,
                self.config.min_score
            );
            return Ok(Events::new());
        }

        if !self.config.is_known(&best.label) {
            log::debug!("Label {:?} is not in the label set", &best.label);
        }

        let mut events = Events::new();
        self.fire_due_timers(now_ms, &mut events);
        self.observe(&best.label, now_ms, &mut events);
        self.state.last_tick_ms = Some(now_ms);

        Ok(events)
    }

    /// Fire timers that are due without feeding a prediction.
    pub fn poll_timers(&mut self, now_ms: u64) -> Result<Events> {
        self.check_clock(now_ms)?;

        let mut events = Events::new();
        self.fire_due_timers(now_ms, &mut events);
        self.state.last_tick_ms = Some(now_ms);

        Ok(events)
    }

    /// Set the label the user is expected to hold.
    pub fn set_target(&mut self, label: &str, now_ms: u64) -> Result<Events> {
        self.check_clock(now_ms)?;

        let mut events = Events::new();
        self.fire_due_timers(now_ms, &mut events);
        self.replace_target(label.to_owned(), now_ms, &mut events);
        self.state.last_tick_ms = Some(now_ms);

        Ok(events)
    }

    /// Choose a random new target, never the current one.
    pub fn advance_target(&mut self, now_ms: u64) -> Result<Events> {
        self.check_clock(now_ms)?;

        let mut events = Events::new();
        self.fire_due_timers(now_ms, &mut events);
        self.pick_next_target(now_ms, &mut events);
        self.state.last_tick_ms = Some(now_ms);

        Ok(events)
    }

    fn check_clock(&self, now_ms: u64) -> Result<()> {
        match self.state.last_tick_ms {
            Some(last_ms) if now_ms < last_ms => {
                log::warn!("Ignoring tick at {now_ms}ms, last tick was at {last_ms}ms");
                Err(StabilityError::ClockWentBackwards { now_ms, last_ms })
            }
            _ => Ok(()),
        }
    }

    fn observe(&mut self, label: &str, now_ms: u64, events: &mut Events) {
        if self.state.candidate_label.as_deref() != Some(label) {
            log::debug!("New candidate {label:?} at {now_ms}ms");
            self.state.candidate_label = Some(label.to_owned());
            self.state.candidate_since = Some(now_ms);
        }

        match self.state.locked_label.as_deref() {
            Some(locked) if locked == label => {
                if self.state.grace.cancel() {
                    log::debug!("{label:?} back within grace period");
                }
                return;
            }
            Some(locked) => {
                if let Some(grace_ms) = self.config.grace() {
                    if self.state.grace.arm_if_idle(now_ms, grace_ms) {
                        log::debug!("{locked:?} left at {now_ms}ms, grace period started");
                    }
                }
            }
            None => {}
        }

        let since = self.state.candidate_since.unwrap_or(now_ms);
        if now_ms.saturating_sub(since) >= self.config.min_dwell_ms {
            self.lock(label, now_ms, events);
        }
    }

    fn lock(&mut self, label: &str, now_ms: u64, events: &mut Events) {
        log::info!("Locked {label:?} at {now_ms}ms");
        self.state.grace.cancel();
        self.state.completion.cancel();
        self.state.locked_label = Some(label.to_owned());
        self.state.locked_since = Some(now_ms);
        events.push(Event::SelectionChanged(label.to_owned()));

        self.arm_completion(now_ms, events);
    }

    /// Start the hold timer if the locked label is the target.
    fn arm_completion(&mut self, now_ms: u64, events: &mut Events) {
        let Some(hold_ms) = self.config.hold_to_complete() else {
            return;
        };

        match (&self.state.locked_label, &self.target) {
            (Some(locked), Some(target)) if locked == target => {
                self.state.completion.arm(now_ms, hold_ms);
                log::info!("Holding {locked:?} for {hold_ms}ms");
                events.push(Event::PoseLocked(locked.clone()));
            }
            _ => {}
        }
    }

    fn fire_due_timers(&mut self, now_ms: u64, events: &mut Events) {
        // Each handler resets the state, so at most one timer fires per call.
        let grace_due = self.state.grace.due(now_ms);
        let completion_due = self.state.completion.due(now_ms);

        match (grace_due, completion_due) {
            (Some(grace_at), Some(completion_at)) if grace_at < completion_at => {
                self.expire_grace(grace_at, events)
            }
            (_, Some(completion_at)) => self.complete_hold(completion_at, events),
            (Some(grace_at), None) => self.expire_grace(grace_at, events),
            (None, None) => {}
        }
    }

    fn expire_grace(&mut self, at_ms: u64, events: &mut Events) {
        if let Some(label) = self.state.locked_label.take() {
            log::info!("Lost {label:?} at {at_ms}ms");
            events.push(Event::PoseLost(label));
        }
        self.state.reset();
    }

    fn complete_hold(&mut self, at_ms: u64, events: &mut Events) {
        let completed = self.state.locked_label.take();
        self.state.reset();

        if let Some(label) = completed {
            log::info!("Completed {label:?} at {at_ms}ms");
            events.push(Event::PoseCompleted(label));
            self.pick_next_target(at_ms, events);
        }
    }

    fn pick_next_target(&mut self, now_ms: u64, events: &mut Events) {
        let next = self
            .picker
            .pick(&self.target_labels, self.target.as_deref())
            .map(str::to_owned);

        if let Some(next) = next {
            self.replace_target(next, now_ms, events);
        }
    }

    fn replace_target(&mut self, label: String, now_ms: u64, events: &mut Events) {
        if self.target.as_deref() == Some(label.as_str()) {
            return;
        }

        log::info!("New target {label:?}");
        self.state.completion.cancel();
        events.push(Event::TargetChanged(label.clone()));
        self.target = Some(label);

        self.arm_completion(now_ms, events);
    }
}
