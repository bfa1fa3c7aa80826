use std::fmt;

use smallvec::SmallVec;

/// Discrete outcome of feeding the classifier.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Event {
    /// A label became the stable, locked classification.
    SelectionChanged(String),
    /// The locked label matches the target and the hold timer started.
    PoseLocked(String),
    /// The target was held for the full hold-to-complete duration.
    PoseCompleted(String),
    /// The locked label was absent for longer than the grace period.
    PoseLost(String),
    /// A new target label was chosen or set.
    TargetChanged(String),
}

/// Events of a single call. Rarely more than two.
pub type Events = SmallVec<[Event; 2]>;

impl Event {
    pub fn label(&self) -> &str {
        match self {
            Event::SelectionChanged(label)
            | Event::PoseLocked(label)
            | Event::PoseCompleted(label)
            | Event::PoseLost(label)
            | Event::TargetChanged(label) => label,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Event::SelectionChanged(_) => "selection-changed",
            Event::PoseLocked(_) => "pose-locked",
            Event::PoseCompleted(_) => "pose-completed",
            Event::PoseLost(_) => "pose-lost",
            Event::TargetChanged(_) => "target-changed",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.label())
    }
}
