//! Stability classifier for live per-frame predictions.
//!
//! Feeds a noisy stream of best-class predictions through a small dwell /
//! grace / hold-to-complete state machine and emits discrete [`Event`]s once
//! a label is stable enough to act on. The crate has no I/O; timestamps come
//! from the caller's logical clock in milliseconds.
pub mod classifier;
pub mod config;
pub mod error;
pub mod event;
pub mod prediction;
pub mod state;
pub mod target;
pub mod timer;

pub use classifier::StabilityClassifier;
pub use config::StabilityConfig;
pub use error::{Malformed, Result, StabilityError};
pub use event::{Event, Events};
pub use prediction::{best_prediction, combine_scores, Prediction, Predictions};
pub use state::{Phase, StabilityState};
pub use target::TargetPicker;
pub use timer::TimerSlot;
