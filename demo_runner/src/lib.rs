//! Demo runner around the stability classifier.
//!
//! Loads a model's label set, replays recorded predictions as the capture
//! source, runs them through a [`StabilityClassifier`] and renders the
//! resulting events onto an element board.
//!
//! [`StabilityClassifier`]: stability_classifier::StabilityClassifier
use common::protocol::TickMsg;
use tokio::sync::mpsc;

pub mod meter;
pub mod model;
pub mod recording;
pub mod render;
pub mod session;
pub mod sink;
pub mod utils;
pub mod variant;

const TICK_CHANNEL_CAPACITY: usize = 20;

pub type TickSender = mpsc::Sender<TickMsg>;
pub type TickReceiver = mpsc::Receiver<TickMsg>;

/// Channel between a capture source and the session loop.
pub fn tick_channel() -> (TickSender, TickReceiver) {
    mpsc::channel(TICK_CHANNEL_CAPACITY)
}
