//! Session loop: ticks in, events out to the sink.
//!
use common::protocol::TickMsg;
use futures::StreamExt;
use stability_classifier::{Event, StabilityClassifier};
use tokio_stream::wrappers::ReceiverStream;

use crate::{
    meter::METER,
    sink::{ElementBoard, EventSink},
    TickReceiver,
};

/// Outcome of a finished session.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionSummary {
    pub ticks: u64,
    pub rejected: u64,
    pub events: Vec<Event>,
    pub target: Option<String>,
    pub board: ElementBoard,
}

pub struct Session {
    classifier: StabilityClassifier,
    sink: Box<dyn EventSink + Send>,
    started: bool,
    ticks: u64,
    rejected: u64,
    events: Vec<Event>,
}

impl Session {
    pub fn new(classifier: StabilityClassifier, sink: Box<dyn EventSink + Send>) -> Self {
        Self {
            classifier,
            sink,
            started: false,
            ticks: 0,
            rejected: 0,
            events: Vec::new(),
        }
    }

    /// Pick the first target when the page has one. Runs once, implicitly
    /// before the first tick if not called.
    pub fn start(&mut self, now_ms: u64) {
        if self.started {
            return;
        }
        self.started = true;

        if self.classifier.config().hold_to_complete().is_some() {
            match self.classifier.advance_target(now_ms) {
                Ok(events) => self.dispatch(events),
                Err(e) => log::warn!("Failed to pick a first target: {e}"),
            }
        }
    }

    /// Run one tick through the classifier. Malformed ticks are skipped.
    pub fn handle_tick(&mut self, tick: &TickMsg) {
        self.start(tick.time_ms);

        match self.classifier.on_scores(&tick.scores, tick.time_ms) {
            Ok(events) => {
                self.ticks += 1;
                METER.tick();
                self.dispatch(events);
            }
            Err(e) => {
                log::warn!("Skipping tick at {}ms: {}", tick.time_ms, e);
                self.rejected += 1;
                METER.tick_rejected();
            }
        }
    }

    /// Consume ticks until every sender is gone.
    pub async fn run(mut self, rx: TickReceiver) -> SessionSummary {
        let mut ticks = ReceiverStream::new(rx);
        while let Some(tick) = ticks.next().await {
            self.handle_tick(&tick);
        }

        log::info!(
            "Session ended after {} ticks ({} rejected), board: {}",
            self.ticks,
            self.rejected,
            self.sink.board()
        );
        self.summary()
    }

    pub fn classifier(&self) -> &StabilityClassifier {
        &self.classifier
    }

    pub fn board(&self) -> &ElementBoard {
        self.sink.board()
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            ticks: self.ticks,
            rejected: self.rejected,
            events: self.events.clone(),
            target: self.classifier.target().map(str::to_owned),
            board: self.sink.board().clone(),
        }
    }

    fn dispatch(&mut self, events: impl IntoIterator<Item = Event>) {
        let mut count = 0;
        for event in events {
            log::info!("{event}");
            self.sink.handle(&event);
            self.events.push(event);
            count += 1;
        }
        METER.add_events(count);
    }
}
