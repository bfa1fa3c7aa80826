use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::{Duration, Instant},
};

use tokio::{task::JoinHandle, time::interval};

pub static METER: Meter = Meter::new();

#[derive(Default)]
pub struct Meter {
    ticks: AtomicU64,
    rejected_ticks: AtomicU64,
    events: AtomicU64,
}

impl Meter {
    pub const fn new() -> Meter {
        Meter {
            ticks: AtomicU64::new(0),
            rejected_ticks: AtomicU64::new(0),
            events: AtomicU64::new(0),
        }
    }

    pub fn tick(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn tick_rejected(&self) {
        self.rejected_ticks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_events(&self, count: u64) {
        self.events.fetch_add(count, Ordering::Relaxed);
    }

    pub fn get_reset_ticks(&self) -> u64 {
        self.ticks.swap(0, Ordering::Relaxed)
    }

    pub fn get_reset_rejected(&self) -> u64 {
        self.rejected_ticks.swap(0, Ordering::Relaxed)
    }

    pub fn get_reset_events(&self) -> u64 {
        self.events.swap(0, Ordering::Relaxed)
    }
}

pub fn spawn_meter_logger() -> JoinHandle<()> {
    tokio::spawn(async {
        let mut log_interval = interval(Duration::from_secs(2));
        log_interval.tick().await;

        loop {
            let start = Instant::now();
            log_interval.tick().await;

            let ticks = METER.get_reset_ticks();
            let rejected = METER.get_reset_rejected();
            let events = METER.get_reset_events();
            let elapsed = start.elapsed().as_secs_f32();
            let tick_rate = ticks as f32 / elapsed;

            if ticks > 0 {
                log::info!("Ticks per second: {tick_rate:.2}, events: {events}")
            }
            if rejected > 0 {
                log::warn!("Rejected {rejected} malformed ticks")
            }
        }
    })
}
