use std::time::{Duration, Instant};

use lifeglow::session::Generation;

const REPORT_EVERY: Duration = Duration::from_millis(500);

/// Rolling generations-per-second meter for the footer and headless logs
pub struct RateRecord {
    total: u64,
    reseeds: u64,
    gens_in_report: u64,
    last_report: Instant,
    rate: f64,
}
impl RateRecord {
    pub fn new() -> Self {
        Self {
            total: 0,
            reseeds: 0,
            gens_in_report: 0,
            last_report: Instant::now(),
            rate: 0.0,
        }
    }

    pub fn record(&mut self, generation: Generation) {
        self.total += 1;
        self.gens_in_report += 1;
        if generation.reseeded.is_some() {
            self.reseeds += 1;
        }
    }

    pub fn has_report(&self) -> bool {
        self.last_report.elapsed() >= REPORT_EVERY
    }

    /// Recomputes the rate and resets the window
    pub fn roll(&mut self) -> f64 {
        self.rate = self.gens_in_report as f64 / self.last_report.elapsed().as_secs_f64();
        self.last_report = Instant::now();
        self.gens_in_report = 0;
        self.rate
    }

    pub fn total(&self) -> u64 {
        self.total
    }
    pub fn reseeds(&self) -> u64 {
        self.reseeds
    }
    pub fn rate(&self) -> f64 {
        self.rate
    }
}
