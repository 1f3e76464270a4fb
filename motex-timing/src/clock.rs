use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("invalid simulation rate: {0} Hz")]
pub struct InvalidRate(pub f64);

/// The deterministic simulation rate. All experiment timing is expressed in
/// whole ticks of this clock, never in display refreshes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimRate {
    hz: f64,
}

impl SimRate {
    pub fn new(hz: f64) -> Result<Self, InvalidRate> {
        if !hz.is_finite() || hz <= 0.0 {
            return Err(InvalidRate(hz));
        }
        Ok(Self { hz })
    }

    pub fn hz(&self) -> f64 {
        self.hz
    }

    pub fn dt(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.hz)
    }

    pub fn dt_secs(&self) -> f64 {
        1.0 / self.hz
    }

    /// Frame count for a millisecond duration: rounded, and never zero so
    /// that every scheduled interval occupies at least one tick.
    pub fn frames_for_ms(&self, ms: u64) -> u32 {
        let frames = (ms as f64 / 1000.0 * self.hz).round() as u32;
        frames.max(1)
    }
}

/// Fixed-step accumulator. Real elapsed time goes in, whole simulation ticks
/// come out; the fractional remainder is carried forward, so the tick count
/// over a span does not depend on how the span was chunked.
#[derive(Debug, Clone)]
pub struct FixedStep {
    dt: Duration,
    accumulated: Duration,
}

impl FixedStep {
    pub fn new(rate: SimRate) -> Self {
        Self {
            dt: rate.dt(),
            accumulated: Duration::ZERO,
        }
    }

    /// Consume `elapsed` wall time and return the number of whole ticks now
    /// due.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        self.accumulated += elapsed;
        let mut ticks = 0;
        while self.accumulated >= self.dt {
            self.accumulated -= self.dt;
            ticks += 1;
        }
        ticks
    }

    /// Drop any fractional residue. Used when simulation time must not have
    /// advanced across a pause, e.g. while waiting for the start event.
    pub fn reset(&mut self) {
        self.accumulated = Duration::ZERO;
    }
}
