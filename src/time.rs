//! Wall-clock tick driver.
//!
//! The host scheduler calls the engine on whatever cadence it likes
//! (display refresh, a timer, a test loop). `TickDriver` turns each call
//! into the elapsed seconds since its own previous call, so accumulation
//! stays exact whatever the call frequency and however many frames drop.

pub struct TickDriver {
    /// Timestamp of the last update (ms), None before the first call.
    last_timestamp: Option<f64>,
}

impl TickDriver {
    pub fn new() -> Self {
        Self {
            last_timestamp: None,
        }
    }

    /// Feed a wall-clock timestamp (from `performance.now()` or similar).
    /// Returns elapsed seconds since the previous call; the first call
    /// after construction or [`reset`](Self::reset) returns 0.
    pub fn update(&mut self, now_ms: f64) -> f64 {
        let delta = match self.last_timestamp {
            Some(prev) => ((now_ms - prev) / 1000.0).max(0.0),
            None => 0.0,
        };
        self.last_timestamp = Some(now_ms);
        delta
    }

    /// Forget the previous timestamp. Called after a state load so time
    /// spent not running is never credited retroactively.
    pub fn reset(&mut self) {
        self.last_timestamp = None;
    }
}

impl Default for TickDriver {
    fn default() -> Self {
        Self::new()
    }
}
