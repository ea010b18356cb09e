//! Fixed-timestep game clock using an accumulator pattern.
//!
//! `draw_web()` calls at ~60fps with variable delta. `TickClock` turns that
//! into whole game ticks (one per second by default), so passive generation
//! is independent of frame rate and testable without a browser.

/// Largest frame gap honoured in one update. A tab returning from the
/// background catches up at most this much.
const MAX_FRAME_GAP_MS: f64 = 5_000.0;

pub struct TickClock {
    interval_ms: f64,
    /// Milliseconds not yet consumed as ticks.
    accumulator: f64,
    last_timestamp: Option<f64>,
}

impl TickClock {
    pub fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms: interval_ms.max(1) as f64,
            accumulator: 0.0,
            last_timestamp: None,
        }
    }

    /// Feed a wall-clock timestamp (`performance.now()`), returning how many
    /// ticks elapsed since the previous call.
    pub fn update(&mut self, now_ms: f64) -> u32 {
        let delta = match self.last_timestamp {
            Some(prev) => (now_ms - prev).clamp(0.0, MAX_FRAME_GAP_MS),
            None => 0.0,
        };
        self.last_timestamp = Some(now_ms);

        self.accumulator += delta;
        let ticks = (self.accumulator / self.interval_ms) as u32;
        self.accumulator -= ticks as f64 * self.interval_ms;
        ticks
    }
}
