//! Build timing.

use std::time::{Duration, Instant};

/// Measures how long a named phase takes.
pub struct Timer {
    name: String,
    start: Instant,
}

impl Timer {
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start: Instant::now(),
        }
    }

    /// Stop the timer, log the elapsed time and return it.
    pub fn finish(self) -> Duration {
        let elapsed = self.start.elapsed();
        let secs = elapsed.as_secs_f64();
        if secs >= 60.0 {
            tracing::info!(phase = %self.name, "Finished in {:.1}m", secs / 60.0);
        } else {
            tracing::info!(phase = %self.name, "Finished in {:.1}s", secs);
        }
        elapsed
    }
}
