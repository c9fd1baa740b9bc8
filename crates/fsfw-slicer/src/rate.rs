//! Sliding-window rate tracker.
//!
//! Each slice owns one tracker. Admitted calls are recorded with their
//! timestamp; records older than the window fall out. A call is admitted
//! while the number of records in the window is below `rate * window`.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Default target rate, in messages per second.
pub const DEFAULT_RATE: u32 = 100;

/// Default window width.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(1);

/// Windowed rate limiter shared by all execution contexts of a slice.
#[derive(Debug)]
pub struct RateTracker {
    rate: AtomicU32,
    window: Duration,
    history: Mutex<VecDeque<Instant>>,
}

impl RateTracker {
    /// Creates a tracker admitting `rate` messages per second over `window`.
    ///
    /// A zero window is widened to one millisecond.
    pub fn new(rate: u32, window: Duration) -> Self {
        Self {
            rate: AtomicU32::new(rate),
            window: window.max(Duration::from_millis(1)),
            history: Mutex::new(VecDeque::new()),
        }
    }

    /// Returns the target rate in messages per second.
    pub fn rate(&self) -> u32 {
        self.rate.load(Ordering::Acquire)
    }

    /// Changes the target rate. Recorded history is kept.
    pub fn set_rate(&self, rate: u32) {
        self.rate.store(rate, Ordering::Release);
    }

    /// Returns the window width.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Admits one message now if the window budget allows it.
    pub fn admit(&self) -> bool {
        self.admit_at(Instant::now())
    }

    /// Admits one message at `now` if the window budget allows it.
    pub fn admit_at(&self, now: Instant) -> bool {
        let budget = self.budget();
        let mut history = self.history.lock();
        Self::expire(&mut history, now, self.window);

        if history.len() >= budget {
            return false;
        }
        history.push_back(now);
        true
    }

    /// Measured rate over the window ending now, in messages per second.
    pub fn current_rate(&self) -> f64 {
        self.current_rate_at(Instant::now())
    }

    /// Measured rate over the window ending at `now`, in messages per second.
    pub fn current_rate_at(&self, now: Instant) -> f64 {
        let mut history = self.history.lock();
        Self::expire(&mut history, now, self.window);
        history.len() as f64 / self.window.as_secs_f64()
    }

    fn budget(&self) -> usize {
        let rate = self.rate();
        if rate == 0 {
            return 0;
        }
        (f64::from(rate) * self.window.as_secs_f64()).ceil().max(1.0) as usize
    }

    fn expire(history: &mut VecDeque<Instant>, now: Instant, window: Duration) {
        while let Some(oldest) = history.front() {
            if now.saturating_duration_since(*oldest) < window {
                break;
            }
            history.pop_front();
        }
    }
}

impl Default for RateTracker {
    fn default() -> Self {
        Self::new(DEFAULT_RATE, DEFAULT_WINDOW)
    }
}
