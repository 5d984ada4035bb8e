//! Sliding-window admission limit for new submissions.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct AdmissionLimiter {
    limit: usize,
    window: Duration,
    admitted: VecDeque<Instant>,
}

impl AdmissionLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit: limit as usize,
            window,
            admitted: VecDeque::with_capacity(limit as usize),
        }
    }

    pub fn per_minute(limit: u32) -> Self {
        Self::new(limit, Duration::from_secs(60))
    }

    /// Admits one submission at `now`, or returns how long until a slot frees.
    pub fn try_acquire(&mut self, now: Instant) -> Result<(), Duration> {
        while let Some(oldest) = self.admitted.front() {
            if now.duration_since(*oldest) >= self.window {
                self.admitted.pop_front();
            } else {
                break;
            }
        }

        if self.admitted.len() < self.limit {
            self.admitted.push_back(now);
            return Ok(());
        }

        let oldest = self.admitted.front().copied().unwrap_or(now);
        Err(self.window.saturating_sub(now.duration_since(oldest)))
    }

    /// Returns the most recent admission's slot.
    pub fn refund(&mut self) {
        self.admitted.pop_back();
    }
}
