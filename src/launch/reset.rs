//! Hidden multi-tap reset.
//!
//! N taps inside a sliding window clear the cached redirect and force a fresh
//! gate check. Reachable, but not advertised anywhere in the UI.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct TapReset {
    required: usize,
    window: Duration,
    taps: VecDeque<Instant>,
}

impl TapReset {
    pub fn new(required: usize, window: Duration) -> Self {
        Self {
            required,
            window,
            taps: VecDeque::with_capacity(required),
        }
    }

    /// Record a tap at `now`. Returns `true` when this tap completes the
    /// sequence; the counter then starts over.
    pub fn tap(&mut self, now: Instant) -> bool {
        if self.required == 0 {
            return false;
        }

        while let Some(&first) = self.taps.front() {
            if now.saturating_duration_since(first) > self.window {
                self.taps.pop_front();
            } else {
                break;
            }
        }

        self.taps.push_back(now);
        if self.taps.len() >= self.required {
            self.taps.clear();
            return true;
        }
        false
    }

    pub fn pending(&self) -> usize {
        self.taps.len()
    }
}
