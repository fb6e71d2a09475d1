//! Sliding 1-second message-rate window, shared by the transport read loop.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Tracks inbound-message timestamps within the trailing second and flags
/// when the per-connection rate cap is exceeded.
pub struct RateWindow {
    timestamps: VecDeque<Instant>,
    limit: usize,
}

impl RateWindow {
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            timestamps: VecDeque::new(),
            limit,
        }
    }

    /// Records an inbound message at `now` and reports whether the
    /// trailing-1s count now exceeds the configured limit.
    pub fn record(&mut self, now: Instant) -> bool {
        self.timestamps.push_back(now);
        while let Some(&front) = self.timestamps.front() {
            if now.duration_since(front) > Duration::from_secs(1) {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }
        self.timestamps.len() > self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_messages_under_the_limit() {
        let mut window = RateWindow::new(30);
        let now = Instant::now();
        for _ in 0..30 {
            assert!(!window.record(now));
        }
    }

    #[test]
    fn flags_when_limit_exceeded_within_one_second() {
        let mut window = RateWindow::new(30);
        let now = Instant::now();
        for _ in 0..30 {
            window.record(now);
        }
        assert!(window.record(now));
    }

    #[test]
    fn expires_old_entries_outside_the_window() {
        let mut window = RateWindow::new(2);
        let t0 = Instant::now();
        window.record(t0);
        window.record(t0);
        let t1 = t0 + Duration::from_millis(1100);
        assert!(!window.record(t1));
    }
}
