//! Per-agent sliding-window rate limiter.
//!
//! One ordered timestamp vector per agent; entries older than the window are
//! pruned in place on every `check`. `check` and `record` are separately
//! atomic; the policy engine calls `check` first and only `record`s when the
//! whole decision is an allow, so denied calls never inflate the window.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Width of the sliding window.
const WINDOW: Duration = Duration::from_secs(60);

/// Sliding-window rate limiter: at most `limit` requests per 60 seconds
/// per agent.
#[derive(Default)]
pub struct RateLimiter {
    windows: Mutex<HashMap<String, Vec<Instant>>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the agent has strictly fewer than `limit` requests in the
    /// current window. Prunes stale entries as a side effect.
    pub fn check(&self, agent_id: &str, limit: usize) -> bool {
        self.check_at(agent_id, limit, Instant::now())
    }

    /// Record a request timestamp for the agent.
    pub fn record(&self, agent_id: &str) {
        self.record_at(agent_id, Instant::now());
    }

    fn check_at(&self, agent_id: &str, limit: usize, now: Instant) -> bool {
        let mut windows = self.windows.lock();
        let window = windows.entry(agent_id.to_string()).or_default();
        window.retain(|t| now.saturating_duration_since(*t) < WINDOW);
        window.len() < limit
    }

    fn record_at(&self, agent_id: &str, now: Instant) {
        let mut windows = self.windows.lock();
        windows.entry(agent_id.to_string()).or_default().push(now);
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
