//! Per-agent LLM cost tracking with daily rotation.
//!
//! [`BudgetTracker`] keeps one `(day_index, spent_usd)` pair per agent where
//! `day_index = floor(unix_seconds / 86400)`. A stored entry from an earlier
//! day counts as zero spend; the stored day advances on the first `record`
//! of the new day. Nothing persists across restarts.

use std::collections::HashMap;

use chrono::Utc;
use parking_lot::Mutex;

struct DayBudget {
    day: i64,
    spent: f64,
}

/// Thread-safe per-agent daily cost accumulator.
///
/// `check` never mutates; `record` is purely additive. Enforcing the cap is
/// the policy engine's job.
#[derive(Default)]
pub struct BudgetTracker {
    budgets: Mutex<HashMap<String, DayBudget>>,
}

impl BudgetTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn current_day() -> i64 {
        Utc::now().timestamp().div_euclid(86_400)
    }

    /// Remaining budget for today, clamped at zero.
    pub fn check(&self, agent_id: &str, max_cost_per_day: f64) -> f64 {
        self.check_on_day(agent_id, max_cost_per_day, Self::current_day())
    }

    /// Record a cost charge against today's budget.
    pub fn record(&self, agent_id: &str, cost: f64) {
        self.record_on_day(agent_id, cost, Self::current_day());
    }

    /// Total recorded spend for today.
    pub fn spent_today(&self, agent_id: &str) -> f64 {
        self.spent_on_day(agent_id, Self::current_day())
    }

    fn check_on_day(&self, agent_id: &str, max_cost_per_day: f64, day: i64) -> f64 {
        let budgets = self.budgets.lock();
        match budgets.get(agent_id) {
            Some(b) if b.day == day => (max_cost_per_day - b.spent).max(0.0),
            _ => max_cost_per_day,
        }
    }

    fn record_on_day(&self, agent_id: &str, cost: f64, day: i64) {
        let mut budgets = self.budgets.lock();
        let entry = budgets
            .entry(agent_id.to_string())
            .or_insert(DayBudget { day, spent: 0.0 });
        if entry.day != day {
            entry.day = day;
            entry.spent = 0.0;
        }
        entry.spent += cost;
    }

    fn spent_on_day(&self, agent_id: &str, day: i64) -> f64 {
        let budgets = self.budgets.lock();
        match budgets.get(agent_id) {
            Some(b) if b.day == day => b.spent,
            _ => 0.0,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
