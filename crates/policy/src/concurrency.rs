//! Per-agent concurrency gate.
//!
//! A lazily-created counting semaphore per agent. The configured capacity is
//! captured on first use; the config snapshot is immutable, so the capacity
//! never needs to change afterwards. Enforcement is opt-in: a tool that wants
//! to bound its own in-flight work acquires the gate around that work.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Semaphore;

#[derive(Default)]
pub struct ConcurrencyGate {
    semaphores: Mutex<HashMap<String, Arc<Semaphore>>>,
}

impl ConcurrencyGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get (or create) the agent's semaphore with the given capacity.
    pub fn semaphore(&self, agent_id: &str, capacity: usize) -> Arc<Semaphore> {
        let mut semaphores = self.semaphores.lock();
        semaphores
            .entry(agent_id.to_string())
            .or_insert_with(|| Arc::new(Semaphore::new(capacity)))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_agent_gets_same_semaphore() {
        let gate = ConcurrencyGate::new();
        let a = gate.semaphore("agent-x", 2);
        let b = gate.semaphore("agent-x", 2);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn capacity_bounds_permits() {
        let gate = ConcurrencyGate::new();
        let sem = gate.semaphore("agent-x", 2);
        let p1 = sem.try_acquire().unwrap();
        let _p2 = sem.try_acquire().unwrap();
        assert!(sem.try_acquire().is_err());
        drop(p1);
        assert!(sem.try_acquire().is_ok());
    }

    #[test]
    fn agents_have_independent_gates() {
        let gate = ConcurrencyGate::new();
        let a = gate.semaphore("agent-x", 1);
        let _permit = a.try_acquire().unwrap();
        let b = gate.semaphore("agent-y", 1);
        assert!(b.try_acquire().is_ok());
    }
}
