//! Policy enforcement for the gateway: authentication, quotas, and the
//! engine that combines them into per-call allow/deny decisions.

pub mod auth;
pub mod budget;
pub mod concurrency;
pub mod engine;
pub mod rate_limit;
pub mod redact;

pub use auth::AuthResolver;
pub use budget::BudgetTracker;
pub use concurrency::ConcurrencyGate;
pub use engine::PolicyEngine;
pub use rate_limit::RateLimiter;
pub use redact::Redactor;
