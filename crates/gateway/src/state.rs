use std::sync::Arc;

use ag_domain::config::Config;
use ag_plugins::PluginRegistry;
use ag_policy::{AuthResolver, PolicyEngine};

/// Shared application state passed to all handlers.
///
/// Everything here is built once at startup and read-only afterwards; the
/// mutable per-agent counters live inside the policy engine behind their
/// own locks.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub auth: Arc<AuthResolver>,
    pub policy: Arc<PolicyEngine>,
    pub plugins: Arc<PluginRegistry>,
}
