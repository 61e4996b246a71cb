//! Bearer-token authentication: token → [`AgentIdentity`].
//!
//! Tokens are hashed with SHA-256 at startup and probes are compared against
//! **every** stored digest with a constant-time equality check. Hashing to a
//! fixed-length digest removes token-length leakage; visiting every entry
//! removes match-position leakage.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use ag_domain::config::Config;
use ag_domain::types::AgentIdentity;

/// Resolves pre-shared bearer tokens to agent identities.
///
/// Built once from the startup config snapshot; read-only afterwards.
pub struct AuthResolver {
    entries: Vec<([u8; 32], AgentIdentity)>,
}

impl AuthResolver {
    pub fn new(config: &Config) -> Self {
        let mut entries = Vec::with_capacity(config.agents.len());
        for (agent_id, agent_cfg) in &config.agents {
            if agent_cfg.token.is_empty() {
                continue;
            }
            let digest: [u8; 32] = Sha256::digest(agent_cfg.token.as_bytes()).into();
            entries.push((
                digest,
                AgentIdentity {
                    agent_id: agent_id.clone(),
                    tenant_id: agent_cfg.tenant_id.clone(),
                },
            ));
        }
        Self { entries }
    }

    /// Resolve a bearer token, or `None` for unknown or empty tokens.
    ///
    /// The loop must not break on a match: every stored digest is compared
    /// so resolution time does not depend on which entry (if any) matched.
    pub fn resolve(&self, token: &str) -> Option<AgentIdentity> {
        if token.is_empty() {
            return None;
        }
        let probe: [u8; 32] = Sha256::digest(token.as_bytes()).into();
        let mut matched: Option<&AgentIdentity> = None;
        for (digest, identity) in &self.entries {
            if bool::from(digest.as_slice().ct_eq(probe.as_slice())) {
                matched = Some(identity);
            }
        }
        matched.cloned()
    }

    /// Number of indexed tokens.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// Manual Debug impl so token digests never reach log output.
impl std::fmt::Debug for AuthResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthResolver")
            .field("token_count", &self.entries.len())
            .finish()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;
    use ag_domain::config::AgentConfig;

    fn config_with_agents(agents: &[(&str, &str, &str)]) -> Config {
        let mut config = Config::default();
        for (agent_id, token, tenant) in agents {
            config.agents.insert(
                (*agent_id).into(),
                AgentConfig {
                    token: (*token).into(),
                    tenant_id: (*tenant).into(),
                    ..AgentConfig::default()
                },
            );
        }
        config
    }

    #[test]
    fn resolves_valid_token() {
        let config = config_with_agents(&[("agent-alpha", "token-alpha-secret", "team-a")]);
        let auth = AuthResolver::new(&config);
        let identity = auth.resolve("token-alpha-secret").unwrap();
        assert_eq!(identity.agent_id, "agent-alpha");
        assert_eq!(identity.tenant_id, "team-a");
    }

    #[test]
    fn resolves_each_of_several_tokens() {
        let config = config_with_agents(&[
            ("agent-alpha", "token-alpha-secret", "team-a"),
            ("agent-beta", "token-beta-secret", "team-b"),
        ]);
        let auth = AuthResolver::new(&config);
        assert_eq!(
            auth.resolve("token-beta-secret").unwrap().agent_id,
            "agent-beta"
        );
        assert_eq!(
            auth.resolve("token-alpha-secret").unwrap().agent_id,
            "agent-alpha"
        );
    }

    #[test]
    fn invalid_token_is_none() {
        let config = config_with_agents(&[("agent-alpha", "token-alpha-secret", "team-a")]);
        let auth = AuthResolver::new(&config);
        assert!(auth.resolve("invalid-token").is_none());
    }

    #[test]
    fn empty_token_is_none() {
        let config = config_with_agents(&[("agent-alpha", "token-alpha-secret", "team-a")]);
        let auth = AuthResolver::new(&config);
        assert!(auth.resolve("").is_none());
    }

    #[test]
    fn shared_prefix_tokens_resolve_distinctly() {
        // Two tokens that differ only in the last byte must still map to
        // their own agents, and a probe sharing the long prefix must fail.
        let config = config_with_agents(&[
            ("agent-a", "token-shared-prefix-aaaaaaaa-1", "t"),
            ("agent-b", "token-shared-prefix-aaaaaaaa-2", "t"),
        ]);
        let auth = AuthResolver::new(&config);
        assert_eq!(
            auth.resolve("token-shared-prefix-aaaaaaaa-1").unwrap().agent_id,
            "agent-a"
        );
        assert_eq!(
            auth.resolve("token-shared-prefix-aaaaaaaa-2").unwrap().agent_id,
            "agent-b"
        );
        assert!(auth.resolve("token-shared-prefix-aaaaaaaa-3").is_none());
    }

    #[test]
    fn agents_without_tokens_are_not_indexed() {
        let config = config_with_agents(&[("agent-a", "", "t")]);
        let auth = AuthResolver::new(&config);
        assert!(auth.is_empty());
        assert!(auth.resolve("").is_none());
    }

    #[test]
    fn debug_does_not_leak_tokens() {
        let config = config_with_agents(&[("agent-a", "super-secret-token", "t")]);
        let auth = AuthResolver::new(&config);
        let debug = format!("{auth:?}");
        assert!(!debug.contains("super-secret-token"));
        assert!(debug.contains("token_count"));
    }
}
