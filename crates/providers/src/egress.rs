//! Guarded outbound HTTP: a reqwest wrapper enforcing a host allowlist.
//!
//! Every request method checks the target host before any connection is
//! made. Matching is exact and case-insensitive on the URL's host component;
//! there is deliberately no suffix or wildcard matching, and ports and paths
//! play no part in the decision.

use std::collections::HashSet;
use std::time::Duration;

use ag_domain::error::{Error, Result};
use serde_json::Value;

use crate::util::from_reqwest;

/// An async HTTP client restricted to a fixed set of hostnames.
///
/// The allowlist is a per-client property: callers that need to reach
/// different hosts construct distinct clients.
pub struct GuardedHttpClient {
    allowlist: HashSet<String>,
    /// Sorted copy for error messages, so denials render deterministically.
    allowlist_display: Vec<String>,
    client: reqwest::Client,
}

impl GuardedHttpClient {
    pub fn new(allowlist: &[String], timeout: Duration) -> Result<Self> {
        let normalized: HashSet<String> =
            allowlist.iter().map(|h| h.to_ascii_lowercase()).collect();
        let mut display: Vec<String> = normalized.iter().cloned().collect();
        display.sort_unstable();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(from_reqwest)?;
        Ok(Self {
            allowlist: normalized,
            allowlist_display: display,
            client,
        })
    }

    /// Verify that `url` targets an allowlisted host.
    ///
    /// # Errors
    ///
    /// [`Error::EgressDenied`] (carrying the attempted host and the
    /// allowlist) on mismatch; no network I/O has happened at that point.
    pub fn check_url(&self, url: &str) -> Result<()> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|e| Error::Http(format!("invalid URL '{url}': {e}")))?;
        let host = parsed.host_str().unwrap_or("").to_ascii_lowercase();
        if !self.allowlist.contains(&host) {
            return Err(Error::EgressDenied {
                host,
                allowlist: self.allowlist_display.clone(),
            });
        }
        Ok(())
    }

    /// POST a JSON body with the given headers.
    pub async fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &Value,
    ) -> Result<reqwest::Response> {
        self.check_url(url)?;
        let mut request = self.client.post(url).json(body);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        request.send().await.map_err(from_reqwest)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    fn client(hosts: &[&str]) -> GuardedHttpClient {
        let hosts: Vec<String> = hosts.iter().map(|h| h.to_string()).collect();
        GuardedHttpClient::new(&hosts, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn allows_listed_host() {
        let c = client(&["api.openai.com"]);
        assert!(c
            .check_url("https://api.openai.com/v1/chat/completions")
            .is_ok());
    }

    #[test]
    fn blocks_unlisted_host_without_io() {
        let c = client(&["api.openai.com"]);
        let err = c.check_url("https://evil.example.com/path").unwrap_err();
        match err {
            Error::EgressDenied { host, allowlist } => {
                assert_eq!(host, "evil.example.com");
                assert_eq!(allowlist, vec!["api.openai.com"]);
            }
            other => panic!("expected EgressDenied, got {other:?}"),
        }
    }

    #[test]
    fn host_match_is_case_insensitive() {
        let c = client(&["API.OpenAI.com"]);
        assert!(c.check_url("https://api.openai.com/v1").is_ok());
        assert!(c.check_url("https://API.OPENAI.COM/v1").is_ok());
    }

    #[test]
    fn no_suffix_matching() {
        let c = client(&["openai.com"]);
        assert!(c.check_url("https://api.openai.com/v1").is_err());
    }

    #[test]
    fn port_and_path_are_ignored() {
        let c = client(&["localhost"]);
        assert!(c.check_url("http://localhost:11434/api/generate").is_ok());
    }

    #[test]
    fn invalid_url_is_rejected() {
        let c = client(&["api.openai.com"]);
        assert!(matches!(
            c.check_url("not a url").unwrap_err(),
            Error::Http(_)
        ));
    }

    #[tokio::test]
    async fn post_to_unlisted_host_fails_before_sending() {
        let c = client(&["api.openai.com"]);
        let err = c
            .post_json("https://evil.example.com/x", &[], &serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::EgressDenied { .. }));
    }
}
