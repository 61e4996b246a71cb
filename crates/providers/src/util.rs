//! Shared helpers for provider adapters.

use ag_domain::error::{Error, Result};
use serde_json::Value;

/// Convert a [`reqwest::Error`] into the domain [`Error`] type.
///
/// Timeout errors map to [`Error::Timeout`]; everything else maps to
/// [`Error::Http`].
pub(crate) fn from_reqwest(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout(e.to_string())
    } else {
        Error::Http(e.to_string())
    }
}

/// Check the response status and decode the JSON body.
///
/// Non-2xx responses become [`Error::Provider`] with a truncated body
/// excerpt; upstream bodies can be large and are not worth logging whole.
pub(crate) async fn expect_json(resp: reqwest::Response, provider: &str) -> Result<Value> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        let excerpt: String = body.chars().take(300).collect();
        return Err(Error::Provider {
            provider: provider.to_string(),
            message: format!("HTTP {status}: {excerpt}"),
        });
    }
    resp.json::<Value>().await.map_err(from_reqwest)
}
