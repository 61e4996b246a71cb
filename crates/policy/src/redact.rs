//! Secret redaction for log output.
//!
//! An ordered list of regex patterns, each substituted with a fixed marker.
//! The gateway applies the redactor to every formatted log record before it
//! reaches the output stream; any sink that bypasses that writer must
//! reapply the same patterns.

use regex::Regex;

use ag_domain::error::{Error, Result};

/// Replacement literal for every pattern match.
pub const REDACTED: &str = "***REDACTED***";

pub struct Redactor {
    patterns: Vec<Regex>,
}

impl Redactor {
    /// Compile the pattern list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] on the first invalid pattern; redaction is
    /// a security control, so a partially-working filter is not acceptable.
    pub fn new(patterns: &[String]) -> Result<Self> {
        let compiled = patterns
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|e| Error::Config(format!("invalid redact pattern '{p}': {e}")))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns: compiled })
    }

    /// Apply every pattern in order, replacing matches with [`REDACTED`].
    pub fn redact(&self, text: &str) -> String {
        let mut out = text.to_string();
        for pattern in &self.patterns {
            out = pattern.replace_all(&out, REDACTED).into_owned();
        }
        out
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
