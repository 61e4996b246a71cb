//! Structured JSON logging with secret redaction.
//!
//! Records are formatted by `tracing-subscriber`'s JSON layer into a
//! per-event buffer, redacted, and only then written to stdout. The
//! redactor therefore sees the record after formatting but before
//! transport, covering the message and every structured field.

use std::io::{self, Write};
use std::sync::Arc;

use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

use ag_policy::Redactor;

/// Install the global subscriber: JSON records through the redacting writer.
pub fn init_tracing(redactor: Arc<Redactor>) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,ag_gateway=debug")),
        )
        .json()
        .with_writer(RedactingMakeWriter::new(redactor))
        .init();
}

#[derive(Clone)]
pub struct RedactingMakeWriter {
    redactor: Arc<Redactor>,
}

impl RedactingMakeWriter {
    pub fn new(redactor: Arc<Redactor>) -> Self {
        Self { redactor }
    }
}

impl<'a> MakeWriter<'a> for RedactingMakeWriter {
    type Writer = RedactingWriter<io::Stdout>;

    fn make_writer(&'a self) -> Self::Writer {
        RedactingWriter::new(self.redactor.clone(), io::stdout())
    }
}

/// Buffers one log event, redacts it on flush, then forwards it.
pub struct RedactingWriter<W: Write> {
    redactor: Arc<Redactor>,
    buf: Vec<u8>,
    inner: W,
}

impl<W: Write> RedactingWriter<W> {
    pub fn new(redactor: Arc<Redactor>, inner: W) -> Self {
        Self {
            redactor,
            buf: Vec::new(),
            inner,
        }
    }

    fn flush_buf(&mut self) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        let text = String::from_utf8_lossy(&self.buf);
        let redacted = self.redactor.redact(&text);
        self.buf.clear();
        self.inner.write_all(redacted.as_bytes())
    }
}

impl<W: Write> Write for RedactingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flush_buf()?;
        self.inner.flush()
    }
}

impl<W: Write> Drop for RedactingWriter<W> {
    fn drop(&mut self) {
        let _ = self.flush_buf();
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use ag_domain::config::Config;

    #[derive(Clone, Default)]
    struct Sink(Arc<Mutex<Vec<u8>>>);

    impl Write for Sink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn redactor() -> Arc<Redactor> {
        Arc::new(Redactor::new(&Config::default().redact_patterns).unwrap())
    }

    #[test]
    fn secrets_are_redacted_before_the_sink() {
        let sink = Sink::default();
        {
            let mut writer = RedactingWriter::new(redactor(), sink.clone());
            writer
                .write_all(b"{\"message\":\"key=sk-abcdefghijklmnopqrstuvwxyz\"}\n")
                .unwrap();
        }
        let out = String::from_utf8(sink.0.lock().unwrap().clone()).unwrap();
        assert!(!out.contains("sk-abcdefghijklmnopqrstuvwxyz"));
        assert!(out.contains("***REDACTED***"));
    }

    #[test]
    fn clean_records_pass_through_unchanged() {
        let sink = Sink::default();
        {
            let mut writer = RedactingWriter::new(redactor(), sink.clone());
            writer.write_all(b"{\"message\":\"hello\"}\n").unwrap();
        }
        let out = String::from_utf8(sink.0.lock().unwrap().clone()).unwrap();
        assert_eq!(out, "{\"message\":\"hello\"}\n");
    }

    #[test]
    fn partial_writes_assemble_one_record() {
        let sink = Sink::default();
        {
            let mut writer = RedactingWriter::new(redactor(), sink.clone());
            writer.write_all(b"Bearer secret").unwrap();
            writer.write_all(b"-token-abc\n").unwrap();
        }
        let out = String::from_utf8(sink.0.lock().unwrap().clone()).unwrap();
        assert!(!out.contains("secret-token-abc"));
    }
}
