//! Quiet writers.
//!
//! A quiet writer wraps a sink and never lets a write error escape:
//! failures are reported to the owning appender's error handler and the
//! write is treated as complete. The counting variant additionally
//! tracks how many bytes reached the sink, which is what a rolling file
//! appender bases its rotation decision on.

use std::io::{self, Write};
use std::sync::Arc;

use crate::error_handler::ErrorHandler;

/// A writer that routes errors to an error handler instead of returning
/// them.
pub struct QuietWriter<W: Write> {
    inner: W,
    handler: Arc<dyn ErrorHandler>,
}

impl<W: Write> QuietWriter<W> {
    /// Wraps `inner`, reporting failures to `handler`.
    pub fn new(inner: W, handler: Arc<dyn ErrorHandler>) -> QuietWriter<W> {
        QuietWriter { inner, handler }
    }

    /// Returns the wrapped sink.
    pub fn into_inner(self) -> W {
        self.inner
    }

    fn report(&self, error: io::Error) {
        self.handler
            .error("failed to write to appender sink", Some(&error.into()), None);
    }
}

impl<W: Write> Write for QuietWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.inner.write_all(buf) {
            Ok(()) => Ok(buf.len()),
            Err(error) => {
                self.report(error);
                // The caller sees success; the handler saw the failure.
                Ok(buf.len())
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Err(error) = self.inner.flush() {
            self.report(error);
        }
        Ok(())
    }
}

/// A [`QuietWriter`] that counts the bytes written through it.
pub struct CountingQuietWriter<W: Write> {
    inner: QuietWriter<W>,
    count: u64,
}

impl<W: Write> CountingQuietWriter<W> {
    /// Wraps `inner`, reporting failures to `handler`.
    pub fn new(inner: W, handler: Arc<dyn ErrorHandler>) -> CountingQuietWriter<W> {
        CountingQuietWriter {
            inner: QuietWriter::new(inner, handler),
            count: 0,
        }
    }

    /// Bytes written so far.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Resets the byte count, typically after reopening the sink.
    pub fn set_count(&mut self, count: u64) {
        self.count = count;
    }

    /// Returns the wrapped sink.
    pub fn into_inner(self) -> W {
        self.inner.into_inner()
    }
}

impl<W: Write> Write for CountingQuietWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.count += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::event::LoggingEvent;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct CountingHandler {
        calls: AtomicUsize,
    }

    impl ErrorHandler for CountingHandler {
        fn error(&self, _: &str, _: Option<&anyhow::Error>, _: Option<&LoggingEvent>) {
            self.calls.fetch_add(1, Ordering::Relaxed);
        }
    }

    struct FailingSink;

    impl Write for FailingSink {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "down"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn failures_go_to_the_handler() {
        let handler = Arc::new(CountingHandler::default());
        let mut writer = QuietWriter::new(FailingSink, handler.clone());
        assert!(writer.write_all(b"lost").is_ok());
        assert_eq!(handler.calls.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn counts_bytes() {
        let handler = Arc::new(CountingHandler::default());
        let mut writer = CountingQuietWriter::new(Vec::new(), handler);
        writer.write_all(b"12345").unwrap();
        writer.write_all(b"678").unwrap();
        assert_eq!(writer.count(), 8);
        assert_eq!(writer.into_inner(), b"12345678");
    }
}
