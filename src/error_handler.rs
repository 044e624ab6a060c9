//! Appender error handling.
//!
//! Failures inside an appender are routed to the appender's error
//! handler and never to the caller of a logging method. The default
//! handler reports the first failure to the internal diagnostic channel
//! and suppresses the rest, so a broken sink cannot flood the process.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::append::Append;
use crate::event::LoggingEvent;
use crate::internal;
use crate::logger::Logger;

/// A trait implemented by appender error handlers.
pub trait ErrorHandler: fmt::Debug + Send + Sync + 'static {
    /// Reports a failure inside an appender.
    ///
    /// `event` is the event being appended when the failure occurred, if
    /// any.
    fn error(&self, message: &str, error: Option<&anyhow::Error>, event: Option<&LoggingEvent>);

    /// Tells a richer handler which logger the failing appender serves.
    ///
    /// The default implementation does nothing.
    fn set_logger(&self, logger: Arc<Logger>) {
        let _ = logger;
    }

    /// Tells a richer handler which appender it is guarding.
    ///
    /// The default implementation does nothing.
    fn set_appender(&self, appender: Arc<dyn Append>) {
        let _ = appender;
    }

    /// Tells a richer handler where to divert events on failure.
    ///
    /// The default implementation does nothing.
    fn set_backup_appender(&self, appender: Arc<dyn Append>) {
        let _ = appender;
    }
}

/// The default error handler.
///
/// Emits the first error it sees to the internal diagnostic channel and
/// silently ignores all subsequent errors.
#[derive(Debug, Default)]
pub struct OnlyOnceErrorHandler {
    seen: AtomicBool,
}

impl OnlyOnceErrorHandler {
    /// Creates a new handler that has not yet reported.
    pub fn new() -> OnlyOnceErrorHandler {
        OnlyOnceErrorHandler::default()
    }
}

impl ErrorHandler for OnlyOnceErrorHandler {
    fn error(&self, message: &str, error: Option<&anyhow::Error>, _event: Option<&LoggingEvent>) {
        if self.seen.swap(true, Ordering::Relaxed) {
            return;
        }
        match error {
            Some(error) => internal::error(format_args!("{}: {}", message, error)),
            None => internal::error(format_args!("{}", message)),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[derive(Debug, Default)]
    struct CountingHandler {
        calls: AtomicUsize,
    }

    impl ErrorHandler for CountingHandler {
        fn error(&self, _: &str, _: Option<&anyhow::Error>, _: Option<&LoggingEvent>) {
            self.calls.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn only_once_reports_once() {
        let handler = OnlyOnceErrorHandler::new();
        handler.error("boom", None, None);
        handler.error("boom again", None, None);
        // The "seen" flag is all that is observable without capturing
        // stderr; the second call must leave it set.
        assert!(handler.seen.load(Ordering::Relaxed));
    }

    #[test]
    fn custom_handlers_count_every_call() {
        let handler = CountingHandler::default();
        handler.error("a", None, None);
        handler.error("b", None, None);
        assert_eq!(handler.calls.load(Ordering::Relaxed), 2);
    }
}
