//! Logging events.
//!
//! A [`LoggingEvent`] is the immutable record of one log occurrence. It
//! is created by a [`Logger`](crate::logger::Logger) once enablement has
//! been decided and handed to every appender along the hierarchy walk.

use std::borrow::Cow;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use lazy_static::lazy_static;

use crate::level::Level;
use crate::{mdc, ndc, thread};

lazy_static! {
    static ref START: SystemTime = SystemTime::now();
}

/// Returns the process-wide instant the framework came up.
///
/// Layouts use this as the zero point for relative timestamps.
pub fn start_time() -> SystemTime {
    *START
}

pub(crate) fn capture_start_time() {
    lazy_static::initialize(&START);
}

#[cfg(not(target_family = "wasm"))]
fn current_thread_id() -> usize {
    thread_id::get()
}

#[cfg(target_family = "wasm")]
fn current_thread_id() -> usize {
    0
}

/// The source position a logging call was made from.
#[derive(Clone, Debug)]
pub struct LocationInfo {
    function: Cow<'static, str>,
    file: Cow<'static, str>,
    line: u32,
}

impl LocationInfo {
    /// Creates a new location.
    pub fn new(
        function: impl Into<Cow<'static, str>>,
        file: impl Into<Cow<'static, str>>,
        line: u32,
    ) -> LocationInfo {
        LocationInfo {
            function: function.into(),
            file: file.into(),
            line,
        }
    }

    /// The function or module path the call was made from.
    pub fn function(&self) -> &str {
        &self.function
    }

    /// The source file the call was made from.
    pub fn file(&self) -> &str {
        &self.file
    }

    /// The source line the call was made from.
    pub fn line(&self) -> u32 {
        self.line
    }
}

/// The immutable record of one log occurrence.
///
/// All fields are captured at construction on the emitting thread, with
/// one exception: the MDC is a lazy view over the thread's live map.
/// Before an event crosses a thread boundary (a buffering appender, for
/// example) the diagnostic context must be pinned with [`freeze`].
///
/// [`freeze`]: LoggingEvent::freeze
#[derive(Clone, Debug)]
pub struct LoggingEvent {
    logger: String,
    level: Level,
    message: String,
    timestamp: SystemTime,
    thread_name: String,
    thread_id: usize,
    location: Option<LocationInfo>,
    ndc: Option<String>,
    mdc: Option<Vec<(String, String)>>,
}

impl LoggingEvent {
    /// Creates an event for `logger` at `level`.
    ///
    /// The timestamp, thread identity and NDC snapshot are taken from the
    /// calling thread at this moment.
    pub fn new(
        logger: &str,
        level: Level,
        message: String,
        location: Option<LocationInfo>,
    ) -> LoggingEvent {
        LoggingEvent {
            logger: logger.to_owned(),
            level,
            message,
            timestamp: SystemTime::now(),
            thread_name: thread::name(),
            thread_id: current_thread_id(),
            location,
            ndc: ndc::get(),
            mdc: None,
        }
    }

    /// The name of the logger the event was emitted through.
    pub fn logger_name(&self) -> &str {
        &self.logger
    }

    /// The severity of the event.
    pub fn level(&self) -> Level {
        self.level
    }

    /// The rendered message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The wall-clock time the event was created.
    pub fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    /// The event time as seconds and microseconds since the epoch.
    pub fn timestamp_parts(&self) -> (i64, u32) {
        match self.timestamp.duration_since(UNIX_EPOCH) {
            Ok(elapsed) => (elapsed.as_secs() as i64, elapsed.subsec_micros()),
            Err(err) => {
                let elapsed = err.duration();
                (-(elapsed.as_secs() as i64), elapsed.subsec_micros())
            }
        }
    }

    /// Milliseconds between framework startup and this event.
    pub fn relative_millis(&self) -> u64 {
        self.timestamp
            .duration_since(start_time())
            .unwrap_or(Duration::ZERO)
            .as_millis() as u64
    }

    /// The display name of the emitting thread.
    pub fn thread_name(&self) -> &str {
        &self.thread_name
    }

    /// The identifier of the emitting thread.
    pub fn thread_id(&self) -> usize {
        self.thread_id
    }

    /// The source position of the logging call, if captured.
    pub fn location(&self) -> Option<&LocationInfo> {
        self.location.as_ref()
    }

    /// The nested diagnostic context rendered at creation.
    pub fn ndc(&self) -> Option<&str> {
        self.ndc.as_deref()
    }

    /// Looks up `key` in the mapped diagnostic context.
    ///
    /// Reads the frozen copy if [`freeze`](LoggingEvent::freeze) has been
    /// called, otherwise the calling thread's live map.
    pub fn mdc(&self, key: &str) -> Option<String> {
        match &self.mdc {
            Some(pairs) => pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone()),
            None => mdc::get(key),
        }
    }

    /// Returns a copy of the mapped diagnostic context.
    pub fn mdc_snapshot(&self) -> Vec<(String, String)> {
        match &self.mdc {
            Some(pairs) => pairs.clone(),
            None => mdc::snapshot(),
        }
    }

    /// Pins the diagnostic context into the event.
    ///
    /// Must be called on the emitting thread before the event is handed
    /// to another thread.
    pub fn freeze(&mut self) {
        if self.mdc.is_none() {
            self.mdc = Some(mdc::snapshot());
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn captures_thread_and_ndc() {
        ndc::clear();
        ndc::push("ctx");
        let event = LoggingEvent::new("a.b", Level::INFO, "hi".to_owned(), None);
        assert_eq!(event.logger_name(), "a.b");
        assert_eq!(event.level(), Level::INFO);
        assert_eq!(event.message(), "hi");
        assert_eq!(event.ndc(), Some("ctx"));
        assert!(!event.thread_name().is_empty());
        ndc::clear();
    }

    #[test]
    fn frozen_mdc_survives_thread_hop() {
        mdc::clear();
        mdc::put("user", "alice");
        let mut event = LoggingEvent::new("a", Level::WARN, "x".to_owned(), None);
        event.freeze();
        mdc::clear();

        std::thread::spawn(move || {
            assert_eq!(event.mdc("user").as_deref(), Some("alice"));
        })
        .join()
        .unwrap();
    }

    #[test]
    fn lazy_mdc_reads_live_map() {
        mdc::clear();
        let event = LoggingEvent::new("a", Level::WARN, "x".to_owned(), None);
        mdc::put("late", "yes");
        assert_eq!(event.mdc("late").as_deref(), Some("yes"));
        mdc::clear();
    }
}
