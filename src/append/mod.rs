//! Appenders.
//!
//! An appender is an output sink strategy: the thing that actually
//! writes an event somewhere. Every appender carries a name, an optional
//! layout, an optional level threshold, an ordered filter chain and an
//! error handler; [`AppenderSkeleton`] bundles that shared state so
//! concrete appenders embed it by composition and implement only their
//! write strategy.

use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard, RwLock};

use crate::error_handler::{ErrorHandler, OnlyOnceErrorHandler};
use crate::event::LoggingEvent;
use crate::filter::{Decision, Filter};
use crate::internal;
use crate::layout::Layout;
use crate::level::Level;

pub mod async_appender;
pub mod console;
pub mod file;
pub mod rolling_file;
#[cfg(unix)]
pub mod syslog;
pub mod writer;

pub use self::async_appender::AsyncAppender;
pub use self::console::ConsoleAppender;
pub use self::file::FileAppender;
pub use self::rolling_file::RollingFileAppender;
#[cfg(unix)]
pub use self::syslog::SyslogAppender;

/// A trait implemented by log4g appenders.
///
/// The entry point is [`do_append`](Append::do_append), whose default
/// implementation provides the full dispatch protocol: it serializes on
/// the appender's lock, refuses closed appenders, applies the threshold
/// and the filter chain, invokes [`append`](Append::append) and routes
/// any failure to the error handler. Concrete appenders implement
/// [`append`](Append::append) and [`close`](Append::close) and expose
/// their embedded [`AppenderSkeleton`].
pub trait Append: fmt::Debug + Send + Sync + 'static {
    /// Returns the shared appender state embedded in this appender.
    fn skeleton(&self) -> &AppenderSkeleton;

    /// The concrete write strategy.
    ///
    /// Called with the appender lock held; failures are routed to the
    /// error handler by [`do_append`](Append::do_append).
    fn append(&self, event: &LoggingEvent) -> anyhow::Result<()>;

    /// Releases the appender's resources. Idempotent.
    ///
    /// A closed appender drops subsequent events with an internal error.
    fn close(&self);

    /// Whether this appender is useless without a layout.
    fn requires_layout(&self) -> bool {
        true
    }

    /// Dispatches one event through the appender.
    fn do_append(&self, event: &LoggingEvent) {
        let skeleton = self.skeleton();
        let _guard = skeleton.lock();
        if skeleton.is_closed() {
            internal::error(format_args!(
                "attempted to append to closed appender named [{}]",
                skeleton.name().unwrap_or_default()
            ));
            return;
        }
        if !skeleton.is_as_severe_as(event.level()) {
            return;
        }
        if skeleton.decide(event) == Decision::Deny {
            return;
        }
        if let Err(error) = self.append(event) {
            skeleton
                .error_handler()
                .error("failed to append logging event", Some(&error), Some(event));
        }
    }

    /// Returns this appender's attachment surface, if it forwards to
    /// nested appenders.
    fn as_attachable(&self) -> Option<&dyn AppenderAttachable> {
        None
    }
}

/// The state shared by every appender, embedded by composition.
pub struct AppenderSkeleton {
    name: RwLock<Option<String>>,
    layout: RwLock<Option<Arc<dyn Layout>>>,
    threshold: RwLock<Option<Level>>,
    filters: RwLock<Vec<Arc<dyn Filter>>>,
    error_handler: RwLock<Arc<dyn ErrorHandler>>,
    closed: RwLock<bool>,
    // Serializes do_append against close; the field locks above are only
    // ever held briefly.
    lock: Mutex<()>,
}

impl Default for AppenderSkeleton {
    fn default() -> AppenderSkeleton {
        AppenderSkeleton::new()
    }
}

impl fmt::Debug for AppenderSkeleton {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_struct("AppenderSkeleton")
            .field("name", &*self.name.read())
            .field("layout", &*self.layout.read())
            .field("threshold", &*self.threshold.read())
            .field("closed", &*self.closed.read())
            .finish()
    }
}

impl AppenderSkeleton {
    /// Creates a fresh skeleton with an [`OnlyOnceErrorHandler`].
    pub fn new() -> AppenderSkeleton {
        AppenderSkeleton {
            name: RwLock::new(None),
            layout: RwLock::new(None),
            threshold: RwLock::new(None),
            filters: RwLock::new(Vec::new()),
            error_handler: RwLock::new(Arc::new(OnlyOnceErrorHandler::new())),
            closed: RwLock::new(false),
            lock: Mutex::new(()),
        }
    }

    /// Takes the appender lock.
    pub fn lock(&self) -> MutexGuard<'_, ()> {
        self.lock.lock()
    }

    /// Returns the appender's name.
    pub fn name(&self) -> Option<String> {
        self.name.read().clone()
    }

    /// Sets the appender's name.
    pub fn set_name(&self, name: &str) {
        *self.name.write() = Some(name.to_owned());
    }

    /// Returns the appender's layout.
    pub fn layout(&self) -> Option<Arc<dyn Layout>> {
        self.layout.read().clone()
    }

    /// Sets the appender's layout.
    pub fn set_layout(&self, layout: Arc<dyn Layout>) {
        *self.layout.write() = Some(layout);
    }

    /// Returns the appender's threshold level.
    pub fn threshold(&self) -> Option<Level> {
        *self.threshold.read()
    }

    /// Sets the appender's threshold level.
    pub fn set_threshold(&self, threshold: Option<Level>) {
        *self.threshold.write() = threshold;
    }

    /// Returns `true` if `level` passes the threshold.
    pub fn is_as_severe_as(&self, level: Level) -> bool {
        match *self.threshold.read() {
            Some(threshold) => level.is_greater_or_equal(&threshold),
            None => true,
        }
    }

    /// Appends a filter to the end of the chain.
    pub fn add_filter(&self, filter: Arc<dyn Filter>) {
        self.filters.write().push(filter);
    }

    /// Returns the head of the filter chain.
    pub fn first_filter(&self) -> Option<Arc<dyn Filter>> {
        self.filters.read().first().cloned()
    }

    /// Releases the whole filter chain.
    pub fn clear_filters(&self) {
        self.filters.write().clear();
    }

    /// Walks the filter chain: the leftmost non-neutral decision wins,
    /// and an empty or all-neutral chain accepts.
    pub fn decide(&self, event: &LoggingEvent) -> Decision {
        for filter in self.filters.read().iter() {
            match filter.decide(event) {
                Decision::Neutral => continue,
                decision => return decision,
            }
        }
        Decision::Neutral
    }

    /// Returns the appender's error handler.
    pub fn error_handler(&self) -> Arc<dyn ErrorHandler> {
        self.error_handler.read().clone()
    }

    /// Replaces the appender's error handler.
    pub fn set_error_handler(&self, handler: Arc<dyn ErrorHandler>) {
        *self.error_handler.write() = handler;
    }

    /// Returns `true` if the appender has been closed.
    pub fn is_closed(&self) -> bool {
        *self.closed.read()
    }

    /// Marks the appender closed.
    ///
    /// Returns `false` if it was already closed, making double-close a
    /// no-op for callers.
    pub fn mark_closed(&self) -> bool {
        let mut closed = self.closed.write();
        if *closed {
            false
        } else {
            *closed = true;
            true
        }
    }

    /// Applies a property every appender understands, reporting unknown
    /// names against `target`.
    ///
    /// Concrete appenders fall through to this from their own
    /// `set_property` implementations. `threshold` takes a level name;
    /// `layout` takes a named `<object>` reference.
    pub fn set_common_property(
        &self,
        target: &str,
        name: &str,
        value: crate::registry::PropertyValue,
    ) -> Result<(), crate::error::ConfigError> {
        use crate::error::ConfigError;
        use crate::registry::PropertyValue;
        match name {
            "threshold" => {
                let value = value.into_string(target, name)?;
                self.set_threshold(Some(crate::config::property::to_level(name, &value)?));
                Ok(())
            }
            "layout" => match value {
                PropertyValue::Object(object) => {
                    self.set_layout(object.into_layout(name)?);
                    Ok(())
                }
                PropertyValue::String(value) => Err(ConfigError::invalid_value(
                    name,
                    &value,
                    "expected a reference to a layout <object>",
                )),
            },
            _ => Err(ConfigError::UnknownProperty {
                target: target.to_owned(),
                name: name.to_owned(),
            }),
        }
    }
}

/// The interface of appenders that forward to nested appenders, and of
/// loggers.
pub trait AppenderAttachable {
    /// Attaches an appender. Attaching the same appender twice is a
    /// silent no-op.
    fn add_appender(&self, appender: Arc<dyn Append>);

    /// Detaches an appender by identity.
    fn remove_appender(&self, appender: &Arc<dyn Append>);

    /// Detaches an appender by name, returning it if it was attached.
    fn remove_appender_by_name(&self, name: &str) -> Option<Arc<dyn Append>>;

    /// Detaches all appenders.
    fn remove_all_appenders(&self);

    /// Returns the attached appender with the given name.
    fn get_appender(&self, name: &str) -> Option<Arc<dyn Append>>;

    /// Returns all attached appenders.
    fn get_all_appenders(&self) -> Vec<Arc<dyn Append>>;

    /// Returns `true` if `appender` is attached, by identity.
    fn is_attached(&self, appender: &Arc<dyn Append>) -> bool;
}

/// An ordered list of appenders with identity-based attachment.
///
/// Backs the [`AppenderAttachable`] implementations of `Logger` and
/// `AsyncAppender`.
#[derive(Default)]
pub struct AppenderList {
    appenders: RwLock<Vec<Arc<dyn Append>>>,
}

impl fmt::Debug for AppenderList {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        let names: Vec<Option<String>> = self
            .appenders
            .read()
            .iter()
            .map(|a| a.skeleton().name())
            .collect();
        fmt.debug_struct("AppenderList").field("appenders", &names).finish()
    }
}

impl AppenderList {
    /// Creates an empty list.
    pub fn new() -> AppenderList {
        AppenderList::default()
    }

    /// Adds `appender` unless the same instance is already present.
    pub fn add(&self, appender: Arc<dyn Append>) {
        let mut appenders = self.appenders.write();
        if !appenders.iter().any(|a| Arc::ptr_eq(a, &appender)) {
            appenders.push(appender);
        }
    }

    /// Removes `appender` by identity.
    pub fn remove(&self, appender: &Arc<dyn Append>) {
        self.appenders.write().retain(|a| !Arc::ptr_eq(a, appender));
    }

    /// Removes the appender named `name`, returning it.
    pub fn remove_by_name(&self, name: &str) -> Option<Arc<dyn Append>> {
        let mut appenders = self.appenders.write();
        let index = appenders
            .iter()
            .position(|a| a.skeleton().name().as_deref() == Some(name))?;
        Some(appenders.remove(index))
    }

    /// Removes every appender.
    pub fn clear(&self) {
        self.appenders.write().clear();
    }

    /// Returns the appender named `name`.
    pub fn find(&self, name: &str) -> Option<Arc<dyn Append>> {
        self.appenders
            .read()
            .iter()
            .find(|a| a.skeleton().name().as_deref() == Some(name))
            .cloned()
    }

    /// Returns a snapshot of the list.
    pub fn all(&self) -> Vec<Arc<dyn Append>> {
        self.appenders.read().clone()
    }

    /// Returns `true` if `appender` is present, by identity.
    pub fn contains(&self, appender: &Arc<dyn Append>) -> bool {
        self.appenders
            .read()
            .iter()
            .any(|a| Arc::ptr_eq(a, appender))
    }

    /// Invokes `do_append` on every appender, returning how many were
    /// invoked.
    pub fn append_all(&self, event: &LoggingEvent) -> usize {
        let appenders = self.all();
        for appender in &appenders {
            appender.do_append(event);
        }
        appenders.len()
    }
}

#[cfg(test)]
pub(crate) mod test_util {
    use super::*;

    /// An appender that records the events it receives.
    #[derive(Debug, Default)]
    pub struct VecAppender {
        skeleton: AppenderSkeleton,
        pub events: Mutex<Vec<LoggingEvent>>,
    }

    impl VecAppender {
        pub fn new() -> Arc<VecAppender> {
            Arc::new(VecAppender::default())
        }

        pub fn named(name: &str) -> Arc<VecAppender> {
            let appender = VecAppender::default();
            appender.skeleton.set_name(name);
            Arc::new(appender)
        }

        pub fn messages(&self) -> Vec<String> {
            self.events
                .lock()
                .iter()
                .map(|e| e.message().to_owned())
                .collect()
        }
    }

    impl Append for VecAppender {
        fn skeleton(&self) -> &AppenderSkeleton {
            &self.skeleton
        }

        fn append(&self, event: &LoggingEvent) -> anyhow::Result<()> {
            self.events.lock().push(event.clone());
            Ok(())
        }

        fn close(&self) {
            self.skeleton.mark_closed();
        }

        fn requires_layout(&self) -> bool {
            false
        }
    }
}

#[cfg(test)]
mod test {
    use super::test_util::VecAppender;
    use super::*;
    use crate::filter::{DenyAllFilter, LevelRangeFilter};

    fn event(level: Level) -> LoggingEvent {
        LoggingEvent::new("a", level, "m".to_owned(), None)
    }

    #[test]
    fn threshold_gates_events() {
        let appender = VecAppender::new();
        appender.skeleton().set_threshold(Some(Level::WARN));
        appender.do_append(&event(Level::INFO));
        appender.do_append(&event(Level::ERROR));
        assert_eq!(appender.events.lock().len(), 1);
    }

    #[test]
    fn filter_chain_leftmost_decision_wins() {
        let appender = VecAppender::new();
        appender.skeleton().add_filter(Arc::new(LevelRangeFilter::new(
            Some(Level::INFO),
            Some(Level::WARN),
            true,
        )));
        appender
            .skeleton()
            .add_filter(Arc::new(DenyAllFilter::new()));

        appender.do_append(&event(Level::WARN));
        appender.do_append(&event(Level::ERROR));
        appender.do_append(&event(Level::DEBUG));
        assert_eq!(appender.events.lock().len(), 1);
        assert_eq!(appender.events.lock()[0].level(), Level::WARN);
    }

    #[test]
    fn closed_appender_drops_events() {
        let appender = VecAppender::new();
        appender.do_append(&event(Level::INFO));
        appender.close();
        appender.close();
        appender.do_append(&event(Level::INFO));
        assert_eq!(appender.events.lock().len(), 1);
    }

    #[test]
    fn list_add_is_idempotent() {
        let list = AppenderList::new();
        let appender: Arc<dyn Append> = VecAppender::named("x");
        list.add(appender.clone());
        list.add(appender.clone());
        assert_eq!(list.all().len(), 1);
        assert!(list.contains(&appender));

        assert!(list.find("x").is_some());
        assert!(list.remove_by_name("x").is_some());
        assert!(list.all().is_empty());
    }
}
