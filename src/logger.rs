//! Loggers.
//!
//! A logger is a named node in the hierarchy. Applications obtain
//! loggers from the [`manager`](crate::manager) by dotted name and emit
//! events through them; each event then travels up the hierarchy,
//! invoking the appenders attached along the way until a non-additive
//! logger (or the root) stops the walk.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::append::{Append, AppenderAttachable, AppenderList};
use crate::event::{LocationInfo, LoggingEvent};
use crate::hierarchy::Hierarchy;
use crate::internal;
use crate::level::Level;

/// A named node of the logger hierarchy.
pub struct Logger {
    name: String,
    is_root: bool,
    level: RwLock<Option<Level>>,
    additivity: AtomicBool,
    parent: RwLock<Option<Arc<Logger>>>,
    appenders: AppenderList,
    repository: RwLock<Weak<Hierarchy>>,
}

impl fmt::Debug for Logger {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_struct("Logger")
            .field("name", &self.name)
            .field("level", &*self.level.read())
            .field("additivity", &self.additivity.load(Ordering::Relaxed))
            .finish()
    }
}

impl Logger {
    /// Creates a detached logger.
    ///
    /// Loggers are normally created through the repository, which links
    /// them into the hierarchy; this constructor is the hook for
    /// [`LoggerFactory`] implementations.
    pub fn new(name: &str) -> Arc<Logger> {
        Arc::new(Logger {
            name: name.to_owned(),
            is_root: false,
            level: RwLock::new(None),
            additivity: AtomicBool::new(true),
            parent: RwLock::new(None),
            appenders: AppenderList::new(),
            repository: RwLock::new(Weak::new()),
        })
    }

    /// Creates a root logger.
    ///
    /// The root always has a level; attempts to unset it are rejected.
    pub fn new_root(level: Level) -> Arc<Logger> {
        Arc::new(Logger {
            name: "root".to_owned(),
            is_root: true,
            level: RwLock::new(Some(level)),
            additivity: AtomicBool::new(true),
            parent: RwLock::new(None),
            appenders: AppenderList::new(),
            repository: RwLock::new(Weak::new()),
        })
    }

    /// Returns the logger's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the logger's own level, if one is set.
    pub fn level(&self) -> Option<Level> {
        *self.level.read()
    }

    /// Sets or unsets the logger's level.
    ///
    /// Unsetting the root logger's level is rejected with a warning.
    pub fn set_level(&self, level: Option<Level>) {
        if self.is_root && level.is_none() {
            internal::warn(format_args!(
                "you have tried to set a null level to root"
            ));
            return;
        }
        *self.level.write() = level;
    }

    /// Resolves the level in effect for this logger.
    ///
    /// Walks towards the root until a logger with a set level is found.
    /// The walk always terminates: the hierarchy is a tree and the root
    /// is guaranteed a level.
    pub fn effective_level(&self) -> Level {
        if let Some(level) = *self.level.read() {
            return level;
        }
        let mut node = self.parent();
        while let Some(logger) = node {
            if let Some(level) = logger.level() {
                return level;
            }
            node = logger.parent();
        }
        internal::error(format_args!(
            "no level found for logger [{}]; broken hierarchy?",
            self.name
        ));
        Level::DEBUG
    }

    /// Returns the additivity flag.
    pub fn additivity(&self) -> bool {
        self.additivity.load(Ordering::Relaxed)
    }

    /// Sets the additivity flag.
    ///
    /// A non-additive logger stops the appender walk: ancestors'
    /// appenders no longer receive events emitted through this logger.
    pub fn set_additivity(&self, additivity: bool) {
        self.additivity.store(additivity, Ordering::Relaxed);
    }

    /// Returns the logger's parent, or `None` for the root.
    pub fn parent(&self) -> Option<Arc<Logger>> {
        self.parent.read().clone()
    }

    pub(crate) fn set_parent(&self, parent: Arc<Logger>) {
        *self.parent.write() = Some(parent);
    }

    /// Returns the repository this logger belongs to.
    pub fn repository(&self) -> Option<Arc<Hierarchy>> {
        self.repository.read().upgrade()
    }

    pub(crate) fn set_repository(&self, repository: Weak<Hierarchy>) {
        *self.repository.write() = repository;
    }

    /// Returns `true` if an event at `level` would be dispatched.
    ///
    /// Checks the repository threshold first, then the effective level.
    pub fn is_enabled_for(&self, level: Level) -> bool {
        if let Some(repository) = self.repository() {
            if repository.is_disabled(level.rank()) {
                return false;
            }
        }
        level.is_greater_or_equal(&self.effective_level())
    }

    /// Logs a pre-formatted message at `level` with a source location.
    ///
    /// Returns without constructing an event if `level` is not enabled.
    pub fn log_at(&self, level: Level, args: fmt::Arguments, location: Option<LocationInfo>) {
        if !self.is_enabled_for(level) {
            return;
        }
        let event = LoggingEvent::new(&self.name, level, args.to_string(), location);
        self.call_appenders(&event);
    }

    /// Logs a message at `level`.
    pub fn log<M: fmt::Display>(&self, level: Level, message: M) {
        self.log_at(level, format_args!("{}", message), None);
    }

    /// Logs a message at `TRACE`.
    pub fn trace<M: fmt::Display>(&self, message: M) {
        self.log(Level::TRACE, message);
    }

    /// Logs a message at `DEBUG`.
    pub fn debug<M: fmt::Display>(&self, message: M) {
        self.log(Level::DEBUG, message);
    }

    /// Logs a message at `INFO`.
    pub fn info<M: fmt::Display>(&self, message: M) {
        self.log(Level::INFO, message);
    }

    /// Logs a message at `WARN`.
    pub fn warn<M: fmt::Display>(&self, message: M) {
        self.log(Level::WARN, message);
    }

    /// Logs a message at `ERROR`.
    pub fn error<M: fmt::Display>(&self, message: M) {
        self.log(Level::ERROR, message);
    }

    /// Logs a message at `FATAL`.
    pub fn fatal<M: fmt::Display>(&self, message: M) {
        self.log(Level::FATAL, message);
    }

    /// Dispatches an event to the appenders of this logger and its
    /// ancestors, honoring additivity.
    pub fn call_appenders(&self, event: &LoggingEvent) {
        let mut invoked = self.appenders.append_all(event);
        if self.additivity() {
            let mut node = self.parent();
            while let Some(logger) = node {
                invoked += logger.appenders.append_all(event);
                if !logger.additivity() {
                    break;
                }
                node = logger.parent();
            }
        }
        if invoked == 0 {
            if let Some(repository) = self.repository() {
                repository.emit_no_appender_warning(&self.name);
            }
        }
    }

    /// Closes every appender attached to this logger.
    pub fn close_nested_appenders(&self) {
        for appender in self.appenders.all() {
            appender.close();
        }
    }
}

impl AppenderAttachable for Logger {
    fn add_appender(&self, appender: Arc<dyn Append>) {
        self.appenders.add(appender);
    }

    fn remove_appender(&self, appender: &Arc<dyn Append>) {
        self.appenders.remove(appender);
    }

    fn remove_appender_by_name(&self, name: &str) -> Option<Arc<dyn Append>> {
        self.appenders.remove_by_name(name)
    }

    fn remove_all_appenders(&self) {
        self.appenders.clear();
    }

    fn get_appender(&self, name: &str) -> Option<Arc<dyn Append>> {
        self.appenders.find(name)
    }

    fn get_all_appenders(&self) -> Vec<Arc<dyn Append>> {
        self.appenders.all()
    }

    fn is_attached(&self, appender: &Arc<dyn Append>) -> bool {
        self.appenders.contains(appender)
    }
}

/// A trait for factories that instantiate loggers on behalf of the
/// repository.
pub trait LoggerFactory: Send + Sync {
    /// Creates a fresh, unlinked logger named `name`.
    fn make_new_logger_instance(&self, name: &str) -> Arc<Logger>;
}

/// The factory used when no other is supplied.
#[derive(Debug, Default)]
pub struct DefaultLoggerFactory;

impl LoggerFactory for DefaultLoggerFactory {
    fn make_new_logger_instance(&self, name: &str) -> Arc<Logger> {
        Logger::new(name)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::append::test_util::VecAppender;

    #[test]
    fn effective_level_walks_parents() {
        let root = Logger::new_root(Level::WARN);
        let a = Logger::new("a");
        let b = Logger::new("a.b");
        a.set_parent(root.clone());
        b.set_parent(a.clone());

        assert_eq!(b.effective_level(), Level::WARN);
        a.set_level(Some(Level::TRACE));
        assert_eq!(b.effective_level(), Level::TRACE);
        b.set_level(Some(Level::ERROR));
        assert_eq!(b.effective_level(), Level::ERROR);
    }

    #[test]
    fn enablement_is_monotone() {
        let root = Logger::new_root(Level::INFO);
        let logger = Logger::new("a");
        logger.set_parent(root);

        assert!(!logger.is_enabled_for(Level::DEBUG));
        assert!(logger.is_enabled_for(Level::INFO));
        assert!(logger.is_enabled_for(Level::ERROR));
    }

    #[test]
    fn root_level_cannot_be_unset() {
        let root = Logger::new_root(Level::INFO);
        root.set_level(None);
        assert_eq!(root.level(), Some(Level::INFO));
        root.set_level(Some(Level::ERROR));
        assert_eq!(root.level(), Some(Level::ERROR));
    }

    #[test]
    fn additivity_stops_the_walk() {
        let root = Logger::new_root(Level::DEBUG);
        let a = Logger::new("a");
        let b = Logger::new("a.b");
        a.set_parent(root.clone());
        b.set_parent(a.clone());

        let on_root = VecAppender::new();
        let on_a = VecAppender::new();
        root.add_appender(on_root.clone());
        a.add_appender(on_a.clone());

        b.info("first");
        assert_eq!(on_a.messages(), vec!["first"]);
        assert_eq!(on_root.messages(), vec!["first"]);

        a.set_additivity(false);
        b.info("second");
        assert_eq!(on_a.messages(), vec!["first", "second"]);
        assert_eq!(on_root.messages(), vec!["first"]);
    }

    #[test]
    fn disabled_levels_do_not_reach_appenders() {
        let root = Logger::new_root(Level::WARN);
        let appender = VecAppender::new();
        root.add_appender(appender.clone());
        root.info("quiet");
        root.error("loud");
        assert_eq!(appender.messages(), vec!["loud"]);
    }

    #[test]
    fn double_add_leaves_list_unchanged() {
        let root = Logger::new_root(Level::DEBUG);
        let appender: Arc<dyn Append> = VecAppender::named("x");
        root.add_appender(appender.clone());
        root.add_appender(appender.clone());
        assert_eq!(root.get_all_appenders().len(), 1);
        root.remove_appender(&appender);
        assert!(root.get_all_appenders().is_empty());
    }
}
