//! The log manager.
//!
//! A process-wide singleton tying the pieces together: it owns the
//! current logger repository and the module loader, both created lazily
//! on first use. The free functions here are the everyday API; most
//! callers never touch the manager itself.

use std::sync::Arc;

use lazy_static::lazy_static;
use parking_lot::{Mutex, RwLock};

use crate::hierarchy::Hierarchy;
use crate::level::Level;
use crate::logger::{Logger, LoggerFactory};
use crate::module::{DefaultModuleLoader, ModuleLoader};

lazy_static! {
    static ref INSTANCE: RwLock<Option<Arc<LogManager>>> = RwLock::new(None);
}

/// Serializes unit tests that reconfigure the global repository.
#[cfg(test)]
pub(crate) static GLOBAL_TEST_LOCK: Mutex<()> = Mutex::new(());

/// The process-wide manager of the logger repository.
pub struct LogManager {
    repository: RwLock<Arc<Hierarchy>>,
    loader: Mutex<DefaultModuleLoader>,
}

impl LogManager {
    fn new() -> Arc<LogManager> {
        let root = Logger::new_root(Level::DEBUG);
        Arc::new(LogManager {
            repository: RwLock::new(Hierarchy::new(root)),
            loader: Mutex::new(DefaultModuleLoader::new()),
        })
    }

    /// Returns the current logger repository.
    pub fn repository(&self) -> Arc<Hierarchy> {
        self.repository.read().clone()
    }

    /// Replaces the logger repository.
    ///
    /// Used by configurators that install a custom repository; the old
    /// repository keeps any loggers handed out from it.
    pub fn set_repository(&self, repository: Arc<Hierarchy>) {
        *self.repository.write() = repository;
    }
}

/// Returns the singleton manager, creating it on first use.
///
/// Creation captures the framework start time and loads any plug-in
/// modules found on the module path.
pub fn instance() -> Arc<LogManager> {
    if let Some(manager) = INSTANCE.read().as_ref() {
        return manager.clone();
    }
    let manager = {
        let mut guard = INSTANCE.write();
        if let Some(manager) = guard.as_ref() {
            return manager.clone();
        }
        let manager = LogManager::new();
        *guard = Some(manager.clone());
        manager
    };
    crate::event::capture_start_time();
    manager.loader.lock().load_modules();
    manager
}

/// Tears down the singleton. Intended for test harnesses.
pub fn remove_instance() {
    *INSTANCE.write() = None;
}

/// Returns the logger named `name`, creating it if necessary.
pub fn get_logger(name: &str) -> Arc<Logger> {
    instance().repository().get_logger(name)
}

/// Returns the logger named `name`, creating it through `factory` if
/// necessary.
pub fn get_logger_with_factory(name: &str, factory: &dyn LoggerFactory) -> Arc<Logger> {
    instance().repository().get_logger_with_factory(name, factory)
}

/// Returns the root logger.
pub fn root_logger() -> Arc<Logger> {
    instance().repository().root()
}

/// Returns the logger named `name` if it already exists.
pub fn exists(name: &str) -> Option<Arc<Logger>> {
    instance().repository().exists(name)
}

/// Returns every logger currently instantiated.
pub fn current_loggers() -> Vec<Arc<Logger>> {
    instance().repository().current_loggers()
}

/// Closes every appender in the current repository.
///
/// A no-op if the framework was never used.
pub fn shutdown() {
    if let Some(manager) = INSTANCE.read().as_ref() {
        manager.repository().shutdown();
    }
}

/// Resets the current repository to its unconfigured state.
pub fn reset_configuration() {
    if let Some(manager) = INSTANCE.read().as_ref() {
        manager.repository().reset_configuration();
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn loggers_come_from_one_repository() {
        let a = get_logger("manager.test.a");
        let again = get_logger("manager.test.a");
        assert!(Arc::ptr_eq(&a, &again));
        assert!(exists("manager.test.a").is_some());
        assert!(current_loggers()
            .iter()
            .any(|l| l.name() == "manager.test.a"));
    }

    #[test]
    fn root_is_shared() {
        let root = root_logger();
        assert_eq!(root.name(), "root");
        assert!(Arc::ptr_eq(&root, &instance().repository().root()));
    }
}
