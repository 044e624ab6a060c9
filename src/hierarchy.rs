//! The logger repository.
//!
//! The hierarchy owns every logger in a process and maintains the tree
//! structure between them. Children link to their parents; parents do
//! not know their children. Descendants may be instantiated before
//! their ancestors: the vacant ancestor position is held by a provision
//! node listing the descendants, and is replaced by a real logger when
//! that name is eventually requested.

use std::sync::{Arc, Weak};

use arc_swap::ArcSwap;
use fnv::FnvHashMap;
use parking_lot::Mutex;

use crate::internal;
use crate::level::Level;
use crate::logger::{DefaultLoggerFactory, Logger, LoggerFactory};

/// One position in the name table: either a live logger or a provision
/// node holding the descendants of a not-yet-instantiated ancestor.
#[derive(Clone)]
enum Entry {
    Logger(Arc<Logger>),
    Provision(Vec<Arc<Logger>>),
}

struct Inner {
    table: FnvHashMap<String, Entry>,
    warned: bool,
}

/// The logger repository.
pub struct Hierarchy {
    // Handed to loggers as their repository back-reference.
    weak_self: Weak<Hierarchy>,
    root: Arc<Logger>,
    factory: Box<dyn LoggerFactory>,
    threshold: ArcSwap<Level>,
    inner: Mutex<Inner>,
}

impl Hierarchy {
    /// Creates a hierarchy owned by `root`.
    pub fn new(root: Arc<Logger>) -> Arc<Hierarchy> {
        let hierarchy = Arc::new_cyclic(|weak| Hierarchy {
            weak_self: weak.clone(),
            root: root.clone(),
            factory: Box::new(DefaultLoggerFactory),
            threshold: ArcSwap::from_pointee(Level::ALL),
            inner: Mutex::new(Inner {
                table: FnvHashMap::default(),
                warned: false,
            }),
        });
        root.set_repository(hierarchy.weak_self.clone());
        hierarchy
    }

    /// Returns the root logger.
    pub fn root(&self) -> Arc<Logger> {
        self.root.clone()
    }

    /// Returns the logger named `name` if it already exists.
    pub fn exists(&self, name: &str) -> Option<Arc<Logger>> {
        match self.inner.lock().table.get(name) {
            Some(Entry::Logger(logger)) => Some(logger.clone()),
            _ => None,
        }
    }

    /// Returns every logger currently instantiated.
    ///
    /// Provision nodes are placeholders, not loggers, and are skipped.
    pub fn current_loggers(&self) -> Vec<Arc<Logger>> {
        self.inner
            .lock()
            .table
            .values()
            .filter_map(|entry| match entry {
                Entry::Logger(logger) => Some(logger.clone()),
                Entry::Provision(_) => None,
            })
            .collect()
    }

    /// Returns the logger named `name`, creating it if necessary.
    pub fn get_logger(&self, name: &str) -> Arc<Logger> {
        self.get_logger_with_factory(name, &*self.factory)
    }

    /// Returns the logger named `name`, creating it through `factory` if
    /// necessary.
    pub fn get_logger_with_factory(
        &self,
        name: &str,
        factory: &dyn LoggerFactory,
    ) -> Arc<Logger> {
        let inner = &mut *self.inner.lock();
        if let Some(Entry::Logger(logger)) = inner.table.get(name) {
            return logger.clone();
        }
        let logger = factory.make_new_logger_instance(name);
        logger.set_repository(self.weak_self.clone());
        if let Some(Entry::Provision(children)) = inner
            .table
            .insert(name.to_owned(), Entry::Logger(logger.clone()))
        {
            Self::update_children(&children, &logger);
        }
        Self::update_parents(&mut inner.table, &self.root, &logger);
        logger
    }

    /// Links a freshly created logger to its nearest registered
    /// ancestor, planting provision nodes at the vacant positions in
    /// between.
    fn update_parents(
        table: &mut FnvHashMap<String, Entry>,
        root: &Arc<Logger>,
        logger: &Arc<Logger>,
    ) {
        let name = logger.name();
        let mut prefix = name;
        let mut found = false;
        while let Some(dot) = prefix.rfind('.') {
            prefix = &prefix[..dot];
            match table.get_mut(prefix) {
                Some(Entry::Logger(parent)) => {
                    logger.set_parent(parent.clone());
                    found = true;
                    break;
                }
                Some(Entry::Provision(children)) => children.push(logger.clone()),
                None => {
                    table.insert(prefix.to_owned(), Entry::Provision(vec![logger.clone()]));
                }
            }
        }
        if !found {
            logger.set_parent(root.clone());
        }
    }

    /// Slots a new logger between a provision node's children and their
    /// former parents.
    ///
    /// A child whose current parent already sits at or below the new
    /// logger keeps it; every other child is re-parented onto the new
    /// logger, which inherits the child's former parent as its own.
    fn update_children(children: &[Arc<Logger>], logger: &Arc<Logger>) {
        let name = logger.name();
        for child in children {
            let parent = child.parent();
            let keep = parent
                .as_ref()
                .map(|p| is_name_or_descendant(p.name(), name))
                .unwrap_or(false);
            if keep {
                continue;
            }
            if let Some(parent) = parent {
                logger.set_parent(parent);
            }
            child.set_parent(logger.clone());
        }
    }

    /// Returns the repository threshold.
    pub fn threshold(&self) -> Level {
        **self.threshold.load()
    }

    /// Sets the repository threshold; events below it are suppressed
    /// before any logger walk.
    pub fn set_threshold(&self, threshold: Level) {
        self.threshold.store(Arc::new(threshold));
    }

    /// Sets the threshold from a level name, warning on unknown names.
    pub fn set_threshold_str(&self, threshold: &str) {
        match Level::by_name(threshold) {
            Some(level) => self.set_threshold(level),
            None => internal::warn(format_args!(
                "could not convert [{}] to a level",
                threshold
            )),
        }
    }

    /// Returns `true` if the threshold suppresses `rank`.
    pub fn is_disabled(&self, rank: i32) -> bool {
        self.threshold.load().rank() > rank
    }

    /// Warns, once per configuration epoch, that a logger had no
    /// appender anywhere on its walk.
    pub fn emit_no_appender_warning(&self, name: &str) {
        let mut inner = self.inner.lock();
        if inner.warned {
            return;
        }
        inner.warned = true;
        internal::warn(format_args!(
            "no appenders could be found for logger ({})",
            name
        ));
        internal::warn(format_args!("please initialize the log4g system properly"));
    }

    /// Closes and detaches every appender in the repository.
    pub fn shutdown(&self) {
        use crate::append::AppenderAttachable;

        let loggers = self.current_loggers();
        self.root.close_nested_appenders();
        for logger in &loggers {
            logger.close_nested_appenders();
        }
        self.root.remove_all_appenders();
        for logger in &loggers {
            logger.remove_all_appenders();
        }
    }

    /// Returns the repository to its unconfigured state.
    ///
    /// The root level returns to `DEBUG`, the threshold to `ALL`, every
    /// appender is closed and detached, and every logger loses its own
    /// level and becomes additive again. The "no appenders" warning is
    /// re-armed for the new configuration epoch.
    pub fn reset_configuration(&self) {
        self.root.set_level(Some(Level::DEBUG));
        self.set_threshold(Level::ALL);
        self.shutdown();
        for logger in self.current_loggers() {
            logger.set_level(None);
            logger.set_additivity(true);
        }
        self.inner.lock().warned = false;
    }

    /// Forgets every logger, leaving only the root.
    pub fn clear(&self) {
        self.inner.lock().table.clear();
    }
}

/// Is `name` equal to `ancestor`, or a dotted descendant of it?
fn is_name_or_descendant(name: &str, ancestor: &str) -> bool {
    name == ancestor
        || (name.starts_with(ancestor) && name.as_bytes().get(ancestor.len()) == Some(&b'.'))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::append::test_util::VecAppender;
    use crate::append::{Append, AppenderAttachable};

    fn fresh() -> Arc<Hierarchy> {
        Hierarchy::new(Logger::new_root(Level::DEBUG))
    }

    fn parent_name(logger: &Arc<Logger>) -> String {
        logger.parent().map(|p| p.name().to_owned()).unwrap_or_default()
    }

    #[test]
    fn in_order_creation() {
        let hierarchy = fresh();
        let a = hierarchy.get_logger("a");
        let ab = hierarchy.get_logger("a.b");
        let abc = hierarchy.get_logger("a.b.c");

        assert_eq!(parent_name(&a), "root");
        assert_eq!(parent_name(&ab), "a");
        assert_eq!(parent_name(&abc), "a.b");
        assert!(Arc::ptr_eq(&hierarchy.get_logger("a.b"), &ab));
    }

    #[test]
    fn out_of_order_creation() {
        let hierarchy = fresh();
        let abc = hierarchy.get_logger("a.b.c");
        assert_eq!(parent_name(&abc), "root");

        let a = hierarchy.get_logger("a");
        assert_eq!(parent_name(&abc), "a");
        assert_eq!(parent_name(&a), "root");

        let ab = hierarchy.get_logger("a.b");
        assert_eq!(parent_name(&abc), "a.b");
        assert_eq!(parent_name(&ab), "a");
        assert_eq!(parent_name(&a), "root");
    }

    #[test]
    fn interleaved_creation_keeps_nearest_ancestor() {
        let hierarchy = fresh();
        let abc = hierarchy.get_logger("a.b.c");
        let ab = hierarchy.get_logger("a.b");
        assert_eq!(parent_name(&abc), "a.b");

        // "a" arrives last; a.b.c must keep its nearer parent a.b.
        let a = hierarchy.get_logger("a");
        assert_eq!(parent_name(&abc), "a.b");
        assert_eq!(parent_name(&ab), "a");
        assert_eq!(parent_name(&a), "root");
    }

    #[test]
    fn similar_prefixes_are_not_ancestors() {
        let hierarchy = fresh();
        let abc = hierarchy.get_logger("a.bx.c");
        let _ab = hierarchy.get_logger("a.b");
        // a.b is not an ancestor of a.bx.c.
        assert_eq!(parent_name(&abc), "root");

        let _abx = hierarchy.get_logger("a.bx");
        assert_eq!(parent_name(&abc), "a.bx");
    }

    #[test]
    fn parent_is_longest_registered_strict_prefix() {
        let hierarchy = fresh();
        hierarchy.get_logger("x");
        hierarchy.get_logger("x.y.z.w");
        hierarchy.get_logger("x.y.z");
        hierarchy.get_logger("x.y");

        for name in ["x.y.z.w", "x.y.z", "x.y", "x"] {
            let logger = hierarchy.exists(name).unwrap();
            let parent = parent_name(&logger);
            match name.rfind('.') {
                Some(dot) => assert_eq!(parent, &name[..dot]),
                None => assert_eq!(parent, "root"),
            }
        }
    }

    #[test]
    fn threshold_disables_below() {
        let hierarchy = fresh();
        hierarchy.set_threshold(Level::WARN);
        assert!(hierarchy.is_disabled(Level::INFO.rank()));
        assert!(!hierarchy.is_disabled(Level::WARN.rank()));

        let logger = hierarchy.get_logger("gated");
        assert!(!logger.is_enabled_for(Level::INFO));
        assert!(logger.is_enabled_for(Level::ERROR));
    }

    #[test]
    fn threshold_from_string() {
        let hierarchy = fresh();
        hierarchy.set_threshold_str("error");
        assert_eq!(hierarchy.threshold(), Level::ERROR);
        hierarchy.set_threshold_str("bogus");
        assert_eq!(hierarchy.threshold(), Level::ERROR);
    }

    #[test]
    fn shutdown_closes_and_detaches() {
        let hierarchy = fresh();
        let logger = hierarchy.get_logger("svc");
        let on_logger = VecAppender::new();
        let on_root = VecAppender::new();
        logger.add_appender(on_logger.clone());
        hierarchy.root().add_appender(on_root.clone());

        hierarchy.shutdown();
        assert!(on_logger.skeleton().is_closed());
        assert!(on_root.skeleton().is_closed());
        assert!(logger.get_all_appenders().is_empty());
        assert!(hierarchy.root().get_all_appenders().is_empty());
    }

    #[test]
    fn reset_restores_defaults() {
        let hierarchy = fresh();
        let logger = hierarchy.get_logger("svc");
        logger.set_level(Some(Level::ERROR));
        logger.set_additivity(false);
        hierarchy.root().set_level(Some(Level::FATAL));
        hierarchy.set_threshold(Level::ERROR);

        hierarchy.reset_configuration();

        assert_eq!(logger.level(), None);
        assert!(logger.additivity());
        assert_eq!(hierarchy.root().level(), Some(Level::DEBUG));
        assert_eq!(hierarchy.threshold(), Level::ALL);
    }
}
