//! The basic configurator.
//!
//! For file based configuration see
//! [`DomConfigurator`](crate::config::dom::DomConfigurator).

use std::sync::Arc;

use crate::append::console::{ConsoleAppender, Target};
use crate::append::{Append, AppenderAttachable};
use crate::layout::TtccLayout;
use crate::manager;

/// Quickly configures the framework.
///
/// Adds a console appender printing to stdout with a
/// [`TtccLayout`](crate::layout::TtccLayout) to the root logger, which
/// keeps its default `DEBUG` level.
pub fn configure() {
    let appender = ConsoleAppender::builder()
        .target(Target::Stdout)
        .layout(Arc::new(TtccLayout::new()))
        .build();
    manager::root_logger().add_appender(Arc::new(appender));
}

/// Adds `appender` to the root logger.
pub fn configure_appender(appender: Arc<dyn Append>) {
    manager::root_logger().add_appender(appender);
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::append::test_util::VecAppender;
    use crate::level::Level;

    #[test]
    fn root_gets_a_console_appender() {
        let _lock = manager::GLOBAL_TEST_LOCK.lock();
        manager::reset_configuration();
        configure();
        let root = manager::root_logger();
        assert_eq!(root.get_all_appenders().len(), 1);
        assert_eq!(root.effective_level(), Level::DEBUG);
        manager::reset_configuration();
    }

    #[test]
    fn custom_appenders_attach_to_root() {
        let _lock = manager::GLOBAL_TEST_LOCK.lock();
        manager::reset_configuration();
        let appender = VecAppender::new();
        configure_appender(appender.clone());
        manager::root_logger().debug("hello");
        assert_eq!(appender.messages(), vec!["hello"]);
        manager::reset_configuration();
    }
}
