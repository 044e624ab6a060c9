mod common;

use common::RecordingAppender;
use log4g::append::AppenderAttachable;

#[test]
fn facade_records_reach_the_hierarchy() {
    log4g::bridge::install().unwrap();

    let appender = RecordingAppender::new();
    log4g::root_logger().add_appender(appender.clone());

    log::info!(target: "bridge::target", "via {}", "facade");
    log::error!(target: "bridge::target", "also via facade");
    // Below the root's default DEBUG level; dropped by the hierarchy.
    log::trace!(target: "bridge::target", "too fine");

    let events = appender.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].logger_name(), "bridge.target");
    assert_eq!(events[0].message(), "via facade");
    assert!(events[0].location().is_some());

    // The target logger exists in the hierarchy now.
    assert!(log4g::manager::exists("bridge.target").is_some());

    log4g::shutdown();
}
