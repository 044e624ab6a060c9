use log4g::append::{Append, AppenderAttachable};
use log4g::event::LoggingEvent;
use log4g::layout::Layout;
use log4g::level::Level;
use log4g::log4g_debug;

#[test]
fn basic_configuration_prints_level_and_message() {
    log4g::config::basic::configure();

    let root = log4g::root_logger();
    let appenders = root.get_all_appenders();
    assert_eq!(appenders.len(), 1);

    // The attached console appender formats with the TTCC layout; the
    // line carries the level name and the message text.
    let layout = appenders[0].skeleton().layout().unwrap();
    let event = LoggingEvent::new("root", Level::DEBUG, "hello".to_owned(), None);
    let mut line = Vec::new();
    layout.format(&mut line, &event).unwrap();
    let line = String::from_utf8(line).unwrap();
    assert!(line.contains("hello"), "{}", line);
    assert!(line.contains("DEBUG"), "{}", line);
    assert_eq!(line.matches('\n').count(), 1);

    // And the real path writes one line to stdout.
    log4g_debug!("hello");

    log4g::shutdown();
}
