use std::fs;
use std::io::Write;

use log4g::append::AppenderAttachable;
use log4g::level::Level;
use log4g::{log4g_debug, log4g_info};

#[test]
fn init_from_xml_file() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("integration.log");
    let config_path = dir.path().join("log4g.xml");

    let config = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<configuration threshold="all">
    <appender name="logfile" type="FileAppender">
        <property name="file" value="{}"/>
        <layout type="PatternLayout">
            <property name="conversion-pattern" value="%p %c - %m%n"/>
        </layout>
    </appender>
    <logger name="integration.test" additivity="false">
        <level value="debug"/>
        <appender name="logfile"/>
    </logger>
    <root>
        <level value="warn"/>
        <appender name="logfile"/>
    </root>
</configuration>
"#,
        log_path.display()
    );
    let mut file = fs::File::create(&config_path).unwrap();
    file.write_all(config.as_bytes()).unwrap();

    log4g::init_file(&config_path).unwrap();

    let logger = log4g::get_logger("integration.test");
    assert_eq!(logger.level(), Some(Level::DEBUG));
    assert!(!logger.additivity());
    assert!(logger.get_appender("logfile").is_some());
    assert_eq!(log4g::root_logger().level(), Some(Level::WARN));

    log4g_debug!(logger: "integration.test", "through the configured file");
    // Below the root's WARN level; must not reach the appender.
    log4g_info!("ambient info");

    log4g::shutdown();

    let contents = fs::read_to_string(&log_path).unwrap();
    assert!(contents.contains("DEBUG integration.test - through the configured file"));
    assert!(!contents.contains("ambient info"));
}
