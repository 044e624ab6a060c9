use std::sync::Arc;

use log4g::append::rolling_file::RollingFileAppender;
use log4g::append::Append;
use log4g::event::LoggingEvent;
use log4g::layout::SimpleLayout;
use log4g::level::Level;

#[test]
fn ten_writes_keep_at_most_four_backups() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.log");

    let appender = RollingFileAppender::builder()
        .max_file_size(10)
        .max_backup_index(4)
        .layout(Arc::new(SimpleLayout::new()))
        .build(&path)
        .unwrap();

    for i in 0..10 {
        let event = LoggingEvent::new("roll", Level::INFO, format!("event {}", i), None);
        appender.do_append(&event);
    }
    appender.close();

    assert!(path.exists());
    for index in 1..=4 {
        let backup = dir.path().join(format!("test.log.{}", index));
        assert!(backup.exists(), "expected backup {}", index);
    }
    assert!(!dir.path().join("test.log.5").exists());

    // Every write exceeded the threshold and rolled, so the live file
    // holds at most the most recent write.
    let live = std::fs::metadata(&path).unwrap().len();
    assert!(live <= "INFO - event 9\n".len() as u64);
}
