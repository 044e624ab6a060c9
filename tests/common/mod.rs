use std::sync::{Arc, Mutex};

use log4g::append::{Append, AppenderSkeleton};
use log4g::event::LoggingEvent;

/// An appender that records every event it receives.
#[derive(Debug, Default)]
pub struct RecordingAppender {
    skeleton: AppenderSkeleton,
    events: Mutex<Vec<LoggingEvent>>,
}

impl RecordingAppender {
    pub fn new() -> Arc<RecordingAppender> {
        Arc::new(RecordingAppender::default())
    }

    pub fn messages(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|event| event.message().to_owned())
            .collect()
    }

    pub fn events(&self) -> Vec<LoggingEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl Append for RecordingAppender {
    fn skeleton(&self) -> &AppenderSkeleton {
        &self.skeleton
    }

    fn append(&self, event: &LoggingEvent) -> anyhow::Result<()> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }

    fn close(&self) {
        self.skeleton.mark_closed();
    }

    fn requires_layout(&self) -> bool {
        false
    }
}
