//! The asynchronous buffering appender.
//!
//! Wraps other appenders behind a bounded queue drained by a worker
//! thread, so that slow sinks do not stall the emitting thread. Events
//! have their diagnostic context frozen before they cross into the
//! worker.
//!
//! When the queue is full the appender either blocks the caller (the
//! default) or discards the event, according to the `blocking` option;
//! discards are counted and summarized on close.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, SyncSender, TrySendError};
use std::sync::Arc;
use std::thread;

use anyhow::anyhow;
use parking_lot::Mutex;

use crate::append::{Append, AppenderAttachable, AppenderList, AppenderSkeleton};
use crate::config::property;
use crate::error::ConfigError;
use crate::event::LoggingEvent;
use crate::internal;
use crate::registry::{Configurable, PropertyValue};

const DEFAULT_BUFFER_SIZE: usize = 128;

#[derive(Debug)]
struct Worker {
    tx: SyncSender<LoggingEvent>,
    handle: thread::JoinHandle<()>,
}

/// An appender that forwards events to nested appenders from a worker
/// thread.
#[derive(Debug)]
pub struct AsyncAppender {
    skeleton: AppenderSkeleton,
    appenders: Arc<AppenderList>,
    worker: Mutex<Option<Worker>>,
    blocking: AtomicBool,
    buffer_size: Mutex<usize>,
    discarded: AtomicU64,
}

impl Default for AsyncAppender {
    fn default() -> AsyncAppender {
        AsyncAppender {
            skeleton: AppenderSkeleton::new(),
            appenders: Arc::new(AppenderList::new()),
            worker: Mutex::new(None),
            blocking: AtomicBool::new(true),
            buffer_size: Mutex::new(DEFAULT_BUFFER_SIZE),
            discarded: AtomicU64::new(0),
        }
    }
}

impl AsyncAppender {
    /// Creates a new `AsyncAppender` with the default queue size.
    pub fn new() -> AsyncAppender {
        AsyncAppender::default()
    }

    /// Determines whether a full queue blocks the caller or discards the
    /// event. Defaults to blocking.
    pub fn set_blocking(&self, blocking: bool) {
        self.blocking.store(blocking, Ordering::Relaxed);
    }

    /// Starts the worker thread.
    ///
    /// Called by `activate_options`; harmless if already running.
    pub fn start(&self) {
        let mut worker = self.worker.lock();
        if worker.is_some() {
            return;
        }
        let (tx, rx) = mpsc::sync_channel::<LoggingEvent>(*self.buffer_size.lock());
        let appenders = self.appenders.clone();
        let spawned = thread::Builder::new()
            .name("log4g-async".to_owned())
            .spawn(move || {
                while let Ok(event) = rx.recv() {
                    appenders.append_all(&event);
                }
            });
        match spawned {
            Ok(handle) => *worker = Some(Worker { tx, handle }),
            Err(error) => internal::error(format_args!(
                "failed to spawn async appender worker: {}",
                error
            )),
        }
    }
}

impl Append for AsyncAppender {
    fn skeleton(&self) -> &AppenderSkeleton {
        &self.skeleton
    }

    fn append(&self, event: &LoggingEvent) -> anyhow::Result<()> {
        let worker = self.worker.lock();
        let worker = worker
            .as_ref()
            .ok_or_else(|| anyhow!("async appender has not been started"))?;

        let mut event = event.clone();
        event.freeze();

        if self.blocking.load(Ordering::Relaxed) {
            worker.tx.send(event).map_err(|_| anyhow!("worker thread is gone"))?;
        } else {
            match worker.tx.try_send(event) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    self.discarded.fetch_add(1, Ordering::Relaxed);
                }
                Err(TrySendError::Disconnected(_)) => {
                    return Err(anyhow!("worker thread is gone"));
                }
            }
        }
        Ok(())
    }

    fn close(&self) {
        {
            let _guard = self.skeleton.lock();
            if !self.skeleton.mark_closed() {
                return;
            }
        }
        // Dropping the sender ends the worker loop once the queue drains.
        if let Some(worker) = self.worker.lock().take() {
            drop(worker.tx);
            let _ = worker.handle.join();
        }
        let discarded = self.discarded.swap(0, Ordering::Relaxed);
        if discarded > 0 {
            internal::warn(format_args!(
                "async appender discarded {} events on a full queue",
                discarded
            ));
        }
        for appender in self.appenders.all() {
            appender.close();
        }
    }

    fn requires_layout(&self) -> bool {
        false
    }

    fn as_attachable(&self) -> Option<&dyn AppenderAttachable> {
        Some(self)
    }
}

impl AppenderAttachable for AsyncAppender {
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

impl Configurable for AsyncAppender {
    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<(), ConfigError> {
        match name {
            "buffer-size" => {
                let value = value.into_string("AsyncAppender", name)?;
                *self.buffer_size.lock() = property::to_usize(name, &value)?;
            }
            "blocking" => {
                let value = value.into_string("AsyncAppender", name)?;
                self.set_blocking(property::to_bool(name, &value)?);
            }
            _ => return self.skeleton.set_common_property("AsyncAppender", name, value),
        }
        Ok(())
    }

    fn activate_options(&mut self) -> Result<(), ConfigError> {
        self.start();
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::append::test_util::VecAppender;
    use crate::level::Level;
    use crate::mdc;

    fn event(message: &str) -> LoggingEvent {
        LoggingEvent::new("a", Level::INFO, message.to_owned(), None)
    }

    #[test]
    fn forwards_through_worker() {
        let nested = VecAppender::new();
        let appender = AsyncAppender::new();
        appender.add_appender(nested.clone());
        appender.start();

        appender.do_append(&event("one"));
        appender.do_append(&event("two"));
        appender.close();

        assert_eq!(nested.messages(), vec!["one", "two"]);
        assert!(nested.skeleton().is_closed());
    }

    #[test]
    fn frozen_context_travels_with_the_event() {
        mdc::clear();
        mdc::put("req", "42");
        let nested = VecAppender::new();
        let appender = AsyncAppender::new();
        appender.add_appender(nested.clone());
        appender.start();

        appender.do_append(&event("ctx"));
        appender.close();
        mdc::clear();

        let events = nested.events.lock();
        assert_eq!(events[0].mdc("req").as_deref(), Some("42"));
    }

    #[test]
    fn attachable_surface() {
        let appender = AsyncAppender::new();
        let nested: Arc<dyn Append> = VecAppender::named("inner");
        appender.add_appender(nested.clone());
        appender.add_appender(nested.clone());
        assert_eq!(appender.get_all_appenders().len(), 1);
        assert!(appender.is_attached(&nested));
        assert!(appender.get_appender("inner").is_some());
        assert!(appender.remove_appender_by_name("inner").is_some());
        assert!(appender.get_all_appenders().is_empty());
    }
}
