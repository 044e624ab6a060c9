//! Per-thread display names.
//!
//! Events record the name of the emitting thread. A name set through
//! [`set_name`] takes precedence; otherwise the name the thread was
//! spawned with is used, and unnamed threads get a generated `thread-N`
//! name that is stable for the lifetime of the thread.

use std::cell::RefCell;
use std::sync::atomic::{AtomicUsize, Ordering};

static UNNAMED: AtomicUsize = AtomicUsize::new(1);

thread_local! {
    static NAME: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Sets the display name of the calling thread.
pub fn set_name(name: &str) {
    NAME.with(|cell| *cell.borrow_mut() = Some(name.to_owned()));
}

/// Returns the display name of the calling thread.
pub fn name() -> String {
    NAME.with(|cell| {
        if let Some(name) = cell.borrow().as_deref() {
            return name.to_owned();
        }
        let name = match std::thread::current().name() {
            Some(name) => name.to_owned(),
            None => format!("thread-{}", UNNAMED.fetch_add(1, Ordering::Relaxed)),
        };
        *cell.borrow_mut() = Some(name.clone());
        name
    })
}
