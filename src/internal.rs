//! The framework's internal diagnostic channel.
//!
//! Problems inside the framework itself (a failing appender sink, a bad
//! configuration element, a module that will not load) are reported here
//! rather than through the logger hierarchy. Output goes to stderr and is
//! gated by the `debug` and `quiet` flags.

use std::fmt;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};

static DEBUG: AtomicBool = AtomicBool::new(false);
static QUIET: AtomicBool = AtomicBool::new(false);

/// Enables or disables internal debugging output.
pub fn set_internal_debugging(enabled: bool) {
    DEBUG.store(enabled, Ordering::Relaxed);
}

/// Enables or disables quiet mode, suppressing all internal output.
pub fn set_quiet_mode(enabled: bool) {
    QUIET.store(enabled, Ordering::Relaxed);
}

fn emit(prefix: &str, args: fmt::Arguments) {
    if QUIET.load(Ordering::Relaxed) {
        return;
    }
    let _ = writeln!(io::stderr(), "log4g: {}: {}", prefix, args);
}

pub(crate) fn debug(args: fmt::Arguments) {
    if DEBUG.load(Ordering::Relaxed) {
        emit("debug", args);
    }
}

pub(crate) fn warn(args: fmt::Arguments) {
    emit("warning", args);
}

pub(crate) fn error(args: fmt::Arguments) {
    emit("error", args);
}
