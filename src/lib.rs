//! log4g is a hierarchical, highly configurable logging framework in
//! the tradition of log4j.
//!
//! Applications obtain named loggers, emit events at severity levels,
//! and the framework dispatches each event through a tree of loggers to
//! attached output sinks ([appenders](append)), each formatted by a
//! pluggable [layout](layout) and optionally gated by
//! [filters](filter).
//!
//! # Architecture
//!
//! * Loggers have dotted names (`net.example.widget`) and form a tree
//!   rooted at the root logger; a logger without its own level inherits
//!   the nearest ancestor's ([effective level](logger::Logger::effective_level)).
//! * An event emitted through a logger visits the appenders of the
//!   logger and of its ancestors, until a non-additive logger (or the
//!   root) stops the walk.
//! * Appenders serialize their writes, consult a per-appender threshold
//!   and filter chain, and route internal failures to an
//!   [error handler](error_handler) rather than to the caller. A
//!   logging call never fails from the caller's perspective.
//! * [MDC](mdc) and [NDC](ndc) carry per-thread diagnostic context into
//!   layouts.
//! * Configuration comes from an [XML document](config::dom) or the
//!   [basic configurator](config::basic); component types named in the
//!   document are resolved through a [type registry](registry) that
//!   [plug-in modules](module) can extend at runtime.
//!
//! # Examples
//!
//! Basic use:
//!
//! ```
//! log4g::config::basic::configure();
//!
//! log4g::log4g_info!("starting up");
//! log4g::log4g_debug!(logger: "net.example.widget", "frobbed {} widgets", 3);
//!
//! let logger = log4g::get_logger("net.example");
//! logger.warn("queue is filling");
//!
//! log4g::shutdown();
//! ```
//!
//! Initialization from the environment and command line, falling back
//! to the basic configurator when no configuration file is given:
//!
//! ```no_run
//! fn main() {
//!     if let Err(error) = log4g::init_with_args(std::env::args()) {
//!         eprintln!("logging configuration failed: {}", error);
//!     }
//!     log4g::log4g_info!("ready");
//!     log4g::shutdown();
//! }
//! ```

#![warn(missing_docs)]

pub mod append;
pub mod bridge;
pub mod config;
pub mod error;
pub mod error_handler;
pub mod event;
pub mod filter;
pub mod hierarchy;
pub mod internal;
pub mod layout;
pub mod level;
pub mod logger;
pub mod manager;
pub mod mdc;
pub mod module;
pub mod ndc;
pub mod registry;
pub mod thread;

pub use crate::error::ConfigError;
pub use crate::event::{LocationInfo, LoggingEvent};
pub use crate::level::Level;
pub use crate::logger::Logger;
pub use crate::manager::{get_logger, root_logger};

use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::dom::DomConfigurator;

static INITIALIZED: AtomicBool = AtomicBool::new(false);

#[derive(Default)]
struct Options {
    configuration: Option<String>,
    debug: bool,
    quiet: bool,
    thread: Option<String>,
}

impl Options {
    fn parse_flags(&mut self, list: &str) {
        for flag in list.split(',').map(str::trim).filter(|f| !f.is_empty()) {
            match flag {
                "debug" => self.debug = true,
                "quiet" => self.quiet = true,
                other => internal::warn(format_args!("unknown log4g flag [{}]", other)),
            }
        }
    }

    fn from_env() -> Options {
        let mut options = Options::default();
        if let Ok(flags) = std::env::var("LOG4G_FLAGS") {
            options.parse_flags(&flags);
        }
        if let Ok(flags) = std::env::var("LOG4G_DEBUG") {
            match flags.as_str() {
                "1" | "true" | "all" => options.debug = true,
                _ => options.parse_flags(&flags),
            }
        }
        if let Ok(configuration) = std::env::var("LOG4G_CONFIGURATION") {
            options.configuration = Some(configuration);
        }
        options
    }

    fn parse_args<I, S>(&mut self, args: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for arg in args {
            let arg = arg.as_ref();
            if let Some(value) = arg.strip_prefix("--log4g-configuration=") {
                self.configuration = Some(value.to_owned());
            } else if let Some(value) = arg.strip_prefix("--log4g-flags=") {
                self.parse_flags(value);
            } else if let Some(value) = arg.strip_prefix("--log4g-main-thread=") {
                self.thread = Some(value.to_owned());
            }
        }
    }
}

fn init_with_options(options: Options) -> Result<(), ConfigError> {
    if INITIALIZED.swap(true, Ordering::SeqCst) {
        return Ok(());
    }
    if options.debug {
        internal::set_internal_debugging(true);
    }
    if options.quiet {
        internal::set_quiet_mode(true);
    }
    thread::set_name(options.thread.as_deref().unwrap_or("main"));
    event::capture_start_time();
    let _ = manager::instance();

    let result = match &options.configuration {
        Some(path) => DomConfigurator::configure(path).map_err(|error| {
            internal::warn(format_args!("{}: {}", path, error));
            internal::warn(format_args!("using basic configurator for configuration"));
            error
        }),
        None => Ok(()),
    };
    if result.is_err() || options.configuration.is_none() {
        config::basic::configure();
    }
    result
}

/// Initializes the framework from the environment.
///
/// Reads `LOG4G_CONFIGURATION`, `LOG4G_FLAGS` and `LOG4G_DEBUG`. With no
/// configuration file, or with one that fails to parse, the basic
/// configurator is used; a parse failure is still reported through the
/// returned error. Repeated initialization is a no-op.
pub fn init() -> Result<(), ConfigError> {
    init_with_options(Options::from_env())
}

/// Initializes the framework from command-line arguments, with the
/// environment as fallback.
///
/// Recognizes `--log4g-configuration=FILE`, `--log4g-flags=LIST`
/// (`debug`, `quiet`) and `--log4g-main-thread=NAME`; unrecognized
/// arguments are ignored, so the process arguments can be passed
/// through unfiltered.
pub fn init_with_args<I, S>(args: I) -> Result<(), ConfigError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = Options::from_env();
    options.parse_args(args);
    init_with_options(options)
}

/// Initializes the framework from the XML configuration file at `path`.
///
/// Unlike [`init`], a failure here does not fall back to the basic
/// configurator.
pub fn init_file<P: AsRef<std::path::Path>>(path: P) -> Result<(), ConfigError> {
    INITIALIZED.store(true, Ordering::SeqCst);
    event::capture_start_time();
    let _ = manager::instance();
    DomConfigurator::configure(path)
}

/// Closes every appender in the repository.
///
/// Call before process exit to flush buffered sinks.
pub fn shutdown() {
    manager::shutdown();
}

/// Logs a message at an explicit level.
///
/// The first form logs through a named logger, the second through the
/// root logger. The source location is captured at the call site. The
/// event is not constructed unless the level is enabled.
#[macro_export]
macro_rules! log4g_log {
    (logger: $name:expr, $level:expr, $($arg:tt)+) => {{
        let logger = $crate::get_logger($name);
        if logger.is_enabled_for($level) {
            logger.log_at(
                $level,
                ::core::format_args!($($arg)+),
                ::core::option::Option::Some($crate::LocationInfo::new(
                    ::core::module_path!(),
                    ::core::file!(),
                    ::core::line!(),
                )),
            );
        }
    }};
    ($level:expr, $($arg:tt)+) => {{
        let logger = $crate::root_logger();
        if logger.is_enabled_for($level) {
            logger.log_at(
                $level,
                ::core::format_args!($($arg)+),
                ::core::option::Option::Some($crate::LocationInfo::new(
                    ::core::module_path!(),
                    ::core::file!(),
                    ::core::line!(),
                )),
            );
        }
    }};
}

/// Logs a message at the `TRACE` level.
#[macro_export]
macro_rules! log4g_trace {
    (logger: $name:expr, $($arg:tt)+) => {
        $crate::log4g_log!(logger: $name, $crate::Level::TRACE, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::log4g_log!($crate::Level::TRACE, $($arg)+)
    };
}

/// Logs a message at the `DEBUG` level.
#[macro_export]
macro_rules! log4g_debug {
    (logger: $name:expr, $($arg:tt)+) => {
        $crate::log4g_log!(logger: $name, $crate::Level::DEBUG, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::log4g_log!($crate::Level::DEBUG, $($arg)+)
    };
}

/// Logs a message at the `INFO` level.
#[macro_export]
macro_rules! log4g_info {
    (logger: $name:expr, $($arg:tt)+) => {
        $crate::log4g_log!(logger: $name, $crate::Level::INFO, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::log4g_log!($crate::Level::INFO, $($arg)+)
    };
}

/// Logs a message at the `WARN` level.
#[macro_export]
macro_rules! log4g_warn {
    (logger: $name:expr, $($arg:tt)+) => {
        $crate::log4g_log!(logger: $name, $crate::Level::WARN, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::log4g_log!($crate::Level::WARN, $($arg)+)
    };
}

/// Logs a message at the `ERROR` level.
#[macro_export]
macro_rules! log4g_error {
    (logger: $name:expr, $($arg:tt)+) => {
        $crate::log4g_log!(logger: $name, $crate::Level::ERROR, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::log4g_log!($crate::Level::ERROR, $($arg)+)
    };
}

/// Logs a message at the `FATAL` level.
#[macro_export]
macro_rules! log4g_fatal {
    (logger: $name:expr, $($arg:tt)+) => {
        $crate::log4g_log!(logger: $name, $crate::Level::FATAL, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::log4g_log!($crate::Level::FATAL, $($arg)+)
    };
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn flags_parse() {
        let mut options = Options::default();
        options.parse_flags("debug, quiet");
        assert!(options.debug);
        assert!(options.quiet);
    }

    #[test]
    fn args_override() {
        let mut options = Options::default();
        options.parse_args([
            "program",
            "--log4g-configuration=conf.xml",
            "--log4g-flags=quiet",
            "--log4g-main-thread=primary",
            "--unrelated",
        ]);
        assert_eq!(options.configuration.as_deref(), Some("conf.xml"));
        assert!(options.quiet);
        assert!(!options.debug);
        assert_eq!(options.thread.as_deref(), Some("primary"));
    }

    #[test]
    fn macros_reach_appenders() {
        use crate::append::AppenderAttachable;

        let _lock = manager::GLOBAL_TEST_LOCK.lock();
        manager::reset_configuration();
        let appender = crate::append::test_util::VecAppender::new();
        manager::root_logger().add_appender(appender.clone());

        log4g_info!("macro {}", "message");
        log4g_warn!(logger: "lib.test.named", "named {}", 7);

        let messages = appender.messages();
        assert!(messages.contains(&"macro message".to_owned()));
        assert!(messages.contains(&"named 7".to_owned()));

        let events = appender.events.lock();
        let event = events.iter().find(|e| e.message() == "named 7").unwrap();
        assert_eq!(event.logger_name(), "lib.test.named");
        assert!(event.location().is_some());
        drop(events);
        manager::reset_configuration();
    }
}
