//! A bridge from the `log` facade.
//!
//! Libraries that log through the `log` crate can be routed into the
//! hierarchy: [`install`] registers a global `log::Log` whose records
//! are dispatched to the logger named by the record target (with `::`
//! mapped to `.`), so `log::warn!(target: "net::example", ...)` behaves
//! like a warning emitted through the `net.example` logger.

use log::{LevelFilter, Log, Metadata, Record};

use crate::event::LocationInfo;
use crate::level::Level;
use crate::manager;

fn level_of(level: log::Level) -> Level {
    match level {
        log::Level::Error => Level::ERROR,
        log::Level::Warn => Level::WARN,
        log::Level::Info => Level::INFO,
        log::Level::Debug => Level::DEBUG,
        log::Level::Trace => Level::TRACE,
    }
}

fn logger_name(target: &str) -> String {
    target.replace("::", ".")
}

struct Bridge;

static BRIDGE: Bridge = Bridge;

impl Log for Bridge {
    fn enabled(&self, metadata: &Metadata) -> bool {
        manager::get_logger(&logger_name(metadata.target()))
            .is_enabled_for(level_of(metadata.level()))
    }

    fn log(&self, record: &Record) {
        let logger = manager::get_logger(&logger_name(record.target()));
        let level = level_of(record.level());
        if !logger.is_enabled_for(level) {
            return;
        }
        let location = record.file().map(|file| {
            LocationInfo::new(
                record.module_path().unwrap_or("?").to_owned(),
                file.to_owned(),
                record.line().unwrap_or(0),
            )
        });
        logger.log_at(level, *record.args(), location);
    }

    fn flush(&self) {}
}

/// Routes the `log` facade into the hierarchy.
///
/// Fails if another `log` implementation is already installed.
pub fn install() -> Result<(), log::SetLoggerError> {
    log::set_logger(&BRIDGE)?;
    log::set_max_level(LevelFilter::Trace);
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn level_mapping_is_order_preserving() {
        assert_eq!(level_of(log::Level::Trace), Level::TRACE);
        assert_eq!(level_of(log::Level::Error), Level::ERROR);
        assert!(level_of(log::Level::Warn) < level_of(log::Level::Error));
    }

    #[test]
    fn targets_become_dotted_names() {
        assert_eq!(logger_name("net::example::sub"), "net.example.sub");
        assert_eq!(logger_name("plain"), "plain");
    }
}
