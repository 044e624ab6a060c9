//! The classic time-thread-category-context layout.

use std::io::{self, Write};

use crate::config::property;
use crate::error::ConfigError;
use crate::event::LoggingEvent;
use crate::layout::{Layout, NEWLINE};
use crate::registry::{Configurable, PropertyValue};

/// A layout printing time, thread, level, category and context.
///
/// Output looks like `176 [main] INFO net.example request-9 - started`,
/// where the leading number is milliseconds since framework startup. The
/// thread, category and context fields can each be switched off.
#[derive(Debug)]
pub struct TtccLayout {
    thread_printing: bool,
    category_prefixing: bool,
    context_printing: bool,
}

impl Default for TtccLayout {
    fn default() -> TtccLayout {
        TtccLayout {
            thread_printing: true,
            category_prefixing: true,
            context_printing: true,
        }
    }
}

impl TtccLayout {
    /// Creates a new `TtccLayout` with all fields enabled.
    pub fn new() -> TtccLayout {
        TtccLayout::default()
    }
}

impl Layout for TtccLayout {
    fn format(&self, w: &mut dyn io::Write, event: &LoggingEvent) -> anyhow::Result<()> {
        write!(w, "{} ", event.relative_millis())?;
        if self.thread_printing {
            write!(w, "[{}] ", event.thread_name())?;
        }
        write!(w, "{} ", event.level())?;
        if self.category_prefixing {
            write!(w, "{} ", event.logger_name())?;
        }
        if self.context_printing {
            if let Some(ndc) = event.ndc() {
                write!(w, "{} ", ndc)?;
            }
        }
        write!(w, "- {}{}", event.message(), NEWLINE)?;
        Ok(())
    }
}

impl Configurable for TtccLayout {
    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<(), ConfigError> {
        let value = value.into_string("TtccLayout", name)?;
        match name {
            "thread-printing" => self.thread_printing = property::to_bool(name, &value)?,
            "category-prefixing" => self.category_prefixing = property::to_bool(name, &value)?,
            "context-printing" => self.context_printing = property::to_bool(name, &value)?,
            _ => {
                return Err(ConfigError::UnknownProperty {
                    target: "TtccLayout".to_owned(),
                    name: name.to_owned(),
                })
            }
        }
        Ok(())
    }
}
