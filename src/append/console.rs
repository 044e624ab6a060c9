//! The console appender.

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::anyhow;
use parking_lot::RwLock;

use crate::append::{Append, AppenderSkeleton};
use crate::error::ConfigError;
use crate::event::LoggingEvent;
use crate::layout::{Layout, PatternLayout};
use crate::registry::{Configurable, PropertyValue};

/// The stream a [`ConsoleAppender`] writes to.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Target {
    /// Standard output.
    Stdout,
    /// Standard error.
    Stderr,
}

impl Target {
    fn parse(value: &str) -> Result<Target, ConfigError> {
        // Accepted by name or by file descriptor number.
        match value.to_ascii_lowercase().as_str() {
            "stdout" | "1" => Ok(Target::Stdout),
            "stderr" | "2" => Ok(Target::Stderr),
            _ => Err(ConfigError::invalid_value(
                "target",
                value,
                "expected `stdout` or `stderr`",
            )),
        }
    }
}

/// An appender which logs to standard output or standard error.
#[derive(Debug)]
pub struct ConsoleAppender {
    skeleton: AppenderSkeleton,
    target: RwLock<Target>,
}

impl Default for ConsoleAppender {
    fn default() -> ConsoleAppender {
        ConsoleAppender {
            skeleton: AppenderSkeleton::new(),
            target: RwLock::new(Target::Stdout),
        }
    }
}

impl ConsoleAppender {
    /// Creates a new `ConsoleAppender` builder.
    pub fn builder() -> ConsoleAppenderBuilder {
        ConsoleAppenderBuilder {
            target: Target::Stdout,
            layout: None,
        }
    }

    /// Returns the stream this appender writes to.
    pub fn target(&self) -> Target {
        *self.target.read()
    }

    fn write_frame(&self, text: Option<String>) {
        if let Some(text) = text {
            let target = *self.target.read();
            let result = match target {
                Target::Stdout => io::stdout().lock().write_all(text.as_bytes()),
                Target::Stderr => io::stderr().lock().write_all(text.as_bytes()),
            };
            if let Err(error) = result {
                self.skeleton.error_handler().error(
                    "failed to write layout frame",
                    Some(&error.into()),
                    None,
                );
            }
        }
    }
}

impl Append for ConsoleAppender {
    fn skeleton(&self) -> &AppenderSkeleton {
        &self.skeleton
    }

    fn append(&self, event: &LoggingEvent) -> anyhow::Result<()> {
        let layout = self
            .skeleton
            .layout()
            .ok_or_else(|| anyhow!("console appender has no layout"))?;
        match *self.target.read() {
            Target::Stdout => {
                let mut stdout = io::stdout().lock();
                layout.format(&mut stdout, event)?;
                stdout.flush()?;
            }
            Target::Stderr => {
                let mut stderr = io::stderr().lock();
                layout.format(&mut stderr, event)?;
                stderr.flush()?;
            }
        }
        Ok(())
    }

    fn close(&self) {
        let _guard = self.skeleton.lock();
        if !self.skeleton.mark_closed() {
            return;
        }
        self.write_frame(self.skeleton.layout().and_then(|l| l.footer()));
    }
}

impl Configurable for ConsoleAppender {
    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<(), ConfigError> {
        match name {
            "target" => {
                let value = value.into_string("ConsoleAppender", name)?;
                *self.target.write() = Target::parse(&value)?;
            }
            _ => return self.skeleton.set_common_property("ConsoleAppender", name, value),
        }
        Ok(())
    }

    fn activate_options(&mut self) -> Result<(), ConfigError> {
        self.write_frame(self.skeleton.layout().and_then(|l| l.header()));
        Ok(())
    }
}

/// A builder for [`ConsoleAppender`]s.
pub struct ConsoleAppenderBuilder {
    target: Target,
    layout: Option<Arc<dyn Layout>>,
}

impl ConsoleAppenderBuilder {
    /// Sets the output stream. Defaults to [`Target::Stdout`].
    pub fn target(mut self, target: Target) -> ConsoleAppenderBuilder {
        self.target = target;
        self
    }

    /// Sets the layout. Defaults to a [`PatternLayout`] with the default
    /// pattern.
    pub fn layout(mut self, layout: Arc<dyn Layout>) -> ConsoleAppenderBuilder {
        self.layout = Some(layout);
        self
    }

    /// Consumes the builder, producing a `ConsoleAppender`.
    pub fn build(self) -> ConsoleAppender {
        let appender = ConsoleAppender {
            skeleton: AppenderSkeleton::new(),
            target: RwLock::new(self.target),
        };
        let layout = self
            .layout
            .unwrap_or_else(|| Arc::new(PatternLayout::default()));
        appender.skeleton.set_layout(layout);
        appender.write_frame(appender.skeleton.layout().and_then(|l| l.header()));
        appender
    }
}
