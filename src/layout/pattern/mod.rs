//! A flexible layout configured by a conversion pattern.
//!
//! The pattern is raw text interspersed with `%`-prefixed conversion
//! specifiers. Each specifier may carry a format modifier
//! `%[-]min[.max]`: output shorter than `min` is padded with spaces
//! (on the left by default, on the right with `-`), and output longer
//! than `max` is truncated from the left.
//!
//! # Specifiers
//!
//! * `%c` - the logger name. An optional `{N}` option keeps only the
//!   rightmost `N` dot-components: `%c{2}` renders `a.b.c` as `b.c`.
//! * `%d` - the event date. An optional `{fmt}` option supplies a
//!   strftime-style format; the default is `%Y-%m-%d %H:%M:%S,%3f`.
//! * `%F` - the file the logging call was made from.
//! * `%L` - the line the logging call was made from.
//! * `%M` - the function the logging call was made from.
//! * `%l` - the full location, `function (file:line)`.
//! * `%m` - the message.
//! * `%n` - the platform newline.
//! * `%p` - the level name.
//! * `%r` - milliseconds elapsed since framework startup.
//! * `%t` - the name of the emitting thread.
//! * `%x` - the nested diagnostic context.
//! * `%X{key}` - one value from the mapped diagnostic context.
//! * `%%` - a literal percent sign.
//!
//! # Examples
//!
//! The pattern `%-5p [%t]: %m%n` produces output like:
//!
//! ```not_rust
//! DEBUG [main]: starting up
//! WARN  [worker-1]: queue is 90% full
//! ```

mod parser;

use std::io::{self, Write};

use chrono::{DateTime, Local};

use crate::error::ConfigError;
use crate::event::LoggingEvent;
use crate::layout::Layout;
use crate::registry::{Configurable, PropertyValue};

use self::parser::{Chunk, Converter, FormattingInfo, Parser};

pub(crate) const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

const DEFAULT_PATTERN: &str = "%m%n";

/// A layout driven by a conversion pattern.
#[derive(Debug)]
pub struct PatternLayout {
    pattern: String,
    chunks: Vec<Chunk>,
}

impl Default for PatternLayout {
    fn default() -> PatternLayout {
        PatternLayout::new(DEFAULT_PATTERN)
    }
}

impl PatternLayout {
    /// Creates a layout from a conversion pattern.
    ///
    /// Invalid portions of the pattern are reported to the internal
    /// diagnostic channel and rendered literally.
    pub fn new(pattern: &str) -> PatternLayout {
        PatternLayout {
            pattern: pattern.to_owned(),
            chunks: Parser::new(pattern).parse(),
        }
    }

    /// Returns the conversion pattern.
    pub fn conversion_pattern(&self) -> &str {
        &self.pattern
    }

    fn convert(&self, converter: &Converter, event: &LoggingEvent) -> String {
        match converter {
            Converter::Literal(text) => text.clone(),
            Converter::Category { precision } => {
                let name = event.logger_name();
                if *precision == 0 {
                    name.to_owned()
                } else {
                    let parts: Vec<&str> = name.split('.').collect();
                    let keep = parts.len().saturating_sub(*precision);
                    parts[keep..].join(".")
                }
            }
            Converter::Date { format } => {
                use std::fmt::Write;
                let date = DateTime::<Local>::from(event.timestamp());
                let mut out = String::new();
                if write!(out, "{}", date.format(format)).is_err() {
                    crate::internal::error(format_args!(
                        "invalid date format `{}` in conversion pattern",
                        format
                    ));
                    out.clear();
                }
                out
            }
            Converter::File => event
                .location()
                .map(|l| l.file().to_owned())
                .unwrap_or_else(|| "?".to_owned()),
            Converter::Line => event
                .location()
                .map(|l| l.line().to_string())
                .unwrap_or_else(|| "?".to_owned()),
            Converter::Function => event
                .location()
                .map(|l| l.function().to_owned())
                .unwrap_or_else(|| "?".to_owned()),
            Converter::Location => match event.location() {
                Some(l) => format!("{} ({}:{})", l.function(), l.file(), l.line()),
                None => "?".to_owned(),
            },
            Converter::Message => event.message().to_owned(),
            Converter::Level => event.level().name().to_owned(),
            Converter::RelativeTime => event.relative_millis().to_string(),
            Converter::Thread => event.thread_name().to_owned(),
            Converter::Ndc => event.ndc().unwrap_or("").to_owned(),
            Converter::Mdc { key } => event.mdc(key).unwrap_or_default(),
        }
    }
}

/// Applies a format modifier: truncate from the left to `max`, then pad
/// with spaces out to `min`.
fn apply(w: &mut dyn io::Write, text: &str, fmt: &FormattingInfo) -> io::Result<()> {
    let len = text.chars().count();
    let text: String = if len > fmt.max {
        text.chars().skip(len - fmt.max).collect()
    } else {
        text.to_owned()
    };
    let len = len.min(fmt.max);
    if len >= fmt.min {
        return w.write_all(text.as_bytes());
    }
    let pad = fmt.min - len;
    if fmt.left {
        write!(w, "{}{}", text, " ".repeat(pad))
    } else {
        write!(w, "{}{}", " ".repeat(pad), text)
    }
}

impl Layout for PatternLayout {
    fn format(&self, w: &mut dyn io::Write, event: &LoggingEvent) -> anyhow::Result<()> {
        for chunk in &self.chunks {
            match &chunk.converter {
                // Literals carry no modifier; write them straight through.
                Converter::Literal(text) => w.write_all(text.as_bytes())?,
                converter => apply(w, &self.convert(converter, event), &chunk.fmt)?,
            }
        }
        Ok(())
    }
}

impl Configurable for PatternLayout {
    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<(), ConfigError> {
        match name {
            "conversion-pattern" => {
                self.pattern = value.into_string("PatternLayout", name)?;
            }
            _ => {
                return Err(ConfigError::UnknownProperty {
                    target: "PatternLayout".to_owned(),
                    name: name.to_owned(),
                })
            }
        }
        Ok(())
    }

    fn activate_options(&mut self) -> Result<(), ConfigError> {
        self.chunks = Parser::new(&self.pattern).parse();
        Ok(())
    }
}
