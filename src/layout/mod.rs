//! Layouts.
//!
//! A layout turns a [`LoggingEvent`] into bytes. Appenders that write
//! character streams require one; layouts that frame their output (HTML,
//! XML) additionally provide a header and footer written when the sink is
//! opened and closed.

use std::fmt;
use std::io::{self, Write};

use crate::event::LoggingEvent;

pub mod html;
pub mod json;
pub mod pattern;
pub mod simple;
pub mod ttcc;
pub mod xml;

pub use self::html::HtmlLayout;
pub use self::json::JsonLayout;
pub use self::pattern::PatternLayout;
pub use self::simple::SimpleLayout;
pub use self::ttcc::TtccLayout;
pub use self::xml::XmlLayout;

#[cfg(windows)]
pub(crate) const NEWLINE: &str = "\r\n";

#[cfg(not(windows))]
pub(crate) const NEWLINE: &str = "\n";

/// A trait implemented by log4g layouts.
pub trait Layout: fmt::Debug + Send + Sync + 'static {
    /// Formats the event and writes the result to `w`.
    fn format(&self, w: &mut dyn io::Write, event: &LoggingEvent) -> anyhow::Result<()>;

    /// The MIME type of the output produced by this layout.
    fn content_type(&self) -> &str {
        "text/plain"
    }

    /// Bytes to emit before the first event, if any.
    fn header(&self) -> Option<String> {
        None
    }

    /// Bytes to emit after the last event, if any.
    fn footer(&self) -> Option<String> {
        None
    }
}

/// Writes `text` with the XML/HTML metacharacters escaped.
pub(crate) fn write_escaped(w: &mut dyn io::Write, text: &str) -> io::Result<()> {
    for ch in text.chars() {
        match ch {
            '&' => w.write_all(b"&amp;")?,
            '<' => w.write_all(b"&lt;")?,
            '>' => w.write_all(b"&gt;")?,
            '"' => w.write_all(b"&quot;")?,
            '\'' => w.write_all(b"&apos;")?,
            _ => write!(w, "{}", ch)?,
        }
    }
    Ok(())
}

#[cfg(test)]
pub(crate) fn render(layout: &dyn Layout, event: &LoggingEvent) -> String {
    let mut buf = Vec::new();
    layout.format(&mut buf, event).unwrap();
    String::from_utf8(buf).unwrap()
}
