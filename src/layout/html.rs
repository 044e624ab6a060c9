//! A layout producing an HTML table.

use std::io::{self, Write};

use crate::error::ConfigError;
use crate::event::LoggingEvent;
use crate::layout::{write_escaped, Layout, NEWLINE};
use crate::registry::{Configurable, PropertyValue};

const DEFAULT_TITLE: &str = "Log4g Log Messages";

/// A layout that renders each event as one row of an HTML table.
///
/// The header opens the document and the table; the footer closes them.
/// An appender using this layout writes the header when its sink is
/// opened and the footer when it is closed.
#[derive(Debug)]
pub struct HtmlLayout {
    title: String,
}

impl Default for HtmlLayout {
    fn default() -> HtmlLayout {
        HtmlLayout {
            title: DEFAULT_TITLE.to_owned(),
        }
    }
}

impl HtmlLayout {
    /// Creates a new `HtmlLayout` with the default title.
    pub fn new() -> HtmlLayout {
        HtmlLayout::default()
    }

    /// Sets the document title.
    pub fn set_title<T: Into<String>>(&mut self, title: T) {
        self.title = title.into();
    }
}

impl Layout for HtmlLayout {
    fn format(&self, w: &mut dyn io::Write, event: &LoggingEvent) -> anyhow::Result<()> {
        write!(w, "<tr>{}", NEWLINE)?;
        write!(w, "<td>{}</td>{}", event.relative_millis(), NEWLINE)?;
        w.write_all(b"<td>")?;
        write_escaped(w, event.thread_name())?;
        write!(w, "</td>{}", NEWLINE)?;
        write!(w, "<td>{}</td>{}", event.level(), NEWLINE)?;
        w.write_all(b"<td>")?;
        write_escaped(w, event.logger_name())?;
        write!(w, "</td>{}", NEWLINE)?;
        w.write_all(b"<td>")?;
        write_escaped(w, event.ndc().unwrap_or(""))?;
        write!(w, "</td>{}", NEWLINE)?;
        w.write_all(b"<td>")?;
        write_escaped(w, event.message())?;
        write!(w, "</td>{}", NEWLINE)?;
        write!(w, "</tr>{}", NEWLINE)?;
        Ok(())
    }

    fn content_type(&self) -> &str {
        "text/html"
    }

    fn header(&self) -> Option<String> {
        let mut header = String::new();
        header.push_str("<!DOCTYPE html>");
        header.push_str(NEWLINE);
        header.push_str("<html>");
        header.push_str(NEWLINE);
        header.push_str("<head>");
        header.push_str(NEWLINE);
        header.push_str(&format!("<title>{}</title>", self.title));
        header.push_str(NEWLINE);
        header.push_str("</head>");
        header.push_str(NEWLINE);
        header.push_str("<body>");
        header.push_str(NEWLINE);
        header.push_str("<table border=\"1\" cellpadding=\"4\">");
        header.push_str(NEWLINE);
        header.push_str(
            "<tr><th>Time</th><th>Thread</th><th>Level</th>\
             <th>Logger</th><th>NDC</th><th>Message</th></tr>",
        );
        header.push_str(NEWLINE);
        Some(header)
    }

    fn footer(&self) -> Option<String> {
        let mut footer = String::new();
        footer.push_str("</table>");
        footer.push_str(NEWLINE);
        footer.push_str("</body>");
        footer.push_str(NEWLINE);
        footer.push_str("</html>");
        footer.push_str(NEWLINE);
        Some(footer)
    }
}

impl Configurable for HtmlLayout {
    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<(), ConfigError> {
        match name {
            "title" => self.title = value.into_string("HtmlLayout", name)?,
            _ => {
                return Err(ConfigError::UnknownProperty {
                    target: "HtmlLayout".to_owned(),
                    name: name.to_owned(),
                })
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::layout::render;
    use crate::level::Level;

    #[test]
    fn escapes_markup() {
        let event = LoggingEvent::new("a", Level::INFO, "<b>&</b>".to_owned(), None);
        let row = render(&HtmlLayout::new(), &event);
        assert!(row.contains("&lt;b&gt;&amp;&lt;/b&gt;"));
        assert!(!row.contains("<b>"));
    }

    #[test]
    fn header_and_footer_frame_a_table() {
        let layout = HtmlLayout::new();
        assert!(layout.header().unwrap().contains("<table"));
        assert!(layout.footer().unwrap().contains("</table>"));
        assert_eq!(layout.content_type(), "text/html");
    }
}
