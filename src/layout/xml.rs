//! A layout producing log4j-style XML event elements.

use std::io::{self, Write};

use crate::config::property;
use crate::error::ConfigError;
use crate::event::LoggingEvent;
use crate::layout::{write_escaped, Layout, NEWLINE};
use crate::registry::{Configurable, PropertyValue};

/// A layout that renders each event as an `<event>` element.
///
/// The output is a fragment; wrap it in a root element (or concatenate
/// with an external entity) to obtain a well-formed document.
#[derive(Debug, Default)]
pub struct XmlLayout {
    location_info: bool,
}

impl XmlLayout {
    /// Creates a new `XmlLayout`.
    pub fn new() -> XmlLayout {
        XmlLayout::default()
    }

    /// Includes the source location of each event in the output.
    pub fn set_location_info(&mut self, location_info: bool) {
        self.location_info = location_info;
    }
}

impl Layout for XmlLayout {
    fn format(&self, w: &mut dyn io::Write, event: &LoggingEvent) -> anyhow::Result<()> {
        let (seconds, micros) = event.timestamp_parts();
        w.write_all(b"<event logger=\"")?;
        write_escaped(w, event.logger_name())?;
        write!(w, "\" timestamp=\"{}.{:06}\" level=\"", seconds, micros)?;
        write_escaped(w, event.level().name())?;
        w.write_all(b"\" thread=\"")?;
        write_escaped(w, event.thread_name())?;
        write!(w, "\">{}", NEWLINE)?;

        w.write_all(b"<message>")?;
        write_escaped(w, event.message())?;
        write!(w, "</message>{}", NEWLINE)?;

        if let Some(ndc) = event.ndc() {
            w.write_all(b"<ndc>")?;
            write_escaped(w, ndc)?;
            write!(w, "</ndc>{}", NEWLINE)?;
        }

        if self.location_info {
            if let Some(location) = event.location() {
                w.write_all(b"<location function=\"")?;
                write_escaped(w, location.function())?;
                w.write_all(b"\" file=\"")?;
                write_escaped(w, location.file())?;
                write!(w, "\" line=\"{}\"/>{}", location.line(), NEWLINE)?;
            }
        }

        write!(w, "</event>{}", NEWLINE)?;
        Ok(())
    }

    fn content_type(&self) -> &str {
        "text/xml"
    }
}

impl Configurable for XmlLayout {
    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<(), ConfigError> {
        match name {
            "location-info" => {
                let value = value.into_string("XmlLayout", name)?;
                self.location_info = property::to_bool(name, &value)?;
            }
            _ => {
                return Err(ConfigError::UnknownProperty {
                    target: "XmlLayout".to_owned(),
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
    use crate::event::LocationInfo;
    use crate::layout::render;
    use crate::level::Level;
    use crate::ndc;

    #[test]
    fn well_formed_fragment() {
        ndc::clear();
        ndc::push("ctx");
        let event = LoggingEvent::new("a.b", Level::ERROR, "oh < no".to_owned(), None);
        let xml = render(&XmlLayout::new(), &event);
        assert!(xml.starts_with("<event logger=\"a.b\""));
        assert!(xml.contains("level=\"ERROR\""));
        assert!(xml.contains("<message>oh &lt; no</message>"));
        assert!(xml.contains("<ndc>ctx</ndc>"));
        assert!(xml.ends_with(&format!("</event>{}", NEWLINE)));
        ndc::clear();
    }

    #[test]
    fn location_is_opt_in() {
        let location = Some(LocationInfo::new("f", "x.rs", 7));
        let event = LoggingEvent::new("a", Level::INFO, "m".to_owned(), location);
        assert!(!render(&XmlLayout::new(), &event).contains("<location"));

        let mut layout = XmlLayout::new();
        layout.set_location_info(true);
        let xml = render(&layout, &event);
        assert!(xml.contains("<location function=\"f\" file=\"x.rs\" line=\"7\"/>"));
    }
}
