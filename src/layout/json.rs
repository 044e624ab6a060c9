//! A layout producing one JSON object per event.
//!
//! An example object (real output is not pretty-printed):
//!
//! ```json
//! {
//!     "time": "2026-03-20T14:22:20.644420340-08:00",
//!     "level": "INFO",
//!     "logger": "net.example",
//!     "message": "the log message",
//!     "thread": "main",
//!     "ndc": "request-42",
//!     "mdc": {"user": "alice"}
//! }
//! ```

use std::io::{self, Write};

use chrono::{DateTime, Local};
use serde_json::{json, Map, Value};

use crate::config::property;
use crate::error::ConfigError;
use crate::event::LoggingEvent;
use crate::layout::{Layout, NEWLINE};
use crate::registry::{Configurable, PropertyValue};

/// A layout that writes each event as a JSON object on its own line.
#[derive(Debug, Default)]
pub struct JsonLayout {
    location_info: bool,
}

impl JsonLayout {
    /// Creates a new `JsonLayout`.
    pub fn new() -> JsonLayout {
        JsonLayout::default()
    }

    /// Includes the source location of each event in the output.
    pub fn set_location_info(&mut self, location_info: bool) {
        self.location_info = location_info;
    }
}

impl Layout for JsonLayout {
    fn format(&self, w: &mut dyn io::Write, event: &LoggingEvent) -> anyhow::Result<()> {
        let time = DateTime::<Local>::from(event.timestamp());
        let mut map = Map::new();
        map.insert("time".to_owned(), Value::String(time.to_rfc3339()));
        map.insert(
            "level".to_owned(),
            Value::String(event.level().name().to_owned()),
        );
        map.insert(
            "logger".to_owned(),
            Value::String(event.logger_name().to_owned()),
        );
        map.insert(
            "message".to_owned(),
            Value::String(event.message().to_owned()),
        );
        map.insert(
            "thread".to_owned(),
            Value::String(event.thread_name().to_owned()),
        );
        if let Some(ndc) = event.ndc() {
            map.insert("ndc".to_owned(), Value::String(ndc.to_owned()));
        }
        let mdc = event.mdc_snapshot();
        if !mdc.is_empty() {
            let mdc: Map<String, Value> = mdc
                .into_iter()
                .map(|(k, v)| (k, Value::String(v)))
                .collect();
            map.insert("mdc".to_owned(), Value::Object(mdc));
        }
        if self.location_info {
            if let Some(location) = event.location() {
                map.insert(
                    "location".to_owned(),
                    json!({
                        "function": location.function(),
                        "file": location.file(),
                        "line": location.line(),
                    }),
                );
            }
        }
        serde_json::to_writer(&mut *w, &Value::Object(map))?;
        w.write_all(NEWLINE.as_bytes())?;
        Ok(())
    }

    fn content_type(&self) -> &str {
        "application/json"
    }
}

impl Configurable for JsonLayout {
    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<(), ConfigError> {
        match name {
            "location-info" => {
                let value = value.into_string("JsonLayout", name)?;
                self.location_info = property::to_bool(name, &value)?;
            }
            _ => {
                return Err(ConfigError::UnknownProperty {
                    target: "JsonLayout".to_owned(),
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
    use crate::{mdc, ndc};

    #[test]
    fn one_object_per_line() {
        ndc::clear();
        mdc::clear();
        mdc::put("user", "alice");
        let event = LoggingEvent::new("a.b", Level::INFO, "hi".to_owned(), None);
        let line = render(&JsonLayout::new(), &event);
        assert!(line.ends_with('\n'));

        let value: Value = serde_json::from_str(line.trim_end()).unwrap();
        assert_eq!(value["level"], "INFO");
        assert_eq!(value["logger"], "a.b");
        assert_eq!(value["message"], "hi");
        assert_eq!(value["mdc"]["user"], "alice");
        assert!(value.get("ndc").is_none());
        mdc::clear();
    }
}
