//! A minimal layout.

use std::io::{self, Write};

use crate::error::ConfigError;
use crate::event::LoggingEvent;
use crate::layout::{Layout, NEWLINE};
use crate::registry::{Configurable, PropertyValue};

/// A layout that prints the level name and the message, nothing else.
#[derive(Debug, Default)]
pub struct SimpleLayout(());

impl SimpleLayout {
    /// Creates a new `SimpleLayout`.
    pub fn new() -> SimpleLayout {
        SimpleLayout::default()
    }
}

impl Layout for SimpleLayout {
    fn format(&self, w: &mut dyn io::Write, event: &LoggingEvent) -> anyhow::Result<()> {
        write!(w, "{} - {}{}", event.level(), event.message(), NEWLINE)?;
        Ok(())
    }
}

impl Configurable for SimpleLayout {
    fn set_property(&mut self, name: &str, _value: PropertyValue) -> Result<(), ConfigError> {
        Err(ConfigError::UnknownProperty {
            target: "SimpleLayout".to_owned(),
            name: name.to_owned(),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::layout::render;
    use crate::level::Level;

    #[test]
    fn level_and_message() {
        let event = LoggingEvent::new("a.b", Level::WARN, "watch out".to_owned(), None);
        assert_eq!(render(&SimpleLayout::new(), &event), "WARN - watch out\n");
    }
}
