//! A filter that drops every event.
//!
//! Placed at the end of a chain it turns the chain's default from
//! "write" into "drop", so that only events explicitly accepted by an
//! earlier filter get through.

use crate::event::LoggingEvent;
use crate::filter::{Decision, Filter};
use crate::registry::{Configurable, PropertyValue};

use crate::error::ConfigError;

/// A filter that denies all events.
#[derive(Debug, Default)]
pub struct DenyAllFilter(());

impl DenyAllFilter {
    /// Creates a new `DenyAllFilter`.
    pub fn new() -> DenyAllFilter {
        DenyAllFilter::default()
    }
}

impl Filter for DenyAllFilter {
    fn decide(&self, _event: &LoggingEvent) -> Decision {
        Decision::Deny
    }
}

impl Configurable for DenyAllFilter {
    fn set_property(&mut self, name: &str, _value: PropertyValue) -> Result<(), ConfigError> {
        Err(ConfigError::UnknownProperty {
            target: "DenyAllFilter".to_owned(),
            name: name.to_owned(),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::level::Level;

    #[test]
    fn denies_everything() {
        let filter = DenyAllFilter::new();
        let event = LoggingEvent::new("a", Level::FATAL, "x".to_owned(), None);
        assert_eq!(filter.decide(&event), Decision::Deny);
    }
}
