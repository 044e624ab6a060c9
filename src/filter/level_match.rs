//! A filter matching one exact level.

use crate::error::ConfigError;
use crate::event::LoggingEvent;
use crate::filter::{Decision, Filter};
use crate::level::Level;
use crate::registry::{Configurable, PropertyValue};

use crate::config::property;

/// A filter that matches events at exactly one level.
///
/// Matching events are accepted or denied according to
/// `accept_on_match`; all other events pass through neutrally.
#[derive(Debug)]
pub struct LevelMatchFilter {
    level_to_match: Option<Level>,
    accept_on_match: bool,
}

impl Default for LevelMatchFilter {
    fn default() -> LevelMatchFilter {
        LevelMatchFilter {
            level_to_match: None,
            accept_on_match: true,
        }
    }
}

impl LevelMatchFilter {
    /// Creates a filter matching `level`.
    pub fn new(level: Level, accept_on_match: bool) -> LevelMatchFilter {
        LevelMatchFilter {
            level_to_match: Some(level),
            accept_on_match,
        }
    }
}

impl Filter for LevelMatchFilter {
    fn decide(&self, event: &LoggingEvent) -> Decision {
        match self.level_to_match {
            Some(level) if event.level() == level => {
                if self.accept_on_match {
                    Decision::Accept
                } else {
                    Decision::Deny
                }
            }
            _ => Decision::Neutral,
        }
    }
}

impl Configurable for LevelMatchFilter {
    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<(), ConfigError> {
        let value = value.into_string("LevelMatchFilter", name)?;
        match name {
            "level-to-match" => {
                self.level_to_match = Some(property::to_level(name, &value)?);
            }
            "accept-on-match" => {
                self.accept_on_match = property::to_bool(name, &value)?;
            }
            _ => {
                return Err(ConfigError::UnknownProperty {
                    target: "LevelMatchFilter".to_owned(),
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

    fn event(level: Level) -> LoggingEvent {
        LoggingEvent::new("a", level, "x".to_owned(), None)
    }

    #[test]
    fn accepts_on_match() {
        let filter = LevelMatchFilter::new(Level::WARN, true);
        assert_eq!(filter.decide(&event(Level::WARN)), Decision::Accept);
        assert_eq!(filter.decide(&event(Level::ERROR)), Decision::Neutral);
    }

    #[test]
    fn denies_on_match() {
        let filter = LevelMatchFilter::new(Level::WARN, false);
        assert_eq!(filter.decide(&event(Level::WARN)), Decision::Deny);
        assert_eq!(filter.decide(&event(Level::INFO)), Decision::Neutral);
    }

    #[test]
    fn unconfigured_is_neutral() {
        let filter = LevelMatchFilter::default();
        assert_eq!(filter.decide(&event(Level::WARN)), Decision::Neutral);
    }
}
