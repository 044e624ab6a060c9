//! A filter matching a closed range of levels.

use crate::config::property;
use crate::error::ConfigError;
use crate::event::LoggingEvent;
use crate::filter::{Decision, Filter};
use crate::level::Level;
use crate::registry::{Configurable, PropertyValue};

/// A filter that denies events outside a level range.
///
/// Events below `level_min` or above `level_max` are denied. Events in
/// range are accepted when `accept_on_range` is set, and passed through
/// neutrally otherwise. An unset bound does not constrain that side.
#[derive(Debug, Default)]
pub struct LevelRangeFilter {
    level_min: Option<Level>,
    level_max: Option<Level>,
    accept_on_range: bool,
}

impl LevelRangeFilter {
    /// Creates a filter with the given bounds.
    pub fn new(
        level_min: Option<Level>,
        level_max: Option<Level>,
        accept_on_range: bool,
    ) -> LevelRangeFilter {
        LevelRangeFilter {
            level_min,
            level_max,
            accept_on_range,
        }
    }
}

impl Filter for LevelRangeFilter {
    fn decide(&self, event: &LoggingEvent) -> Decision {
        if let Some(min) = self.level_min {
            if event.level() < min {
                return Decision::Deny;
            }
        }
        if let Some(max) = self.level_max {
            if event.level() > max {
                return Decision::Deny;
            }
        }
        if self.accept_on_range {
            Decision::Accept
        } else {
            Decision::Neutral
        }
    }
}

impl Configurable for LevelRangeFilter {
    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<(), ConfigError> {
        let value = value.into_string("LevelRangeFilter", name)?;
        match name {
            "level-min" => self.level_min = Some(property::to_level(name, &value)?),
            "level-max" => self.level_max = Some(property::to_level(name, &value)?),
            "accept-on-range" => self.accept_on_range = property::to_bool(name, &value)?,
            _ => {
                return Err(ConfigError::UnknownProperty {
                    target: "LevelRangeFilter".to_owned(),
                    name: name.to_owned(),
                })
            }
        }
        Ok(())
    }
}
