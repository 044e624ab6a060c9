//! A filter matching a substring of the message.

use crate::config::property;
use crate::error::ConfigError;
use crate::event::LoggingEvent;
use crate::filter::{Decision, Filter};
use crate::registry::{Configurable, PropertyValue};

/// A filter that matches events whose message contains a substring.
#[derive(Debug)]
pub struct StringMatchFilter {
    string_to_match: Option<String>,
    accept_on_match: bool,
}

impl Default for StringMatchFilter {
    fn default() -> StringMatchFilter {
        StringMatchFilter {
            string_to_match: None,
            accept_on_match: true,
        }
    }
}

impl StringMatchFilter {
    /// Creates a filter matching `string`.
    pub fn new<T: Into<String>>(string: T, accept_on_match: bool) -> StringMatchFilter {
        StringMatchFilter {
            string_to_match: Some(string.into()),
            accept_on_match,
        }
    }
}

impl Filter for StringMatchFilter {
    fn decide(&self, event: &LoggingEvent) -> Decision {
        match self.string_to_match.as_deref() {
            Some(needle) if !needle.is_empty() && event.message().contains(needle) => {
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

impl Configurable for StringMatchFilter {
    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<(), ConfigError> {
        let value = value.into_string("StringMatchFilter", name)?;
        match name {
            "string-to-match" => self.string_to_match = Some(value),
            "accept-on-match" => self.accept_on_match = property::to_bool(name, &value)?,
            _ => {
                return Err(ConfigError::UnknownProperty {
                    target: "StringMatchFilter".to_owned(),
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
    use crate::level::Level;

    fn event(message: &str) -> LoggingEvent {
        LoggingEvent::new("a", Level::INFO, message.to_owned(), None)
    }

    #[test]
    fn matches_substring() {
        let filter = StringMatchFilter::new("needle", true);
        assert_eq!(filter.decide(&event("a needle here")), Decision::Accept);
        assert_eq!(filter.decide(&event("nothing")), Decision::Neutral);
    }

    #[test]
    fn denies_when_configured() {
        let filter = StringMatchFilter::new("secret", false);
        assert_eq!(filter.decide(&event("a secret value")), Decision::Deny);
    }
}
