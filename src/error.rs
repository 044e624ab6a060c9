//! Configuration and initialization errors.

use thiserror::Error;

/// An error raised while configuring the framework.
///
/// Configuration errors are reported to the caller of the configurator;
/// they never cross a logging call.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration document could not be read.
    #[error("unable to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration document is not well-formed XML.
    #[error("malformed configuration: {0}")]
    Malformed(String),

    /// The document root is not a `<configuration>` element.
    #[error("unexpected document root <{0}>")]
    UnexpectedRoot(String),

    /// A type name did not resolve against the type registry.
    #[error("unknown type `{0}`")]
    UnknownType(String),

    /// A required attribute was missing from an element.
    #[error("missing attribute `{attribute}` on <{element}>")]
    MissingAttribute {
        /// The element lacking the attribute.
        element: String,
        /// The attribute that was expected.
        attribute: String,
    },

    /// A property name did not resolve against the target type.
    #[error("`{target}` has no property `{name}`")]
    UnknownProperty {
        /// The type the property was set on.
        target: String,
        /// The property name.
        name: String,
    },

    /// A property value could not be coerced to the expected type.
    #[error("invalid value `{value}` for property `{name}`: {reason}")]
    InvalidValue {
        /// The property name.
        name: String,
        /// The rejected value.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// An appender that requires a layout was activated without one.
    #[error("appender `{0}` requires a layout")]
    MissingLayout(String),

    /// An `<appender>` reference named an appender not yet declared.
    #[error("reference to undeclared appender `{0}`")]
    UndeclaredAppender(String),

    /// An `<object>` reference named an object not yet declared.
    #[error("reference to undeclared object `{0}`")]
    UndeclaredObject(String),

    /// A component could not finish its deferred initialization.
    #[error("unable to activate `{target}`: {reason}")]
    Activation {
        /// The type being activated.
        target: String,
        /// Why activation failed.
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid_value(
        name: &str,
        value: &str,
        reason: impl Into<String>,
    ) -> ConfigError {
        ConfigError::InvalidValue {
            name: name.to_owned(),
            value: value.to_owned(),
            reason: reason.into(),
        }
    }
}
