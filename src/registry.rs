//! The type registry.
//!
//! Configuration files name component types as strings; the registry
//! maps those names to constructors. Built-in appenders, layouts and
//! filters are registered up front, and plug-in modules add their own
//! through the same surface at load time.
//!
//! A constructed component is configured through [`Configurable`]: the
//! configurator sets string-valued (or object-valued) properties one by
//! one, then calls `activate_options` to finish deferred initialization
//! before the component is attached and shared.

use std::fmt;
use std::sync::Arc;

use fnv::FnvHashMap;
use lazy_static::lazy_static;
use parking_lot::RwLock;

use crate::append::Append;
use crate::error::ConfigError;
use crate::filter::Filter;
use crate::layout::Layout;

/// A component shared by name through the configurator's `<object>`
/// table.
#[derive(Clone, Debug)]
pub enum SharedObject {
    /// A layout, shareable between appenders.
    Layout(Arc<dyn Layout>),
    /// A filter.
    Filter(Arc<dyn Filter>),
    /// An appender.
    Appender(Arc<dyn Append>),
}

impl SharedObject {
    /// Coerces the object to a layout.
    pub fn into_layout(self, property: &str) -> Result<Arc<dyn Layout>, ConfigError> {
        match self {
            SharedObject::Layout(layout) => Ok(layout),
            _ => Err(ConfigError::invalid_value(
                property,
                "<object>",
                "the referenced object is not a layout",
            )),
        }
    }
}

/// A property value handed to [`Configurable::set_property`].
///
/// Values arrive as strings from the configuration document; a value
/// naming a declared `<object>` arrives resolved.
#[derive(Clone, Debug)]
pub enum PropertyValue {
    /// A string value, coerced by the receiving component.
    String(String),
    /// A resolved reference to a shared object.
    Object(SharedObject),
}

impl PropertyValue {
    /// Unwraps a string value, reporting object values against
    /// `target.name`.
    pub fn into_string(self, target: &str, name: &str) -> Result<String, ConfigError> {
        match self {
            PropertyValue::String(value) => Ok(value),
            PropertyValue::Object(_) => Err(ConfigError::invalid_value(
                name,
                "<object>",
                format!("`{}` expects a string value here", target),
            )),
        }
    }
}

/// The configuration surface of a constructed component.
pub trait Configurable {
    /// Sets one named property.
    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<(), ConfigError>;

    /// Finishes initialization once all properties have been set.
    fn activate_options(&mut self) -> Result<(), ConfigError> {
        Ok(())
    }
}

/// An appender under construction: configurable now, shareable once
/// activated.
pub trait AppenderComponent: Append + Configurable {
    /// Freezes the appender into its shared form.
    fn into_appender(self: Box<Self>) -> Arc<dyn Append>;
}

impl<T: Append + Configurable> AppenderComponent for T {
    fn into_appender(self: Box<Self>) -> Arc<dyn Append> {
        Arc::new(*self)
    }
}

/// A layout under construction.
pub trait LayoutComponent: Layout + Configurable {
    /// Freezes the layout into its shared form.
    fn into_layout(self: Box<Self>) -> Arc<dyn Layout>;
}

impl<T: Layout + Configurable> LayoutComponent for T {
    fn into_layout(self: Box<Self>) -> Arc<dyn Layout> {
        Arc::new(*self)
    }
}

/// A filter under construction.
pub trait FilterComponent: Filter + Configurable {
    /// Freezes the filter into its shared form.
    fn into_filter(self: Box<Self>) -> Arc<dyn Filter>;
}

impl<T: Filter + Configurable> FilterComponent for T {
    fn into_filter(self: Box<Self>) -> Arc<dyn Filter> {
        Arc::new(*self)
    }
}

type AppenderCtor = fn() -> Box<dyn AppenderComponent>;
type LayoutCtor = fn() -> Box<dyn LayoutComponent>;
type FilterCtor = fn() -> Box<dyn FilterComponent>;

/// The registry of constructible component types.
#[derive(Default)]
pub struct TypeRegistry {
    appenders: FnvHashMap<String, AppenderCtor>,
    layouts: FnvHashMap<String, LayoutCtor>,
    filters: FnvHashMap<String, FilterCtor>,
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_struct("TypeRegistry")
            .field("appenders", &self.appenders.keys().collect::<Vec<_>>())
            .field("layouts", &self.layouts.keys().collect::<Vec<_>>())
            .field("filters", &self.filters.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl TypeRegistry {
    /// Creates an empty registry.
    pub fn new() -> TypeRegistry {
        TypeRegistry::default()
    }

    /// Creates a registry holding the built-in component types.
    pub fn with_builtins() -> TypeRegistry {
        use crate::append::{AsyncAppender, ConsoleAppender, FileAppender, RollingFileAppender};
        use crate::filter::{
            DenyAllFilter, LevelMatchFilter, LevelRangeFilter, StringMatchFilter,
        };
        use crate::layout::{
            HtmlLayout, JsonLayout, PatternLayout, SimpleLayout, TtccLayout, XmlLayout,
        };

        let mut registry = TypeRegistry::new();

        registry.register_appender("ConsoleAppender", || Box::new(ConsoleAppender::default()));
        registry.register_appender("FileAppender", || Box::new(FileAppender::default()));
        registry.register_appender("RollingFileAppender", || {
            Box::new(RollingFileAppender::default())
        });
        registry.register_appender("AsyncAppender", || Box::new(AsyncAppender::default()));
        #[cfg(unix)]
        registry.register_appender("SyslogAppender", || {
            Box::new(crate::append::SyslogAppender::default())
        });

        registry.register_layout("SimpleLayout", || Box::new(SimpleLayout::default()));
        registry.register_layout("TtccLayout", || Box::new(TtccLayout::default()));
        registry.register_layout("PatternLayout", || Box::new(PatternLayout::default()));
        registry.register_layout("HtmlLayout", || Box::new(HtmlLayout::default()));
        registry.register_layout("XmlLayout", || Box::new(XmlLayout::default()));
        registry.register_layout("JsonLayout", || Box::new(JsonLayout::default()));

        registry.register_filter("DenyAllFilter", || Box::new(DenyAllFilter::default()));
        registry.register_filter("LevelMatchFilter", || Box::new(LevelMatchFilter::default()));
        registry.register_filter("LevelRangeFilter", || Box::new(LevelRangeFilter::default()));
        registry.register_filter("StringMatchFilter", || {
            Box::new(StringMatchFilter::default())
        });

        registry
    }

    /// Registers an appender type.
    pub fn register_appender(&mut self, name: &str, ctor: AppenderCtor) {
        self.appenders.insert(name.to_owned(), ctor);
    }

    /// Registers a layout type.
    pub fn register_layout(&mut self, name: &str, ctor: LayoutCtor) {
        self.layouts.insert(name.to_owned(), ctor);
    }

    /// Registers a filter type.
    pub fn register_filter(&mut self, name: &str, ctor: FilterCtor) {
        self.filters.insert(name.to_owned(), ctor);
    }

    /// Constructs an appender by type name.
    pub fn create_appender(&self, name: &str) -> Result<Box<dyn AppenderComponent>, ConfigError> {
        self.appenders
            .get(name)
            .map(|ctor| ctor())
            .ok_or_else(|| ConfigError::UnknownType(name.to_owned()))
    }

    /// Constructs a layout by type name.
    pub fn create_layout(&self, name: &str) -> Result<Box<dyn LayoutComponent>, ConfigError> {
        self.layouts
            .get(name)
            .map(|ctor| ctor())
            .ok_or_else(|| ConfigError::UnknownType(name.to_owned()))
    }

    /// Constructs a filter by type name.
    pub fn create_filter(&self, name: &str) -> Result<Box<dyn FilterComponent>, ConfigError> {
        self.filters
            .get(name)
            .map(|ctor| ctor())
            .ok_or_else(|| ConfigError::UnknownType(name.to_owned()))
    }

    /// Returns `true` if any kind of component is registered under
    /// `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.appenders.contains_key(name)
            || self.layouts.contains_key(name)
            || self.filters.contains_key(name)
    }
}

lazy_static! {
    static ref REGISTRY: RwLock<TypeRegistry> = RwLock::new(TypeRegistry::with_builtins());
}

/// Returns the process-wide type registry.
pub fn registry() -> &'static RwLock<TypeRegistry> {
    &REGISTRY
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn builtins_resolve() {
        let registry = TypeRegistry::with_builtins();
        assert!(registry.create_appender("ConsoleAppender").is_ok());
        assert!(registry.create_layout("PatternLayout").is_ok());
        assert!(registry.create_filter("DenyAllFilter").is_ok());
        assert!(registry.contains("RollingFileAppender"));
    }

    #[test]
    fn unknown_types_are_reported() {
        let registry = TypeRegistry::with_builtins();
        assert!(matches!(
            registry.create_appender("CarrierPigeonAppender"),
            Err(ConfigError::UnknownType(name)) if name == "CarrierPigeonAppender"
        ));
    }

    #[test]
    fn modules_can_register_types() {
        let mut registry = TypeRegistry::new();
        registry.register_filter("DenyAllFilter", || {
            Box::new(crate::filter::DenyAllFilter::default())
        });
        assert!(registry.create_filter("DenyAllFilter").is_ok());
        assert!(registry.create_appender("DenyAllFilter").is_err());
    }

    #[test]
    fn configured_component_round_trip() {
        let registry = TypeRegistry::with_builtins();
        let mut layout = registry.create_layout("PatternLayout").unwrap();
        layout
            .set_property(
                "conversion-pattern",
                PropertyValue::String("%p: %m".to_owned()),
            )
            .unwrap();
        layout.activate_options().unwrap();
        let layout = layout.into_layout();

        let event = crate::event::LoggingEvent::new(
            "a",
            crate::level::Level::WARN,
            "pinch".to_owned(),
            None,
        );
        let mut buf = Vec::new();
        layout.format(&mut buf, &event).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "WARN: pinch");
    }
}
