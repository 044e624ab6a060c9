//! The DOM configurator.
//!
//! Reads a declarative XML document into the current repository.
//!
//! # Syntax
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <configuration threshold="all" debug="false">
//!
//!     <!-- Appenders are declared with a type from the registry and
//!          configured through nested properties. -->
//!     <appender name="A1" type="ConsoleAppender">
//!         <property name="target" value="stdout"/>
//!         <layout type="PatternLayout">
//!             <property name="conversion-pattern" value="%-5p %c - %m%n"/>
//!         </layout>
//!         <filter type="LevelRangeFilter">
//!             <property name="level-min" value="info"/>
//!             <property name="level-max" value="warn"/>
//!             <property name="accept-on-range" value="true"/>
//!         </filter>
//!     </appender>
//!
//!     <!-- A type-less <appender> is a reference to an earlier one. -->
//!     <logger name="net.example.fulliautomatix" additivity="false">
//!         <level value="debug"/>
//!         <appender name="A1"/>
//!     </logger>
//!
//!     <root>
//!         <level value="warn"/>
//!         <appender name="A1"/>
//!     </root>
//! </configuration>
//! ```
//!
//! `<object name="..." type="...">` declares a named, shareable
//! component (typically a layout) that object-valued properties can
//! reference by name.
//!
//! The root element takes three optional attributes: `debug` toggles the
//! framework's internal diagnostics, `reset` wipes the repository before
//! applying the document, and `threshold` sets the repository-wide
//! level gate.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::Arc;

use xml::reader::{EventReader, XmlEvent};

use crate::append::Append;
use crate::config::property;
use crate::error::ConfigError;
use crate::filter::Filter;
use crate::internal;
use crate::layout::Layout;
use crate::manager;
use crate::registry::{
    self, AppenderComponent, Configurable, FilterComponent, LayoutComponent, PropertyValue,
    SharedObject,
};

/// A parsed XML element: name, attributes and child elements.
struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
}

impl Element {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(attr, _)| attr == name)
            .map(|(_, value)| value.as_str())
    }

    fn require_attr(&self, name: &str) -> Result<&str, ConfigError> {
        self.attr(name).ok_or_else(|| ConfigError::MissingAttribute {
            element: self.name.clone(),
            attribute: name.to_owned(),
        })
    }
}

fn parse_document<R: Read>(input: R) -> Result<Element, ConfigError> {
    let mut stack: Vec<Element> = Vec::new();
    for event in EventReader::new(input) {
        match event.map_err(|error| ConfigError::Malformed(error.to_string()))? {
            XmlEvent::StartElement {
                name, attributes, ..
            } => {
                stack.push(Element {
                    name: name.local_name,
                    attributes: attributes
                        .into_iter()
                        .map(|attr| (attr.name.local_name, attr.value))
                        .collect(),
                    children: Vec::new(),
                });
            }
            XmlEvent::EndElement { .. } => {
                let element = match stack.pop() {
                    Some(element) => element,
                    None => return Err(ConfigError::Malformed("unbalanced document".to_owned())),
                };
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => return Ok(element),
                }
            }
            _ => {}
        }
    }
    Err(ConfigError::Malformed("empty document".to_owned()))
}

/// Configures the framework from an XML document.
pub struct DomConfigurator {
    appenders: HashMap<String, Arc<dyn Append>>,
    objects: HashMap<String, SharedObject>,
}

impl DomConfigurator {
    /// Applies the configuration file at `path` to the current
    /// repository.
    pub fn configure<P: AsRef<Path>>(path: P) -> Result<(), ConfigError> {
        let file = File::open(path)?;
        Self::configure_reader(BufReader::new(file))
    }

    /// Applies a configuration document read from `input`.
    pub fn configure_reader<R: Read>(input: R) -> Result<(), ConfigError> {
        if std::env::var_os("LOG4G_PARSE_DTDVALID").is_some() {
            internal::warn(format_args!(
                "LOG4G_PARSE_DTDVALID is set, but DTD validation is not supported"
            ));
        }
        let document = parse_document(input)?;
        if document.name != "configuration" {
            return Err(ConfigError::UnexpectedRoot(document.name));
        }
        let mut configurator = DomConfigurator {
            appenders: HashMap::new(),
            objects: HashMap::new(),
        };
        configurator.apply(&document)
    }

    fn apply(&mut self, document: &Element) -> Result<(), ConfigError> {
        match document.attr("debug") {
            Some("true") => internal::set_internal_debugging(true),
            Some("false") => internal::set_internal_debugging(false),
            Some("null") | None => {}
            Some(other) => internal::warn(format_args!(
                "ignoring invalid debug attribute [{}]",
                other
            )),
        }
        if document.attr("reset") == Some("true") {
            manager::reset_configuration();
        }
        let repository = manager::instance().repository();
        if let Some(threshold) = document.attr("threshold") {
            repository.set_threshold_str(threshold);
        }

        for child in &document.children {
            match child.name.as_str() {
                "appender" => {
                    self.parse_appender(child)?;
                }
                "object" => self.parse_object(child)?,
                "logger" => self.parse_logger(child)?,
                "root" => self.parse_root(child)?,
                other => internal::warn(format_args!(
                    "ignoring unknown element <{}>",
                    other
                )),
            }
        }
        Ok(())
    }

    /// Constructs an appender declaration, or resolves a type-less
    /// element as a reference to an earlier declaration.
    fn parse_appender(&mut self, element: &Element) -> Result<Arc<dyn Append>, ConfigError> {
        let type_name = match element.attr("type") {
            Some(type_name) => type_name,
            None => {
                let name = element.require_attr("name")?;
                return self
                    .appenders
                    .get(name)
                    .cloned()
                    .ok_or_else(|| ConfigError::UndeclaredAppender(name.to_owned()));
            }
        };

        let mut appender = registry::registry().read().create_appender(type_name)?;
        let name = element.attr("name");
        if let Some(name) = name {
            appender.skeleton().set_name(name);
        }

        let mut nested = Vec::new();
        for child in &element.children {
            match child.name.as_str() {
                "property" => {
                    let (name, value) = self.resolve_property(child)?;
                    appender.set_property(&name, value)?;
                }
                "layout" => {
                    let layout = self.parse_layout(child)?;
                    appender.skeleton().set_layout(layout);
                }
                "filter" => {
                    let filter = self.parse_filter(child)?;
                    appender.skeleton().add_filter(filter);
                }
                "appender" => nested.push(self.parse_appender(child)?),
                other => internal::warn(format_args!(
                    "ignoring unknown element <{}> in <appender>",
                    other
                )),
            }
        }

        if appender.requires_layout() && appender.skeleton().layout().is_none() {
            return Err(ConfigError::MissingLayout(
                name.unwrap_or(type_name).to_owned(),
            ));
        }
        appender.activate_options()?;
        let appender = appender.into_appender();

        if !nested.is_empty() {
            match appender.as_attachable() {
                Some(attachable) => {
                    for inner in nested {
                        attachable.add_appender(inner);
                    }
                }
                None => internal::warn(format_args!(
                    "appender type [{}] cannot attach nested appenders",
                    type_name
                )),
            }
        }

        if let Some(name) = name {
            self.appenders.insert(name.to_owned(), appender.clone());
        }
        Ok(appender)
    }

    fn parse_layout(&self, element: &Element) -> Result<Arc<dyn Layout>, ConfigError> {
        let type_name = element.require_attr("type")?;
        let mut layout = registry::registry().read().create_layout(type_name)?;
        for child in &element.children {
            match child.name.as_str() {
                "property" => {
                    let (name, value) = self.resolve_property(child)?;
                    layout.set_property(&name, value)?;
                }
                other => internal::warn(format_args!(
                    "ignoring unknown element <{}> in <layout>",
                    other
                )),
            }
        }
        layout.activate_options()?;
        Ok(layout.into_layout())
    }

    fn parse_filter(&self, element: &Element) -> Result<Arc<dyn Filter>, ConfigError> {
        let type_name = element.require_attr("type")?;
        let mut filter = registry::registry().read().create_filter(type_name)?;
        for child in &element.children {
            match child.name.as_str() {
                "property" => {
                    let (name, value) = self.resolve_property(child)?;
                    filter.set_property(&name, value)?;
                }
                other => internal::warn(format_args!(
                    "ignoring unknown element <{}> in <filter>",
                    other
                )),
            }
        }
        filter.activate_options()?;
        Ok(filter.into_filter())
    }

    /// Declares a named shareable component for object-valued
    /// properties.
    fn parse_object(&mut self, element: &Element) -> Result<(), ConfigError> {
        let name = element.require_attr("name")?;
        let type_name = element.require_attr("type")?;
        let registry = registry::registry().read();

        let object = if registry.create_layout(type_name).is_ok() {
            drop(registry);
            SharedObject::Layout(self.parse_layout(element)?)
        } else if registry.create_filter(type_name).is_ok() {
            drop(registry);
            SharedObject::Filter(self.parse_filter(element)?)
        } else if registry.create_appender(type_name).is_ok() {
            drop(registry);
            SharedObject::Appender(self.parse_appender(element)?)
        } else {
            return Err(ConfigError::UnknownType(type_name.to_owned()));
        };

        self.objects.insert(name.to_owned(), object);
        Ok(())
    }

    fn parse_logger(&mut self, element: &Element) -> Result<(), ConfigError> {
        let name = element.require_attr("name")?;
        let logger = manager::get_logger(name);
        if let Some(additivity) = element.attr("additivity") {
            logger.set_additivity(property::to_bool("additivity", additivity)?);
        }
        self.parse_logger_children(element, &*logger)
    }

    fn parse_root(&mut self, element: &Element) -> Result<(), ConfigError> {
        let root = manager::root_logger();
        self.parse_logger_children(element, &*root)
    }

    fn parse_logger_children(
        &mut self,
        element: &Element,
        logger: &crate::logger::Logger,
    ) -> Result<(), ConfigError> {
        use crate::append::AppenderAttachable;
        for child in &element.children {
            match child.name.as_str() {
                "level" => {
                    let value = child.require_attr("value")?;
                    logger.set_level(Some(property::to_level("level", value)?));
                }
                "appender" => {
                    let appender = self.parse_appender(child)?;
                    logger.add_appender(appender);
                }
                other => internal::warn(format_args!(
                    "ignoring unknown element <{}> in <{}>",
                    other, element.name
                )),
            }
        }
        Ok(())
    }

    /// Resolves one `<property name= value=/>` element.
    ///
    /// A value naming a declared `<object>` resolves to an object
    /// reference; anything else stays a string.
    fn resolve_property(
        &self,
        element: &Element,
    ) -> Result<(String, PropertyValue), ConfigError> {
        let name = element.require_attr("name")?;
        let value = element.require_attr("value")?;
        let value = match self.objects.get(value) {
            Some(object) => PropertyValue::Object(object.clone()),
            None => PropertyValue::String(value.to_owned()),
        };
        Ok((name.to_owned(), value))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::append::AppenderAttachable;
    use crate::level::Level;

    fn configure(xml: &str) -> Result<(), ConfigError> {
        DomConfigurator::configure_reader(xml.as_bytes())
    }

    #[test]
    fn full_document() {
        let _lock = manager::GLOBAL_TEST_LOCK.lock();
        manager::reset_configuration();
        configure(
            r#"<?xml version="1.0"?>
            <configuration threshold="all">
                <appender name="dom-a1" type="ConsoleAppender">
                    <property name="target" value="stderr"/>
                    <layout type="PatternLayout">
                        <property name="conversion-pattern" value="%p - %m%n"/>
                    </layout>
                    <filter type="LevelRangeFilter">
                        <property name="level-min" value="info"/>
                        <property name="accept-on-range" value="true"/>
                    </filter>
                </appender>
                <logger name="dom.test.child" additivity="false">
                    <level value="trace"/>
                    <appender name="dom-a1"/>
                </logger>
                <root>
                    <level value="warn"/>
                    <appender name="dom-a1"/>
                </root>
            </configuration>"#,
        )
        .unwrap();

        let logger = manager::exists("dom.test.child").unwrap();
        assert_eq!(logger.level(), Some(Level::TRACE));
        assert!(!logger.additivity());
        assert_eq!(logger.get_all_appenders().len(), 1);
        assert!(logger.get_appender("dom-a1").is_some());

        let root = manager::root_logger();
        assert_eq!(root.level(), Some(Level::WARN));
        assert!(root.get_appender("dom-a1").is_some());
        manager::reset_configuration();
    }

    #[test]
    fn forward_reference_is_an_error() {
        let _lock = manager::GLOBAL_TEST_LOCK.lock();
        let result = configure(
            r#"<configuration>
                <root>
                    <appender name="later"/>
                </root>
            </configuration>"#,
        );
        assert!(matches!(
            result,
            Err(ConfigError::UndeclaredAppender(name)) if name == "later"
        ));
    }

    #[test]
    fn unknown_type_is_an_error() {
        let _lock = manager::GLOBAL_TEST_LOCK.lock();
        let result = configure(
            r#"<configuration>
                <appender name="x" type="TelegraphAppender">
                    <layout type="SimpleLayout"/>
                </appender>
            </configuration>"#,
        );
        assert!(matches!(result, Err(ConfigError::UnknownType(_))));
    }

    #[test]
    fn missing_layout_is_an_error() {
        let _lock = manager::GLOBAL_TEST_LOCK.lock();
        let result = configure(
            r#"<configuration>
                <appender name="bare" type="ConsoleAppender"/>
            </configuration>"#,
        );
        assert!(matches!(
            result,
            Err(ConfigError::MissingLayout(name)) if name == "bare"
        ));
    }

    #[test]
    fn malformed_xml_is_reported() {
        let _lock = manager::GLOBAL_TEST_LOCK.lock();
        assert!(matches!(
            configure("<configuration><appender"),
            Err(ConfigError::Malformed(_))
        ));
        assert!(matches!(
            configure("<not-a-configuration/>"),
            Err(ConfigError::UnexpectedRoot(name)) if name == "not-a-configuration"
        ));
    }

    #[test]
    fn shared_layout_object() {
        let _lock = manager::GLOBAL_TEST_LOCK.lock();
        manager::reset_configuration();
        configure(
            r#"<configuration>
                <object name="shared-pattern" type="PatternLayout">
                    <property name="conversion-pattern" value="%m%n"/>
                </object>
                <appender name="dom-obj-a" type="ConsoleAppender">
                    <property name="layout" value="shared-pattern"/>
                </appender>
            </configuration>"#,
        )
        .unwrap();
        manager::reset_configuration();
    }

    #[test]
    fn threshold_attribute_gates_repository() {
        let _lock = manager::GLOBAL_TEST_LOCK.lock();
        manager::reset_configuration();
        configure(r#"<configuration threshold="error"/>"#).unwrap();
        assert_eq!(
            manager::instance().repository().threshold(),
            Level::ERROR
        );
        manager::reset_configuration();
    }
}
