//! The syslog appender.
//!
//! Writes events to the local system log via `syslog(3)`. Each event's
//! priority is its level's syslog code OR'd with the configured
//! facility; the mapping from levels to codes lives on
//! [`Level`](crate::level::Level) itself.

use std::ffi::CString;
use std::sync::Arc;

use anyhow::anyhow;
use parking_lot::RwLock;

use crate::append::{Append, AppenderSkeleton};
use crate::config::property;
use crate::error::ConfigError;
use crate::event::LoggingEvent;
use crate::layout::Layout;
use crate::registry::{Configurable, PropertyValue};

#[derive(Debug)]
struct SyslogOptions {
    ident: Option<CString>,
    option: i32,
    facility: i32,
}

impl Default for SyslogOptions {
    fn default() -> SyslogOptions {
        SyslogOptions {
            ident: None,
            option: 0,
            facility: libc::LOG_USER,
        }
    }
}

fn parse_facility(value: &str) -> Result<i32, ConfigError> {
    // Accepted by name or as the raw facility code.
    let facility = match value.to_ascii_lowercase().as_str() {
        "auth" => libc::LOG_AUTH,
        "cron" => libc::LOG_CRON,
        "daemon" => libc::LOG_DAEMON,
        "kern" => libc::LOG_KERN,
        "lpr" => libc::LOG_LPR,
        "mail" => libc::LOG_MAIL,
        "news" => libc::LOG_NEWS,
        "syslog" => libc::LOG_SYSLOG,
        "user" => libc::LOG_USER,
        "uucp" => libc::LOG_UUCP,
        "local0" => libc::LOG_LOCAL0,
        "local1" => libc::LOG_LOCAL1,
        "local2" => libc::LOG_LOCAL2,
        "local3" => libc::LOG_LOCAL3,
        "local4" => libc::LOG_LOCAL4,
        "local5" => libc::LOG_LOCAL5,
        "local6" => libc::LOG_LOCAL6,
        "local7" => libc::LOG_LOCAL7,
        _ => property::to_i32("facility", value)?,
    };
    Ok(facility)
}

/// An appender which logs to `syslog(3)`.
#[derive(Debug, Default)]
pub struct SyslogAppender {
    skeleton: AppenderSkeleton,
    options: RwLock<SyslogOptions>,
}

impl SyslogAppender {
    /// Creates a new `SyslogAppender` builder.
    pub fn builder() -> SyslogAppenderBuilder {
        SyslogAppenderBuilder {
            options: SyslogOptions::default(),
            layout: None,
        }
    }

    fn openlog(&self) {
        let options = self.options.read();
        if let Some(ident) = &options.ident {
            // The ident pointer must stay valid for the lifetime of the
            // connection; the CString lives in `options` until close.
            unsafe { libc::openlog(ident.as_ptr(), options.option, options.facility) };
        }
    }
}

impl Append for SyslogAppender {
    fn skeleton(&self) -> &AppenderSkeleton {
        &self.skeleton
    }

    fn append(&self, event: &LoggingEvent) -> anyhow::Result<()> {
        let layout = self
            .skeleton
            .layout()
            .ok_or_else(|| anyhow!("syslog appender has no layout"))?;
        let mut buffer = Vec::new();
        layout.format(&mut buffer, event)?;
        let message = CString::new(buffer).map_err(|_| anyhow!("message contains a NUL byte"))?;
        let priority = self.options.read().facility | event.level().syslog_code();
        unsafe {
            libc::syslog(
                priority,
                b"%s\0".as_ptr().cast(),
                message.as_ptr(),
            );
        }
        Ok(())
    }

    fn close(&self) {
        let _guard = self.skeleton.lock();
        if !self.skeleton.mark_closed() {
            return;
        }
        let mut options = self.options.write();
        if options.ident.take().is_some() {
            unsafe { libc::closelog() };
        }
    }
}

impl Configurable for SyslogAppender {
    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<(), ConfigError> {
        match name {
            "ident" => {
                let value = value.into_string("SyslogAppender", name)?;
                let ident = CString::new(value.clone()).map_err(|_| {
                    ConfigError::invalid_value(name, &value, "contains a NUL byte")
                })?;
                self.options.write().ident = Some(ident);
            }
            "option" => {
                let value = value.into_string("SyslogAppender", name)?;
                self.options.write().option = property::to_i32(name, &value)?;
            }
            "facility" => {
                let value = value.into_string("SyslogAppender", name)?;
                self.options.write().facility = parse_facility(&value)?;
            }
            _ => return self.skeleton.set_common_property("SyslogAppender", name, value),
        }
        Ok(())
    }

    fn activate_options(&mut self) -> Result<(), ConfigError> {
        self.openlog();
        Ok(())
    }
}

/// A builder for [`SyslogAppender`]s.
pub struct SyslogAppenderBuilder {
    options: SyslogOptions,
    layout: Option<Arc<dyn Layout>>,
}

impl SyslogAppenderBuilder {
    /// Sets the identifier prepended to every message.
    pub fn ident(mut self, ident: &str) -> SyslogAppenderBuilder {
        self.options.ident = CString::new(ident).ok();
        self
    }

    /// Sets the `openlog(3)` option bits.
    pub fn option(mut self, option: i32) -> SyslogAppenderBuilder {
        self.options.option = option;
        self
    }

    /// Sets the syslog facility. Defaults to `LOG_USER`.
    pub fn facility(mut self, facility: i32) -> SyslogAppenderBuilder {
        self.options.facility = facility;
        self
    }

    /// Sets the layout.
    pub fn layout(mut self, layout: Arc<dyn Layout>) -> SyslogAppenderBuilder {
        self.layout = Some(layout);
        self
    }

    /// Consumes the builder, producing a `SyslogAppender`.
    pub fn build(self) -> SyslogAppender {
        let appender = SyslogAppender {
            skeleton: AppenderSkeleton::new(),
            options: RwLock::new(self.options),
        };
        if let Some(layout) = self.layout {
            appender.skeleton.set_layout(layout);
        }
        appender.openlog();
        appender
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn facility_by_name_and_number() {
        assert_eq!(parse_facility("daemon").unwrap(), libc::LOG_DAEMON);
        assert_eq!(parse_facility("LOCAL3").unwrap(), libc::LOG_LOCAL3);
        assert_eq!(
            parse_facility(&libc::LOG_MAIL.to_string()).unwrap(),
            libc::LOG_MAIL
        );
        assert!(parse_facility("postbox").is_err());
    }
}
