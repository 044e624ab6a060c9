//! The file appender.

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::anyhow;
use parking_lot::{Mutex, RwLock};

use crate::append::writer::QuietWriter;
use crate::append::{Append, AppenderSkeleton};
use crate::config::property;
use crate::error::ConfigError;
use crate::event::LoggingEvent;
use crate::layout::Layout;
use crate::registry::{Configurable, PropertyValue};

const DEFAULT_BUFFER_SIZE: usize = 8 * 1024;

#[derive(Clone, Debug)]
struct FileOptions {
    path: Option<PathBuf>,
    append: bool,
    buffered_io: bool,
    buffer_size: usize,
    immediate_flush: bool,
}

impl Default for FileOptions {
    fn default() -> FileOptions {
        FileOptions {
            path: None,
            append: true,
            buffered_io: false,
            buffer_size: DEFAULT_BUFFER_SIZE,
            immediate_flush: true,
        }
    }
}

impl FileOptions {
    fn open(&self, skeleton: &AppenderSkeleton) -> Result<QuietWriter<BufWriter<File>>, ConfigError> {
        let path = self.path.as_ref().ok_or_else(|| ConfigError::Activation {
            target: "FileAppender".to_owned(),
            reason: "no file set".to_owned(),
        })?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .write(true)
            .append(self.append)
            .truncate(!self.append)
            .create(true)
            .open(path)?;
        let capacity = if self.buffered_io { self.buffer_size } else { 0 };
        let mut writer = QuietWriter::new(
            BufWriter::with_capacity(capacity, file),
            skeleton.error_handler(),
        );
        if let Some(header) = skeleton.layout().and_then(|l| l.header()) {
            let _ = writer.write_all(header.as_bytes());
        }
        Ok(writer)
    }
}

/// An appender which logs to a file.
pub struct FileAppender {
    skeleton: AppenderSkeleton,
    options: RwLock<FileOptions>,
    writer: Mutex<Option<QuietWriter<BufWriter<File>>>>,
}

impl fmt::Debug for FileAppender {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_struct("FileAppender")
            .field("skeleton", &self.skeleton)
            .field("options", &*self.options.read())
            .finish()
    }
}

impl Default for FileAppender {
    fn default() -> FileAppender {
        FileAppender {
            skeleton: AppenderSkeleton::new(),
            options: RwLock::new(FileOptions::default()),
            writer: Mutex::new(None),
        }
    }
}

impl FileAppender {
    /// Creates a new `FileAppender` builder.
    pub fn builder() -> FileAppenderBuilder {
        FileAppenderBuilder {
            options: FileOptions::default(),
            layout: None,
        }
    }

    /// Returns the path of the log file, once set.
    pub fn path(&self) -> Option<PathBuf> {
        self.options.read().path.clone()
    }
}

impl Append for FileAppender {
    fn skeleton(&self) -> &AppenderSkeleton {
        &self.skeleton
    }

    fn append(&self, event: &LoggingEvent) -> anyhow::Result<()> {
        let layout = self
            .skeleton
            .layout()
            .ok_or_else(|| anyhow!("file appender has no layout"))?;
        let mut writer = self.writer.lock();
        let writer = writer
            .as_mut()
            .ok_or_else(|| anyhow!("file appender has no open file"))?;
        layout.format(writer, event)?;
        if self.options.read().immediate_flush {
            writer.flush()?;
        }
        Ok(())
    }

    fn close(&self) {
        let _guard = self.skeleton.lock();
        if !self.skeleton.mark_closed() {
            return;
        }
        if let Some(mut writer) = self.writer.lock().take() {
            if let Some(footer) = self.skeleton.layout().and_then(|l| l.footer()) {
                let _ = writer.write_all(footer.as_bytes());
            }
            let _ = writer.flush();
        }
    }
}

impl Configurable for FileAppender {
    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<(), ConfigError> {
        let mut options = self.options.write();
        match name {
            "file" => {
                let value = value.into_string("FileAppender", name)?;
                options.path = Some(PathBuf::from(value));
            }
            "append" => {
                let value = value.into_string("FileAppender", name)?;
                options.append = property::to_bool(name, &value)?;
            }
            "buffered-io" => {
                let value = value.into_string("FileAppender", name)?;
                options.buffered_io = property::to_bool(name, &value)?;
            }
            "buffer-size" => {
                let value = value.into_string("FileAppender", name)?;
                options.buffer_size = property::to_usize(name, &value)?;
            }
            "immediate-flush" => {
                let value = value.into_string("FileAppender", name)?;
                options.immediate_flush = property::to_bool(name, &value)?;
            }
            _ => {
                drop(options);
                return self.skeleton.set_common_property("FileAppender", name, value);
            }
        }
        Ok(())
    }

    fn activate_options(&mut self) -> Result<(), ConfigError> {
        let writer = self.options.read().open(&self.skeleton)?;
        *self.writer.lock() = Some(writer);
        Ok(())
    }
}

/// A builder for [`FileAppender`]s.
pub struct FileAppenderBuilder {
    options: FileOptions,
    layout: Option<Arc<dyn Layout>>,
}

impl FileAppenderBuilder {
    /// Determines if the appender appends to or truncates the log file.
    ///
    /// Defaults to `true`.
    pub fn append(mut self, append: bool) -> FileAppenderBuilder {
        self.options.append = append;
        self
    }

    /// Buffers writes to the file with the given buffer size.
    pub fn buffered_io(mut self, buffer_size: usize) -> FileAppenderBuilder {
        self.options.buffered_io = true;
        self.options.buffer_size = buffer_size;
        self
    }

    /// Determines if the file is flushed after every event.
    ///
    /// Defaults to `true`.
    pub fn immediate_flush(mut self, immediate_flush: bool) -> FileAppenderBuilder {
        self.options.immediate_flush = immediate_flush;
        self
    }

    /// Sets the layout.
    pub fn layout(mut self, layout: Arc<dyn Layout>) -> FileAppenderBuilder {
        self.layout = Some(layout);
        self
    }

    /// Consumes the builder, opening the log file at `path`.
    pub fn build<P: AsRef<Path>>(mut self, path: P) -> Result<FileAppender, ConfigError> {
        self.options.path = Some(path.as_ref().to_owned());
        let mut appender = FileAppender {
            skeleton: AppenderSkeleton::new(),
            options: RwLock::new(self.options),
            writer: Mutex::new(None),
        };
        if let Some(layout) = self.layout {
            appender.skeleton.set_layout(layout);
        }
        appender.activate_options()?;
        Ok(appender)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::layout::SimpleLayout;
    use crate::level::Level;

    #[test]
    fn writes_formatted_events() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.log");
        let appender = FileAppender::builder()
            .layout(Arc::new(SimpleLayout::new()))
            .build(&path)
            .unwrap();

        let event = LoggingEvent::new("a", Level::INFO, "to disk".to_owned(), None);
        appender.do_append(&event);
        appender.close();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "INFO - to disk\n");
    }

    #[test]
    fn append_mode_preserves_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.log");
        fs::write(&path, "old\n").unwrap();

        let appender = FileAppender::builder()
            .layout(Arc::new(SimpleLayout::new()))
            .build(&path)
            .unwrap();
        appender.do_append(&LoggingEvent::new("a", Level::WARN, "new".to_owned(), None));
        appender.close();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "old\nWARN - new\n");
    }

    #[test]
    fn truncate_mode_discards_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.log");
        fs::write(&path, "old\n").unwrap();

        let appender = FileAppender::builder()
            .append(false)
            .layout(Arc::new(SimpleLayout::new()))
            .build(&path)
            .unwrap();
        appender.do_append(&LoggingEvent::new("a", Level::WARN, "new".to_owned(), None));
        appender.close();

        assert_eq!(fs::read_to_string(&path).unwrap(), "WARN - new\n");
    }

    #[test]
    fn activation_requires_a_file() {
        let mut appender = FileAppender::default();
        assert!(appender.activate_options().is_err());
    }
}
