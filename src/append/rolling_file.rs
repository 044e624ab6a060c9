//! The rolling file appender.
//!
//! Logging directly to a file is a dangerous proposition for long
//! running processes. A rolling file appender bounds the damage: once
//! the log file exceeds a size limit it is rotated into a numbered
//! backup (`log`, `log.1`, `log.2`, ...) and the oldest backup is
//! deleted.

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::anyhow;
use parking_lot::{Mutex, RwLock};

use crate::append::writer::CountingQuietWriter;
use crate::append::{Append, AppenderSkeleton};
use crate::config::property;
use crate::error::ConfigError;
use crate::event::LoggingEvent;
use crate::internal;
use crate::layout::Layout;
use crate::registry::{Configurable, PropertyValue};

const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
const DEFAULT_MAX_BACKUP_INDEX: u32 = 1;

#[derive(Clone, Debug)]
struct RollingOptions {
    path: Option<PathBuf>,
    append: bool,
    max_file_size: u64,
    max_backup_index: u32,
}

impl Default for RollingOptions {
    fn default() -> RollingOptions {
        RollingOptions {
            path: None,
            append: true,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_backup_index: DEFAULT_MAX_BACKUP_INDEX,
        }
    }
}

type RollingWriter = CountingQuietWriter<BufWriter<File>>;

/// An appender which rotates its log file by size.
pub struct RollingFileAppender {
    skeleton: AppenderSkeleton,
    options: RwLock<RollingOptions>,
    writer: Mutex<Option<RollingWriter>>,
}

impl fmt::Debug for RollingFileAppender {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_struct("RollingFileAppender")
            .field("skeleton", &self.skeleton)
            .field("options", &*self.options.read())
            .finish()
    }
}

impl Default for RollingFileAppender {
    fn default() -> RollingFileAppender {
        RollingFileAppender {
            skeleton: AppenderSkeleton::new(),
            options: RwLock::new(RollingOptions::default()),
            writer: Mutex::new(None),
        }
    }
}

impl RollingFileAppender {
    /// Creates a new `RollingFileAppender` builder.
    pub fn builder() -> RollingFileAppenderBuilder {
        RollingFileAppenderBuilder {
            options: RollingOptions::default(),
            layout: None,
        }
    }

    fn backup_path(path: &Path, index: u32) -> PathBuf {
        let mut backup = path.as_os_str().to_owned();
        backup.push(format!(".{}", index));
        PathBuf::from(backup)
    }

    fn open(&self, truncate: bool) -> Result<RollingWriter, ConfigError> {
        let options = self.options.read();
        let path = options.path.as_ref().ok_or_else(|| ConfigError::Activation {
            target: "RollingFileAppender".to_owned(),
            reason: "no file set".to_owned(),
        })?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let append = options.append && !truncate;
        let file = OpenOptions::new()
            .write(true)
            .append(append)
            .truncate(!append)
            .create(true)
            .open(path)?;
        let len = if append { file.metadata()?.len() } else { 0 };
        let mut writer =
            CountingQuietWriter::new(BufWriter::with_capacity(1024, file), self.skeleton.error_handler());
        writer.set_count(len);
        if let Some(header) = self.skeleton.layout().and_then(|l| l.header()) {
            let _ = writer.write_all(header.as_bytes());
        }
        Ok(writer)
    }

    /// Rotates the log file: `log.N-1` becomes `log.N` for each backup,
    /// the live file becomes `log.1`, and a fresh live file is opened.
    ///
    /// With a backup index of zero the live file is simply truncated.
    fn roll_over(&self, writer: &mut Option<RollingWriter>) {
        let (path, max_backup_index) = {
            let options = self.options.read();
            match &options.path {
                Some(path) => (path.clone(), options.max_backup_index),
                None => return,
            }
        };

        // Close the live file before renaming it.
        if let Some(mut writer) = writer.take() {
            let _ = writer.flush();
        }

        if max_backup_index > 0 {
            let oldest = Self::backup_path(&path, max_backup_index);
            if oldest.exists() {
                if let Err(error) = fs::remove_file(&oldest) {
                    internal::error(format_args!(
                        "failed to delete [{}]: {}",
                        oldest.display(),
                        error
                    ));
                }
            }
            for index in (1..max_backup_index).rev() {
                let from = Self::backup_path(&path, index);
                let to = Self::backup_path(&path, index + 1);
                if from.exists() {
                    if let Err(error) = fs::rename(&from, &to) {
                        internal::error(format_args!(
                            "failed to rename [{}] to [{}]: {}",
                            from.display(),
                            to.display(),
                            error
                        ));
                    }
                }
            }
            let first = Self::backup_path(&path, 1);
            if let Err(error) = fs::rename(&path, &first) {
                internal::error(format_args!(
                    "failed to rename [{}] to [{}]: {}",
                    path.display(),
                    first.display(),
                    error
                ));
            }
        }

        match self.open(true) {
            Ok(reopened) => *writer = Some(reopened),
            Err(error) => self.skeleton.error_handler().error(
                "failed to reopen log file after rollover",
                Some(&anyhow!(error.to_string())),
                None,
            ),
        }
    }
}

impl Append for RollingFileAppender {
    fn skeleton(&self) -> &AppenderSkeleton {
        &self.skeleton
    }

    fn append(&self, event: &LoggingEvent) -> anyhow::Result<()> {
        let layout = self
            .skeleton
            .layout()
            .ok_or_else(|| anyhow!("rolling file appender has no layout"))?;
        let mut writer = self.writer.lock();
        {
            let writer = writer
                .as_mut()
                .ok_or_else(|| anyhow!("rolling file appender has no open file"))?;
            layout.format(writer, event)?;
            writer.flush()?;
        }
        let over_limit = writer
            .as_ref()
            .map(|w| w.count() >= self.options.read().max_file_size)
            .unwrap_or(false);
        if over_limit {
            self.roll_over(&mut writer);
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

impl Configurable for RollingFileAppender {
    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<(), ConfigError> {
        let mut options = self.options.write();
        match name {
            "file" => {
                let value = value.into_string("RollingFileAppender", name)?;
                options.path = Some(PathBuf::from(value));
            }
            "append" => {
                let value = value.into_string("RollingFileAppender", name)?;
                options.append = property::to_bool(name, &value)?;
            }
            "maximum-file-size" => {
                let value = value.into_string("RollingFileAppender", name)?;
                options.max_file_size = property::to_u64(name, &value)?;
            }
            "max-backup-index" => {
                let value = value.into_string("RollingFileAppender", name)?;
                options.max_backup_index = property::to_u32(name, &value)?;
            }
            _ => {
                drop(options);
                return self
                    .skeleton
                    .set_common_property("RollingFileAppender", name, value);
            }
        }
        Ok(())
    }

    fn activate_options(&mut self) -> Result<(), ConfigError> {
        let writer = self.open(false)?;
        *self.writer.lock() = Some(writer);
        Ok(())
    }
}

/// A builder for [`RollingFileAppender`]s.
pub struct RollingFileAppenderBuilder {
    options: RollingOptions,
    layout: Option<Arc<dyn Layout>>,
}

impl RollingFileAppenderBuilder {
    /// Determines if the appender appends to or truncates an existing
    /// log file. Defaults to `true`.
    pub fn append(mut self, append: bool) -> RollingFileAppenderBuilder {
        self.options.append = append;
        self
    }

    /// Sets the size in bytes past which the log file is rotated.
    ///
    /// Defaults to 10 MiB.
    pub fn max_file_size(mut self, max_file_size: u64) -> RollingFileAppenderBuilder {
        self.options.max_file_size = max_file_size;
        self
    }

    /// Sets how many rotated backups are kept.
    ///
    /// Defaults to 1. Zero truncates in place instead of rotating.
    pub fn max_backup_index(mut self, max_backup_index: u32) -> RollingFileAppenderBuilder {
        self.options.max_backup_index = max_backup_index;
        self
    }

    /// Sets the layout.
    pub fn layout(mut self, layout: Arc<dyn Layout>) -> RollingFileAppenderBuilder {
        self.layout = Some(layout);
        self
    }

    /// Consumes the builder, opening the log file at `path`.
    pub fn build<P: AsRef<Path>>(mut self, path: P) -> Result<RollingFileAppender, ConfigError> {
        self.options.path = Some(path.as_ref().to_owned());
        let mut appender = RollingFileAppender {
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

    fn emit(appender: &RollingFileAppender, message: &str) {
        appender.do_append(&LoggingEvent::new(
            "a",
            Level::INFO,
            message.to_owned(),
            None,
        ));
    }

    #[test]
    fn rotates_and_caps_backups() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.log");
        let appender = RollingFileAppender::builder()
            .max_file_size(10)
            .max_backup_index(4)
            .layout(Arc::new(SimpleLayout::new()))
            .build(&path)
            .unwrap();

        for i in 0..10 {
            emit(&appender, &format!("event {}", i));
        }
        appender.close();

        for index in 1..=4u32 {
            assert!(
                RollingFileAppender::backup_path(&path, index).exists(),
                "missing backup {}",
                index
            );
        }
        assert!(!RollingFileAppender::backup_path(&path, 5).exists());

        // Every event rolled the file, so the live file was left empty.
        let live = fs::metadata(&path).unwrap().len();
        assert!(live < 10, "live file too large: {}", live);
    }

    #[test]
    fn backups_age_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.log");
        let appender = RollingFileAppender::builder()
            .max_file_size(1)
            .max_backup_index(2)
            .layout(Arc::new(SimpleLayout::new()))
            .build(&path)
            .unwrap();

        emit(&appender, "first");
        emit(&appender, "second");
        appender.close();

        let newest = fs::read_to_string(RollingFileAppender::backup_path(&path, 1)).unwrap();
        let oldest = fs::read_to_string(RollingFileAppender::backup_path(&path, 2)).unwrap();
        assert!(newest.contains("second"));
        assert!(oldest.contains("first"));
    }

    #[test]
    fn zero_backup_index_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.log");
        let appender = RollingFileAppender::builder()
            .max_file_size(1)
            .max_backup_index(0)
            .layout(Arc::new(SimpleLayout::new()))
            .build(&path)
            .unwrap();

        emit(&appender, "only");
        appender.close();

        assert!(!RollingFileAppender::backup_path(&path, 1).exists());
        assert_eq!(fs::metadata(&path).unwrap().len(), 0);
    }
}
