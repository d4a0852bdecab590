//! 单一文件 Sink
//!
//! 把日志记录追加写入单个文件，支持文本与 JSON 行两种格式。

use crate::config::{ConfigSection, Preset};
use crate::core::event::LogRecord;
use crate::core::level::Level;
use crate::core::logger::{Logger, LoggerCore};
use crate::core::message::{format_message, LogArg, NamedMessages};
use crate::error::{LogError, Result};
use crate::sinks::console::validate_timestamp_format;
use crate::sinks::traits::Backend;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Mutex;

const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// 文件输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// `[时间戳] LEVEL logger: message`
    Text,
    /// 每行一个 JSON 对象
    Json,
}

impl FromStr for FileFormat {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(FileFormat::Text),
            "json" => Ok(FileFormat::Json),
            _ => Err(LogError::config(format!("invalid file format: {}", s))),
        }
    }
}

/// 文件日志器
///
/// 配置属性：`path`（必需）、`append`（默认 true）、`format`（text | json，默认 text）、
/// `timestamp_format`、`min_level`（默认 DEBUG）。
#[derive(Debug)]
pub struct FileLogger {
    core: LoggerCore,
    path: PathBuf,
    format: FileFormat,
    timestamp_format: String,
    min_level: Level,
    /// `dispose` 之后为 `None`
    writer: Mutex<Option<BufWriter<File>>>,
}

impl FileLogger {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> FileFormat {
        self.format
    }

    fn open(path: &Path, append: bool) -> Result<BufWriter<File>> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(append)
            .truncate(!append)
            .open(path)
            .map_err(|e| {
                LogError::config(format!("Failed to open file {}: {}", path.display(), e))
            })?;
        Ok(BufWriter::new(file))
    }

    fn render(&self, record: &LogRecord) -> Result<String> {
        match self.format {
            FileFormat::Text => Ok(record.to_text_line(&self.timestamp_format)),
            FileFormat::Json => Ok(record.to_json()?),
        }
    }

    fn write_line(&self, line: &str) -> Result<()> {
        let mut guard = self
            .writer
            .lock()
            .map_err(|_| LogError::logging("file writer lock poisoned"))?;
        let writer = guard.as_mut().ok_or_else(|| {
            LogError::logging(format!("file logger '{}' has been disposed", self.core.name()))
        })?;

        writer
            .write_all(line.as_bytes())
            .and_then(|_| writer.write_all(b"\n"))
            .and_then(|_| writer.flush())
            .map_err(|e| LogError::logging(format!("Failed to write to file: {}", e)))
    }
}

impl Logger for FileLogger {
    fn name(&self) -> &str {
        self.core.name()
    }

    fn default_level(&self) -> Level {
        self.core.default_level()
    }

    fn named_messages(&self) -> &NamedMessages {
        self.core.named_messages()
    }

    fn log(&self, level: Level, template: &str, args: &[LogArg]) -> Result<()> {
        if !self.is_level_enabled(level)? {
            return Ok(());
        }
        let message = format_message(template, args)?;
        let line = self.render(&LogRecord::new(level, self.core.name(), message))?;
        self.write_line(&line)
    }

    fn is_level_enabled(&self, level: Level) -> Result<bool> {
        Ok(level.passes(self.min_level))
    }

    fn dispose(&self) -> Result<()> {
        let writer = match self.writer.lock() {
            Ok(mut guard) => guard.take(),
            Err(_) => {
                tracing::warn!("File writer lock poisoned during dispose: {}", self.path.display());
                None
            }
        };
        if let Some(mut writer) = writer {
            if let Err(e) = writer.flush() {
                tracing::warn!(
                    "Failed to flush file {} during dispose: {}",
                    self.path.display(),
                    e
                );
            }
            tracing::debug!("File logger closed: {}", self.path.display());
        }
        Ok(())
    }
}

impl Backend for FileLogger {
    const NAME: &'static str = "File";

    fn from_config(config: &ConfigSection) -> Result<Self> {
        let core = LoggerCore::from_config(config)?;
        let path = PathBuf::from(config.required_attribute("path")?);
        let append = config.bool_attribute("append", true)?;
        let format = config
            .parsed_attribute::<FileFormat>("format")?
            .unwrap_or(FileFormat::Text);
        let timestamp_format = config
            .attribute("timestamp_format")
            .unwrap_or(DEFAULT_TIMESTAMP_FORMAT);
        validate_timestamp_format(timestamp_format)?;
        let min_level = config.level_attribute("min_level", Level::Debug)?;

        let writer = Self::open(&path, append)?;
        tracing::debug!("File logger opened: {}", path.display());

        Ok(Self {
            core,
            path,
            format,
            timestamp_format: timestamp_format.to_string(),
            min_level,
            writer: Mutex::new(Some(writer)),
        })
    }

    fn initialize_zero_configuration(
        preset: Preset,
        config: &ConfigSection,
    ) -> Result<ConfigSection> {
        let logger_name = config.required_attribute("logger_name")?;
        let format = match preset {
            Preset::Verbose => "json",
            Preset::Minimal | Preset::Standard => "text",
        };
        let defaults = ConfigSection::new(config.name())
            .with_attribute("path", format!("{}.log", logger_name))
            .with_attribute("format", format)
            .with_attribute("append", "true")
            .with_attribute("min_level", preset.min_level().as_str());
        Ok(config.with_defaults(&defaults))
    }
}
