//! 控制台输出 Sink 实现
//!
//! 将日志记录输出到标准输出或标准错误，支持彩色级别与自定义时间戳格式。

use crate::config::{ConfigSection, Preset};
use crate::core::event::LogRecord;
use crate::core::level::Level;
use crate::core::logger::{Logger, LoggerCore};
use crate::core::message::{format_message, LogArg, NamedMessages};
use crate::error::{LogError, Result};
use crate::sinks::traits::Backend;
use chrono::format::{Item, StrftimeItems};
use colored::{ColoredString, Colorize};
use std::io::{self, Write};
use std::str::FromStr;

fn default_timestamp_format() -> &'static str {
    "%Y-%m-%d %H:%M:%S%.3f"
}

/// 校验 chrono 时间戳格式串，非法格式在输出时会导致格式化失败
pub(crate) fn validate_timestamp_format(format: &str) -> Result<()> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(LogError::config(format!(
            "invalid timestamp_format: {}",
            format
        )));
    }
    Ok(())
}

/// 输出流选择
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleStream {
    Stdout,
    Stderr,
    /// WARN 及以上写入标准错误，其余写入标准输出
    Auto,
}

impl FromStr for ConsoleStream {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stdout" => Ok(ConsoleStream::Stdout),
            "stderr" => Ok(ConsoleStream::Stderr),
            "auto" => Ok(ConsoleStream::Auto),
            _ => Err(LogError::config(format!("invalid console stream: {}", s))),
        }
    }
}

impl ConsoleStream {
    fn use_stderr(&self, level: Level) -> bool {
        match self {
            ConsoleStream::Stdout => false,
            ConsoleStream::Stderr => true,
            ConsoleStream::Auto => level >= Level::Warn,
        }
    }
}

/// 控制台日志器
///
/// 配置属性：`stream`（stdout | stderr | auto，默认 auto）、`colored`（默认 true）、
/// `timestamp_format`（chrono 格式串）、`min_level`（默认 DEBUG）。
#[derive(Debug)]
pub struct ConsoleLogger {
    core: LoggerCore,
    stream: ConsoleStream,
    colored: bool,
    timestamp_format: String,
    min_level: Level,
}

impl ConsoleLogger {
    pub fn stream(&self) -> ConsoleStream {
        self.stream
    }

    pub fn is_colored(&self) -> bool {
        self.colored
    }

    /// 格式化单行输出（不含换行符）
    pub fn format_line(&self, record: &LogRecord) -> String {
        let level = if self.colored {
            colorize(record.level).to_string()
        } else {
            record.level.to_string()
        };
        format!(
            "{} {:>5} [{}] {}",
            record.timestamp.format(&self.timestamp_format),
            level,
            record.logger,
            record.message
        )
    }

    fn write_line(&self, level: Level, line: &str) -> io::Result<()> {
        if self.stream.use_stderr(level) {
            let mut stderr = io::stderr().lock();
            writeln!(stderr, "{}", line)?;
            stderr.flush()
        } else {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{}", line)?;
            stdout.flush()
        }
    }
}

fn colorize(level: Level) -> ColoredString {
    let name = level.as_str();
    match level {
        Level::Fatal => name.white().on_red().bold(),
        Level::Error => name.red(),
        Level::FailureAudit => name.magenta(),
        Level::SuccessAudit => name.blue(),
        Level::Warn => name.yellow(),
        Level::Info => name.green(),
        Level::Debug => name.cyan(),
        Level::Off => name.normal(),
    }
}

impl Logger for ConsoleLogger {
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
        let line = self.format_line(&LogRecord::new(level, self.core.name(), message));
        self.write_line(level, &line)
            .map_err(|e| LogError::logging(format!("console write failed: {}", e)))
    }

    fn is_level_enabled(&self, level: Level) -> Result<bool> {
        Ok(level.passes(self.min_level))
    }

    fn dispose(&self) -> Result<()> {
        // 刷新输出流，失败只记录不返回
        if let Err(e) = io::stdout().flush() {
            tracing::warn!("Failed to flush stdout during dispose: {}", e);
        }
        if let Err(e) = io::stderr().flush() {
            tracing::warn!("Failed to flush stderr during dispose: {}", e);
        }
        Ok(())
    }
}

impl Backend for ConsoleLogger {
    const NAME: &'static str = "Console";

    fn from_config(config: &ConfigSection) -> Result<Self> {
        let timestamp_format = config
            .attribute("timestamp_format")
            .unwrap_or(default_timestamp_format());
        validate_timestamp_format(timestamp_format)?;

        Ok(Self {
            core: LoggerCore::from_config(config)?,
            stream: config
                .parsed_attribute::<ConsoleStream>("stream")?
                .unwrap_or(ConsoleStream::Auto),
            colored: config.bool_attribute("colored", true)?,
            timestamp_format: timestamp_format.to_string(),
            min_level: config.level_attribute("min_level", Level::Debug)?,
        })
    }

    fn initialize_zero_configuration(
        preset: Preset,
        config: &ConfigSection,
    ) -> Result<ConfigSection> {
        let mut defaults = ConfigSection::new(config.name())
            .with_attribute("min_level", preset.min_level().as_str());
        match preset {
            Preset::Minimal => {
                defaults.set_attribute("stream", "stderr");
                defaults.set_attribute("colored", "false");
            }
            Preset::Standard => {
                defaults.set_attribute("stream", "auto");
                defaults.set_attribute("colored", "true");
            }
            Preset::Verbose => {
                defaults.set_attribute("stream", "stdout");
                defaults.set_attribute("colored", "true");
                defaults.set_attribute("timestamp_format", "%Y-%m-%dT%H:%M:%S%.6f");
            }
        }
        Ok(config.with_defaults(&defaults))
    }
}
