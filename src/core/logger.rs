//! Logger 能力契约
//!
//! 所有后端与装饰器都实现 [`Logger`]。契约只规定能力，不强制继承任何字段；
//! 后端可以借助 [`LoggerCore`] 复用标识状态（名称、默认级别、命名消息）的构造与校验。
//!
//! # 使用示例
//!
//! ```rust
//! use pluglog::{Backend, ConfigSection, Level, LogArg, Logger, MemoryLogger};
//!
//! let config = ConfigSection::new("Logger").with_attribute("logger_name", "svc");
//! let logger = MemoryLogger::from_config(&config)?;
//! logger.log(Level::Info, "{0} started", &[LogArg::from("svc")])?;
//! assert_eq!(logger.sink().messages(), vec!["svc started".to_string()]);
//! # Ok::<(), pluglog::LogError>(())
//! ```

use crate::config::{keys, ConfigSection};
use crate::core::level::Level;
use crate::core::message::{LogArg, NamedMessage, NamedMessages};
use crate::error::{LogError, Result};
use std::fmt::Debug;

/// 日志器能力集合
///
/// 实例在构造后必须支持多线程并发调用 `log` / `is_level_enabled`。
pub trait Logger: Send + Sync + Debug {
    /// 日志器名称（目标或类别），生命周期内不变
    fn name(&self) -> &str;

    /// 未显式指定级别时使用的级别，生命周期内不变
    fn default_level(&self) -> Level;

    /// 在构造时注册的命名消息
    fn named_messages(&self) -> &NamedMessages;

    /// 用 `args` 填充 `template` 并以 `level` 写出
    ///
    /// `level` 为 `Off` 或未启用时直接返回。模板与参数不匹配返回
    /// `MessageFormattingError`，后端拒绝写入返回 `LoggingError`。
    fn log(&self, level: Level, template: &str, args: &[LogArg]) -> Result<()>;

    /// 后端是否会处理该级别
    fn is_level_enabled(&self, level: Level) -> Result<bool>;

    /// 释放后端资源
    ///
    /// 重复调用必须是安全的。
    fn dispose(&self) -> Result<()>;

    /// 以默认级别记录
    fn log_default(&self, template: &str, args: &[LogArg]) -> Result<()> {
        self.log(self.default_level(), template, args)
    }

    /// 以消息自身的默认级别记录命名消息
    fn log_named_message(&self, identifier: &str, args: &[LogArg]) -> Result<()> {
        let level = self.named_messages().lookup(identifier)?.default_level();
        self.log_named_message_at(level, identifier, args)
    }

    /// 以显式级别记录命名消息
    fn log_named_message_at(
        &self,
        level: Level,
        identifier: &str,
        args: &[LogArg],
    ) -> Result<()> {
        let message = self.named_messages().lookup(identifier)?;
        self.write_named_message(level, message, args)
    }

    /// 命名消息的写出步骤
    ///
    /// 默认实现与 `log(level, message.text(), args)` 完全相同。支持原生参数化日志的
    /// 后端可以覆盖此方法，直接传递参数而不是预先格式化。
    fn write_named_message(
        &self,
        level: Level,
        message: &NamedMessage,
        args: &[LogArg],
    ) -> Result<()> {
        self.log(level, message.text(), args)
    }
}

/// 日志器标识状态
///
/// 名称、默认级别与命名消息在构造后都不可变。
#[derive(Debug, Clone, PartialEq)]
pub struct LoggerCore {
    name: String,
    default_level: Level,
    named_messages: NamedMessages,
}

impl LoggerCore {
    pub fn new(name: impl Into<String>, default_level: Level) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(LogError::argument("logger name must not be empty"));
        }
        Ok(Self {
            name,
            default_level,
            named_messages: NamedMessages::new(),
        })
    }

    /// 附加命名消息注册表
    pub fn with_named_messages(mut self, named_messages: NamedMessages) -> Self {
        self.named_messages = named_messages;
        self
    }

    /// 从配置节读取 `logger_name`（必需）、`default_level`（默认 DEBUG）与 `NamedMessages` 子节
    pub fn from_config(config: &ConfigSection) -> Result<Self> {
        let name = config.required_attribute(keys::LOGGER_NAME)?;
        let default_level = config.level_attribute(keys::DEFAULT_LEVEL, Level::Debug)?;
        let named_messages = match config.child(keys::NAMED_MESSAGES) {
            Some(section) => NamedMessages::from_config(section, default_level)?,
            None => NamedMessages::new(),
        };

        Ok(Self::new(name, default_level)?.with_named_messages(named_messages))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn default_level(&self) -> Level {
        self.default_level
    }

    pub fn named_messages(&self) -> &NamedMessages {
        &self.named_messages
    }
}
