//! tracing 桥接后端
//!
//! 把日志调用转发为 `tracing` 事件（target 为 [`TRACING_TARGET`]），由宿主应用安装的
//! subscriber 决定最终输出。本 crate 不会安装全局 subscriber。
//!
//! 级别映射：
//!
//! | pluglog | tracing |
//! |---------|---------|
//! | FATAL / ERROR / FAILUREAUDIT | ERROR |
//! | WARN | WARN |
//! | SUCCESSAUDIT / INFO | INFO |
//! | DEBUG | DEBUG |

use crate::config::{ConfigSection, Preset};
use crate::core::level::Level;
use crate::core::logger::{Logger, LoggerCore};
use crate::core::message::{format_message, LogArg, NamedMessage, NamedMessages};
use crate::error::Result;
use crate::sinks::traits::Backend;

/// 事件 target
pub const TRACING_TARGET: &str = "pluglog";

// tracing 的级别必须是常量，因此映射表只在这里展开一次：
// 每个分支把对应级别绑定为局部常量 `$lvl` 后求值 `$body`，`Off` 分支求值 `$off`
macro_rules! with_tracing_level {
    ($level:expr, $lvl:ident => $body:expr, off => $off:expr) => {
        match $level {
            Level::Fatal | Level::Error | Level::FailureAudit => {
                const $lvl: tracing::Level = tracing::Level::ERROR;
                $body
            }
            Level::Warn => {
                const $lvl: tracing::Level = tracing::Level::WARN;
                $body
            }
            Level::SuccessAudit | Level::Info => {
                const $lvl: tracing::Level = tracing::Level::INFO;
                $body
            }
            Level::Debug => {
                const $lvl: tracing::Level = tracing::Level::DEBUG;
                $body
            }
            Level::Off => $off,
        }
    };
}

macro_rules! emit_event {
    ($level:expr, $($fields:tt)+) => {
        with_tracing_level!(
            $level,
            LEVEL => tracing::event!(target: TRACING_TARGET, LEVEL, $($fields)+),
            off => ()
        )
    };
}

fn subscriber_enabled(level: Level) -> bool {
    with_tracing_level!(
        level,
        LEVEL => tracing::enabled!(target: TRACING_TARGET, LEVEL),
        off => false
    )
}

/// tracing 桥接日志器
///
/// 配置属性：`min_level`（默认 DEBUG）。
#[derive(Debug)]
pub struct TracingLogger {
    core: LoggerCore,
    min_level: Level,
}

impl Logger for TracingLogger {
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
        emit_event!(
            level,
            logger = %self.core.name(),
            pluglog.level = level.as_str(),
            "{}",
            message
        );
        Ok(())
    }

    fn is_level_enabled(&self, level: Level) -> Result<bool> {
        Ok(level.passes(self.min_level) && subscriber_enabled(level))
    }

    fn dispose(&self) -> Result<()> {
        Ok(())
    }

    /// 附带原始模板与按参数名组织的 JSON 参数对象
    fn write_named_message(
        &self,
        level: Level,
        message: &NamedMessage,
        args: &[LogArg],
    ) -> Result<()> {
        if !self.is_level_enabled(level)? {
            return Ok(());
        }
        let rendered = message.render(args)?;
        let parameters: serde_json::Map<String, serde_json::Value> = message
            .parameter_names()
            .iter()
            .zip(args)
            .map(|(name, arg)| -> Result<(String, serde_json::Value)> {
                Ok((name.clone(), serde_json::to_value(arg)?))
            })
            .collect::<Result<_>>()?;
        let parameters = serde_json::Value::Object(parameters);

        emit_event!(
            level,
            logger = %self.core.name(),
            pluglog.level = level.as_str(),
            named_message = message.name(),
            template = message.text(),
            parameters = %parameters,
            "{}",
            rendered
        );
        Ok(())
    }
}

impl Backend for TracingLogger {
    const NAME: &'static str = "Tracing";

    fn from_config(config: &ConfigSection) -> Result<Self> {
        Ok(Self {
            core: LoggerCore::from_config(config)?,
            min_level: config.level_attribute("min_level", Level::Debug)?,
        })
    }

    fn initialize_zero_configuration(
        preset: Preset,
        config: &ConfigSection,
    ) -> Result<ConfigSection> {
        Ok(config.with_default_attribute("min_level", preset.min_level().as_str()))
    }
}
