//! 级别过滤装饰器
//!
//! 纯粹的级别闸门：被屏蔽级别以及 `OFF` 的写入调用直接返回，其余调用原样转发给
//! 底层日志器，底层抛出的错误照常向上传播。本层不做任何异常处理，也不持有可变状态。

use crate::core::level::Level;
use crate::core::logger::Logger;
use crate::core::message::{LogArg, NamedMessage, NamedMessages};
use crate::error::Result;
use std::collections::BTreeSet;
use std::sync::Arc;

/// 屏蔽一组级别的日志器装饰器
///
/// 名称、默认级别与命名消息直接读取底层日志器。
#[derive(Debug, Clone)]
pub struct LevelFilterLogger {
    inner: Arc<dyn Logger>,
    suppressed: BTreeSet<Level>,
}

impl LevelFilterLogger {
    /// 用给定的屏蔽级别集合包装 `inner`（集合可以为空）
    pub fn new(inner: Arc<dyn Logger>, suppressed: impl IntoIterator<Item = Level>) -> Self {
        Self {
            inner,
            suppressed: suppressed.into_iter().collect(),
        }
    }

    pub fn suppressed_levels(&self) -> &BTreeSet<Level> {
        &self.suppressed
    }

    pub fn is_suppressed(&self, level: Level) -> bool {
        self.suppressed.contains(&level)
    }

    // OFF 表示不写入，无论屏蔽集合如何
    fn drops(&self, level: Level) -> bool {
        level == Level::Off || self.is_suppressed(level)
    }

    pub fn inner(&self) -> &Arc<dyn Logger> {
        &self.inner
    }
}

impl Logger for LevelFilterLogger {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn default_level(&self) -> Level {
        self.inner.default_level()
    }

    fn named_messages(&self) -> &NamedMessages {
        self.inner.named_messages()
    }

    fn log(&self, level: Level, template: &str, args: &[LogArg]) -> Result<()> {
        if self.drops(level) {
            return Ok(());
        }
        self.inner.log(level, template, args)
    }

    fn is_level_enabled(&self, level: Level) -> Result<bool> {
        if self.is_suppressed(level) {
            return Ok(false);
        }
        self.inner.is_level_enabled(level)
    }

    fn dispose(&self) -> Result<()> {
        self.inner.dispose()
    }

    fn log_named_message_at(
        &self,
        level: Level,
        identifier: &str,
        args: &[LogArg],
    ) -> Result<()> {
        if self.drops(level) {
            return Ok(());
        }
        self.inner.log_named_message_at(level, identifier, args)
    }

    fn write_named_message(
        &self,
        level: Level,
        message: &NamedMessage,
        args: &[LogArg],
    ) -> Result<()> {
        if self.drops(level) {
            return Ok(());
        }
        self.inner.write_named_message(level, message, args)
    }
}
