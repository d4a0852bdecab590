//! 异常安全装饰器
//!
//! 本层是“永不抛出”的边界：底层日志器在 `log`、命名消息、`is_level_enabled`
//! 或 `dispose` 中返回错误（或发生 panic）时，错误被捕获并尽力写入异常日志器，
//! 调用本身正常返回。写入异常日志器再次失败时，该次失败被静默丢弃。
//!
//! 调用方违反契约（空的或未知的命名消息标识符）不属于后端失败，会在进入边界之前报告。
//! `OFF` 级别的写入调用在查找之后直接返回，不会到达底层日志器。

use crate::core::level::Level;
use crate::core::logger::Logger;
use crate::core::message::{LogArg, NamedMessage, NamedMessages};
use crate::error::{LogError, Result};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

const FAILURE_TEMPLATE: &str = "Logger '{0}' failed during {1}: {2}";

/// 吞掉底层日志器失败的装饰器
#[derive(Debug, Clone)]
pub struct ExceptionSafeLogger {
    inner: Arc<dyn Logger>,
    exception_logger: Arc<dyn Logger>,
    owns_exception_logger: bool,
}

impl ExceptionSafeLogger {
    /// 用独立的异常日志器保护 `inner`
    ///
    /// 异常日志器的生命周期由调用方管理，`dispose` 不会释放它。
    pub fn new(inner: Arc<dyn Logger>, exception_logger: Arc<dyn Logger>) -> Self {
        Self {
            inner,
            exception_logger,
            owns_exception_logger: false,
        }
    }

    /// 把失败报告给 `inner` 自身
    pub fn self_reporting(inner: Arc<dyn Logger>) -> Self {
        Self::new(inner.clone(), inner)
    }

    /// 用独占的异常日志器保护 `inner`，`dispose` 会在底层日志器之后释放它
    pub fn with_owned_exception_logger(
        inner: Arc<dyn Logger>,
        exception_logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            inner,
            exception_logger,
            owns_exception_logger: true,
        }
    }

    pub fn inner(&self) -> &Arc<dyn Logger> {
        &self.inner
    }

    pub fn exception_logger(&self) -> &Arc<dyn Logger> {
        &self.exception_logger
    }

    /// 异常日志器是否就是被保护的日志器本身
    pub fn is_self_reporting(&self) -> bool {
        same_logger(&self.inner, &self.exception_logger)
    }

    fn record_failure(&self, operation: &str, error: &LogError) {
        let args = [
            LogArg::from(self.inner.name()),
            LogArg::from(operation),
            LogArg::from(error.to_string()),
        ];
        let recorded = contain(|| self.exception_logger.log_default(FAILURE_TEMPLATE, &args));
        if let Err(secondary) = recorded {
            tracing::trace!(
                logger = %self.inner.name(),
                operation,
                error = %secondary,
                "discarding failure while recording a swallowed logging error"
            );
        }
    }

    fn guard<F>(&self, operation: &str, call: F) -> Result<()>
    where
        F: FnOnce() -> Result<()>,
    {
        if let Err(e) = contain(call) {
            self.record_failure(operation, &e);
        }
        Ok(())
    }
}

fn same_logger(a: &Arc<dyn Logger>, b: &Arc<dyn Logger>) -> bool {
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}

/// 执行调用，把 panic 转换为 `LoggingError`
fn contain<T, F>(call: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(result) => result,
        Err(payload) => Err(LogError::logging(format!(
            "backend panicked: {}",
            panic_message(payload.as_ref())
        ))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

impl Logger for ExceptionSafeLogger {
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
        if level == Level::Off {
            return Ok(());
        }
        self.guard("log", || self.inner.log(level, template, args))
    }

    fn is_level_enabled(&self, level: Level) -> Result<bool> {
        match contain(|| self.inner.is_level_enabled(level)) {
            Ok(enabled) => Ok(enabled),
            Err(e) => {
                self.record_failure("is_level_enabled", &e);
                Ok(false)
            }
        }
    }

    fn dispose(&self) -> Result<()> {
        self.guard("dispose", || self.inner.dispose())?;
        if self.owns_exception_logger && !self.is_self_reporting() {
            if let Err(e) = contain(|| self.exception_logger.dispose()) {
                tracing::trace!(
                    logger = %self.exception_logger.name(),
                    error = %e,
                    "discarding failure while disposing exception logger"
                );
            }
        }
        Ok(())
    }

    fn log_named_message_at(
        &self,
        level: Level,
        identifier: &str,
        args: &[LogArg],
    ) -> Result<()> {
        self.named_messages().lookup(identifier)?;
        if level == Level::Off {
            return Ok(());
        }
        self.guard("log_named_message", || {
            self.inner.log_named_message_at(level, identifier, args)
        })
    }

    fn write_named_message(
        &self,
        level: Level,
        message: &NamedMessage,
        args: &[LogArg],
    ) -> Result<()> {
        if level == Level::Off {
            return Ok(());
        }
        self.guard("log_named_message", || {
            self.inner.write_named_message(level, message, args)
        })
    }
}
