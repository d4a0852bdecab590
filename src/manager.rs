//! 日志器构造管道
//!
//! [`LoggerManager`] 把一个配置节变成完整装配的日志器：
//!
//! 1. 解析 `backend`（可选 `backend_module`）得到后端；
//! 2. 默认配置节声明了 `default_config` 时，调用后端的零配置初始化得到派生配置；
//! 3. 用（派生）配置构造后端；
//! 4. `filtered_levels` 非空时包装级别过滤层；
//! 5. 除非 `propagate_exceptions = true`，包装异常安全层。异常日志器来自
//!    `ExceptionLogger` 子节（递归构造，默认级别 WARN），缺省时日志器向自身报告失败。
//!
//! 任一步骤失败都以 `ConfigError` 返回，不存在部分装配的日志器。
//!
//! # 使用示例
//!
//! ```rust
//! use pluglog::{load_config_from_str, Level, LoggerManager};
//!
//! let config = load_config_from_str(r#"
//!     [Logger]
//!     backend = "Memory"
//!     logger_name = "svc"
//!     filtered_levels = ["DEBUG"]
//! "#)?;
//!
//! let manager = LoggerManager::default();
//! let logger = manager.create_default_logger(&config)?;
//! logger.log(Level::Debug, "dropped", &[])?;
//! logger.log(Level::Info, "kept", &[])?;
//! logger.dispose()?;
//! # Ok::<(), pluglog::LogError>(())
//! ```

use crate::config::{keys, ConfigSection, LogConfig, Preset, DEFAULT_SECTION_NAME};
use crate::core::layers::{ExceptionSafeLogger, LevelFilterLogger};
use crate::core::level::Level;
use crate::core::logger::Logger;
use crate::error::{LogError, Result};
use crate::sinks::registry::BackendRegistry;
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::str::FromStr;
use std::sync::Arc;

/// 子异常日志器未声明默认级别时使用的级别
const EXCEPTION_LOGGER_DEFAULT_LEVEL: Level = Level::Warn;

/// 日志器构造管道
///
/// 只持有后端注册表，不保存任何已创建的日志器；同一配置的多次调用得到彼此独立的实例。
#[derive(Debug, Clone)]
pub struct LoggerManager {
    registry: BackendRegistry,
}

impl Default for LoggerManager {
    /// 使用全部内置后端
    fn default() -> Self {
        Self::new(BackendRegistry::with_builtins())
    }
}

impl LoggerManager {
    pub fn new(registry: BackendRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &BackendRegistry {
        &self.registry
    }

    /// 用保留的默认配置节构造日志器
    pub fn create_default_logger(&self, config: &LogConfig) -> Result<Arc<dyn Logger>> {
        self.create_logger(config.default_section()?)
    }

    /// 用指定名称的配置节构造日志器
    pub fn create_named_logger(&self, config: &LogConfig, name: &str) -> Result<Arc<dyn Logger>> {
        let section = config
            .section(name)
            .ok_or_else(|| LogError::config(format!("configuration has no '{}' section", name)))?;
        self.create_logger(section)
    }

    /// 从配置节构造完整装配的日志器
    pub fn create_logger(&self, section: &ConfigSection) -> Result<Arc<dyn Logger>> {
        let identifier = section.required_attribute(keys::BACKEND)?;
        let module = section.attribute(keys::BACKEND_MODULE);
        let backend = self.registry.resolve(identifier, module)?;
        tracing::debug!(
            section = section.name(),
            backend = %backend.qualified_name(),
            "resolved logger backend"
        );

        let effective: Cow<'_, ConfigSection> = match zero_configuration_preset(section)? {
            Some(preset) => {
                tracing::debug!(
                    section = section.name(),
                    preset = preset.as_str(),
                    "applying zero-configuration preset"
                );
                Cow::Owned(
                    backend
                        .initialize_zero_configuration(preset, section)
                        .map_err(|e| {
                            e.into_config(&format!(
                                "zero-configuration of backend '{}' failed",
                                backend.qualified_name()
                            ))
                        })?,
                )
            }
            None => Cow::Borrowed(section),
        };

        let mut logger = backend.create(&effective).map_err(|e| {
            e.into_config(&format!(
                "cannot construct backend '{}' from section '{}'",
                backend.qualified_name(),
                section.name()
            ))
        })?;

        let filtered = filtered_levels(&effective)?;
        if !filtered.is_empty() {
            tracing::debug!(
                logger = logger.name(),
                levels = ?filtered,
                "wrapping logger in level filter"
            );
            logger = Arc::new(LevelFilterLogger::new(logger, filtered));
        }

        if effective.bool_attribute(keys::PROPAGATE_EXCEPTIONS, false)? {
            tracing::debug!(logger = logger.name(), "exceptions propagate to callers");
            return Ok(logger);
        }

        let safe = match effective.child(keys::EXCEPTION_LOGGER) {
            Some(child) => {
                let child = child.with_default_attribute(
                    keys::DEFAULT_LEVEL,
                    EXCEPTION_LOGGER_DEFAULT_LEVEL.as_str(),
                );
                let exception_logger = self.create_logger(&child).map_err(|e| {
                    e.into_config(&format!(
                        "cannot construct exception logger of section '{}'",
                        section.name()
                    ))
                })?;
                tracing::debug!(
                    logger = logger.name(),
                    exception_logger = exception_logger.name(),
                    "wrapping logger with dedicated exception logger"
                );
                ExceptionSafeLogger::with_owned_exception_logger(logger, exception_logger)
            }
            None => {
                tracing::debug!(logger = logger.name(), "wrapping logger as self-reporting");
                ExceptionSafeLogger::self_reporting(logger)
            }
        };
        Ok(Arc::new(safe))
    }
}

/// 零配置只对保留的默认配置节生效，其他节上的 `default_config` 被忽略
fn zero_configuration_preset(section: &ConfigSection) -> Result<Option<Preset>> {
    if section.name() != DEFAULT_SECTION_NAME {
        return Ok(None);
    }
    section
        .attribute(keys::DEFAULT_CONFIG)
        .map(Preset::from_str)
        .transpose()
}

/// 解析 `filtered_levels`，无法解析或重复的条目是配置错误
fn filtered_levels(section: &ConfigSection) -> Result<BTreeSet<Level>> {
    let mut levels = BTreeSet::new();
    for entry in section.list(keys::FILTERED_LEVELS).unwrap_or_default() {
        let level = Level::from_str(&entry)?;
        if !levels.insert(level) {
            return Err(LogError::config(format!(
                "filtered_levels of section '{}' lists {} more than once",
                section.name(),
                level
            )));
        }
    }
    Ok(levels)
}
