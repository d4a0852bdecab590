//! pluglog - 可插拔的日志门面
//!
//! 应用代码只依赖一个抽象的 [`Logger`] 契约，具体写到哪里（内存、控制台、文件、
//! `tracing` 生态）在运行时由声明式配置决定。构造管道负责解析后端、应用零配置预设，
//! 并按策略叠加级别过滤层与异常安全层。
//!
//! # 快速开始
//!
//! ```rust
//! use pluglog::{load_config_from_str, Level, LogArg, Logger};
//!
//! let config = load_config_from_str(r#"
//!     [Logger]
//!     backend = "Memory"
//!     logger_name = "svc"
//!     default_level = "INFO"
//!
//!     [Logger.NamedMessages.user_login]
//!     text = "user {0} logged in from {1}"
//!     parameters = ["user", "address"]
//!     default_level = "SUCCESSAUDIT"
//! "#)?;
//!
//! let logger = pluglog::create_default_logger(&config)?;
//! logger.log_default("service {0} ready", &[LogArg::from("svc")])?;
//! logger.log_named_message("user_login", &["ann".into(), "10.0.0.1".into()])?;
//! logger.log(Level::Off, "never written", &[])?;
//! logger.dispose()?;
//! # Ok::<(), pluglog::LogError>(())
//! ```
//!
//! # 自定义后端
//!
//! 实现 [`Logger`] 与 [`Backend`]，再注册到 [`BackendRegistry`]：
//!
//! ```rust
//! use pluglog::{BackendRegistry, ConfigSection, LoggerManager, MemoryLogger};
//!
//! let mut registry = BackendRegistry::with_builtins();
//! registry.register::<MemoryLogger>("my_app");
//!
//! let manager = LoggerManager::new(registry);
//! let section = ConfigSection::new("Audit")
//!     .with_attribute("backend", "my_app::Memory")
//!     .with_attribute("logger_name", "audit")
//!     .with_attribute("propagate_exceptions", "true");
//! let logger = manager.create_logger(&section)?;
//! assert_eq!(logger.name(), "audit");
//! # Ok::<(), pluglog::LogError>(())
//! ```

pub mod config;
pub mod core;
pub mod env_config;
pub mod error;
pub mod manager;
pub mod sinks;

// 重新导出主要类型
pub use config::{
    keys, load_config_from_file, load_config_from_json_str, load_config_from_str, ConfigSection,
    ConfigValue, LogConfig, Preset, DEFAULT_SECTION_NAME,
};
pub use env_config::{load_config_from_env, EnvConfig, CONFIG_ENV_VAR};
pub use error::{LogError, Result};
pub use manager::LoggerManager;

// 重新导出核心功能
pub use core::{
    format_message, ExceptionSafeLogger, Level, LevelFilterLogger, LogArg, LogRecord, Logger,
    LoggerCore, NamedMessage, NamedMessages,
};
pub use sinks::{
    Backend, BackendDescriptor, BackendRegistry, ConsoleLogger, ConsoleStream, FileFormat,
    FileLogger, MemoryLogger, MemorySink, TracingLogger, DEFAULT_MODULE,
};

use std::sync::Arc;

/// 库版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 使用内置后端，从单个配置节构造日志器
///
/// 等价于 `LoggerManager::default().create_logger(section)`。
pub fn create_logger(section: &ConfigSection) -> Result<Arc<dyn Logger>> {
    LoggerManager::default().create_logger(section)
}

/// 使用内置后端，从配置文档的默认节构造日志器
pub fn create_default_logger(config: &LogConfig) -> Result<Arc<dyn Logger>> {
    LoggerManager::default().create_default_logger(config)
}

/// 从 `PLUGLOG_CONFIG` 指向的配置文件构造默认日志器
///
/// 环境变量未设置时返回 `Ok(None)`。
pub fn create_default_logger_from_env() -> Result<Option<Arc<dyn Logger>>> {
    load_config_from_env()?
        .map(|config| create_default_logger(&config))
        .transpose()
}
