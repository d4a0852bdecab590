//! pluglog Backend Traits
//!
//! 定义了后端必须提供的构造契约：从配置节构造实例，以及一个类级别的零配置初始化函数。
//! 日志能力本身由 [`Logger`] 规定。
//!
//! # 使用示例
//!
//! ```rust
//! use pluglog::{Backend, BackendRegistry, ConfigSection, Level, LogArg, Logger, LoggerCore,
//!               NamedMessages, Result};
//!
//! #[derive(Debug)]
//! struct NullLogger {
//!     core: LoggerCore,
//! }
//!
//! impl Logger for NullLogger {
//!     fn name(&self) -> &str { self.core.name() }
//!     fn default_level(&self) -> Level { self.core.default_level() }
//!     fn named_messages(&self) -> &NamedMessages { self.core.named_messages() }
//!     fn log(&self, _level: Level, _template: &str, _args: &[LogArg]) -> Result<()> { Ok(()) }
//!     fn is_level_enabled(&self, _level: Level) -> Result<bool> { Ok(false) }
//!     fn dispose(&self) -> Result<()> { Ok(()) }
//! }
//!
//! impl Backend for NullLogger {
//!     const NAME: &'static str = "Null";
//!
//!     fn from_config(config: &ConfigSection) -> Result<Self> {
//!         Ok(Self { core: LoggerCore::from_config(config)? })
//!     }
//! }
//!
//! let mut registry = BackendRegistry::new();
//! registry.register::<NullLogger>("my_app");
//! assert!(registry.resolve("my_app::Null", None).is_ok());
//! ```

use crate::config::{ConfigSection, Preset};
use crate::core::logger::Logger;
use crate::error::Result;

/// 可由构造管道按名称实例化的后端
pub trait Backend: Logger + Sized + 'static {
    /// 注册表中的短名称
    const NAME: &'static str;

    /// 从配置节构造实例；缺失或非法的必需属性使构造失败
    fn from_config(config: &ConfigSection) -> Result<Self>;

    /// 零配置初始化
    ///
    /// 返回一个派生配置：`preset` 对应的后端默认值叠加在 `config` 的显式设置之下。
    /// 默认实现不补充任何值。
    fn initialize_zero_configuration(
        preset: Preset,
        config: &ConfigSection,
    ) -> Result<ConfigSection> {
        let _ = preset;
        Ok(config.clone())
    }
}
