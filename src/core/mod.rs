//! pluglog 核心模块
//!
//! 本模块包含日志器契约、级别、消息模板、日志记录以及装饰层。

pub mod event;
pub mod layers;
pub mod level;
pub mod logger;
pub mod message;

// 重新导出核心类型
pub use event::LogRecord;
pub use level::Level;
pub use logger::{Logger, LoggerCore};
pub use message::{format_message, LogArg, NamedMessage, NamedMessages};

// 重新导出层类型
pub use layers::{ExceptionSafeLogger, LevelFilterLogger};
