//! pluglog Sinks 模块
//!
//! 提供内置后端（内存、控制台、文件、tracing 桥接）以及按名称实例化后端的注册表。

pub mod console;
pub mod file;
pub mod memory;
pub mod registry;
pub mod tracing_bridge;
pub mod traits;

// 重新导出主要类型
pub use console::{ConsoleLogger, ConsoleStream};
pub use file::{FileFormat, FileLogger};
pub use memory::{MemoryLogger, MemorySink};
pub use registry::{
    BackendDescriptor, BackendRegistry, LoggerFactory, ZeroConfigInitializer, DEFAULT_MODULE,
};
pub use tracing_bridge::{TracingLogger, TRACING_TARGET};
pub use traits::Backend;
