//! pluglog 装饰层模块
//!
//! 装饰层包装另一个日志器并改变其行为，但不改变底层输出目标。
//! 构造管道按固定顺序叠加：先级别过滤，再异常安全。

pub mod exception_safety;
pub mod level_filter;

pub use exception_safety::ExceptionSafeLogger;
pub use level_filter::LevelFilterLogger;
