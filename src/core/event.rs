//! 日志记录定义
//!
//! 内置后端在写出之前把一次日志调用整理为 `LogRecord`。

use crate::core::level::Level;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 一条已格式化的日志记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// 记录时间戳
    pub timestamp: DateTime<Utc>,
    /// 日志级别
    pub level: Level,
    /// 日志器名称
    pub logger: String,
    /// 格式化后的消息
    pub message: String,
}

impl LogRecord {
    /// 以当前时间创建记录
    pub fn new(level: Level, logger: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            logger: logger.into(),
            message: message.into(),
        }
    }

    /// 获取记录的 JSON 表示
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// 按给定时间戳格式输出单行文本
    pub fn to_text_line(&self, timestamp_format: &str) -> String {
        format!(
            "[{}] {} {}: {}",
            self.timestamp.format(timestamp_format),
            self.level,
            self.logger,
            self.message
        )
    }
}
