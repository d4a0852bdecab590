//! 日志级别定义
//!
//! 封闭、全序的严重级别枚举。`Off` 是低于所有级别的哨兵值，仅表示“从不记录”。

use crate::error::LogError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 日志严重级别
///
/// 声明顺序即比较顺序：`Off < Debug < Info < Warn < SuccessAudit < FailureAudit < Error < Fatal`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Off,
    Debug,
    Info,
    Warn,
    SuccessAudit,
    FailureAudit,
    Error,
    Fatal,
}

impl Level {
    /// 所有可记录的级别，从高到低排列（不含 `Off`）
    pub const ALL: [Level; 7] = [
        Level::Fatal,
        Level::Error,
        Level::FailureAudit,
        Level::SuccessAudit,
        Level::Warn,
        Level::Info,
        Level::Debug,
    ];

    /// 大写名称，也是配置中使用的名称
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Off => "OFF",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::SuccessAudit => "SUCCESSAUDIT",
            Level::FailureAudit => "FAILUREAUDIT",
            Level::Error => "ERROR",
            Level::Fatal => "FATAL",
        }
    }

    /// 判断该级别在给定阈值下是否应被记录
    ///
    /// `Off` 永远不会通过；阈值为 `Off` 时所有级别都被关闭。
    pub fn passes(self, threshold: Level) -> bool {
        self != Level::Off && threshold != Level::Off && self >= threshold
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "OFF" => Ok(Level::Off),
            "DEBUG" => Ok(Level::Debug),
            "INFO" => Ok(Level::Info),
            "WARN" => Ok(Level::Warn),
            "SUCCESSAUDIT" => Ok(Level::SuccessAudit),
            "FAILUREAUDIT" => Ok(Level::FailureAudit),
            "ERROR" => Ok(Level::Error),
            "FATAL" => Ok(Level::Fatal),
            _ => Err(LogError::InvalidLogLevel(s.to_string())),
        }
    }
}
