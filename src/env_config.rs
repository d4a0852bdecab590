//! 环境变量配置模块
//!
//! 此模块负责从环境变量指定的配置文件加载日志配置。

use crate::config::{load_config_from_file, LogConfig};
use crate::error::Result;
use std::env;
use std::path::PathBuf;

/// 指向配置文件的环境变量
pub const CONFIG_ENV_VAR: &str = "PLUGLOG_CONFIG";

/// 环境变量配置管理器
pub struct EnvConfig;

impl EnvConfig {
    /// 从环境变量读取配置文件路径，未设置或为空时返回 `None`
    pub fn config_path() -> Option<PathBuf> {
        env::var(CONFIG_ENV_VAR)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
    }
}

/// 加载 `PLUGLOG_CONFIG` 指向的配置文件
///
/// 环境变量未设置时返回 `Ok(None)`；文件不存在返回 `ConfigFileMissing`。
pub fn load_config_from_env() -> Result<Option<LogConfig>> {
    match EnvConfig::config_path() {
        Some(path) => {
            tracing::debug!("Loading logger configuration from {}", path.display());
            load_config_from_file(&path).map(Some)
        }
        None => Ok(None),
    }
}
