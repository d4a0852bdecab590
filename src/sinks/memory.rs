//! 内存 Sink 实现
//!
//! 把日志记录保存在可共享的内存缓冲区中，适合测试与进程内诊断。

use crate::config::{ConfigSection, Preset};
use crate::core::event::LogRecord;
use crate::core::level::Level;
use crate::core::logger::{Logger, LoggerCore};
use crate::core::message::{format_message, LogArg, NamedMessages};
use crate::error::{LogError, Result};
use crate::sinks::traits::Backend;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

fn default_capacity() -> usize {
    10_000
}

/// 可克隆的内存缓冲区句柄
///
/// 所有克隆共享同一个缓冲区，可在日志器之外读取记录。
#[derive(Debug, Clone)]
pub struct MemorySink {
    records: Arc<Mutex<VecDeque<LogRecord>>>,
    capacity: usize,
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySink {
    pub fn new() -> Self {
        Self::with_capacity(default_capacity())
    }

    /// 超出容量时丢弃最旧的记录
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Arc::new(Mutex::new(VecDeque::new())),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&self, record: LogRecord) -> Result<()> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| LogError::logging("memory sink lock poisoned"))?;
        if records.len() >= self.capacity {
            records.pop_front();
        }
        records.push_back(record);
        Ok(())
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.records
            .lock()
            .map(|r| r.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// 只返回消息文本
    pub fn messages(&self) -> Vec<String> {
        self.records().into_iter().map(|r| r.message).collect()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut records) = self.records.lock() {
            records.clear();
        }
    }
}

/// 内存日志器
///
/// 配置属性：`capacity`（保留的最大记录数）、`min_level`（最低记录级别，默认 DEBUG）。
#[derive(Debug)]
pub struct MemoryLogger {
    core: LoggerCore,
    sink: MemorySink,
    min_level: Level,
}

impl MemoryLogger {
    /// 写入调用方提供的缓冲区，忽略配置中的 `capacity`
    pub fn with_sink(config: &ConfigSection, sink: MemorySink) -> Result<Self> {
        Ok(Self {
            core: LoggerCore::from_config(config)?,
            sink,
            min_level: config.level_attribute("min_level", Level::Debug)?,
        })
    }

    pub fn sink(&self) -> &MemorySink {
        &self.sink
    }
}

impl Logger for MemoryLogger {
    fn name(&self) -> &str {
        self.core.name()
    }

    fn default_level(&self) -> Level {
        self.core.default_level()
    }

    fn named_messages(&self) -> &NamedMessages {
        self.core.named_messages()
    }

    fn log(&self, level: Level, template: &str, args: &[LogArg]) -> Result<()> {
        if !self.is_level_enabled(level)? {
            return Ok(());
        }
        let message = format_message(template, args)?;
        self.sink.push(LogRecord::new(level, self.core.name(), message))
    }

    fn is_level_enabled(&self, level: Level) -> Result<bool> {
        Ok(level.passes(self.min_level))
    }

    fn dispose(&self) -> Result<()> {
        Ok(())
    }
}

impl Backend for MemoryLogger {
    const NAME: &'static str = "Memory";

    fn from_config(config: &ConfigSection) -> Result<Self> {
        let capacity = config
            .parsed_attribute::<usize>("capacity")?
            .unwrap_or_else(default_capacity);
        if capacity == 0 {
            return Err(LogError::config("memory logger capacity must be greater than 0"));
        }
        Self::with_sink(config, MemorySink::with_capacity(capacity))
    }

    fn initialize_zero_configuration(
        preset: Preset,
        config: &ConfigSection,
    ) -> Result<ConfigSection> {
        let capacity = match preset {
            Preset::Minimal => "100",
            Preset::Standard => "1000",
            Preset::Verbose => "10000",
        };
        let defaults = ConfigSection::new(config.name())
            .with_attribute("capacity", capacity)
            .with_attribute("min_level", preset.min_level().as_str());
        Ok(config.with_defaults(&defaults))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ConfigSection {
        ConfigSection::new("Logger").with_attribute("logger_name", "mem")
    }

    #[test]
    fn test_records_formatted_messages() {
        let logger = MemoryLogger::from_config(&config()).unwrap();
        logger
            .log(Level::Warn, "{0} items left", &[LogArg::from(3)])
            .unwrap();
        let records = logger.sink().records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].level, Level::Warn);
        assert_eq!(records[0].logger, "mem");
        assert_eq!(records[0].message, "3 items left");
    }

    #[test]
    fn test_min_level_and_off() {
        let logger =
            MemoryLogger::from_config(&config().with_attribute("min_level", "WARN")).unwrap();
        logger.log(Level::Info, "skipped", &[]).unwrap();
        logger.log(Level::Off, "never", &[]).unwrap();
        logger.log(Level::Error, "kept", &[]).unwrap();
        assert_eq!(logger.sink().messages(), vec!["kept".to_string()]);
        assert!(!logger.is_level_enabled(Level::Off).unwrap());
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let logger =
            MemoryLogger::from_config(&config().with_attribute("capacity", "2")).unwrap();
        for i in 0..3 {
            logger.log(Level::Info, "{0}", &[LogArg::from(i)]).unwrap();
        }
        assert_eq!(logger.sink().messages(), vec!["1".to_string(), "2".to_string()]);
    }

    #[test]
    fn test_invalid_capacity() {
        assert!(MemoryLogger::from_config(&config().with_attribute("capacity", "0")).is_err());
        assert!(MemoryLogger::from_config(&config().with_attribute("capacity", "many")).is_err());
    }

    #[test]
    fn test_formatting_error_propagates() {
        let logger = MemoryLogger::from_config(&config()).unwrap();
        let err = logger.log(Level::Info, "{1}", &[LogArg::from(1)]).unwrap_err();
        assert!(matches!(err, LogError::MessageFormattingError(_)));
        assert!(logger.sink().is_empty());
    }

    #[test]
    fn test_zero_configuration_keeps_explicit_values() {
        let derived = MemoryLogger::initialize_zero_configuration(
            Preset::Minimal,
            &config().with_attribute("capacity", "5"),
        )
        .unwrap();
        assert_eq!(derived.attribute("capacity"), Some("5"));
        assert_eq!(derived.attribute("min_level"), Some("WARN"));
        assert_eq!(derived.attribute("logger_name"), Some("mem"));
    }

    #[test]
    fn test_concurrent_logging() {
        let logger = Arc::new(MemoryLogger::from_config(&config()).unwrap());
        std::thread::scope(|scope| {
            for t in 0..4 {
                let logger = Arc::clone(&logger);
                scope.spawn(move || {
                    for i in 0..25 {
                        logger
                            .log(Level::Info, "{0}-{1}", &[LogArg::from(t), LogArg::from(i)])
                            .unwrap();
                    }
                });
            }
        });
        assert_eq!(logger.sink().len(), 100);
    }
}
