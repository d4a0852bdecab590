//! 构造管道集成测试
//!
//! 从配置文件出发，经由 `LoggerManager` 装配内置与自定义后端，验证完整的装饰器栈行为。

use pluglog::{
    load_config_from_file, load_config_from_json_str, load_config_from_str, Backend,
    BackendRegistry, ConfigSection, Level, LogArg, LogError, Logger, LoggerCore, LoggerManager,
    MemoryLogger, MemorySink, NamedMessages, Preset, Result,
};
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// 统计写入与释放次数、写入总是失败的自定义后端
///
/// 后端自身不检查 `OFF`，用来验证装饰层的级别闸门。
#[derive(Debug)]
struct FlakyLogger {
    core: LoggerCore,
}

static FLAKY_WRITES: AtomicUsize = AtomicUsize::new(0);
static FLAKY_DISPOSALS: AtomicUsize = AtomicUsize::new(0);

impl Logger for FlakyLogger {
    fn name(&self) -> &str {
        self.core.name()
    }

    fn default_level(&self) -> Level {
        self.core.default_level()
    }

    fn named_messages(&self) -> &NamedMessages {
        self.core.named_messages()
    }

    fn log(&self, level: Level, _template: &str, _args: &[LogArg]) -> Result<()> {
        if level == Level::Off {
            FLAKY_WRITES.fetch_add(1, Ordering::SeqCst);
        }
        Err(LogError::logging("remote service unreachable"))
    }

    fn is_level_enabled(&self, _level: Level) -> Result<bool> {
        Err(LogError::logging("remote service unreachable"))
    }

    fn dispose(&self) -> Result<()> {
        FLAKY_DISPOSALS.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl Backend for FlakyLogger {
    const NAME: &'static str = "Flaky";

    fn from_config(config: &ConfigSection) -> Result<Self> {
        Ok(Self {
            core: LoggerCore::from_config(config)?,
        })
    }
}

fn manager_with(sink: &MemorySink) -> LoggerManager {
    let mut registry = BackendRegistry::with_builtins();
    registry.register::<FlakyLogger>("remote");
    let shared = sink.clone();
    registry.register_fn(
        "test",
        "Mem",
        move |config: &ConfigSection| -> Result<Arc<dyn Logger>> {
            Ok(Arc::new(MemoryLogger::with_sink(config, shared.clone())?))
        },
        |preset: Preset, config: &ConfigSection| {
            MemoryLogger::initialize_zero_configuration(preset, config)
        },
    );
    LoggerManager::new(registry)
}

#[test]
fn mem_scenario_from_toml() {
    let config = load_config_from_str(
        r#"
        [Logger]
        backend = "Mem"
        logger_name = "svc"
        filtered_levels = ["DEBUG"]
        "#,
    )
    .unwrap();

    let sink = MemorySink::new();
    let logger = manager_with(&sink).create_default_logger(&config).unwrap();

    logger.log(Level::Debug, "dropped", &[]).unwrap();
    logger.log(Level::Info, "forwarded {0}", &[LogArg::from(1)]).unwrap();
    logger.log(Level::Off, "never", &[]).unwrap();
    assert_eq!(sink.messages(), vec!["forwarded 1".to_string()]);
    assert!(!logger.is_level_enabled(Level::Debug).unwrap());
    assert!(logger.is_level_enabled(Level::Info).unwrap());
    logger.dispose().unwrap();
}

#[test]
fn failing_backend_reports_to_dedicated_exception_logger() {
    let config = load_config_from_str(
        r#"
        [Logger]
        backend = "remote::Flaky"
        logger_name = "remote-svc"

        [Logger.ExceptionLogger]
        backend = "Mem"
        logger_name = "fallback"
        "#,
    )
    .unwrap();

    let sink = MemorySink::new();
    let logger = manager_with(&sink).create_default_logger(&config).unwrap();

    assert!(logger.log(Level::Error, "lost", &[]).is_ok());
    assert!(!logger.is_level_enabled(Level::Fatal).unwrap());

    let records = sink.records();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.logger == "fallback" && r.level == Level::Warn));
    assert!(records[0].message.contains("remote-svc"));
    assert!(records[0].message.contains("remote service unreachable"));
    assert!(records[1].message.contains("is_level_enabled"));

    let before = FLAKY_DISPOSALS.load(Ordering::SeqCst);
    logger.dispose().unwrap();
    assert!(FLAKY_DISPOSALS.load(Ordering::SeqCst) > before);
}

#[test]
fn off_never_reaches_custom_backend() {
    let config = load_config_from_str(
        r#"
        [Logger]
        backend = "remote::Flaky"
        logger_name = "remote-svc"

        [Logger.ExceptionLogger]
        backend = "Mem"
        logger_name = "fallback"
        "#,
    )
    .unwrap();

    let sink = MemorySink::new();
    let manager = manager_with(&sink);
    let safe = manager.create_default_logger(&config).unwrap();
    let raw = manager
        .create_logger(
            &ConfigSection::new("Remote")
                .with_attribute("backend", "remote::Flaky")
                .with_attribute("logger_name", "remote-svc")
                .with_attribute("propagate_exceptions", "true")
                .with_list("filtered_levels", ["DEBUG"]),
        )
        .unwrap();

    assert!(safe.log(Level::Off, "never", &[]).is_ok());
    assert!(raw.log(Level::Off, "never", &[]).is_ok());
    assert_eq!(FLAKY_WRITES.load(Ordering::SeqCst), 0);
    assert!(sink.is_empty());
}

#[test]
fn propagate_exceptions_surfaces_backend_errors() {
    let section = ConfigSection::new("Remote")
        .with_attribute("backend", "Flaky")
        .with_attribute("backend_module", "remote")
        .with_attribute("logger_name", "remote-svc")
        .with_attribute("propagate_exceptions", "true");

    let logger = manager_with(&MemorySink::new()).create_logger(&section).unwrap();
    let err = logger.log(Level::Error, "lost", &[]).unwrap_err();
    assert!(matches!(err, LogError::LoggingError(_)));
}

#[test]
fn named_messages_from_json() {
    let config = load_config_from_json_str(
        r#"{
            "Logger": {
                "backend": "Mem",
                "logger_name": "audit",
                "default_level": "INFO",
                "NamedMessages": {
                    "login": {
                        "text": "user {0} logged in after {1} attempts",
                        "parameters": ["user", "attempts"],
                        "default_level": "SUCCESSAUDIT"
                    }
                }
            }
        }"#,
    )
    .unwrap();

    let sink = MemorySink::new();
    let logger = manager_with(&sink).create_default_logger(&config).unwrap();
    logger
        .log_named_message("login", &["ann".into(), 2.into()])
        .unwrap();
    logger
        .log_named_message_at(Level::FailureAudit, "login", &["bob".into(), 5.into()])
        .unwrap();

    let records = sink.records();
    assert_eq!(records[0].level, Level::SuccessAudit);
    assert_eq!(records[0].message, "user ann logged in after 2 attempts");
    assert_eq!(records[1].level, Level::FailureAudit);

    let err = logger.log_named_message("logout", &[]).unwrap_err();
    assert!(err.is_argument_error());
}

#[test]
fn invalid_named_message_fails_construction() {
    let config = load_config_from_str(
        r#"
        [Logger]
        backend = "Mem"
        logger_name = "svc"

        [Logger.NamedMessages.broken]
        text = "needs {0} and {1}"
        parameters = ["only_one"]
        "#,
    )
    .unwrap();

    let err = manager_with(&MemorySink::new())
        .create_default_logger(&config)
        .unwrap_err();
    assert!(err.is_config_error());
}

#[test]
fn file_backend_with_zero_configuration() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("logs").join("svc.log");
    let config_path = temp_dir.path().join("pluglog.toml");
    fs::write(
        &config_path,
        format!(
            concat!(
                "[Logger]\nbackend = \"File\"\nlogger_name = \"svc\"\n",
                "path = {:?}\ndefault_config = \"minimal\"\n"
            ),
            path.to_string_lossy()
        ),
    )
    .unwrap();

    let config = load_config_from_file(&config_path).unwrap();
    let logger = LoggerManager::default().create_default_logger(&config).unwrap();
    logger.log(Level::Info, "below minimal preset", &[]).unwrap();
    logger.log(Level::Error, "disk {0:F1}% full", &[LogArg::from(93.26)]).unwrap();
    logger.dispose().unwrap();

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with("ERROR svc: disk 93.3% full"));

    // 释放之后的写入失败被异常安全层吞掉
    assert!(logger.log(Level::Error, "late", &[]).is_ok());
}

#[test]
fn concurrent_logging_through_decorators() {
    let sink = MemorySink::new();
    let manager = manager_with(&sink);
    let logger = manager
        .create_logger(
            &ConfigSection::new("Logger")
                .with_attribute("backend", "Mem")
                .with_attribute("logger_name", "svc")
                .with_list("filtered_levels", ["DEBUG"]),
        )
        .unwrap();

    let seen = Mutex::new(0usize);
    std::thread::scope(|scope| {
        for t in 0..4 {
            let logger = Arc::clone(&logger);
            let seen = &seen;
            scope.spawn(move || {
                for i in 0..50 {
                    let level = if i % 2 == 0 { Level::Debug } else { Level::Info };
                    logger
                        .log(level, "{0}:{1}", &[LogArg::from(t), LogArg::from(i)])
                        .unwrap();
                }
                *seen.lock().unwrap() += 1;
            });
        }
    });

    assert_eq!(*seen.lock().unwrap(), 4);
    assert_eq!(sink.len(), 100);
}
