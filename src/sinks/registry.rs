//! 后端注册表
//!
//! 把字符串标识符映射到工厂函数与零配置初始化函数，在进程启动时由编译进来的后端填充。
//! 这样既保留了“由配置选择实现”的能力，又不需要运行时类型加载。

use crate::config::{ConfigSection, Preset};
use crate::core::logger::Logger;
use crate::error::{LogError, Result};
use crate::sinks::traits::Backend;
use crate::sinks::{ConsoleLogger, FileLogger, MemoryLogger, TracingLogger};
use std::fmt;
use std::sync::Arc;

/// 内置后端所在的模块名
pub const DEFAULT_MODULE: &str = "pluglog";

/// 后端工厂：配置节 -> 日志器实例
pub type LoggerFactory = Arc<dyn Fn(&ConfigSection) -> Result<Arc<dyn Logger>> + Send + Sync>;

/// 零配置初始化函数：预设 + 配置节 -> 派生配置节
pub type ZeroConfigInitializer =
    Arc<dyn Fn(Preset, &ConfigSection) -> Result<ConfigSection> + Send + Sync>;

/// 注册表中的一个后端
#[derive(Clone)]
pub struct BackendDescriptor {
    module: String,
    name: String,
    factory: LoggerFactory,
    initializer: ZeroConfigInitializer,
}

impl BackendDescriptor {
    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `module::name` 形式的完整标识符
    pub fn qualified_name(&self) -> String {
        format!("{}::{}", self.module, self.name)
    }

    /// 调用后端构造函数
    pub fn create(&self, config: &ConfigSection) -> Result<Arc<dyn Logger>> {
        (self.factory)(config)
    }

    /// 调用后端的零配置初始化函数
    pub fn initialize_zero_configuration(
        &self,
        preset: Preset,
        config: &ConfigSection,
    ) -> Result<ConfigSection> {
        (self.initializer)(preset, config)
    }
}

impl fmt::Debug for BackendDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendDescriptor")
            .field("module", &self.module)
            .field("name", &self.name)
            .finish()
    }
}

/// 标识符 -> 后端 的显式注册表
#[derive(Debug, Clone, Default)]
pub struct BackendRegistry {
    entries: Vec<BackendDescriptor>,
}

impl BackendRegistry {
    /// 创建空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建包含全部内置后端的注册表
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register::<MemoryLogger>(DEFAULT_MODULE);
        registry.register::<ConsoleLogger>(DEFAULT_MODULE);
        registry.register::<FileLogger>(DEFAULT_MODULE);
        registry.register::<TracingLogger>(DEFAULT_MODULE);
        registry
    }

    /// 在 `module` 下注册实现了 [`Backend`] 的类型
    pub fn register<B: Backend>(&mut self, module: &str) -> &mut Self {
        self.register_fn(
            module,
            B::NAME,
            |config: &ConfigSection| -> Result<Arc<dyn Logger>> {
                Ok(Arc::new(B::from_config(config)?))
            },
            B::initialize_zero_configuration,
        )
    }

    /// 用闭包注册后端
    ///
    /// 同一模块下的同名后端会被替换。
    pub fn register_fn<F, Z>(
        &mut self,
        module: &str,
        name: &str,
        factory: F,
        initializer: Z,
    ) -> &mut Self
    where
        F: Fn(&ConfigSection) -> Result<Arc<dyn Logger>> + Send + Sync + 'static,
        Z: Fn(Preset, &ConfigSection) -> Result<ConfigSection> + Send + Sync + 'static,
    {
        self.entries.retain(|e| !(e.module == module && e.name == name));
        self.entries.push(BackendDescriptor {
            module: module.to_string(),
            name: name.to_string(),
            factory: Arc::new(factory),
            initializer: Arc::new(initializer),
        });
        tracing::debug!(module, name, "registered logger backend");
        self
    }

    /// 注册不需要零配置初始化的工厂闭包
    pub fn register_factory<F>(&mut self, module: &str, name: &str, factory: F) -> &mut Self
    where
        F: Fn(&ConfigSection) -> Result<Arc<dyn Logger>> + Send + Sync + 'static,
    {
        self.register_fn(module, name, factory, |_, config: &ConfigSection| {
            Ok(config.clone())
        })
    }

    /// 按标识符解析后端
    ///
    /// `identifier` 可以是 `module::Name` 完整形式，也可以是短名称。短名称先在
    /// `module`（若给出）中查找，否则依次查找默认模块与全部模块中的唯一匹配。
    pub fn resolve(&self, identifier: &str, module: Option<&str>) -> Result<&BackendDescriptor> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(LogError::config("backend identifier must not be empty"));
        }

        let (module, name) = match identifier.rsplit_once("::") {
            Some((qualified_module, name)) => {
                if let Some(requested) = module {
                    if requested != qualified_module {
                        return Err(LogError::config(format!(
                            "backend '{}' conflicts with backend_module '{}'",
                            identifier, requested
                        )));
                    }
                }
                (Some(qualified_module), name)
            }
            None => (module, identifier),
        };

        if let Some(module) = module {
            return self.find(module, name).ok_or_else(|| {
                LogError::config(format!(
                    "backend '{}' is not registered in module '{}'",
                    name, module
                ))
            });
        }

        if let Some(entry) = self.find(DEFAULT_MODULE, name) {
            return Ok(entry);
        }

        let mut matches = self.entries.iter().filter(|e| e.name == name);
        match (matches.next(), matches.next()) {
            (Some(entry), None) => Ok(entry),
            (Some(first), Some(second)) => Err(LogError::config(format!(
                "backend '{}' is ambiguous ({}, {}, ...); set backend_module",
                name,
                first.qualified_name(),
                second.qualified_name()
            ))),
            (None, _) => Err(LogError::config(format!(
                "backend '{}' is not registered",
                name
            ))),
        }
    }

    fn find(&self, module: &str, name: &str) -> Option<&BackendDescriptor> {
        self.entries
            .iter()
            .find(|e| e.module == module && e.name == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn backends(&self) -> impl Iterator<Item = &BackendDescriptor> {
        self.entries.iter()
    }
}
