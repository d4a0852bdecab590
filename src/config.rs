//! 定义 pluglog 的配置模型：带名称的配置节、属性与子节。
//!
//! 构造管道只依赖这里的查询接口（键值属性、列表属性、命名子节与子节遍历），
//! 不关心配置来自 TOML、JSON 还是代码构建。
//!
//! 配置对象从不被就地修改：零配置预设与子日志器的默认级别都通过派生新的
//! `ConfigSection`（默认值叠加在显式设置之下）来实现。

use crate::core::level::Level;
use crate::error::{LogError, Result};
use std::collections::BTreeMap;
use std::str::FromStr;

/// 管道保留的默认配置节名称。零配置预设只在该节上生效。
pub const DEFAULT_SECTION_NAME: &str = "Logger";

/// 管道与日志器基础行为读取的属性名
pub mod keys {
    pub const BACKEND: &str = "backend";
    pub const BACKEND_MODULE: &str = "backend_module";
    pub const LOGGER_NAME: &str = "logger_name";
    pub const DEFAULT_LEVEL: &str = "default_level";
    pub const FILTERED_LEVELS: &str = "filtered_levels";
    pub const PROPAGATE_EXCEPTIONS: &str = "propagate_exceptions";
    pub const DEFAULT_CONFIG: &str = "default_config";
    pub const NAMED_MESSAGES: &str = "NamedMessages";
    pub const EXCEPTION_LOGGER: &str = "ExceptionLogger";
}

/// 属性值：单个字符串或字符串列表
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValue {
    Text(String),
    List(Vec<String>),
}

/// 配置节
///
/// 拥有名称、有序属性表与有序子节列表（子节名称允许重复）。属性值在写入时去除首尾空白。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConfigSection {
    name: String,
    attributes: BTreeMap<String, ConfigValue>,
    children: Vec<ConfigSection>,
}

impl ConfigSection {
    /// 创建空配置节
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 以新名称复制当前配置节
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    /// 设置文本属性（构建器风格）
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(key, value);
        self
    }

    /// 设置列表属性（构建器风格）
    pub fn with_list<I, S>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_list(key, values);
        self
    }

    /// 追加子节（构建器风格）
    pub fn with_child(mut self, child: ConfigSection) -> Self {
        self.children.push(child);
        self
    }

    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes
            .insert(key.into(), ConfigValue::Text(value.into().trim().to_string()));
    }

    pub fn set_list<I, S>(&mut self, key: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = values
            .into_iter()
            .map(|v| v.into().trim().to_string())
            .collect();
        self.attributes.insert(key.into(), ConfigValue::List(values));
    }

    pub fn push_child(&mut self, child: ConfigSection) {
        self.children.push(child);
    }

    pub fn has_attribute(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    pub fn value(&self, key: &str) -> Option<&ConfigValue> {
        self.attributes.get(key)
    }

    /// 读取文本属性；列表属性或空字符串视为缺失
    pub fn attribute(&self, key: &str) -> Option<&str> {
        match self.attributes.get(key) {
            Some(ConfigValue::Text(text)) if !text.is_empty() => Some(text.as_str()),
            _ => None,
        }
    }

    /// 读取必需的文本属性
    pub fn required_attribute(&self, key: &str) -> Result<&str> {
        self.attribute(key).ok_or_else(|| {
            LogError::config(format!(
                "section '{}' is missing required attribute '{}'",
                self.name, key
            ))
        })
    }

    /// 读取列表属性
    ///
    /// 文本属性按逗号拆分。空项原样保留，由调用方按自身规则拒绝；
    /// 整个文本为空时得到空列表。
    pub fn list(&self, key: &str) -> Option<Vec<String>> {
        match self.attributes.get(key)? {
            ConfigValue::List(values) => Some(values.clone()),
            ConfigValue::Text(text) if text.is_empty() => Some(Vec::new()),
            ConfigValue::Text(text) => {
                Some(text.split(',').map(|v| v.trim().to_string()).collect())
            }
        }
    }

    /// 读取布尔属性，缺失时返回 `default`
    pub fn bool_attribute(&self, key: &str, default: bool) -> Result<bool> {
        match self.attribute(key) {
            None => Ok(default),
            Some(value) => match value.to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Ok(true),
                "false" | "no" | "0" => Ok(false),
                _ => Err(LogError::config(format!(
                    "attribute '{}' of section '{}' is not a boolean: {}",
                    key, self.name, value
                ))),
            },
        }
    }

    /// 读取级别属性，缺失时返回 `default`
    pub fn level_attribute(&self, key: &str, default: Level) -> Result<Level> {
        self.attribute(key)
            .map(Level::from_str)
            .transpose()
            .map(|level| level.unwrap_or(default))
    }

    /// 读取任意可解析属性，缺失时返回 `None`
    pub fn parsed_attribute<T: FromStr>(&self, key: &str) -> Result<Option<T>> {
        self.attribute(key)
            .map(|value| {
                value.parse::<T>().map_err(|_| {
                    LogError::config(format!(
                        "attribute '{}' of section '{}' has an invalid value: {}",
                        key, self.name, value
                    ))
                })
            })
            .transpose()
    }

    /// 第一个名称匹配的子节
    pub fn child(&self, name: &str) -> Option<&ConfigSection> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children(&self) -> impl Iterator<Item = &ConfigSection> {
        self.children.iter()
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a ConfigSection> {
        self.children.iter().filter(move |c| c.name == name)
    }

    pub fn attribute_keys(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    /// 派生新的配置节：`defaults` 中的属性只在当前节缺失时生效
    ///
    /// 当前节没有的同名子节会从 `defaults` 中补入；已有子节保持不变。
    pub fn with_defaults(&self, defaults: &ConfigSection) -> ConfigSection {
        let mut merged = self.clone();
        for (key, value) in &defaults.attributes {
            merged
                .attributes
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
        for child in &defaults.children {
            if self.child(&child.name).is_none() {
                merged.children.push(child.clone());
            }
        }
        merged
    }

    /// 派生新的配置节，仅在属性缺失时补入一个默认值
    pub fn with_default_attribute(&self, key: &str, value: &str) -> ConfigSection {
        let mut merged = self.clone();
        if merged.attribute(key).is_none() {
            merged.set_attribute(key, value);
        }
        merged
    }

    /// 从 TOML 表构建配置节
    ///
    /// 标量映射为文本属性，标量数组映射为列表属性，表映射为子节，表数组映射为同名的多个子节。
    pub fn from_toml_table(name: impl Into<String>, table: &toml::Table) -> Result<Self> {
        let mut section = ConfigSection::new(name);
        for (key, value) in table {
            match value {
                toml::Value::Table(child) => {
                    section.push_child(ConfigSection::from_toml_table(key.clone(), child)?)
                }
                toml::Value::Array(items)
                    if !items.is_empty() && items.iter().all(toml::Value::is_table) =>
                {
                    for item in items {
                        if let toml::Value::Table(child) = item {
                            section.push_child(ConfigSection::from_toml_table(key.clone(), child)?);
                        }
                    }
                }
                toml::Value::Array(items) => {
                    let values = items
                        .iter()
                        .map(|item| toml_scalar(key, item))
                        .collect::<Result<Vec<_>>>()?;
                    section.set_list(key.clone(), values);
                }
                scalar => section.set_attribute(key.clone(), toml_scalar(key, scalar)?),
            }
        }
        Ok(section)
    }

    /// 从 JSON 对象构建配置节，映射规则与 TOML 相同
    pub fn from_json_object(
        name: impl Into<String>,
        object: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<Self> {
        let mut section = ConfigSection::new(name);
        for (key, value) in object {
            match value {
                serde_json::Value::Object(child) => {
                    section.push_child(ConfigSection::from_json_object(key.clone(), child)?)
                }
                serde_json::Value::Array(items)
                    if !items.is_empty() && items.iter().all(serde_json::Value::is_object) =>
                {
                    for item in items {
                        if let serde_json::Value::Object(child) = item {
                            section
                                .push_child(ConfigSection::from_json_object(key.clone(), child)?);
                        }
                    }
                }
                serde_json::Value::Array(items) => {
                    let values = items
                        .iter()
                        .map(|item| json_scalar(key, item))
                        .collect::<Result<Vec<_>>>()?;
                    section.set_list(key.clone(), values);
                }
                scalar => section.set_attribute(key.clone(), json_scalar(key, scalar)?),
            }
        }
        Ok(section)
    }
}

fn toml_scalar(key: &str, value: &toml::Value) -> Result<String> {
    match value {
        toml::Value::String(s) => Ok(s.clone()),
        toml::Value::Integer(i) => Ok(i.to_string()),
        toml::Value::Float(f) => Ok(f.to_string()),
        toml::Value::Boolean(b) => Ok(b.to_string()),
        toml::Value::Datetime(d) => Ok(d.to_string()),
        toml::Value::Array(_) | toml::Value::Table(_) => Err(LogError::config(format!(
            "attribute '{}' must be a scalar or a list of scalars",
            key
        ))),
    }
}

fn json_scalar(key: &str, value: &serde_json::Value) -> Result<String> {
    match value {
        serde_json::Value::String(s) => Ok(s.clone()),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Bool(b) => Ok(b.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => Err(LogError::config(
            format!("attribute '{}' must be a scalar or a list of scalars", key),
        )),
    }
}

/// 零配置预设
///
/// 由默认配置节的 `default_config` 属性选择，传给后端的零配置初始化函数。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// 只记录警告及以上，尽量少的输出
    Minimal,
    /// 常规生产设置
    Standard,
    /// 记录全部级别，附带额外上下文
    Verbose,
}

impl Preset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Minimal => "minimal",
            Preset::Standard => "standard",
            Preset::Verbose => "verbose",
        }
    }

    /// 该预设对应的最低记录级别
    pub fn min_level(&self) -> Level {
        match self {
            Preset::Minimal => Level::Warn,
            Preset::Standard => Level::Info,
            Preset::Verbose => Level::Debug,
        }
    }
}

impl FromStr for Preset {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "minimal" => Ok(Preset::Minimal),
            "standard" | "default" => Ok(Preset::Standard),
            "verbose" => Ok(Preset::Verbose),
            _ => Err(LogError::config(format!(
                "unknown zero-configuration preset: {}",
                s
            ))),
        }
    }
}

/// 配置文档：顶层的每个表都是一个命名配置节
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LogConfig {
    sections: Vec<ConfigSection>,
}

impl LogConfig {
    pub fn new(sections: Vec<ConfigSection>) -> Self {
        Self { sections }
    }

    pub fn section(&self, name: &str) -> Option<&ConfigSection> {
        self.sections.iter().find(|s| s.name() == name)
    }

    /// 保留的默认配置节
    pub fn default_section(&self) -> Result<&ConfigSection> {
        self.section(DEFAULT_SECTION_NAME).ok_or_else(|| {
            LogError::config(format!(
                "configuration has no '{}' section",
                DEFAULT_SECTION_NAME
            ))
        })
    }

    pub fn sections(&self) -> impl Iterator<Item = &ConfigSection> {
        self.sections.iter()
    }

    fn from_root(root: ConfigSection) -> Result<Self> {
        if let Some(key) = root.attribute_keys().next() {
            return Err(LogError::config(format!(
                "top-level attribute '{}' is not inside a section",
                key
            )));
        }
        Ok(Self {
            sections: root.children,
        })
    }
}

/// 用于从文件加载 `LogConfig` 的辅助函数。扩展名为 `.json` 时按 JSON 解析，其余按 TOML。
pub fn load_config_from_file(path: &std::path::Path) -> Result<LogConfig> {
    use std::fs;

    if !path.exists() {
        return Err(LogError::ConfigFileMissing(
            path.to_string_lossy().into_owned(),
        ));
    }

    let config_str = fs::read_to_string(path)
        .map_err(|e| LogError::config(format!("cannot read {}: {}", path.display(), e)))?;
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        load_config_from_json_str(&config_str)
    } else {
        load_config_from_str(&config_str)
    }
}

/// 用于从 TOML 字符串加载 `LogConfig` 的辅助函数。
pub fn load_config_from_str(config_str: &str) -> Result<LogConfig> {
    let table: toml::Table = toml::from_str(config_str)
        .map_err(|e| LogError::config(format!("TOML解析失败: {}", e)))?;
    LogConfig::from_root(ConfigSection::from_toml_table("", &table)?)
}

/// 用于从 JSON 字符串加载 `LogConfig` 的辅助函数。
pub fn load_config_from_json_str(config_str: &str) -> Result<LogConfig> {
    let value: serde_json::Value = serde_json::from_str(config_str)
        .map_err(|e| LogError::config(format!("JSON解析失败: {}", e)))?;
    match value {
        serde_json::Value::Object(object) => {
            LogConfig::from_root(ConfigSection::from_json_object("", &object)?)
        }
        _ => Err(LogError::config("JSON configuration root must be an object")),
    }
}
