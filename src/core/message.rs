//! 消息模板与命名消息
//!
//! 模板使用复合格式占位符 `{index[,alignment][:format]}`，`{{` 与 `}}` 为转义的花括号。
//! 命名消息是在日志器构造时由配置创建的不可变模板，之后只能按名称调用。

use crate::config::ConfigSection;
use crate::core::level::Level;
use crate::error::{LogError, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// 日志参数值
///
/// 参数类型是封闭的，这样格式说明符与参数类型不匹配时可以在格式化阶段报告错误。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LogArg {
    Str(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
}

impl LogArg {
    fn type_name(&self) -> &'static str {
        match self {
            LogArg::Str(_) => "string",
            LogArg::Int(_) => "integer",
            LogArg::UInt(_) => "unsigned integer",
            LogArg::Float(_) => "float",
            LogArg::Bool(_) => "bool",
        }
    }
}

impl fmt::Display for LogArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogArg::Str(s) => f.write_str(s),
            LogArg::Int(i) => write!(f, "{}", i),
            LogArg::UInt(u) => write!(f, "{}", u),
            LogArg::Float(v) => write!(f, "{}", v),
            LogArg::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for LogArg {
    fn from(value: &str) -> Self {
        LogArg::Str(value.to_string())
    }
}

impl From<String> for LogArg {
    fn from(value: String) -> Self {
        LogArg::Str(value)
    }
}

impl From<&String> for LogArg {
    fn from(value: &String) -> Self {
        LogArg::Str(value.clone())
    }
}

impl From<i32> for LogArg {
    fn from(value: i32) -> Self {
        LogArg::Int(value as i64)
    }
}

impl From<i64> for LogArg {
    fn from(value: i64) -> Self {
        LogArg::Int(value)
    }
}

impl From<u32> for LogArg {
    fn from(value: u32) -> Self {
        LogArg::UInt(value as u64)
    }
}

impl From<u64> for LogArg {
    fn from(value: u64) -> Self {
        LogArg::UInt(value)
    }
}

impl From<usize> for LogArg {
    fn from(value: usize) -> Self {
        LogArg::UInt(value as u64)
    }
}

impl From<f64> for LogArg {
    fn from(value: f64) -> Self {
        LogArg::Float(value)
    }
}

impl From<bool> for LogArg {
    fn from(value: bool) -> Self {
        LogArg::Bool(value)
    }
}

/// 模板中的一个片段
#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Literal(String),
    Placeholder(Placeholder),
}

#[derive(Debug, Clone, PartialEq)]
struct Placeholder {
    index: usize,
    alignment: Option<i32>,
    spec: Option<String>,
}

/// 对齐宽度与格式精度的上限（不含）
pub const MAX_FORMAT_WIDTH: usize = 10_000;

fn parse_template(template: &str) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = template.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        match c {
            '{' => {
                if matches!(chars.peek(), Some((_, '{'))) {
                    chars.next();
                    literal.push('{');
                    continue;
                }

                let mut body = String::new();
                loop {
                    match chars.next() {
                        Some((_, '}')) => break,
                        Some((_, '{')) | None => {
                            return Err(LogError::formatting(format!(
                                "unclosed placeholder starting at position {} in \"{}\"",
                                pos, template
                            )))
                        }
                        Some((_, ch)) => body.push(ch),
                    }
                }

                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Placeholder(parse_placeholder(&body, template)?));
            }
            '}' => {
                if matches!(chars.peek(), Some((_, '}'))) {
                    chars.next();
                    literal.push('}');
                } else {
                    return Err(LogError::formatting(format!(
                        "unmatched '}}' at position {} in \"{}\"",
                        pos, template
                    )));
                }
            }
            _ => literal.push(c),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

fn parse_placeholder(body: &str, template: &str) -> Result<Placeholder> {
    let (head, spec) = match body.split_once(':') {
        Some((head, spec)) => (head, Some(spec)),
        None => (body, None),
    };
    let (index, alignment) = match head.split_once(',') {
        Some((index, alignment)) => (index, Some(alignment)),
        None => (head, None),
    };

    let index = index.trim().parse::<usize>().map_err(|_| {
        LogError::formatting(format!(
            "invalid placeholder index \"{}\" in \"{}\"",
            index, template
        ))
    })?;
    let alignment = alignment
        .map(|a| {
            let value = a.trim().parse::<i32>().map_err(|_| {
                LogError::formatting(format!("invalid alignment \"{}\" in \"{}\"", a, template))
            })?;
            if value.unsigned_abs() as usize >= MAX_FORMAT_WIDTH {
                return Err(LogError::formatting(format!(
                    "alignment {} in \"{}\" exceeds the limit of {}",
                    value, template, MAX_FORMAT_WIDTH
                )));
            }
            Ok(value)
        })
        .transpose()?;

    Ok(Placeholder {
        index,
        alignment,
        spec: spec.filter(|s| !s.is_empty()).map(str::to_string),
    })
}

fn render_arg(arg: &LogArg, spec: Option<&str>) -> Result<String> {
    let Some(spec) = spec else {
        return Ok(arg.to_string());
    };

    let mut spec_chars = spec.chars();
    let kind = spec_chars.next().unwrap_or_default();
    let precision_str = spec_chars.as_str();
    let precision = if precision_str.is_empty() {
        None
    } else {
        let precision = precision_str.parse::<usize>().map_err(|_| {
            LogError::formatting(format!("invalid precision in format specifier \"{}\"", spec))
        })?;
        if precision >= MAX_FORMAT_WIDTH {
            return Err(LogError::formatting(format!(
                "precision in format specifier \"{}\" exceeds the limit of {}",
                spec, MAX_FORMAT_WIDTH
            )));
        }
        Some(precision)
    };

    let mismatch = || {
        LogError::formatting(format!(
            "format specifier \"{}\" cannot be applied to a {} argument",
            spec,
            arg.type_name()
        ))
    };

    match kind {
        'D' | 'd' => {
            let width = precision.unwrap_or(0);
            match arg {
                LogArg::Int(i) if *i < 0 => {
                    Ok(format!("-{:0>width$}", i.unsigned_abs(), width = width))
                }
                LogArg::Int(i) => Ok(format!("{:0>width$}", i, width = width)),
                LogArg::UInt(u) => Ok(format!("{:0>width$}", u, width = width)),
                _ => Err(mismatch()),
            }
        }
        'X' | 'x' => {
            let width = precision.unwrap_or(0);
            let hex = match arg {
                LogArg::Int(i) => format!("{:x}", i),
                LogArg::UInt(u) => format!("{:x}", u),
                _ => return Err(mismatch()),
            };
            let hex = format!("{:0>width$}", hex, width = width);
            Ok(if kind == 'X' { hex.to_uppercase() } else { hex })
        }
        'F' | 'f' => {
            let decimals = precision.unwrap_or(2);
            let value = match arg {
                LogArg::Int(i) => *i as f64,
                LogArg::UInt(u) => *u as f64,
                LogArg::Float(v) => *v,
                _ => return Err(mismatch()),
            };
            Ok(format!("{:.*}", decimals, value))
        }
        _ => Err(LogError::formatting(format!(
            "unknown format specifier \"{}\"",
            spec
        ))),
    }
}

fn align(text: String, alignment: Option<i32>) -> String {
    match alignment {
        Some(a) if a > 0 => format!("{:>width$}", text, width = a as usize),
        Some(a) if a < 0 => format!("{:<width$}", text, width = a.unsigned_abs() as usize),
        _ => text,
    }
}

/// 将参数按位置代入模板
///
/// 占位符索引超出参数个数、花括号不配对或格式说明符与参数类型不匹配时返回
/// `MessageFormattingError`。多余的参数会被忽略。
pub fn format_message(template: &str, args: &[LogArg]) -> Result<String> {
    let segments = parse_template(template)?;
    let mut output = String::with_capacity(template.len());

    for segment in segments {
        match segment {
            Segment::Literal(text) => output.push_str(&text),
            Segment::Placeholder(p) => {
                let arg = args.get(p.index).ok_or_else(|| {
                    LogError::formatting(format!(
                        "placeholder {{{}}} has no matching argument ({} supplied)",
                        p.index,
                        args.len()
                    ))
                })?;
                let rendered = render_arg(arg, p.spec.as_deref())?;
                output.push_str(&align(rendered, p.alignment));
            }
        }
    }

    Ok(output)
}

/// 返回模板中最大的占位符索引；没有占位符时返回 `None`
pub fn max_placeholder_index(template: &str) -> Result<Option<usize>> {
    Ok(parse_template(template)?
        .iter()
        .filter_map(|s| match s {
            Segment::Placeholder(p) => Some(p.index),
            Segment::Literal(_) => None,
        })
        .max())
}

/// 命名消息
///
/// 不可变的消息模板，由所属日志器独占。
#[derive(Debug, Clone, PartialEq)]
pub struct NamedMessage {
    name: String,
    text: String,
    parameter_names: Vec<String>,
    default_level: Level,
}

impl NamedMessage {
    /// 创建命名消息并校验模板
    ///
    /// 模板中的每个占位符都必须有对应的参数名。
    pub fn new(
        name: impl Into<String>,
        text: impl Into<String>,
        parameter_names: Vec<String>,
        default_level: Level,
    ) -> Result<Self> {
        let name = name.into();
        let text = text.into();

        if name.trim().is_empty() {
            return Err(LogError::argument("named message name must not be empty"));
        }
        if text.trim().is_empty() {
            return Err(LogError::argument(format!(
                "named message '{}' has an empty text",
                name
            )));
        }
        if parameter_names.iter().any(|p| p.trim().is_empty()) {
            return Err(LogError::argument(format!(
                "named message '{}' declares an empty parameter name",
                name
            )));
        }
        if let Some(max) = max_placeholder_index(&text)? {
            if max >= parameter_names.len() {
                return Err(LogError::argument(format!(
                    "named message '{}' uses placeholder {{{}}} but declares {} parameter(s)",
                    name,
                    max,
                    parameter_names.len()
                )));
            }
        }

        Ok(Self {
            name,
            text,
            parameter_names,
            default_level,
        })
    }

    /// 从配置节创建命名消息
    ///
    /// 节名即消息名（可用 `name` 属性覆盖）；`default_level` 缺省时使用 `fallback_level`。
    pub fn from_config(section: &ConfigSection, fallback_level: Level) -> Result<Self> {
        let name = section.attribute("name").unwrap_or(section.name());
        let text = section.required_attribute("text")?;
        let default_level = section.level_attribute("default_level", fallback_level)?;
        let parameter_names = section.list("parameters").unwrap_or_default();

        Self::new(name, text, parameter_names, default_level)
            .map_err(|e| e.into_config(&format!("invalid named message '{}'", name)))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn parameter_names(&self) -> &[String] {
        &self.parameter_names
    }

    pub fn default_level(&self) -> Level {
        self.default_level
    }

    /// 用参数渲染消息文本，语义与 `format_message(text, args)` 相同
    pub fn render(&self, args: &[LogArg]) -> Result<String> {
        format_message(&self.text, args)
    }
}

/// 命名消息注册表（名称 -> 消息），构造后不可变
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NamedMessages {
    messages: BTreeMap<String, NamedMessage>,
}

impl NamedMessages {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册一条消息；名称重复时返回配置错误
    pub fn insert(&mut self, message: NamedMessage) -> Result<()> {
        if self.messages.contains_key(message.name()) {
            return Err(LogError::config(format!(
                "duplicate named message '{}'",
                message.name()
            )));
        }
        self.messages.insert(message.name().to_string(), message);
        Ok(())
    }

    /// 从 `NamedMessages` 配置节构建注册表，每个子节是一条消息
    pub fn from_config(section: &ConfigSection, fallback_level: Level) -> Result<Self> {
        let mut messages = Self::new();
        for child in section.children() {
            messages.insert(NamedMessage::from_config(child, fallback_level)?)?;
        }
        Ok(messages)
    }

    pub fn get(&self, name: &str) -> Option<&NamedMessage> {
        self.messages.get(name)
    }

    /// 按标识符查找消息
    ///
    /// 空标识符返回 `ArgumentError`，未知标识符返回 `UnknownMessage`。
    pub fn lookup(&self, identifier: &str) -> Result<&NamedMessage> {
        if identifier.trim().is_empty() {
            return Err(LogError::argument("named message identifier must not be empty"));
        }
        self.messages
            .get(identifier)
            .ok_or_else(|| LogError::UnknownMessage(identifier.to_string()))
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NamedMessage> {
        self.messages.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: Vec<LogArg>) -> Vec<LogArg> {
        values
    }

    #[test]
    fn test_positional_substitution() {
        let text = format_message(
            "{0} started on port {1}",
            &args(vec!["api".into(), 8080.into()]),
        )
        .unwrap();
        assert_eq!(text, "api started on port 8080");
    }

    #[test]
    fn test_repeated_and_reordered_placeholders() {
        let text = format_message("{1}-{0}-{1}", &args(vec!["a".into(), "b".into()])).unwrap();
        assert_eq!(text, "b-a-b");
    }

    #[test]
    fn test_escaped_braces() {
        let text = format_message("{{literal}} {0}", &args(vec![1.into()])).unwrap();
        assert_eq!(text, "{literal} 1");
    }

    #[test]
    fn test_missing_argument_is_formatting_error() {
        let err = format_message("{0} and {1}", &args(vec!["only".into()])).unwrap_err();
        assert!(matches!(err, LogError::MessageFormattingError(_)));
    }

    #[test]
    fn test_extra_arguments_are_ignored() {
        let text = format_message("{0}", &args(vec!["a".into(), "b".into()])).unwrap();
        assert_eq!(text, "a");
    }

    #[test]
    fn test_unbalanced_braces() {
        assert!(matches!(
            format_message("oops {0", &[]),
            Err(LogError::MessageFormattingError(_))
        ));
        assert!(matches!(
            format_message("oops }", &[]),
            Err(LogError::MessageFormattingError(_))
        ));
        assert!(matches!(
            format_message("{name}", &[]),
            Err(LogError::MessageFormattingError(_))
        ));
    }

    #[test]
    fn test_format_specifiers() {
        let a = args(vec![42.into(), 255u32.into(), 3.14159.into(), (-7).into()]);
        assert_eq!(format_message("{0:D5}", &a).unwrap(), "00042");
        assert_eq!(format_message("{1:X}", &a).unwrap(), "FF");
        assert_eq!(format_message("{1:x4}", &a).unwrap(), "00ff");
        assert_eq!(format_message("{2:F2}", &a).unwrap(), "3.14");
        assert_eq!(format_message("{0:F1}", &a).unwrap(), "42.0");
        assert_eq!(format_message("{3:D3}", &a).unwrap(), "-007");
    }

    #[test]
    fn test_format_specifier_type_mismatch() {
        let err = format_message("{0:D}", &args(vec!["text".into()])).unwrap_err();
        assert!(matches!(err, LogError::MessageFormattingError(_)));
        assert!(err.to_string().contains("string"));

        let err = format_message("{0:X}", &args(vec![1.5.into()])).unwrap_err();
        assert!(matches!(err, LogError::MessageFormattingError(_)));

        let err = format_message("{0:Q}", &args(vec![1.into()])).unwrap_err();
        assert!(matches!(err, LogError::MessageFormattingError(_)));
    }

    #[test]
    fn test_alignment() {
        let a = args(vec!["ab".into()]);
        assert_eq!(format_message("[{0,5}]", &a).unwrap(), "[   ab]");
        assert_eq!(format_message("[{0,-5}]", &a).unwrap(), "[ab   ]");
    }

    #[test]
    fn test_oversized_widths_are_formatting_errors() {
        let a = args(vec![7.into()]);
        for template in ["{0,70000}", "{0,-70000}", "{0:D70000}", "{0:x70000}", "{0:F70000}"] {
            assert!(
                matches!(
                    format_message(template, &a),
                    Err(LogError::MessageFormattingError(_))
                ),
                "{} should be rejected",
                template
            );
        }

        // 上限以内仍然正常填充
        let limit = MAX_FORMAT_WIDTH - 1;
        let padded = format_message(&format!("{{0,{}}}", limit), &a).unwrap();
        assert_eq!(padded.len(), limit);
        let zeros = format_message(&format!("{{0:D{}}}", limit), &a).unwrap();
        assert_eq!(zeros.len(), limit);
        assert!(max_placeholder_index("{0,-70000}").is_err());
    }

    #[test]
    fn test_max_placeholder_index() {
        assert_eq!(max_placeholder_index("no placeholders").unwrap(), None);
        assert_eq!(max_placeholder_index("{2} {0}").unwrap(), Some(2));
    }

    #[test]
    fn test_named_message_validation() {
        let ok = NamedMessage::new(
            "startup",
            "{0} on {1}",
            vec!["service".into(), "port".into()],
            Level::Info,
        );
        assert!(ok.is_ok());

        assert!(NamedMessage::new("", "text", vec![], Level::Info).is_err());
        assert!(NamedMessage::new("empty", "  ", vec![], Level::Info).is_err());
        assert!(NamedMessage::new("blank_param", "{0}", vec![" ".into()], Level::Info).is_err());
        let err = NamedMessage::new("short", "{0} {1}", vec!["a".into()], Level::Info).unwrap_err();
        assert!(matches!(err, LogError::ArgumentError(_)));
    }

    #[test]
    fn test_named_message_render_matches_format_message() {
        let msg = NamedMessage::new(
            "disk",
            "disk {0} at {1:F1}%",
            vec!["mount".into(), "usage".into()],
            Level::Warn,
        )
        .unwrap();
        let a = args(vec!["/var".into(), 93.27.into()]);
        assert_eq!(msg.render(&a).unwrap(), format_message(msg.text(), &a).unwrap());
    }

    #[test]
    fn test_named_messages_from_config() {
        let section = ConfigSection::new("NamedMessages")
            .with_child(
                ConfigSection::new("startup")
                    .with_attribute("text", "{0} started")
                    .with_attribute("default_level", "INFO")
                    .with_list("parameters", ["service"]),
            )
            .with_child(ConfigSection::new("heartbeat").with_attribute("text", "alive"));

        let messages = NamedMessages::from_config(&section, Level::Debug).unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages.get("startup").unwrap().default_level(), Level::Info);
        assert_eq!(messages.get("heartbeat").unwrap().default_level(), Level::Debug);
        assert!(messages.get("heartbeat").unwrap().parameter_names().is_empty());
    }

    #[test]
    fn test_named_messages_duplicate_name_rejected() {
        let section = ConfigSection::new("NamedMessages")
            .with_child(ConfigSection::new("a").with_attribute("text", "one"))
            .with_child(
                ConfigSection::new("b")
                    .with_attribute("name", "a")
                    .with_attribute("text", "two"),
            );
        let err = NamedMessages::from_config(&section, Level::Debug).unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_invalid_named_message_config_is_config_error() {
        let section = ConfigSection::new("NamedMessages")
            .with_child(ConfigSection::new("bad").with_attribute("text", "{0}"));
        let err = NamedMessages::from_config(&section, Level::Debug).unwrap_err();
        assert!(matches!(err, LogError::ConfigError(_)));
    }

    #[test]
    fn test_blank_parameter_name_in_config_rejected() {
        for parameters in [vec!["user", ""], vec!["", "user"]] {
            let section = ConfigSection::new("NamedMessages").with_child(
                ConfigSection::new("login")
                    .with_attribute("text", "user {0}")
                    .with_list("parameters", parameters),
            );
            let err = NamedMessages::from_config(&section, Level::Debug).unwrap_err();
            assert!(matches!(err, LogError::ConfigError(_)));
        }

        let section = ConfigSection::new("NamedMessages").with_child(
            ConfigSection::new("login")
                .with_attribute("text", "user {0}")
                .with_attribute("parameters", "user,"),
        );
        assert!(NamedMessages::from_config(&section, Level::Debug).is_err());
    }

    #[test]
    fn test_lookup_errors() {
        let messages = NamedMessages::new();
        assert!(matches!(messages.lookup(""), Err(LogError::ArgumentError(_))));
        assert!(matches!(
            messages.lookup("missing"),
            Err(LogError::UnknownMessage(_))
        ));
    }
}
