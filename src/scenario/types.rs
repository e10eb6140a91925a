use crate::field::Target;
use crate::http::Method;
use crate::variable::NameValue;
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

/// 场景文档（YAML）
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    pub name: String,

    /// 为 true 时整个场景被跳过（作为 include 时仍然有效）
    #[serde(default)]
    pub ignore: bool,

    /// 场景专用的配置覆盖文件，相对于场景文件所在目录
    #[serde(default)]
    pub config: Option<PathBuf>,

    #[serde(default)]
    pub includes: Vec<String>,

    #[serde(default)]
    pub steps: Vec<Step>,
}

/// 一个声明步骤；展开顺序为 request、filters、handlers、guards
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Step {
    #[serde(default)]
    pub request: Option<ApiRequest>,
    #[serde(default)]
    pub filters: Vec<Filter>,
    #[serde(default)]
    pub handlers: Vec<HandlerRef>,
    #[serde(default)]
    pub guards: Vec<Guard>,
}

/// 标准 REST 操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Index,
    Show,
    Create,
    Update,
    Destroy,
}

impl Operation {
    pub fn method(&self) -> Method {
        match self {
            Operation::Index | Operation::Show => Method::Get,
            Operation::Create => Method::Post,
            Operation::Update => Method::Put,
            Operation::Destroy => Method::Delete,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CustomOperation {
    pub name: String,
    #[serde(default, rename = "type")]
    pub method: Option<Method>,
    #[serde(default = "default_separator")]
    pub separator: String,
}

fn default_separator() -> String {
    "/".to_string()
}

/// YAML 中既可以写数字也可以写字符串的标量
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Int(i64),
    Text(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(n) => write!(f, "{}", n),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

/// 请求描述
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiRequest {
    #[serde(default)]
    pub operation: Option<Operation>,
    #[serde(default)]
    pub custom: Option<CustomOperation>,
    /// 显式 HTTP 方法，`operation` 和 `custom.type` 都缺失时使用
    #[serde(default, rename = "type")]
    pub method: Option<Method>,

    pub resource: String,
    #[serde(default)]
    pub id: Option<Scalar>,
    #[serde(default = "default_format")]
    pub format: Option<String>,

    #[serde(default)]
    pub headers: Vec<NameValue>,
    #[serde(default)]
    pub params: Vec<NameValue>,
    #[serde(default)]
    pub valid_codes: Option<Vec<u16>>,
    /// 秒数或 "A..B" 区间
    #[serde(default)]
    pub delay: Option<Scalar>,

    // 覆盖全局配置
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<Scalar>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub use_ssl: Option<bool>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// 替换整个计算出的路径
    #[serde(default)]
    pub path: Option<String>,
}

fn default_format() -> Option<String> {
    Some("xml".to_string())
}

/// 轮询条件
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Guard {
    pub name: String,
    pub field: String,
    #[serde(default)]
    pub target: Target,
    pub pattern: String,
    /// 轮询间隔（秒）
    #[serde(default = "default_period")]
    pub period: u64,
    /// 最长等待（秒）
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

fn default_period() -> u64 {
    5
}

fn default_timeout() -> u64 {
    120
}

/// 响应断言与变量提取
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Filter {
    pub name: String,
    #[serde(default)]
    pub target: Target,
    #[serde(default)]
    pub is_empty: bool,
    #[serde(default)]
    pub required_fields: Vec<String>,
    #[serde(default)]
    pub validators: Vec<Validator>,
    #[serde(default)]
    pub extractors: Vec<Extractor>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Validator {
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub is_empty: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Extractor {
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub pattern: Option<String>,
    pub variable: String,
    #[serde(default)]
    pub save: bool,
    #[serde(default)]
    pub export: bool,
}

/// 外部处理模块的引用
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HandlerRef {
    pub name: String,
    pub module: String,
}

/// 展开后的执行单元
#[derive(Debug, Clone, PartialEq)]
pub enum StepUnit {
    Request(ApiRequest),
    Filter(Filter),
    Handler(HandlerRef),
    Guard(Guard),
}

impl StepUnit {
    pub fn kind(&self) -> &'static str {
        match self {
            StepUnit::Request(_) => "request",
            StepUnit::Filter(_) => "filter",
            StepUnit::Handler(_) => "handler",
            StepUnit::Guard(_) => "guard",
        }
    }
}

/// 带来源文件的展开条目
#[derive(Debug, Clone, PartialEq)]
pub struct FlatStep {
    pub unit: StepUnit,
    pub origin: PathBuf,
}

/// 加载完成、可执行的场景
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedScenario {
    pub name: String,
    pub path: PathBuf,
    pub ignore: bool,
    /// 已解析为绝对或相对于工作目录的路径
    pub config: Option<PathBuf>,
    pub steps: Vec<FlatStep>,
}
