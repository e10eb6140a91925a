use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResatError {
    #[error("配置错误: {0}")]
    ConfigError(String),

    #[error(transparent)]
    ParseError(#[from] ParseError),

    #[error("HTTP 请求失败: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO 错误: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON 解析错误: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("YAML 解析错误: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("TOML 解析错误: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("URL 解析错误: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for ResatError {
    fn from(err: anyhow::Error) -> Self {
        ResatError::Other(err.to_string())
    }
}

/// 场景文档的结构性错误（文件被跳过，不计入运行失败）
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{}: {message}", path.display())]
pub struct ParseError {
    pub path: PathBuf,
    pub message: String,
}

impl ParseError {
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result type for resat crate
pub type Result<T> = std::result::Result<T, ResatError>;
