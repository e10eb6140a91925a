use crate::variable::NameValue;
use serde::Deserialize;
use std::path::PathBuf;

/// 默认 HTTP 超时（秒）
pub const DEFAULT_REQUEST_TIMEOUT: u64 = 30;

/// 应用于所有请求的全局配置（resat.toml）
///
/// ```toml
/// host = "api.example.com"
/// base_url = "/api/acct/71/"
/// use_ssl = true
/// username = "user@example.com"
/// password = "secret"
///
/// [[headers]]
/// name = "X-API-VERSION"
/// value = "1.0"
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub base_url: Option<String>,
    pub use_ssl: Option<bool>,
    pub username: Option<String>,
    pub password: Option<String>,

    #[serde(default)]
    pub headers: Vec<NameValue>,
    #[serde(default)]
    pub params: Vec<NameValue>,
    #[serde(default)]
    pub variables: Vec<NameValue>,

    /// 运行前读入的变量文件
    pub input: Option<PathBuf>,
    /// 运行结束写出被标记保存的变量
    pub output: Option<PathBuf>,

    pub failonerror: Option<bool>,
    /// 单个请求的超时（秒）
    pub request_timeout: Option<u64>,
}

impl Config {
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or("")
    }

    pub fn use_ssl(&self) -> bool {
        self.use_ssl.unwrap_or(false)
    }

    pub fn fail_on_error(&self) -> bool {
        self.failonerror.unwrap_or(false)
    }

    pub fn request_timeout(&self) -> u64 {
        self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT)
    }

    /// 在当前配置上叠加 `overlay`
    ///
    /// 标量字段以 overlay 为准；列表中同名条目被替换，新名称追加在后面。
    pub fn merge(mut self, overlay: Config) -> Config {
        macro_rules! take {
            ($($field:ident),*) => {
                $(if overlay.$field.is_some() { self.$field = overlay.$field; })*
            };
        }
        take!(
            host,
            port,
            base_url,
            use_ssl,
            username,
            password,
            input,
            output,
            failonerror,
            request_timeout
        );

        merge_named(&mut self.headers, overlay.headers);
        merge_named(&mut self.params, overlay.params);
        merge_named(&mut self.variables, overlay.variables);
        self
    }

    /// 设置（或替换）一个全局变量
    pub fn define(&mut self, name: impl Into<String>, value: impl Into<String>) {
        merge_named(&mut self.variables, vec![NameValue::new(name, value)]);
    }
}

fn merge_named(base: &mut Vec<NameValue>, overlay: Vec<NameValue>) {
    for entry in overlay {
        match base.iter_mut().find(|e| e.name == entry.name) {
            Some(existing) => existing.value = entry.value,
            None => base.push(entry),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.base_url(), "");
        assert!(!config.use_ssl());
        assert!(!config.fail_on_error());
        assert_eq!(config.request_timeout(), DEFAULT_REQUEST_TIMEOUT);
    }

    #[test]
    fn test_parse_toml() {
        let config: Config = toml::from_str(
            r#"
host = "localhost"
port = 3000
base_url = "/api/"

[[headers]]
name = "X-API-VERSION"
value = "1.0"

[[variables]]
name = "account"
value = "71"
"#,
        )
        .unwrap();

        assert_eq!(config.host.as_deref(), Some("localhost"));
        assert_eq!(config.port, Some(3000));
        assert_eq!(config.headers, vec![NameValue::new("X-API-VERSION", "1.0")]);
        assert_eq!(config.variables[0].value, "71");
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: std::result::Result<Config, _> = toml::from_str("hots = \"typo\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_merge_overlay() {
        let base = Config {
            host: Some("base.example.com".into()),
            port: Some(80),
            headers: vec![
                NameValue::new("Accept", "application/xml"),
                NameValue::new("X-Version", "1"),
            ],
            ..Default::default()
        };
        let overlay = Config {
            host: Some("override.example.com".into()),
            headers: vec![
                NameValue::new("X-Version", "2"),
                NameValue::new("X-Extra", "yes"),
            ],
            ..Default::default()
        };

        let merged = base.merge(overlay);
        assert_eq!(merged.host.as_deref(), Some("override.example.com"));
        assert_eq!(merged.port, Some(80));
        assert_eq!(
            merged.headers,
            vec![
                NameValue::new("Accept", "application/xml"),
                NameValue::new("X-Version", "2"),
                NameValue::new("X-Extra", "yes"),
            ]
        );
    }

    #[test]
    fn test_define_replaces() {
        let mut config = Config::default();
        config.define("a", "1");
        config.define("a", "2");
        assert_eq!(config.variables, vec![NameValue::new("a", "2")]);
    }
}
