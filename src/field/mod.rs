//! 从响应的 header 或 body 中读取字段

pub mod json;
pub mod xml;

use crate::http::Response;
use serde::Deserialize;
use std::fmt;

/// 字段来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    Header,
    #[default]
    Body,
}

impl Target {
    pub fn as_str(&self) -> &'static str {
        match self {
            Target::Header => "header",
            Target::Body => "body",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 解析后的响应体
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(serde_json::Value),
    Xml(xml::XmlElement),
    Unparsed,
}

impl ResponseBody {
    /// JSON 优先，失败后尝试 XML；解析错误从不向外抛出
    pub fn parse(raw: &str) -> Self {
        if let Ok(value) = serde_json::from_str(raw) {
            return ResponseBody::Json(value);
        }
        match xml::parse(raw) {
            Some(root) => ResponseBody::Xml(root),
            None => ResponseBody::Unparsed,
        }
    }

    pub fn field(&self, path: &str) -> Option<String> {
        match self {
            ResponseBody::Json(value) => json::lookup(value, path).map(json::to_text),
            ResponseBody::Xml(root) => xml::lookup(root, path).map(|m| m.text()),
            ResponseBody::Unparsed => None,
        }
    }
}

impl Response {
    /// header 查找大小写不敏感；同名多值以 ", " 连接
    fn header_field(&self, name: &str) -> Option<String> {
        let values: Vec<String> = self
            .headers
            .get_all(name)
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .collect();
        (!values.is_empty()).then(|| values.join(", "))
    }

    /// 读取字段值。`name` 为空时返回原始 body。
    pub fn get_field(&self, name: Option<&str>, target: Target) -> Option<String> {
        let name = match name {
            Some(n) if !n.is_empty() => n,
            _ => return Some(self.body.clone()),
        };
        match target {
            Target::Header => self.header_field(name),
            Target::Body => self.parsed_body().field(name),
        }
    }

    pub fn has_field(&self, name: Option<&str>, target: Target) -> bool {
        self.get_field(name, target).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderMap;
    use std::time::Duration;

    fn response(body: &str) -> Response {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", "application/json".parse().unwrap());
        headers.append("set-cookie", "a=1".parse().unwrap());
        headers.append("set-cookie", "b=2".parse().unwrap());
        Response::new(200, headers, body.to_string(), Duration::from_millis(5)).unwrap()
    }

    #[test]
    fn test_parse_prefers_json() {
        assert!(matches!(
            ResponseBody::parse(r#"{"a": 1}"#),
            ResponseBody::Json(_)
        ));
        assert!(matches!(
            ResponseBody::parse("<a>1</a>"),
            ResponseBody::Xml(_)
        ));
        assert_eq!(ResponseBody::parse("<a>"), ResponseBody::Unparsed);
    }

    #[test]
    fn test_header_lookup_case_insensitive() {
        let resp = response("{}");
        assert_eq!(
            resp.get_field(Some("Content-Type"), Target::Header).as_deref(),
            Some("application/json")
        );
        assert_eq!(
            resp.get_field(Some("Set-Cookie"), Target::Header).as_deref(),
            Some("a=1, b=2")
        );
        assert!(!resp.has_field(Some("X-Missing"), Target::Header));
        // 非法 header 名称视为不存在
        assert!(!resp.has_field(Some("bad name"), Target::Header));
    }

    #[test]
    fn test_empty_name_returns_raw_body() {
        let resp = response("raw payload");
        assert_eq!(
            resp.get_field(None, Target::Header).as_deref(),
            Some("raw payload")
        );
        assert_eq!(
            resp.get_field(Some(""), Target::Body).as_deref(),
            Some("raw payload")
        );
    }

    #[test]
    fn test_body_fields() {
        let resp = response(r#"{"server": {"id": 42, "ips": ["10.0.0.1"]}}"#);
        assert_eq!(
            resp.get_field(Some("server/id"), Target::Body).as_deref(),
            Some("42")
        );
        assert_eq!(
            resp.get_field(Some("server/ips/0"), Target::Body).as_deref(),
            Some("10.0.0.1")
        );
        assert!(!resp.has_field(Some("server/name"), Target::Body));
    }

    #[test]
    fn test_xml_body_fields() {
        let resp = response("<server><state>operational</state></server>");
        assert_eq!(
            resp.get_field(Some("server/state"), Target::Body).as_deref(),
            Some("operational")
        );
    }

    #[test]
    fn test_malformed_body_is_field_not_found() {
        let resp = response("<server><state>broken</server>");
        assert!(!resp.has_field(Some("server/state"), Target::Body));
        assert_eq!(resp.parsed_body(), &ResponseBody::Unparsed);
    }
}
