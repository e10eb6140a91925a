use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `{name, value}` 对：用于 headers/params、全局变量以及持久化变量文件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameValue {
    pub name: String,
    pub value: String,
}

impl NameValue {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// 可做变量替换的嵌套值
///
/// 只有字符串会被改写；Mapping 的 key 保持不变。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    String(String),
    Sequence(Vec<Value>),
    Mapping(BTreeMap<String, Value>),
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_from_yaml() {
        let yaml = r#"
- plain
- nested: [a, b]
"#;
        let value: Value = serde_yaml::from_str(yaml).unwrap();
        let items = match value {
            Value::Sequence(items) => items,
            other => panic!("expected sequence, got {:?}", other),
        };
        assert_eq!(items[0].as_str(), Some("plain"));
        match &items[1] {
            Value::Mapping(map) => assert_eq!(
                map["nested"],
                Value::Sequence(vec!["a".into(), "b".into()])
            ),
            other => panic!("expected mapping, got {:?}", other),
        }
    }
}
