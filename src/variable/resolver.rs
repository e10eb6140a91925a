use crate::variable::store::VariableStore;
use crate::variable::types::{NameValue, Value};
use regex::{Captures, Regex};
use std::sync::OnceLock;

/// 替换文本中的所有 $NAME 占位符
///
/// 单次扫描：替换进来的文本不会再被展开。未知变量保持原样。
pub fn substitute_str(text: &str, store: &VariableStore) -> String {
    static VAR_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = VAR_REGEX.get_or_init(|| Regex::new(r"\$([A-Za-z0-9_]+)").unwrap());

    if !text.contains('$') {
        return text.to_string();
    }

    re.replace_all(text, |caps: &Captures| {
        store.get(&caps[1]).unwrap_or(&caps[0]).to_string()
    })
    .into_owned()
}

/// 原地变量替换，递归进入容器
pub trait Substitute {
    fn substitute(&mut self, store: &VariableStore);
}

impl Substitute for String {
    fn substitute(&mut self, store: &VariableStore) {
        if self.contains('$') {
            *self = substitute_str(self, store);
        }
    }
}

impl<T: Substitute> Substitute for Option<T> {
    fn substitute(&mut self, store: &VariableStore) {
        if let Some(inner) = self {
            inner.substitute(store);
        }
    }
}

impl<T: Substitute> Substitute for Vec<T> {
    fn substitute(&mut self, store: &VariableStore) {
        for item in self.iter_mut() {
            item.substitute(store);
        }
    }
}

impl Substitute for NameValue {
    fn substitute(&mut self, store: &VariableStore) {
        self.value.substitute(store);
    }
}

impl Substitute for Value {
    fn substitute(&mut self, store: &VariableStore) {
        match self {
            Value::String(s) => s.substitute(store),
            Value::Sequence(items) => items.substitute(store),
            Value::Mapping(map) => {
                for value in map.values_mut() {
                    value.substitute(store);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn store() -> VariableStore {
        let mut store = VariableStore::new();
        store.set("FOO", "bar");
        store.set("host", "api.example.com");
        store
    }

    #[test]
    fn test_substitute_known_and_unknown() {
        let output = substitute_str("x=$FOO;y=$BAZ", &store());
        assert_eq!(output, "x=bar;y=$BAZ");
    }

    #[test]
    fn test_substitute_without_tokens_is_unchanged() {
        let input = "no tokens here, just 100% text";
        assert_eq!(substitute_str(input, &store()), input);
        assert_eq!(substitute_str("", &store()), "");
        assert_eq!(substitute_str("cost: $", &store()), "cost: $");
    }

    #[test]
    fn test_substitute_is_single_pass() {
        let mut store = VariableStore::new();
        store.set("A", "$B");
        store.set("B", "never");
        assert_eq!(substitute_str("$A", &store), "$B");
    }

    #[test]
    fn test_longest_name_wins() {
        let mut store = VariableStore::new();
        store.set("ID", "short");
        store.set("ID_LONG", "long");
        assert_eq!(substitute_str("$ID_LONG/$ID", &store), "long/short");
    }

    #[test]
    fn test_substitute_nested_value() {
        let mut map = BTreeMap::new();
        map.insert("url".to_string(), Value::from("https://$host/v1"));
        map.insert(
            "list".to_string(),
            Value::Sequence(vec!["$FOO".into(), "$MISSING".into()]),
        );
        let mut value = Value::Mapping(map);
        value.substitute(&store());

        let Value::Mapping(map) = value else {
            panic!("mapping expected");
        };
        assert_eq!(map["url"].as_str(), Some("https://api.example.com/v1"));
        assert_eq!(
            map["list"],
            Value::Sequence(vec!["bar".into(), "$MISSING".into()])
        );
    }

    #[test]
    fn test_substitute_name_values() {
        let mut headers = vec![
            NameValue::new("X-Token", "$FOO"),
            NameValue::new("$FOO", "plain"),
        ];
        headers.substitute(&store());
        assert_eq!(headers[0].value, "bar");
        // 只替换 value
        assert_eq!(headers[1].name, "$FOO");
    }
}
