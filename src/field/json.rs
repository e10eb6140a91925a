use serde_json::Value;

/// 按 `/` 分隔的路径定位 JSON 节点
///
/// 对象按 key 索引，数组按从 0 开始的整数索引。空段被忽略，所以 `/a//b` 与 `a/b` 等价。
pub fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .try_fold(root, |node, segment| match node {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
}

/// 节点的文本形式：字符串原样，标量转字符串，容器序列化为 JSON
pub fn to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}
