use crate::config::Config;
use crate::http::{Method, Request, Scheme};
use crate::request::delay::Delay;
use crate::scenario::ApiRequest;
use crate::variable::{NameValue, VariableStore};

/// 未指定 `valid_codes` 时接受的状态码
pub const DEFAULT_VALID_CODES: [u16; 7] = [200, 201, 202, 203, 204, 205, 206];

/// 准备好的请求，加上判定响应所需的信息
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub request: Request,
    pub valid_codes: Vec<u16>,
    pub delay: Option<Delay>,
}

impl PreparedRequest {
    pub fn accepts(&self, code: u16) -> bool {
        self.valid_codes.contains(&code)
    }
}

/// 根据请求描述、变量和全局配置构造请求
///
/// 返回的 `Err` 是准备失败的描述，只影响这一个请求。
pub fn prepare(
    descriptor: &ApiRequest,
    store: &VariableStore,
    config: &Config,
) -> Result<PreparedRequest, String> {
    let resource = store.substitute_str(&descriptor.resource);

    // 1. 合并全局 headers/params，场景中声明的同名条目优先
    let mut headers = descriptor.headers.clone();
    for global in &config.headers {
        if !headers.iter().any(|h| h.name.eq_ignore_ascii_case(&global.name)) {
            headers.push(global.clone());
        }
    }
    let mut params = descriptor.params.clone();
    for global in &config.params {
        if !params.iter().any(|p| p.name == global.name) {
            params.push(global.clone());
        }
    }

    // 2. 变量替换
    store.substitute(&mut headers);
    store.substitute(&mut params);
    let id = descriptor.id.as_ref().map(|id| store.substitute_str(&id.to_string()));
    let host = descriptor
        .host
        .as_deref()
        .or(config.host.as_deref())
        .map(|h| store.substitute_str(h))
        .filter(|h| !h.is_empty())
        .ok_or_else(|| format!("No host configured for request on '{}'.", resource))?;
    let username = resolve_credential(descriptor.username.as_deref(), config.username.as_deref(), store);
    let password = resolve_credential(descriptor.password.as_deref(), config.password.as_deref(), store);
    let base_url = store.substitute_str(descriptor.base_url.as_deref().unwrap_or(config.base_url()));

    // 3. URI
    let scheme = Scheme::from_ssl(descriptor.use_ssl.unwrap_or(config.use_ssl()));
    let port = match descriptor.port.as_ref() {
        Some(port) => Some(store.substitute_str(&port.to_string())),
        None => config.port.map(|p| p.to_string()),
    };
    let port = match port {
        Some(raw) => raw.trim().parse::<u16>().map_err(|_| {
            format!("Invalid port '{}' for request on '{}'.", raw, resource)
        })?,
        None => scheme.default_port(),
    };

    let path = match descriptor.path.as_deref() {
        Some(path) => normalize_path(&store.substitute_str(path)),
        None => resource_path(descriptor, &base_url, &resource, id.as_deref()),
    };
    let url = format!("{}://{}:{}{}", scheme.as_str(), host, port, path);

    // 4. HTTP 方法
    let method = resolve_method(descriptor)
        .ok_or_else(|| format!("Missing request operation for request on '{}'.", resource))?;

    let mut request =
        Request::new(method, &url).map_err(|e| format!("Invalid URL '{}': {}", url, e))?;

    // 5. 用户名和密码都非空时才使用 basic auth
    if let (Some(username), Some(password)) = (username, password) {
        request = request.with_basic_auth(&username, &password);
    }

    // 6. headers 与 form body
    for NameValue { name, value } in &headers {
        request = request.with_header(name, value).map_err(|e| e.to_string())?;
    }
    if !params.is_empty() {
        request = request
            .with_form(params.iter().map(|p| (p.name.as_str(), p.value.as_str())))
            .map_err(|e| e.to_string())?;
    }

    // 7. 可接受的状态码
    let valid_codes = descriptor
        .valid_codes
        .clone()
        .unwrap_or_else(|| DEFAULT_VALID_CODES.to_vec());

    let delay = match descriptor.delay.as_ref() {
        Some(raw) => {
            let raw = store.substitute_str(&raw.to_string());
            Some(Delay::parse(&raw).ok_or_else(|| {
                format!("Invalid delay '{}' for request on '{}'.", raw, resource)
            })?)
        }
        None => None,
    };

    Ok(PreparedRequest {
        request,
        valid_codes,
        delay,
    })
}

/// `operation` 优先，其次 `custom.type`，最后显式的 `type`
pub fn resolve_method(descriptor: &ApiRequest) -> Option<Method> {
    descriptor
        .operation
        .map(|op| op.method())
        .or_else(|| descriptor.custom.as_ref().and_then(|c| c.method))
        .or(descriptor.method)
}

fn resolve_credential(
    local: Option<&str>,
    global: Option<&str>,
    store: &VariableStore,
) -> Option<String> {
    local
        .or(global)
        .map(|value| store.substitute_str(value))
        .filter(|value| !value.is_empty())
}

/// base + resource [+ /id] [+ .format] [+ separator + custom name]
fn resource_path(
    descriptor: &ApiRequest,
    base_url: &str,
    resource: &str,
    id: Option<&str>,
) -> String {
    let mut path = format!("{}/{}", base_url, resource);
    if let Some(id) = id {
        path.push('/');
        path.push_str(id);
    }
    match &descriptor.custom {
        Some(custom) => {
            path.push_str(&custom.separator);
            path.push_str(&custom.name);
        }
        None => {
            if let Some(format) = descriptor.format.as_deref().filter(|f| !f.is_empty()) {
                path.push('.');
                path.push_str(format);
            }
        }
    }
    normalize_path(&path)
}

/// 合并重复的 `/`，并保证以 `/` 开头
pub fn normalize_path(path: &str) -> String {
    let mut normalized = String::with_capacity(path.len() + 1);
    if !path.starts_with('/') {
        normalized.push('/');
    }
    for c in path.chars() {
        if c == '/' && normalized.ends_with('/') {
            continue;
        }
        normalized.push(c);
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::{CustomOperation, Operation, Scalar};
    use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};

    fn config() -> Config {
        Config {
            host: Some("api.example.com".into()),
            base_url: Some("/api/acct/$account/".into()),
            headers: vec![
                NameValue::new("X-API-VERSION", "1.0"),
                NameValue::new("Accept", "application/xml"),
            ],
            ..Default::default()
        }
    }

    fn store() -> VariableStore {
        let mut store = VariableStore::new();
        store.set("account", "71");
        store.set("server_id", "42");
        store
    }

    fn descriptor(operation: Option<Operation>) -> ApiRequest {
        ApiRequest {
            operation,
            resource: "servers".into(),
            format: Some("xml".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_index_url_and_method() {
        let prepared = prepare(&descriptor(Some(Operation::Index)), &store(), &config()).unwrap();
        assert_eq!(prepared.request.method, Method::Get);
        assert_eq!(
            prepared.request.url.as_str(),
            "http://api.example.com/api/acct/71/servers.xml"
        );
        assert_eq!(prepared.valid_codes, DEFAULT_VALID_CODES.to_vec());
    }

    #[test]
    fn test_show_with_id_and_port() {
        let mut desc = descriptor(Some(Operation::Show));
        desc.id = Some(Scalar::Text("$server_id".into()));
        let mut cfg = config();
        cfg.port = Some(8080);

        let prepared = prepare(&desc, &store(), &cfg).unwrap();
        assert_eq!(
            prepared.request.url.as_str(),
            "http://api.example.com:8080/api/acct/71/servers/42.xml"
        );
    }

    #[test]
    fn test_custom_operation_path_and_method() {
        let mut desc = descriptor(None);
        desc.id = Some(Scalar::Int(7));
        desc.custom = Some(CustomOperation {
            name: "launch".into(),
            method: Some(Method::Post),
            separator: ";".into(),
        });

        let prepared = prepare(&desc, &store(), &config()).unwrap();
        assert_eq!(prepared.request.method, Method::Post);
        assert_eq!(
            prepared.request.url.as_str(),
            "http://api.example.com/api/acct/71/servers/7;launch"
        );
    }

    #[test]
    fn test_missing_method_is_preparation_failure() {
        let err = prepare(&descriptor(None), &store(), &config()).unwrap_err();
        assert!(err.contains("servers"));
        assert!(err.contains("Missing request operation"));
    }

    #[test]
    fn test_explicit_type_used_last() {
        let mut desc = descriptor(None);
        desc.method = Some(Method::Delete);
        assert_eq!(resolve_method(&desc), Some(Method::Delete));
        desc.operation = Some(Operation::Create);
        assert_eq!(resolve_method(&desc), Some(Method::Post));
    }

    #[test]
    fn test_local_headers_win_over_global() {
        let mut desc = descriptor(Some(Operation::Index));
        desc.headers = vec![NameValue::new("accept", "application/json")];

        let prepared = prepare(&desc, &store(), &config()).unwrap();
        let headers = &prepared.request.headers;
        assert_eq!(headers.get("accept").unwrap(), "application/json");
        assert_eq!(headers.get("x-api-version").unwrap(), "1.0");
        assert_eq!(headers.get_all("accept").iter().count(), 1);
    }

    #[test]
    fn test_params_become_form_body() {
        let mut desc = descriptor(Some(Operation::Create));
        desc.params = vec![NameValue::new("server[name]", "box-$server_id")];
        let mut cfg = config();
        cfg.params = vec![
            NameValue::new("server[name]", "ignored"),
            NameValue::new("api_version", "1.0"),
        ];

        let prepared = prepare(&desc, &store(), &cfg).unwrap();
        assert_eq!(
            prepared.request.body.as_deref(),
            Some("server%5Bname%5D=box-42&api_version=1.0")
        );
        assert!(prepared.request.headers.contains_key(CONTENT_TYPE));
    }

    #[test]
    fn test_basic_auth_requires_both_credentials() {
        let mut cfg = config();
        cfg.username = Some("user".into());
        cfg.password = Some("$missing_but_literal".into());
        let prepared = prepare(&descriptor(Some(Operation::Index)), &store(), &cfg).unwrap();
        assert!(prepared.request.basic_auth.is_some());

        cfg.password = Some(String::new());
        let prepared = prepare(&descriptor(Some(Operation::Index)), &store(), &cfg).unwrap();
        assert!(prepared.request.basic_auth.is_none());
        assert!(!prepared.request.headers.contains_key(AUTHORIZATION));
    }

    #[test]
    fn test_ssl_override_and_path_override() {
        let mut desc = descriptor(Some(Operation::Index));
        desc.use_ssl = Some(true);
        desc.path = Some("//status/$account".into());

        let prepared = prepare(&desc, &store(), &config()).unwrap();
        assert_eq!(prepared.request.url.as_str(), "https://api.example.com/status/71");
    }

    #[test]
    fn test_valid_codes_and_delay() {
        let mut desc = descriptor(Some(Operation::Destroy));
        desc.valid_codes = Some(vec![404]);
        desc.delay = Some(Scalar::Text("1..3".into()));

        let prepared = prepare(&desc, &store(), &config()).unwrap();
        assert!(prepared.accepts(404));
        assert!(!prepared.accepts(200));
        assert_eq!(prepared.delay, Some(Delay::Range(1, 3)));

        desc.delay = Some(Scalar::Text("later".into()));
        assert!(prepare(&desc, &store(), &config()).is_err());
    }

    #[test]
    fn test_missing_host_and_bad_port() {
        let desc = descriptor(Some(Operation::Index));
        let err = prepare(&desc, &store(), &Config::default()).unwrap_err();
        assert!(err.contains("No host"));

        let mut desc = descriptor(Some(Operation::Index));
        desc.port = Some(Scalar::Text("$nope".into()));
        let err = prepare(&desc, &store(), &config()).unwrap_err();
        assert!(err.contains("Invalid port"));
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("//a///b/"), "/a/b/");
        assert_eq!(normalize_path("a/b"), "/a/b");
        assert_eq!(normalize_path(""), "/");
    }
}
