use crate::http::Client;
use crate::request::ActiveRequest;
use crate::scenario::Guard;
use crate::variable::VariableStore;
use regex::Regex;
use std::thread;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Waiting,
    Matched,
    TimedOut,
    /// 请求本身在轮询前或轮询中失败；失败归属于请求
    Aborted,
    /// 没有可轮询的请求或模式无效，未开始轮询
    Failed,
}

/// 一次 guard 执行的结果
#[derive(Debug)]
pub struct GuardOutcome {
    pub state: GuardState,
    /// 额外发送的次数（不含进入前的那次）
    pub resends: usize,
    pub failures: Vec<String>,
}

impl GuardOutcome {
    fn finished(state: GuardState, resends: usize, failures: Vec<String>) -> Self {
        Self {
            state,
            resends,
            failures,
        }
    }
}

/// 轮询 `request` 直到字段匹配、超时或请求失败
pub fn wait(
    guard: &Guard,
    request: Option<&mut ActiveRequest>,
    store: &VariableStore,
    client: &Client,
) -> GuardOutcome {
    let Some(request) = request else {
        return GuardOutcome::finished(
            GuardState::Failed,
            0,
            vec![format!("Guard '{}' has no request to poll.", guard.name)],
        );
    };

    let pattern = store.substitute_str(&guard.pattern);
    let field = store.substitute_str(&guard.field);
    tracing::info!("Waiting for guard {} with pattern /{}/", guard.name, pattern);

    let regex = match Regex::new(&pattern) {
        Ok(regex) => regex,
        Err(e) => {
            return GuardOutcome::finished(
                GuardState::Failed,
                0,
                vec![format!("Guard '{}' has invalid pattern /{}/: {}", guard.name, pattern, e)],
            );
        }
    };

    let matches = |request: &ActiveRequest| {
        request
            .response()
            .and_then(|r| r.get_field(Some(&field), guard.target))
            .is_some_and(|value| regex.is_match(&value))
    };

    let period = Duration::from_secs(guard.period);
    let timeout = Duration::from_secs(guard.timeout);
    let start = Instant::now();
    let mut resends = 0;

    let mut state = GuardState::Waiting;
    while state == GuardState::Waiting {
        state = if matches(&*request) {
            GuardState::Matched
        } else if request.has_failed() {
            GuardState::Aborted
        } else if start.elapsed() >= timeout {
            GuardState::TimedOut
        } else {
            thread::sleep(period);
            request.dispatch(client);
            resends += 1;
            GuardState::Waiting
        };
    }

    let failures = match state {
        GuardState::TimedOut => vec![format!(
            "Guard '{}' timed out waiting for field '{}' with pattern '{}' from response {}.",
            guard.name, field, pattern, guard.target
        )],
        GuardState::Aborted => {
            tracing::warn!(
                "Guard '{}' aborted: request on '{}' failed",
                guard.name,
                request.resource()
            );
            Vec::new()
        }
        _ => Vec::new(),
    };
    GuardOutcome::finished(state, resends, failures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Target;
    use crate::http::Response;
    use reqwest::header::HeaderMap;

    fn guard(pattern: &str) -> Guard {
        Guard {
            name: "server up".into(),
            field: "server/state".into(),
            target: Target::Body,
            pattern: pattern.into(),
            period: 1,
            timeout: 1,
        }
    }

    fn request_with_body(body: &str) -> ActiveRequest {
        let response =
            Response::new(200, HeaderMap::new(), body.to_string(), Duration::ZERO).unwrap();
        ActiveRequest::with_response("servers", response)
    }

    #[test]
    fn test_immediate_match_sends_nothing() {
        let mut request = request_with_body(r#"{"server":{"state":"operational"}}"#);
        let mut store = VariableStore::new();
        store.set("wanted", "operational");

        let outcome = wait(&guard("^$wanted$"), Some(&mut request), &store, &Client::new().unwrap());
        assert_eq!(outcome.state, GuardState::Matched);
        assert_eq!(outcome.resends, 0);
        assert!(outcome.failures.is_empty());
    }

    #[test]
    fn test_missing_request_is_failure() {
        let outcome = wait(&guard("x"), None, &VariableStore::new(), &Client::new().unwrap());
        assert_eq!(outcome.state, GuardState::Failed);
        assert_eq!(outcome.failures.len(), 1);
        assert!(outcome.failures[0].contains("server up"));
    }

    #[test]
    fn test_invalid_pattern_is_failure() {
        let mut request = request_with_body("{}");
        let outcome = wait(
            &guard("(unclosed"),
            Some(&mut request),
            &VariableStore::new(),
            &Client::new().unwrap(),
        );
        assert_eq!(outcome.state, GuardState::Failed);
        assert_eq!(outcome.failures.len(), 1);
        assert!(outcome.failures[0].contains("invalid pattern"));
    }

    #[test]
    fn test_already_failed_request_aborts_without_polling() {
        use crate::config::Config;
        use crate::scenario::ApiRequest;

        // 没有 operation，准备阶段即失败
        let descriptor = ApiRequest {
            resource: "servers".into(),
            ..Default::default()
        };
        let config = Config {
            host: Some("127.0.0.1".into()),
            ..Default::default()
        };
        let mut request = ActiveRequest::prepare(&descriptor, &VariableStore::new(), &config);
        assert!(request.has_failed());

        let outcome = wait(
            &guard("operational"),
            Some(&mut request),
            &VariableStore::new(),
            &Client::new().unwrap(),
        );
        assert_eq!(outcome.state, GuardState::Aborted);
        assert_eq!(outcome.resends, 0);
        assert!(outcome.failures.is_empty());
        assert_eq!(request.take_new_failures().len(), 1);
    }

    #[test]
    fn test_zero_timeout_times_out_without_polling() {
        let mut request = request_with_body(r#"{"server":{"state":"pending"}}"#);
        let mut g = guard("operational");
        g.timeout = 0;

        let outcome = wait(&g, Some(&mut request), &VariableStore::new(), &Client::new().unwrap());
        assert_eq!(outcome.state, GuardState::TimedOut);
        assert_eq!(outcome.resends, 0);
        assert_eq!(outcome.failures.len(), 1);
        assert!(outcome.failures[0].contains("'server/state'"));
        assert!(outcome.failures[0].ends_with("from response body."));
    }
}
