use crate::config::Config;
use crate::http::{Client, Response};
use crate::request::builder::{PreparedRequest, prepare};
use crate::scenario::ApiRequest;
use crate::utils::ResponseFormatter;
use crate::variable::VariableStore;
use std::thread;

/// 场景中最近一次发出的请求
///
/// 失败列表只增不减；每个步骤通过 [`take_new_failures`](Self::take_new_failures)
/// 领取自己产生的那部分。
#[derive(Debug)]
pub struct ActiveRequest {
    resource: String,
    prepared: Option<PreparedRequest>,
    response: Option<Response>,
    failures: Vec<String>,
    reported: usize,
    send_count: usize,
}

impl ActiveRequest {
    /// 准备失败不会返回 `Err`，而是记录在请求自身上，此后 dispatch 不会发送任何东西
    pub fn prepare(descriptor: &ApiRequest, store: &VariableStore, config: &Config) -> Self {
        let mut active = Self::empty(&descriptor.resource);
        match prepare(descriptor, store, config) {
            Ok(prepared) => active.prepared = Some(prepared),
            Err(message) => {
                tracing::error!("{}", message);
                active.failures.push(message);
            }
        }
        active
    }

    fn empty(resource: &str) -> Self {
        Self {
            resource: resource.to_string(),
            prepared: None,
            response: None,
            failures: Vec::new(),
            reported: 0,
            send_count: 0,
        }
    }

    /// 发送（或重发）已准备好的请求。可重复调用。
    pub fn dispatch(&mut self, client: &Client) {
        let Some(prepared) = &self.prepared else {
            return;
        };

        if let Some(delay) = prepared.delay {
            let wait = delay.sample();
            if !wait.is_zero() {
                tracing::debug!("Delaying request on '{}' for {}s", self.resource, wait.as_secs());
                thread::sleep(wait);
            }
        }

        let request = &prepared.request;
        tracing::debug!("{} {}", request.method, request.url);
        let response = match client.execute(request) {
            Ok(response) => response,
            Err(e) => {
                let message = format!("Exception raised while making request: {}", e);
                tracing::error!("{}", message);
                self.failures.push(message);
                return;
            }
        };

        if tracing::enabled!(tracing::Level::DEBUG) {
            let formatter = ResponseFormatter::new().with_color(false);
            tracing::debug!("Response:\n{}", formatter.format(&response));
        }

        let code = response.status.code();
        if prepared.accepts(code) {
            self.send_count += 1;
        } else {
            let message = format!("Request returned {}", code);
            tracing::error!("{} for request on '{}'", message, self.resource);
            self.failures.push(message);
        }
        self.response = Some(response);
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn prepared(&self) -> Option<&PreparedRequest> {
        self.prepared.as_ref()
    }

    pub fn response(&self) -> Option<&Response> {
        self.response.as_ref()
    }

    pub fn failures(&self) -> &[String] {
        &self.failures
    }

    pub fn has_failed(&self) -> bool {
        !self.failures.is_empty()
    }

    /// 自上次调用以来新增的失败
    pub fn take_new_failures(&mut self) -> Vec<String> {
        let fresh = self.failures[self.reported..].to_vec();
        self.reported = self.failures.len();
        fresh
    }

    /// 状态码被接受的发送次数
    pub fn send_count(&self) -> usize {
        self.send_count
    }
}

#[cfg(test)]
impl ActiveRequest {
    pub(crate) fn with_response(resource: &str, response: Response) -> Self {
        let mut active = Self::empty(resource);
        active.response = Some(response);
        active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::Operation;

    fn descriptor(operation: Option<Operation>) -> ApiRequest {
        ApiRequest {
            operation,
            resource: "servers".into(),
            ..Default::default()
        }
    }

    fn config() -> Config {
        Config {
            host: Some("127.0.0.1".into()),
            // 没有进程监听的端口
            port: Some(9),
            ..Default::default()
        }
    }

    #[test]
    fn test_preparation_failure_recorded_once() {
        let mut active =
            ActiveRequest::prepare(&descriptor(None), &VariableStore::new(), &config());
        assert!(active.has_failed());
        assert!(active.prepared().is_none());

        let failures = active.take_new_failures();
        assert_eq!(failures.len(), 1);
        assert!(failures[0].contains("servers"));
        assert!(active.take_new_failures().is_empty());

        // 准备失败后 dispatch 不发送
        active.dispatch(&Client::new().unwrap());
        assert_eq!(active.send_count(), 0);
        assert!(active.take_new_failures().is_empty());
    }

    #[test]
    fn test_transport_failure_not_counted() {
        let mut active = ActiveRequest::prepare(
            &descriptor(Some(Operation::Index)),
            &VariableStore::new(),
            &config(),
        );
        assert!(!active.has_failed());

        active.dispatch(&Client::new().unwrap());
        assert_eq!(active.send_count(), 0);
        assert!(active.response().is_none());
        let failures = active.take_new_failures();
        assert_eq!(failures.len(), 1);
        assert!(failures[0].starts_with("Exception raised while making request"));
    }
}
