use std::time::{Duration, Instant};

use crate::Result;
use crate::config::types::DEFAULT_REQUEST_TIMEOUT;
use crate::http::request::Request;
use crate::http::response::Response;

/// 阻塞式 HTTP 客户端；场景中的步骤严格顺序执行，所以不需要异步运行时
#[derive(Clone)]
pub struct Client {
    inner: reqwest::blocking::Client,
}

impl Client {
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        Ok(Self {
            inner: reqwest::blocking::Client::builder()
                .timeout(timeout)
                .build()?,
        })
    }

    pub fn execute(&self, request: &Request) -> Result<Response> {
        let mut req = self
            .inner
            .request(request.method.into(), request.url.clone())
            .headers(request.headers.clone());

        if let Some((username, password)) = &request.basic_auth {
            req = req.basic_auth(username, Some(password));
        }
        if let Some(body) = &request.body {
            req = req.body(body.clone());
        }

        let start = Instant::now();
        let response = req.send()?;
        let duration = start.elapsed();

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.text()?;

        Response::new(status, headers, body, duration)
    }
}
