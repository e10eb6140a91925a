use crate::Result;
use crate::field::ResponseBody;
use crate::http::types::Status;
use reqwest::header::HeaderMap as Headers;
use std::sync::OnceLock;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Response {
    pub status: Status,
    pub headers: Headers,
    pub body: String,
    pub duration: Duration,
    /// 首次访问 body 字段时解析
    parsed: OnceLock<ResponseBody>,
}

impl Response {
    pub fn new(status: u16, headers: Headers, body: String, duration: Duration) -> Result<Self> {
        Ok(Self {
            status: Status::new(status)?,
            headers,
            body,
            duration,
            parsed: OnceLock::new(),
        })
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn is_client_error(&self) -> bool {
        self.status.is_client_error()
    }

    /// JSON 优先，失败后尝试 XML，都失败则为 `Unparsed`
    pub fn parsed_body(&self) -> &ResponseBody {
        self.parsed.get_or_init(|| ResponseBody::parse(&self.body))
    }
}
