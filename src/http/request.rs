use reqwest::header::{CONTENT_TYPE, HeaderMap as Headers, HeaderName, HeaderValue};

use crate::http::types::Method;
use crate::{ResatError, Result};

/// 已准备好、可重复发送的 HTTP 请求
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: url::Url,
    pub headers: Headers,
    pub body: Option<String>,
    pub basic_auth: Option<(String, String)>,
}

impl Request {
    pub fn new(method: Method, url: &str) -> Result<Self> {
        Ok(Self {
            method,
            url: url::Url::parse(url)?,
            headers: Headers::new(),
            body: None,
            basic_auth: None,
        })
    }

    fn insert_header(&mut self, key: &str, value: &str) -> Result<()> {
        let header_name: HeaderName = key
            .parse()
            .map_err(|_| ResatError::Other(format!("Invalid header name '{}'", key)))?;
        let header_value: HeaderValue = value.parse().map_err(|_| {
            ResatError::Other(format!("Invalid value for header '{}': '{}'", key, value))
        })?;
        self.headers.insert(header_name, header_value);
        Ok(())
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Result<Self> {
        self.insert_header(key, value)?;
        Ok(self)
    }

    /// form-urlencoded 请求体
    pub fn with_form<'a, I>(mut self, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let encoded = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();
        if !self.headers.contains_key(CONTENT_TYPE) {
            self.insert_header(CONTENT_TYPE.as_str(), "application/x-www-form-urlencoded")?;
        }
        self.body = Some(encoded);
        Ok(self)
    }

    pub fn with_basic_auth(mut self, username: &str, password: &str) -> Self {
        self.basic_auth = Some((username.to_string(), password.to_string()));
        self
    }
}
