use crate::http::Response;
use crate::request::{ActiveRequest, PreparedRequest};
use crate::scenario::HandlerRef;
use std::collections::HashMap;

/// 外部处理模块：拿到原始请求和响应，返回失败信息（空表示成功）
pub trait Handler: Send + Sync {
    fn process(&self, request: &PreparedRequest, response: &Response) -> Vec<String>;
}

impl<F> Handler for F
where
    F: Fn(&PreparedRequest, &Response) -> Vec<String> + Send + Sync,
{
    fn process(&self, request: &PreparedRequest, response: &Response) -> Vec<String> {
        self(request, response)
    }
}

/// 按模块名注册的处理模块
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Box<dyn Handler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, module: impl Into<String>, handler: impl Handler + 'static) {
        self.handlers.insert(module.into(), Box::new(handler));
    }

    pub fn get(&self, module: &str) -> Option<&dyn Handler> {
        self.handlers.get(module).map(|h| h.as_ref())
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// 对当前请求执行一个 handler 步骤
pub fn run(entry: &HandlerRef, request: Option<&ActiveRequest>, registry: &HandlerRegistry) -> Vec<String> {
    tracing::info!("Running handler '{}'", entry.name);

    let Some(handler) = registry.get(&entry.module) else {
        return vec![format!(
            "Handler '{}' refers to unknown module '{}'.",
            entry.name, entry.module
        )];
    };
    let (Some(prepared), Some(response)) = (
        request.and_then(ActiveRequest::prepared),
        request.and_then(ActiveRequest::response),
    ) else {
        return vec![format!("Handler '{}' has no response to process.", entry.name)];
    };

    handler.process(prepared, response)
}
