use crate::http::{Request, Response};
use colored::*;

/// 把请求和响应格式化为多行文本，用于 `--verbose` 输出和 debug 日志
pub struct ResponseFormatter {
    color: bool,
    show_body: bool,
    show_headers: bool,
    show_timing: bool,
}

impl ResponseFormatter {
    pub fn new() -> Self {
        Self {
            color: true,
            show_body: true,
            show_headers: true,
            show_timing: true,
        }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn with_headers(mut self, show: bool) -> Self {
        self.show_headers = show;
        self
    }

    pub fn request_line(&self, request: &Request) -> String {
        let line = format!("{} {}", request.method, request.url);
        if self.color {
            line.cyan().bold().to_string()
        } else {
            line
        }
    }

    pub fn format(&self, response: &Response) -> String {
        let mut output = Vec::new();
        let status_line = format!(
            "HTTP {} {}",
            response.status.code(),
            response.status.reason_phrase()
        );

        if self.color {
            let colored_status_line = if response.is_success() {
                status_line.green().bold()
            } else if response.is_client_error() {
                status_line.yellow().bold()
            } else {
                status_line.red().bold()
            };
            output.push(colored_status_line.to_string());
        } else {
            output.push(status_line);
        }
        if self.show_timing {
            let timing = format!("Time: {}ms", response.duration.as_millis());
            output.push(self.paint(timing, |s| s.cyan()));
        }
        if self.show_headers && !response.headers.is_empty() {
            output.push(String::new());
            output.push(self.paint("Headers:".to_string(), |s| s.blue().bold()));
            for (key, value) in response.headers.iter() {
                let value_str = value.to_str().unwrap_or("<invalid utf-8>");
                output.push(self.paint(format!("   {}: {}", key, value_str), |s| s.blue()));
            }
        }

        if self.show_body {
            let body = &response.body;
            if !body.trim().is_empty() {
                output.push(String::new());
                output.push(self.paint("Body:".to_string(), |s| s.blue().bold()));
                // JSON 美化，其他原样输出
                let formatted_body = try_format_json(body).unwrap_or_else(|| body.to_string());
                output.push(formatted_body);
            }
        }

        output.join("\n")
    }

    fn paint(&self, text: String, style: impl Fn(&str) -> ColoredString) -> String {
        if self.color {
            style(&text).to_string()
        } else {
            text
        }
    }
}

impl Default for ResponseFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn try_format_json(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    serde_json::to_string_pretty(&value).ok()
}
