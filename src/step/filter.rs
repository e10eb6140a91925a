use crate::field::Target;
use crate::http::Response;
use crate::scenario::{Extractor, Filter, Validator};
use crate::variable::VariableStore;
use regex::Regex;

/// 对当前响应执行断言，然后执行提取
///
/// 提取总是执行，与断言是否失败无关。
pub fn run(filter: &Filter, response: Option<&Response>, store: &mut VariableStore) -> Vec<String> {
    tracing::info!("Running filter '{}'", filter.name);
    let Some(response) = response else {
        return vec!["No response to validate.".to_string()];
    };

    let failures = validate(filter, response, store);
    for extractor in &filter.extractors {
        extract(extractor, filter.target, response, store);
    }
    failures
}

fn validate(filter: &Filter, response: &Response, store: &VariableStore) -> Vec<String> {
    let mut failures = Vec::new();
    let target = filter.target;

    // 1. 是否为空
    let empty = match target {
        Target::Header => response.headers.is_empty(),
        Target::Body => response.body.chars().nth(1).is_none(),
    };
    if filter.is_empty != empty {
        failures.push(if filter.is_empty {
            format!("Response {} not empty (expected empty).", target)
        } else {
            format!("Response {} empty (expected non-empty).", target)
        });
    }

    // 2. 必需字段
    for field in &filter.required_fields {
        if !response.has_field(Some(field), target) {
            failures.push(format!("Missing {} field '{}'.", target, field));
        }
    }

    // 3. validators
    for validator in &filter.validators {
        if let Some(failure) = check_validator(validator, target, response, store) {
            failures.push(failure);
        }
    }
    failures
}

/// 三个条件任一满足即通过：`is_empty` 且值为空；显式空 pattern 且值为空；非空 pattern 匹配
fn check_validator(
    validator: &Validator,
    target: Target,
    response: &Response,
    store: &VariableStore,
) -> Option<String> {
    let field_name = validator.field.as_deref().unwrap_or("");
    let Some(value) = response.get_field(validator.field.as_deref(), target) else {
        return Some(format!("Missing {} field '{}'.", target, field_name));
    };

    let pattern = validator.pattern.as_deref().map(|p| store.substitute_str(p));
    let passed = match pattern.as_deref() {
        _ if validator.is_empty && value.is_empty() => true,
        Some("") => value.is_empty(),
        Some(pattern) => match Regex::new(pattern) {
            Ok(regex) => regex.is_match(&value),
            Err(e) => return Some(format!("Invalid validator pattern /{}/: {}", pattern, e)),
        },
        None => !validator.is_empty && !value.is_empty(),
    };

    (!passed).then(|| {
        format!(
            "Validator /{}/ failed on '{}' from {} field '{}'.",
            pattern.as_deref().unwrap_or("<NONE>"),
            value,
            target,
            field_name
        )
    })
}

fn extract(extractor: &Extractor, target: Target, response: &Response, store: &mut VariableStore) {
    let field = extractor.field.as_deref().map(|f| store.substitute_str(f));
    let field_name = field.as_deref().unwrap_or("");
    let Some(value) = response.get_field(field.as_deref(), target) else {
        tracing::warn!(
            "Extraction from response {} field '{}' failed: field not found.",
            target,
            field_name
        );
        return;
    };

    match extractor.pattern.as_deref().map(|p| store.substitute_str(p)) {
        Some(pattern) => {
            let captured = match Regex::new(&pattern) {
                Ok(regex) => regex
                    .captures(&value)
                    .and_then(|caps| caps.get(1))
                    .map(|m| m.as_str().to_string()),
                Err(e) => {
                    tracing::warn!("Invalid extractor pattern /{}/: {}", pattern, e);
                    None
                }
            };
            match captured {
                Some(captured) => store.set(&extractor.variable, captured),
                None => tracing::warn!(
                    "Extraction from response {} field '{}' ('{}') with pattern '{}' failed.",
                    target,
                    field_name,
                    value,
                    pattern
                ),
            }
        }
        None => store.set(&extractor.variable, value),
    }

    if extractor.save {
        store.mark_for_save(&extractor.variable);
    }
    if extractor.export {
        store.export(&extractor.variable);
    }
}
