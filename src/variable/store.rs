use crate::variable::resolver::{Substitute, substitute_str};
use crate::variable::types::NameValue;
use std::collections::HashMap;

/// 导出变量的快照，在 store 重置或下一个场景中继续存在
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Carryover {
    variables: HashMap<String, String>,
}

impl Carryover {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

/// 场景运行期间的变量表
///
/// 每个条目可以被标记为保存（运行结束写入输出文件）或导出（越过 `reset` 存活）。
#[derive(Debug, Clone, Default)]
pub struct VariableStore {
    variables: HashMap<String, String>,
    /// 按标记顺序保存，不重复
    marked_for_save: Vec<String>,
    exported: Carryover,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 接收上一个场景的导出快照；同名变量以快照为准
    pub fn inherit(&mut self, carryover: Carryover) {
        for (name, value) in &carryover.variables {
            self.variables.insert(name.clone(), value.clone());
        }
        self.exported.variables.extend(carryover.variables);
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(|s| s.as_str())
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(name.into(), value.into());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    /// 批量写入，覆盖已有值
    pub fn extend<I>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = NameValue>,
    {
        for NameValue { name, value } in pairs {
            self.variables.insert(name, value);
        }
    }

    pub fn mark_for_save(&mut self, name: &str) {
        if !self.marked_for_save.iter().any(|n| n == name) {
            self.marked_for_save.push(name.to_string());
        }
    }

    pub fn is_marked_for_save(&self, name: &str) -> bool {
        self.marked_for_save.iter().any(|n| n == name)
    }

    /// 将当前值复制到导出集合；变量不存在时不做任何事
    pub fn export(&mut self, name: &str) {
        if let Some(value) = self.variables.get(name) {
            self.exported
                .variables
                .insert(name.to_string(), value.clone());
        }
    }

    pub fn is_exported(&self, name: &str) -> bool {
        self.exported.variables.contains_key(name)
    }

    /// 只保留导出变量，清除保存标记
    pub fn reset(&mut self) {
        self.variables = self.exported.variables.clone();
        self.marked_for_save.clear();
    }

    pub fn carryover(&self) -> Carryover {
        self.exported.clone()
    }

    /// 已标记保存且当前有值的变量，按标记顺序
    pub fn saved_variables(&self) -> Vec<NameValue> {
        self.marked_for_save
            .iter()
            .filter_map(|name| {
                self.variables
                    .get(name)
                    .map(|value| NameValue::new(name.clone(), value.clone()))
            })
            .collect()
    }

    pub fn substitute<T: Substitute + ?Sized>(&self, value: &mut T) {
        value.substitute(self);
    }

    pub fn substitute_str(&self, text: &str) -> String {
        substitute_str(text, self)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}
