use crate::error::{ResatError, Result};
use crate::variable::store::VariableStore;
use crate::variable::types::NameValue;
use fs2::FileExt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

/// 读取持久化变量文件（YAML 列表 `- {name, value}`）
pub fn read_variables<P: AsRef<Path>>(path: P) -> Result<Vec<NameValue>> {
    let content = fs::read_to_string(path.as_ref())?;
    if content.trim().is_empty() {
        return Err(ResatError::Other(format!(
            "No variables defined in '{}'",
            path.as_ref().display()
        )));
    }
    Ok(serde_yaml::from_str(&content)?)
}

/// 写入持久化变量文件
///
/// 写入期间持有排他锁，避免两个进程交错写同一个文件。
pub fn write_variables<P: AsRef<Path>>(path: P, variables: &[NameValue]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent)?;
    }

    let yaml = serde_yaml::to_string(variables)?;

    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(path)?;
    file.lock_exclusive()?;
    file.set_len(0)?;
    file.write_all(yaml.as_bytes())?;
    file.flush()?;
    drop(file);

    Ok(())
}

impl VariableStore {
    /// 合并文件中的变量，不清除现有值。返回读取的变量个数。
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
        let variables = read_variables(path)?;
        let count = variables.len();
        self.extend(variables);
        Ok(count)
    }

    /// 只写入被标记保存的变量
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        write_variables(path, &self.saved_variables())
    }
}
