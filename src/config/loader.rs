use crate::config::types::Config;
use crate::error::{ResatError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// 配置文件加载器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 配置文件名
    pub const CONFIG_FILE: &'static str = "resat.toml";

    /// 从指定路径加载配置文件
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Config> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ResatError::ConfigError(format!("无法读取 '{}': {}", path.display(), e))
        })?;

        toml::from_str(&content).map_err(|e| {
            ResatError::ConfigError(format!("'{}' 格式无效: {}", path.display(), e))
        })
    }

    /// 查找并加载配置文件
    /// 查找顺序：
    /// 1. 当前目录
    /// 2. 父目录递归查找
    /// 3. 用户配置目录 ~/.config/resat/
    pub fn find_and_load() -> Option<(PathBuf, Config)> {
        let path = Self::find_in_current_dir().or_else(Self::find_in_user_dir)?;
        match Self::load_from_path(&path) {
            Ok(config) => Some((path, config)),
            Err(e) => {
                tracing::warn!("{}", e);
                None
            }
        }
    }

    fn find_in_current_dir() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;

        loop {
            let config_path = current.join(Self::CONFIG_FILE);
            if config_path.is_file() {
                return Some(config_path);
            }

            if !current.pop() {
                break;
            }
        }

        None
    }

    fn find_in_user_dir() -> Option<PathBuf> {
        let home = dirs::home_dir()?;
        let config_path = home.join(".config").join("resat").join(Self::CONFIG_FILE);
        config_path.is_file().then_some(config_path)
    }

    /// 解析 CLI 变量定义 "NAME:VAL"，`::` 表示字面量冒号
    pub fn parse_define(s: &str) -> Option<(String, String)> {
        const PLACEHOLDER: char = '\u{0}';
        let escaped = s.replace("::", &PLACEHOLDER.to_string());
        let (name, value) = escaped.split_once(':')?;
        let restore = |part: &str| part.replace(PLACEHOLDER, ":");
        let name = restore(name.trim());
        if name.is_empty() {
            return None;
        }
        Some((name, restore(value)))
    }
}
