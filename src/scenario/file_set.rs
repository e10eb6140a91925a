use std::fs;
use std::path::{Path, PathBuf};

/// 不扫描的目录
pub const IGNORED_FOLDERS: &[&str] = &[".svn", ".git"];

/// 场景文件扩展名
pub const SCENARIO_EXTENSIONS: &[&str] = &["yml", "yaml"];

/// 目录下指定扩展名的文件集合（按路径排序）
pub struct FileSet;

impl FileSet {
    pub fn gather(dir: &Path, recursive: bool) -> std::io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        Self::collect(dir, recursive, &mut files)?;
        files.sort();
        Ok(files)
    }

    fn collect(dir: &Path, recursive: bool, files: &mut Vec<PathBuf>) -> std::io::Result<()> {
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_dir() {
                if recursive && !is_ignored(&path) {
                    Self::collect(&path, recursive, files)?;
                }
            } else if has_scenario_extension(&path) {
                files.push(path);
            }
        }
        Ok(())
    }
}

pub fn is_ignored(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| IGNORED_FOLDERS.contains(&name))
}

pub fn has_scenario_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| SCENARIO_EXTENSIONS.contains(&ext))
}
