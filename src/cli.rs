use clap::Parser;
use resat::config::ConfigLoader;
use std::path::PathBuf;

/// 执行 YAML 描述的 REST API 场景
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, disable_version_flag = true)]
pub struct Cli {
    /// 场景文件或目录
    pub target: PathBuf,

    /// 配置文件路径（默认查找 resat.toml）
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// 定义变量 NAME:VAL，`::` 表示字面量冒号；可重复
    #[arg(short, long = "define", value_name = "NAME:VAL", value_parser = parse_define)]
    pub defines: Vec<(String, String)>,

    /// 不递归扫描子目录
    #[arg(short, long)]
    pub norecursion: bool,

    /// 第一个失败后停止当前场景
    #[arg(short = 'F', long)]
    pub failonerror: bool,

    /// 只输出结论
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// 输出每次请求的响应
    #[arg(short = 'V', long)]
    pub verbose: bool,

    /// 日志级别（trace, debug, info, warn, error）
    #[arg(short, long, value_name = "LEVEL")]
    pub loglevel: Option<String>,

    /// 运行前读入的变量文件
    #[arg(short, long, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// 运行结束写出保存变量的文件
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// 显示版本（`-V` 留给 --verbose）
    #[arg(long, action = clap::ArgAction::Version)]
    #[allow(dead_code)]
    version: Option<bool>,
}

impl Cli {
    /// 日志级别：显式 `--loglevel` 优先，`--quiet` 降为 error
    pub fn log_level(&self) -> Option<&str> {
        match (&self.loglevel, self.quiet) {
            (Some(level), _) => Some(level.as_str()),
            (None, true) => Some("error"),
            (None, false) => None,
        }
    }
}

fn parse_define(s: &str) -> Result<(String, String), String> {
    ConfigLoader::parse_define(s).ok_or_else(|| format!("'{}' 不是 NAME:VAL 形式", s))
}
