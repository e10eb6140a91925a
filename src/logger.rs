use tracing_subscriber::{EnvFilter, fmt};

/// 默认日志级别
pub const DEFAULT_LEVEL: &str = "info";

/// 初始化日志系统
///
/// 优先级: RUST_LOG 环境变量 > `level` 参数 > info
///
/// 示例:
/// - RUST_LOG=debug resat scenarios/
/// - resat --loglevel warn scenarios/
pub fn init_logger(level: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.unwrap_or(DEFAULT_LEVEL)));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .try_init();

    tracing::debug!("Logger initialized");
}
