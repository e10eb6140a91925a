mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use resat::config::{Config, ConfigLoader};
use resat::variable::NameValue;
use resat::{Engine, Reporter};
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // 初始化日志系统
    resat::logger::init_logger(cli.log_level());

    let mut config = match &cli.config {
        Some(path) => ConfigLoader::load_from_path(path)?,
        None => match ConfigLoader::find_and_load() {
            Some((path, config)) => {
                tracing::info!("Using configuration '{}'", path.display());
                config
            }
            None => Config::default(),
        },
    };

    // 命令行参数覆盖配置文件
    if cli.failonerror {
        config.failonerror = Some(true);
    }
    if let Some(input) = &cli.input {
        config.input = Some(input.clone());
    }
    if let Some(output) = &cli.output {
        config.output = Some(output.clone());
    }
    let defines = cli
        .defines
        .iter()
        .map(|(name, value)| NameValue::new(name, value))
        .collect();

    let engine = Engine::new(config)?
        .with_defines(defines)
        .recursive(!cli.norecursion)
        .with_reporter(Reporter::new(cli.verbose, cli.quiet));
    let report = engine
        .run(&cli.target)
        .with_context(|| format!("无法运行 '{}'", cli.target.display()))?;

    Reporter::new(cli.verbose, cli.quiet).print_summary(&report);

    Ok(if report.succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
