use crate::config::{Config, ConfigLoader};
use crate::error::{ParseError, ResatError, Result};
use crate::http::Client;
use crate::runner::executor::ScenarioRunner;
use crate::runner::reporter::Reporter;
use crate::runner::types::RunReport;
use crate::scenario::{FileSet, LoadedScenario, ScenarioLoader};
use crate::step::HandlerRegistry;
use crate::variable::{Carryover, NameValue, VariableStore, write_variables};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 对一个场景文件或目录执行完整的一次运行
pub struct Engine {
    config: Config,
    client: Client,
    handlers: HandlerRegistry,
    defines: Vec<NameValue>,
    recursive: bool,
    reporter: Option<Reporter>,
}

impl Engine {
    pub fn new(config: Config) -> Result<Self> {
        let client = Client::with_timeout(Duration::from_secs(config.request_timeout()))?;
        Ok(Self {
            config,
            client,
            handlers: HandlerRegistry::new(),
            defines: Vec::new(),
            recursive: true,
            reporter: None,
        })
    }

    pub fn with_handlers(mut self, handlers: HandlerRegistry) -> Self {
        self.handlers = handlers;
        self
    }

    /// 命令行定义的变量，优先于任何配置文件中的同名变量
    pub fn with_defines(mut self, defines: Vec<NameValue>) -> Self {
        self.defines = defines;
        self
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn with_reporter(mut self, reporter: Reporter) -> Self {
        self.reporter = Some(reporter);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 只有目标本身不可读或变量文件写出失败时返回 `Err`；场景内的问题都记录在报告中
    pub fn run(&self, target: &Path) -> Result<RunReport> {
        let files = self.gather(target)?;
        tracing::info!("Found {} scenario file(s) under '{}'", files.len(), target.display());

        let mut report = RunReport::default();
        let mut carryover = Carryover::new();
        let mut saved: Vec<NameValue> = Vec::new();

        for file in files {
            let scenario = match ScenarioLoader::load(&file) {
                Ok(scenario) => scenario,
                Err(e) => {
                    tracing::error!("Skipping '{}' ({})", file.display(), e.message);
                    report.skip(e);
                    continue;
                }
            };
            if scenario.ignore {
                tracing::info!("Ignoring '{}'", file.display());
                report.ignored_count += 1;
                if let Some(reporter) = &self.reporter {
                    reporter.print_ignored(&file);
                }
                continue;
            }

            let config = match self.scenario_config(&scenario) {
                Ok(config) => config,
                Err(e) => {
                    tracing::error!("Skipping '{}' ({})", file.display(), e);
                    report.skip(ParseError::new(&file, e.to_string()));
                    continue;
                }
            };

            let mut store = self.seed_store(carryover, &config);
            let mut runner = ScenarioRunner::new(&self.client, &config, &self.handlers);
            if let Some(reporter) = &self.reporter {
                runner = runner.with_reporter(reporter);
            }
            let outcome = runner.run(&scenario, &mut store);
            if let Some(reporter) = &self.reporter {
                reporter.print_outcome(&outcome);
            }
            report.record(outcome);

            carryover = store.carryover();
            merge_saved(&mut saved, store.saved_variables());
        }

        if let Some(output) = &self.config.output {
            write_variables(output, &saved)?;
            tracing::info!("Saved {} variable(s) to '{}'", saved.len(), output.display());
        }
        Ok(report)
    }

    fn gather(&self, target: &Path) -> Result<Vec<PathBuf>> {
        if target.is_dir() {
            Ok(FileSet::gather(target, self.recursive)?)
        } else if target.is_file() {
            Ok(vec![target.to_path_buf()])
        } else {
            Err(ResatError::ConfigError(format!(
                "找不到场景文件或目录 '{}'",
                target.display()
            )))
        }
    }

    /// 全局配置叠加场景自己的配置文件，最后应用命令行定义
    fn scenario_config(&self, scenario: &LoadedScenario) -> Result<Config> {
        let mut config = match &scenario.config {
            Some(path) => self.config.clone().merge(ConfigLoader::load_from_path(path)?),
            None => self.config.clone(),
        };
        for NameValue { name, value } in &self.defines {
            config.define(name.clone(), value.clone());
        }
        Ok(config)
    }

    /// 先是配置中的变量和输入文件，最后叠加上一个场景导出的变量
    fn seed_store(&self, carryover: Carryover, config: &Config) -> VariableStore {
        let mut store = VariableStore::new();
        store.extend(config.variables.iter().cloned());
        if let Some(input) = &config.input {
            match store.load(input) {
                Ok(count) => tracing::debug!("Loaded {} variable(s) from '{}'", count, input.display()),
                Err(e) => tracing::warn!("Cannot load variables from '{}': {}", input.display(), e),
            }
        }
        if !carryover.is_empty() {
            tracing::debug!("Inheriting exported variables from previous scenario");
        }
        store.inherit(carryover);
        store
    }
}

/// 同名变量以后出现的值为准
fn merge_saved(saved: &mut Vec<NameValue>, fresh: Vec<NameValue>) {
    for entry in fresh {
        match saved.iter_mut().find(|v| v.name == entry.name) {
            Some(existing) => existing.value = entry.value,
            None => saved.push(entry),
        }
    }
}
