use crate::error::ParseError;
use crate::scenario::file_set::{FileSet, is_ignored};
use crate::scenario::types::{FlatStep, LoadedScenario, Scenario, Step, StepUnit};
use std::fs;
use std::path::{Path, PathBuf};

pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// 场景加载器：解析 YAML 文档并递归展开 includes
pub struct ScenarioLoader;

impl ScenarioLoader {
    /// 从文件加载并展开场景
    pub fn load<P: AsRef<Path>>(path: P) -> ParseResult<LoadedScenario> {
        let path = path.as_ref();
        let scenario = Self::parse_file(path)?;
        let dir = parent_dir(path);

        let config = scenario.config.as_ref().map(|c| dir.join(c));
        if scenario.ignore {
            return Ok(LoadedScenario {
                name: scenario.name,
                path: path.to_path_buf(),
                ignore: true,
                config,
                steps: Vec::new(),
            });
        }

        let mut steps = Vec::new();
        let mut stack = vec![identity(path)];
        Self::expand(&scenario, path, &mut stack, &mut steps)?;

        Ok(LoadedScenario {
            name: scenario.name,
            path: path.to_path_buf(),
            ignore: false,
            config,
            steps,
        })
    }

    /// 只解析，不展开
    pub fn parse_file<P: AsRef<Path>>(path: P) -> ParseResult<Scenario> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| ParseError::new(path, format!("cannot read file: {}", e)))?;
        Self::parse_content(&content, path)
    }

    pub fn parse_content(content: &str, path: &Path) -> ParseResult<Scenario> {
        serde_yaml::from_str(content).map_err(|e| ParseError::new(path, e.to_string()))
    }

    /// includes 先于自身步骤，深度优先、按声明顺序
    fn expand(
        scenario: &Scenario,
        path: &Path,
        stack: &mut Vec<PathBuf>,
        out: &mut Vec<FlatStep>,
    ) -> ParseResult<()> {
        let dir = parent_dir(path);
        for include in &scenario.includes {
            let files = Self::resolve_include(include, &dir).ok_or_else(|| {
                ParseError::new(
                    path,
                    format!("cannot find include file or directory '{}'", include),
                )
            })?;

            for file in files {
                let id = identity(&file);
                if stack.contains(&id) {
                    return Err(ParseError::new(
                        path,
                        format!("include cycle through '{}'", file.display()),
                    ));
                }

                let included = Self::parse_file(&file).map_err(|e| {
                    ParseError::new(
                        path,
                        format!("cannot include '{}': {}", file.display(), e.message),
                    )
                })?;
                tracing::debug!("Including '{}' into '{}'", file.display(), path.display());

                stack.push(id);
                Self::expand(&included, &file, stack, out)?;
                stack.pop();
            }
        }

        out.extend(flatten_steps(&scenario.steps, path));
        Ok(())
    }

    /// 目录展开为其中的场景文件；文件名可省略扩展名，也可以位于子目录
    fn resolve_include(include: &str, dir: &Path) -> Option<Vec<PathBuf>> {
        let candidate = dir.join(include);
        if candidate.is_dir() {
            return match FileSet::gather(&candidate, true) {
                Ok(files) => Some(files),
                Err(e) => {
                    tracing::warn!("Cannot read include directory '{}': {}", candidate.display(), e);
                    None
                }
            };
        }
        find_include(include, dir).map(|path| vec![path])
    }
}

fn find_include(include: &str, dir: &Path) -> Option<PathBuf> {
    let candidates = [
        dir.join(format!("{}.yml", include)),
        dir.join(format!("{}.yaml", include)),
        dir.join(include),
    ];
    if let Some(found) = candidates.into_iter().find(|p| p.is_file()) {
        return Some(found);
    }

    let mut subdirs: Vec<PathBuf> = fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_dir() && !is_ignored(p))
        .collect();
    subdirs.sort();
    subdirs.iter().find_map(|sub| find_include(include, sub))
}

/// 单个文件中的步骤展开
pub fn flatten_steps(steps: &[Step], origin: &Path) -> Vec<FlatStep> {
    let mut out = Vec::new();
    for step in steps {
        let units = step
            .request
            .iter()
            .cloned()
            .map(StepUnit::Request)
            .chain(step.filters.iter().cloned().map(StepUnit::Filter))
            .chain(step.handlers.iter().cloned().map(StepUnit::Handler))
            .chain(step.guards.iter().cloned().map(StepUnit::Guard));
        out.extend(units.map(|unit| FlatStep {
            unit,
            origin: origin.to_path_buf(),
        }));
    }
    out
}

fn parent_dir(path: &Path) -> PathBuf {
    path.parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn identity(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
