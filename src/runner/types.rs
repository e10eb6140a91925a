use crate::error::ParseError;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// 带步骤序号和来源文件的失败
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    /// 展开后条目的序号（从 1 开始）
    pub step: usize,
    pub origin: PathBuf,
    pub message: String,
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Step #{} from '{}': {}",
            self.step,
            self.origin.display(),
            self.message
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioState {
    Succeeded,
    Failed,
}

/// 单个场景的执行结果
#[derive(Debug, Clone)]
pub struct ScenarioOutcome {
    pub name: String,
    pub path: PathBuf,
    pub state: ScenarioState,
    pub failures: Vec<Failure>,
    /// 被接受的请求发送次数
    pub requests_sent: usize,
    /// 实际执行到的条目数
    pub steps_run: usize,
}

impl ScenarioOutcome {
    pub fn succeeded(&self) -> bool {
        self.state == ScenarioState::Succeeded
    }
}

/// 一次运行（可能包含多个场景文件）的汇总
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub run_count: usize,
    pub ignored_count: usize,
    pub skipped_count: usize,
    pub requests_count: usize,
    /// 场景文件 -> 按顺序的失败描述
    pub failures: BTreeMap<PathBuf, Vec<String>>,
    /// 被跳过文件的结构性错误
    pub parse_errors: Vec<ParseError>,
    pub outcomes: Vec<ScenarioOutcome>,
}

impl RunReport {
    pub fn succeeded(&self) -> bool {
        self.failures.is_empty() && self.parse_errors.is_empty()
    }

    pub fn failed_count(&self) -> usize {
        self.failures.len()
    }

    pub(crate) fn record(&mut self, outcome: ScenarioOutcome) {
        self.run_count += 1;
        self.requests_count += outcome.requests_sent;
        if !outcome.failures.is_empty() {
            self.failures.insert(
                outcome.path.clone(),
                outcome.failures.iter().map(ToString::to_string).collect(),
            );
        }
        self.outcomes.push(outcome);
    }

    pub(crate) fn skip(&mut self, error: ParseError) {
        self.skipped_count += 1;
        self.parse_errors.push(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(path: &str, failures: Vec<Failure>) -> ScenarioOutcome {
        let state = if failures.is_empty() {
            ScenarioState::Succeeded
        } else {
            ScenarioState::Failed
        };
        ScenarioOutcome {
            name: path.into(),
            path: PathBuf::from(path),
            state,
            failures,
            requests_sent: 2,
            steps_run: 3,
        }
    }

    #[test]
    fn test_failure_display() {
        let failure = Failure {
            step: 3,
            origin: PathBuf::from("scenarios/login.yml"),
            message: "Request returned 404".into(),
        };
        assert_eq!(
            failure.to_string(),
            "Step #3 from 'scenarios/login.yml': Request returned 404"
        );
    }

    #[test]
    fn test_report_accumulates() {
        let mut report = RunReport::default();
        report.record(outcome("a.yml", Vec::new()));
        assert!(report.succeeded());

        report.record(outcome(
            "b.yml",
            vec![Failure {
                step: 1,
                origin: PathBuf::from("b.yml"),
                message: "boom".into(),
            }],
        ));
        report.skip(ParseError::new("c.yml", "bad document"));

        assert_eq!(report.run_count, 2);
        assert_eq!(report.requests_count, 4);
        assert_eq!(report.skipped_count, 1);
        assert_eq!(report.failed_count(), 1);
        assert_eq!(
            report.failures[&PathBuf::from("b.yml")],
            vec!["Step #1 from 'b.yml': boom"]
        );
        assert!(!report.succeeded());
    }
}
