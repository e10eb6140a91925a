use crate::config::Config;
use crate::http::Client;
use crate::request::ActiveRequest;
use crate::runner::reporter::Reporter;
use crate::runner::types::{Failure, ScenarioOutcome, ScenarioState};
use crate::scenario::{FlatStep, LoadedScenario, StepUnit};
use crate::step::{HandlerRegistry, filter, guard, handler};
use crate::variable::VariableStore;

/// 在同一场景的步骤之间传递的状态
pub struct ExecutionContext<'a> {
    pub store: &'a mut VariableStore,
    /// 后续的 guard/filter/handler 作用于最近一次的请求
    pub last_request: Option<ActiveRequest>,
    pub failures: Vec<Failure>,
    pub requests_sent: usize,
}

impl<'a> ExecutionContext<'a> {
    pub fn new(store: &'a mut VariableStore) -> Self {
        Self {
            store,
            last_request: None,
            failures: Vec::new(),
            requests_sent: 0,
        }
    }

    /// 把上一个请求的发送次数计入总数，再换成新的请求
    fn replace_request(&mut self, request: ActiveRequest) {
        self.flush_request();
        self.last_request = Some(request);
    }

    fn flush_request(&mut self) {
        if let Some(previous) = self.last_request.take() {
            self.requests_sent += previous.send_count();
        }
    }
}

/// 顺序执行一个已展开场景的所有条目
pub struct ScenarioRunner<'a> {
    client: &'a Client,
    config: &'a Config,
    handlers: &'a HandlerRegistry,
    fail_on_error: bool,
    reporter: Option<&'a Reporter>,
}

impl<'a> ScenarioRunner<'a> {
    pub fn new(client: &'a Client, config: &'a Config, handlers: &'a HandlerRegistry) -> Self {
        Self {
            client,
            config,
            handlers,
            fail_on_error: config.fail_on_error(),
            reporter: None,
        }
    }

    pub fn fail_on_error(mut self, enabled: bool) -> Self {
        self.fail_on_error = enabled;
        self
    }

    /// 每次请求后由 reporter 输出请求和响应
    pub fn with_reporter(mut self, reporter: &'a Reporter) -> Self {
        self.reporter = Some(reporter);
        self
    }

    pub fn run(&self, scenario: &LoadedScenario, store: &mut VariableStore) -> ScenarioOutcome {
        tracing::info!("{}", "-".repeat(80));
        tracing::info!("Running scenario {}", scenario.name);

        let mut ctx = ExecutionContext::new(store);
        let mut steps_run = 0;
        for (index, step) in scenario.steps.iter().enumerate() {
            steps_run += 1;

            let messages = self.execute(step, &mut ctx);
            let produced_failure = !messages.is_empty();
            ctx.failures.extend(messages.into_iter().map(|message| Failure {
                step: index + 1,
                origin: step.origin.clone(),
                message,
            }));

            if produced_failure && self.fail_on_error {
                tracing::error!(
                    "Stopping scenario '{}' at step #{} ({})",
                    scenario.name,
                    index + 1,
                    step.unit.kind()
                );
                break;
            }
        }
        ctx.flush_request();

        let state = if ctx.failures.is_empty() {
            ScenarioState::Succeeded
        } else {
            ScenarioState::Failed
        };
        match state {
            ScenarioState::Succeeded => tracing::info!("Scenario '{}' succeeded", scenario.name),
            _ => tracing::error!(
                "Scenario '{}' failed with {} failure(s)",
                scenario.name,
                ctx.failures.len()
            ),
        }

        ScenarioOutcome {
            name: scenario.name.clone(),
            path: scenario.path.clone(),
            state,
            failures: ctx.failures,
            requests_sent: ctx.requests_sent,
            steps_run,
        }
    }

    /// 执行单个条目，返回它产生的失败（包括当前请求新增的失败）
    fn execute(&self, step: &FlatStep, ctx: &mut ExecutionContext<'_>) -> Vec<String> {
        let mut failures = match &step.unit {
            StepUnit::Request(descriptor) => {
                let mut request = ActiveRequest::prepare(descriptor, ctx.store, self.config);
                request.dispatch(self.client);
                if let Some(reporter) = self.reporter {
                    reporter.print_exchange(&request);
                }
                ctx.replace_request(request);
                Vec::new()
            }
            StepUnit::Guard(g) => {
                let outcome = guard::wait(g, ctx.last_request.as_mut(), ctx.store, self.client);
                tracing::debug!("Guard '{}' finished as {:?}", g.name, outcome.state);
                if outcome.resends > 0
                    && let (Some(reporter), Some(request)) = (self.reporter, &ctx.last_request)
                {
                    reporter.print_exchange(request);
                }
                outcome.failures
            }
            StepUnit::Filter(f) => {
                let response = ctx.last_request.as_ref().and_then(ActiveRequest::response);
                filter::run(f, response, ctx.store)
            }
            StepUnit::Handler(h) => handler::run(h, ctx.last_request.as_ref(), self.handlers),
        };

        if let Some(request) = ctx.last_request.as_mut() {
            let mut fresh = request.take_new_failures();
            fresh.append(&mut failures);
            failures = fresh;
        }
        failures
    }
}
