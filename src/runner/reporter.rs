use crate::request::ActiveRequest;
use crate::runner::types::{RunReport, ScenarioOutcome};
use crate::utils::ResponseFormatter;
use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, Table};

/// 控制台输出
pub struct Reporter {
    verbose: bool,
    quiet: bool,
    formatter: ResponseFormatter,
}

impl Reporter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            formatter: ResponseFormatter::new(),
        }
    }

    /// verbose 模式下打印一次请求及其响应
    pub fn print_exchange(&self, request: &ActiveRequest) {
        if !self.verbose {
            return;
        }
        if let Some(prepared) = request.prepared() {
            println!(" {} {}", "→".cyan(), self.formatter.request_line(&prepared.request));
        }
        if let Some(response) = request.response() {
            // 缩进显示
            for line in self.formatter.format(response).lines() {
                println!("   {}", line);
            }
            println!();
        }
    }

    /// 打印单个场景的结果
    pub fn print_outcome(&self, outcome: &ScenarioOutcome) {
        if self.quiet {
            return;
        }
        let symbol = if outcome.succeeded() {
            "✓".green()
        } else {
            "✗".red()
        };
        println!(
            " {} {} {} ({} steps, {} requests)",
            symbol,
            outcome.name.bold(),
            outcome.path.display().to_string().dimmed(),
            outcome.steps_run,
            outcome.requests_sent
        );
        for failure in &outcome.failures {
            println!("     {}", failure.to_string().red());
        }
    }

    pub fn print_ignored(&self, path: &std::path::Path) {
        if !self.quiet {
            println!(" {} {} {}", "⊘".dimmed(), path.display(), "(ignored)".dimmed());
        }
    }

    /// 数量汇总表
    pub fn summary_table(&self, report: &RunReport) -> Table {
        let failed = report.failed_count();
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_header(vec!["Run", "Failed", "Ignored", "Skipped", "Requests"]);
        table.add_row(vec![
            Cell::new(report.run_count).add_attribute(Attribute::Bold),
            Cell::new(failed).fg(if failed == 0 { Color::Green } else { Color::Red }),
            Cell::new(report.ignored_count).add_attribute(Attribute::Dim),
            Cell::new(report.skipped_count).fg(if report.skipped_count == 0 {
                Color::Reset
            } else {
                Color::Yellow
            }),
            Cell::new(report.requests_count),
        ]);
        table
    }

    /// 文本形式的运行结论
    pub fn summary(&self, report: &RunReport) -> String {
        let mut out = String::new();

        for error in &report.parse_errors {
            out.push_str(&format!(
                "\n{} '{}': {}",
                "Skipped".yellow().bold(),
                error.path.display(),
                error.message
            ));
        }
        if !report.parse_errors.is_empty() {
            out.push('\n');
        }

        if report.failures.is_empty() {
            let line = match report.run_count {
                0 => "No scenario to run.".to_string(),
                1 => "One scenario SUCCEEDED".to_string(),
                n => format!("{} scenarios SUCCEEDED", n),
            };
            out.push_str(&format!("\n{}", line.green().bold()));
            return out;
        }

        out.push_str(&format!("\n{}\n", "Errors summary:".bold()));
        for (i, (path, errors)) in report.failures.iter().enumerate() {
            out.push_str(&format!(
                "\n{}) Scenario '{}' failed with: ",
                i + 1,
                path.display()
            ));
            for error in errors {
                out.push_str("\n     ");
                out.push_str(error);
            }
        }
        let plural = if report.run_count > 1 { "s" } else { "" };
        let line = format!(
            "{} of {} scenario{} FAILED",
            report.failures.len(),
            report.run_count,
            plural
        );
        out.push_str(&format!("\n\n{}", line.red().bold()));
        out
    }

    pub fn print_summary(&self, report: &RunReport) {
        if !self.quiet {
            println!("\n{}", self.summary_table(report));
        }
        println!("{}\n", self.summary(report));
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new(false, false)
    }
}
