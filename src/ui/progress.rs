use crate::backlog::Backlog;
use crate::report::render_summary;
use crate::signals::IterationOutcome;
use crate::tracker::CommitResult;
use crate::ui::icons::{BLOCKER, CHECK, COMMIT, CROSS, RUNNING, SPARKLE, STOP, WARN};
use console::style;
use std::path::Path;

const RULE_WIDE: usize = 60;
const RULE: usize = 50;

/// Line-oriented terminal output for the orchestrator loop.
///
/// The agent's own output streams straight to stdout between these lines, so
/// nothing here redraws or holds the cursor.
pub struct ConsoleUI {
    verbose: bool,
}

impl ConsoleUI {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    fn print_line(&self, msg: impl AsRef<str>) {
        println!("{}", msg.as_ref());
    }

    fn banner(&self, title: &str, width: usize) {
        let rule = "=".repeat(width);
        self.print_line(&rule);
        self.print_line(style(title).bold().to_string());
        self.print_line(&rule);
    }

    pub fn start_run(&self, project_dir: &Path, agent: &str) {
        self.banner("AUTO-RUN HARNESS: Starting", RULE_WIDE);
        self.print_line(format!("Project: {}", project_dir.display()));
        self.print_line(format!(
            "Time: {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        ));
        if self.verbose {
            self.print_line(format!("Agent: {}", style(agent).dim()));
        }
        self.print_line("");
    }

    pub fn start_iteration(&self, iteration: u32, max: u32, remaining: usize, next: &str) {
        self.print_line("");
        self.banner(&format!("ITERATION {}/{}", iteration, max), RULE);
        self.print_line(format!("Remaining: {} features", remaining));
        self.print_line(format!("Next: {}", style(next).cyan()));
        self.print_line("");
    }

    pub fn unmet_dependencies(&self, unmet: &[u64]) {
        let ids: Vec<String> = unmet.iter().map(|id| id.to_string()).collect();
        self.print_line(
            style(format!(
                "  (dependencies not yet done: {}; running in backlog order)",
                ids.join(", ")
            ))
            .dim()
            .to_string(),
        );
    }

    pub fn agent_start(&self, feature_title: &str) {
        let rule = "-".repeat(40);
        self.print_line(&rule);
        self.print_line(format!("{}Running agent for '{}'...", RUNNING, feature_title));
        self.print_line(&rule);
    }

    pub fn agent_exit_failure(&self, iteration: u32, title: &str, exit_code: i32) {
        self.print_line(format!("\n{}{}", CROSS, exit_failure_line(iteration, title, exit_code)));
    }

    pub fn agent_error(&self, iteration: u32, title: &str, err: &dyn std::fmt::Display) {
        self.print_line(format!(
            "\n{}{}: agent error: {}",
            CROSS,
            iteration_tag(iteration, title),
            style(err).red()
        ));
    }

    pub fn outcome(&self, iteration: u32, title: &str, outcome: IterationOutcome) {
        let icon = match outcome {
            IterationOutcome::Complete => CHECK,
            IterationOutcome::AssumedSuccess => WARN,
            IterationOutcome::Failed => CROSS,
            IterationOutcome::Blocked => BLOCKER,
        };
        self.print_line(format!("\n{}{}", icon, outcome_line(iteration, title, outcome)));
    }

    pub fn blocked_notice(&self) {
        self.print_line(
            style("Human intervention required. Resolve the issue and run again.")
                .yellow()
                .bold()
                .to_string(),
        );
    }

    pub fn committed(&self, iteration: u32, title: &str, result: &CommitResult) {
        self.print_line(format!("{}{}", COMMIT, committed_line(iteration, title, result)));
    }

    pub fn commit_error(&self, iteration: u32, title: &str, err: &dyn std::fmt::Display) {
        self.print_line(format!(
            "{}{}: failed to record progress: {}",
            CROSS,
            iteration_tag(iteration, title),
            style(err).red()
        ));
    }

    pub fn attempts_exhausted(&self, title: &str, attempts: u32) {
        self.print_line(format!(
            "{}'{}' used all {} attempts; passing over it for this run",
            WARN, title, attempts
        ));
    }

    pub fn all_done(&self) {
        self.print_line(format!("\n{}All features completed!", SPARKLE));
    }

    pub fn cap_reached(&self, max: u32) {
        self.print_line(format!(
            "\n{}Iteration limit ({}) reached with work remaining",
            STOP, max
        ));
    }

    pub fn nothing_selectable(&self) {
        self.print_line(format!(
            "\n{}Every pending feature has exhausted its attempts",
            STOP
        ));
    }

    pub fn interrupted(&self) {
        self.print_line(format!("\n\n{}Stopped by user.", STOP));
    }

    pub fn summary(&self, backlog: &Backlog) {
        self.print_line("");
        self.banner("AUTO-RUN SUMMARY", RULE_WIDE);
        print!("{}", render_summary(backlog));
    }
}

/// Prefix for every per-iteration result line.
fn iteration_tag(iteration: u32, title: &str) -> String {
    format!("Iteration {} '{}'", iteration, title)
}

fn exit_failure_line(iteration: u32, title: &str, exit_code: i32) -> String {
    format!(
        "{}: agent exited with code {}",
        iteration_tag(iteration, title),
        exit_code
    )
}

fn outcome_line(iteration: u32, title: &str, outcome: IterationOutcome) -> String {
    let tag = iteration_tag(iteration, title);
    match outcome {
        IterationOutcome::Complete => format!("{}: COMPLETE", tag),
        IterationOutcome::AssumedSuccess => {
            format!("{}: no completion signal detected, assuming success", tag)
        }
        IterationOutcome::Failed => format!("{}: FAILED - skipping and continuing", tag),
        IterationOutcome::Blocked => format!("{}: BLOCKED", tag),
    }
}

fn committed_line(iteration: u32, title: &str, result: &CommitResult) -> String {
    let tag = iteration_tag(iteration, title);
    match result {
        CommitResult::Committed { sha, message } => {
            let short = &sha[..sha.len().min(8)];
            format!("{}: committed {} {}", tag, short, message)
        }
        CommitResult::NoChanges => format!("{}: no changes to commit", tag),
    }
}
