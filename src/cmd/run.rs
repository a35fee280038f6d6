//! `autorun run <dir>`: the orchestrator loop with Ctrl+C handling.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{info, warn};

use autorun::backlog::{Backlog, BacklogStore};
use autorun::config::Config;

/// Load the backlog, turning a missing file into an operator-facing hint.
pub fn load_backlog(config: &Config) -> Result<Backlog> {
    let store = BacklogStore::new(config.backlog_file.clone());
    match store.load() {
        Ok(backlog) => Ok(backlog),
        Err(e) if e.is_missing() => anyhow::bail!(
            "{}\nCreate it first: a JSON list of features with id, title and description.",
            e
        ),
        Err(e) => Err(e.into()),
    }
}

pub async fn cmd_run(
    project_dir: PathBuf,
    verbose: bool,
    max_iterations: Option<u32>,
) -> Result<()> {
    use autorun::orchestrator::{ClaudeRunner, LoopStop, Orchestrator, remove_stale};
    use autorun::tracker::{CommitSynchronizer, GitTracker};
    use autorun::ui::ConsoleUI;

    let mut config = Config::new(project_dir, verbose)?;
    if let Some(max) = max_iterations {
        config = config.with_max_iterations(max);
    }

    // Fail before touching git or spawning anything
    load_backlog(&config)?;

    let ui = ConsoleUI::new(verbose);
    ui.start_run(&config.project_dir, &config.agent_display());

    // Left behind by a run that was killed outright
    remove_stale(&config.scratch_file);

    let store = BacklogStore::new(config.backlog_file.clone());
    let tracker = GitTracker::open_or_init(&config.project_dir).with_context(|| {
        format!(
            "Failed to open git repository at {}",
            config.project_dir.display()
        )
    })?;
    let sync = CommitSynchronizer::new(tracker, store.clone(), config.progress_file.clone());
    let agent = ClaudeRunner::new(&config);
    let mut orchestrator = Orchestrator::new(config, agent, sync);

    // Dropping the loop future kills the agent and removes the scratch prompt
    let result = tokio::select! {
        result = orchestrator.run() => Some(result),
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to install Ctrl+C handler")?;
            None
        }
    };

    match result {
        None => {
            warn!("interrupted by user");
            ui.interrupted();
        }
        Some(result) => {
            let report = result?;
            info!(
                iterations = report.iterations,
                committed = report.completed.len(),
                stop = ?report.stop,
                "run finished"
            );
            if let LoopStop::Halted { feature_id, title } = &report.stop {
                println!("Blocked on [{}] {}", feature_id, title);
            }
        }
    }

    match store.load() {
        Ok(backlog) => ui.summary(&backlog),
        Err(e) => warn!(err = %e, "could not reload backlog for summary"),
    }

    Ok(())
}
