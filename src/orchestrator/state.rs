//! The orchestrator loop.
//!
//! Each pass goes `Selecting → Running → Classifying` and then commits, skips,
//! or halts. The loop ends when the backlog is done, a feature reports itself
//! blocked, or the iteration cap is hit.

use std::collections::{HashMap, HashSet};
use tracing::{Instrument, info, info_span, warn};

use super::runner::AgentRunner;
use crate::backlog::{BacklogStore, Feature};
use crate::config::Config;
use crate::errors::{BacklogError, OrchestratorError, TrackerError};
use crate::prompt::build_prompt;
use crate::signals::{IterationOutcome, detect};
use crate::tracker::{CommitResult, CommitSynchronizer};
use crate::ui::ConsoleUI;

/// Why the loop stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopStop {
    /// No pending features remain
    Finished,
    /// The agent emitted the blocked token; needs an operator
    Halted { feature_id: u64, title: String },
    /// `max_iterations` passes ran with work remaining
    IterationCapReached { max_iterations: u32 },
    /// Every pending feature hit the per-feature attempt limit
    AttemptsExhausted { pending: usize },
}

/// Summary of one `Orchestrator::run`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub iterations: u32,
    pub stop: LoopStop,
    /// Features marked done during this run, in order
    pub completed: Vec<u64>,
}

impl RunReport {
    pub fn is_finished(&self) -> bool {
        self.stop == LoopStop::Finished
    }
}

/// What a single pass did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IterationResult {
    Committed(CommitResult),
    Skipped(SkipReason),
    Halted,
}

/// Why a pass left its feature pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    AgentExit(i32),
    AgentError(String),
    Failed,
    CommitError(String),
}

pub struct Orchestrator<A: AgentRunner> {
    config: Config,
    store: BacklogStore,
    agent: A,
    sync: CommitSynchronizer,
    ui: ConsoleUI,
    attempts: HashMap<u64, u32>,
}

impl<A: AgentRunner> Orchestrator<A> {
    pub fn new(config: Config, agent: A, sync: CommitSynchronizer) -> Self {
        Self {
            store: BacklogStore::new(config.backlog_file.clone()),
            ui: ConsoleUI::new(config.verbose),
            config,
            agent,
            sync,
            attempts: HashMap::new(),
        }
    }

    /// Drive the agent through the backlog.
    ///
    /// A missing or malformed backlog is returned as an error; every
    /// agent-side failure is absorbed as a skipped pass.
    pub async fn run(&mut self) -> Result<RunReport, OrchestratorError> {
        let max = self.config.max_iterations;
        let mut completed = Vec::new();

        for iteration in 1..=max {
            // Selecting: the file on disk is authoritative every pass
            let backlog = self.store.load()?;
            if backlog.is_complete() {
                self.ui.all_done();
                return Ok(RunReport {
                    iterations: iteration - 1,
                    stop: LoopStop::Finished,
                    completed,
                });
            }

            let passed_over = self.passed_over();
            let Some(feature) = backlog.next_pending(&passed_over).cloned() else {
                self.ui.nothing_selectable();
                return Ok(RunReport {
                    iterations: iteration - 1,
                    stop: LoopStop::AttemptsExhausted {
                        pending: backlog.pending().count(),
                    },
                    completed,
                });
            };

            self.ui.start_iteration(
                iteration,
                max,
                backlog.pending().count(),
                &feature.title,
            );
            let unmet = backlog.unmet_dependencies(&feature);
            if !unmet.is_empty() {
                warn!(id = feature.id, ?unmet, "selected feature has unmet dependencies");
                self.ui.unmet_dependencies(&unmet);
            }

            let prompt = build_prompt(&feature, backlog.context());
            let span = info_span!("iteration", iteration, feature = feature.id);
            let result = self.run_iteration(iteration, &feature, &prompt).instrument(span).await?;

            match result {
                IterationResult::Halted => {
                    self.ui.blocked_notice();
                    return Ok(RunReport {
                        iterations: iteration,
                        stop: LoopStop::Halted {
                            feature_id: feature.id,
                            title: feature.title,
                        },
                        completed,
                    });
                }
                IterationResult::Committed(_) => completed.push(feature.id),
                IterationResult::Skipped(reason) => {
                    info!(id = feature.id, ?reason, "feature left pending");
                    self.record_attempt(&feature);
                }
            }

            if iteration < max && !self.config.iteration_delay.is_zero() {
                tokio::time::sleep(self.config.iteration_delay).await;
            }
        }

        // The last pass may have finished the backlog
        let stop = if self.store.load()?.is_complete() {
            self.ui.all_done();
            LoopStop::Finished
        } else {
            self.ui.cap_reached(max);
            LoopStop::IterationCapReached {
                max_iterations: max,
            }
        };
        Ok(RunReport {
            iterations: max,
            stop,
            completed,
        })
    }

    /// Running → Classifying → Committing/Skipping/Halted for one feature.
    async fn run_iteration(
        &mut self,
        iteration: u32,
        feature: &Feature,
        prompt: &str,
    ) -> Result<IterationResult, OrchestratorError> {
        self.ui.agent_start(&feature.title);

        let run = match self.agent.run(prompt).await {
            Ok(run) => run,
            Err(e) => {
                warn!(err = %e, "agent invocation failed");
                self.ui.agent_error(iteration, &feature.title, &e);
                return Ok(IterationResult::Skipped(SkipReason::AgentError(
                    e.to_string(),
                )));
            }
        };

        // A failed process is never classified from its text
        if !run.success() {
            self.ui
                .agent_exit_failure(iteration, &feature.title, run.exit_code);
            return Ok(IterationResult::Skipped(SkipReason::AgentExit(
                run.exit_code,
            )));
        }

        let outcome = detect(&run.output);
        info!(%outcome, "classified agent turn");
        self.ui.outcome(iteration, &feature.title, outcome);

        if outcome == IterationOutcome::Blocked {
            return Ok(IterationResult::Halted);
        }
        if !outcome.should_commit() {
            return Ok(IterationResult::Skipped(SkipReason::Failed));
        }

        match self.sync.commit(feature) {
            Ok(result) => {
                self.ui.committed(iteration, &feature.title, &result);
                Ok(IterationResult::Committed(result))
            }
            Err(TrackerError::Backlog(
                e @ (BacklogError::Missing { .. } | BacklogError::Malformed { .. }),
            )) => Err(e.into()),
            Err(e) => {
                warn!(err = %e, "failed to record feature completion");
                self.ui.commit_error(iteration, &feature.title, &e);
                Ok(IterationResult::Skipped(SkipReason::CommitError(
                    e.to_string(),
                )))
            }
        }
    }

    fn record_attempt(&mut self, feature: &Feature) {
        let attempts = self.attempts.entry(feature.id).or_insert(0);
        *attempts += 1;
        if let Some(limit) = self.config.max_attempts_per_feature
            && *attempts >= limit
        {
            warn!(id = feature.id, attempts = *attempts, "attempt limit reached");
            self.ui.attempts_exhausted(&feature.title, *attempts);
        }
    }

    fn passed_over(&self) -> HashSet<u64> {
        match self.config.max_attempts_per_feature {
            Some(limit) => self
                .attempts
                .iter()
                .filter(|(_, n)| **n >= limit)
                .map(|(id, _)| *id)
                .collect(),
            None => HashSet::new(),
        }
    }
}
