//! Driving the agent: process launch, the scratch prompt, and the loop itself.

pub mod runner;
pub mod scratch;
pub mod state;

pub use runner::{AgentRun, AgentRunner, ClaudeRunner};
pub use scratch::{ScratchPrompt, remove_stale};
pub use state::{IterationResult, LoopStop, Orchestrator, RunReport, SkipReason};
