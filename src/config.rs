//! Runtime configuration for autorun.
//!
//! Settings are layered file → environment → CLI. The optional file lives at
//! `<project>/.autorun.toml`:
//!
//! ```toml
//! [agent]
//! command = "claude"
//! skip_permissions = true
//! scratch_file = ".prompt.txt"
//! # args = ["--print"]   # replaces the default flags entirely
//!
//! [run]
//! max_iterations = 100
//! max_attempts_per_feature = 0   # 0 = unlimited
//! iteration_delay_secs = 2
//! backlog_file = "feature_list.json"
//! progress_file = "claude-progress.txt"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::backlog::DEFAULT_BACKLOG_FILE;

/// Name of the optional config file inside the project directory.
pub const CONFIG_FILE: &str = ".autorun.toml";

/// Hard cap on loop passes.
pub const DEFAULT_MAX_ITERATIONS: u32 = 100;

/// `[agent]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSection {
    /// Agent CLI command (default: "claude")
    #[serde(default)]
    pub command: Option<String>,
    /// Explicit argument list; when set the default flags are not added
    #[serde(default)]
    pub args: Option<Vec<String>>,
    #[serde(default = "default_skip_permissions")]
    pub skip_permissions: bool,
    /// Scratch prompt file, relative to the project directory
    #[serde(default = "default_scratch_file")]
    pub scratch_file: String,
}

fn default_skip_permissions() -> bool {
    true
}

fn default_scratch_file() -> String {
    ".prompt.txt".to_string()
}

impl Default for AgentSection {
    fn default() -> Self {
        Self {
            command: None,
            args: None,
            skip_permissions: default_skip_permissions(),
            scratch_file: default_scratch_file(),
        }
    }
}

/// `[run]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSection {
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    /// Attempts per feature within one run; 0 disables the limit
    #[serde(default)]
    pub max_attempts_per_feature: u32,
    #[serde(default = "default_iteration_delay_secs")]
    pub iteration_delay_secs: u64,
    #[serde(default = "default_backlog_file")]
    pub backlog_file: String,
    #[serde(default = "default_progress_file")]
    pub progress_file: String,
}

fn default_max_iterations() -> u32 {
    DEFAULT_MAX_ITERATIONS
}

fn default_iteration_delay_secs() -> u64 {
    2
}

fn default_backlog_file() -> String {
    DEFAULT_BACKLOG_FILE.to_string()
}

fn default_progress_file() -> String {
    "claude-progress.txt".to_string()
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            max_attempts_per_feature: 0,
            iteration_delay_secs: default_iteration_delay_secs(),
            backlog_file: default_backlog_file(),
            progress_file: default_progress_file(),
        }
    }
}

/// Contents of `.autorun.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AutorunToml {
    #[serde(default)]
    pub agent: AgentSection,
    #[serde(default)]
    pub run: RunSection,
}

impl AutorunToml {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse .autorun.toml")
    }

    /// Load `<project_dir>/.autorun.toml`, or defaults if there is none.
    pub fn load_or_default(project_dir: &Path) -> Result<Self> {
        let config_path = project_dir.join(CONFIG_FILE);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Agent command (file → env → default).
    pub fn agent_cmd(&self) -> String {
        self.agent
            .command
            .clone()
            .or_else(|| std::env::var("AUTORUN_AGENT_CMD").ok())
            .unwrap_or_else(|| "claude".to_string())
    }

    /// skip_permissions (env can override file).
    pub fn skip_permissions(&self) -> bool {
        if let Ok(env_val) = std::env::var("SKIP_PERMISSIONS") {
            return env_val != "false";
        }
        self.agent.skip_permissions
    }
}

/// Orchestrator context: the project root and everything derived from it.
///
/// Components receive this instead of relying on the process working directory.
#[derive(Debug, Clone)]
pub struct Config {
    pub project_dir: PathBuf,
    pub backlog_file: PathBuf,
    pub progress_file: PathBuf,
    pub scratch_file: PathBuf,
    pub agent_cmd: String,
    pub agent_args: Option<Vec<String>>,
    pub skip_permissions: bool,
    pub max_iterations: u32,
    pub max_attempts_per_feature: Option<u32>,
    pub iteration_delay: Duration,
    pub verbose: bool,
}

impl Config {
    /// Resolve the project directory and load its `.autorun.toml`.
    pub fn new(project_dir: PathBuf, verbose: bool) -> Result<Self> {
        let project_dir = project_dir.canonicalize().with_context(|| {
            format!(
                "Failed to resolve project directory: {}",
                project_dir.display()
            )
        })?;
        let toml = AutorunToml::load_or_default(&project_dir)?;
        Ok(Self::from_toml(project_dir, &toml, verbose))
    }

    pub fn from_toml(project_dir: PathBuf, toml: &AutorunToml, verbose: bool) -> Self {
        Self {
            backlog_file: project_dir.join(&toml.run.backlog_file),
            progress_file: project_dir.join(&toml.run.progress_file),
            scratch_file: project_dir.join(&toml.agent.scratch_file),
            agent_cmd: toml.agent_cmd(),
            agent_args: toml.agent.args.clone(),
            skip_permissions: toml.skip_permissions(),
            max_iterations: toml.run.max_iterations,
            max_attempts_per_feature: Some(toml.run.max_attempts_per_feature)
                .filter(|n| *n > 0),
            iteration_delay: Duration::from_secs(toml.run.iteration_delay_secs),
            verbose,
            project_dir,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Arguments passed to the agent command.
    pub fn agent_flags(&self) -> Vec<String> {
        if let Some(args) = &self.agent_args {
            return args.clone();
        }
        let mut flags = vec!["--print".to_string()];
        if self.skip_permissions {
            flags.push("--dangerously-skip-permissions".to_string());
        }
        flags
    }

    /// Printable form of the agent command line.
    pub fn agent_display(&self) -> String {
        let flags = self.agent_flags();
        if flags.is_empty() {
            self.agent_cmd.clone()
        } else {
            format!("{} {}", self.agent_cmd, flags.join(" "))
        }
    }
}
