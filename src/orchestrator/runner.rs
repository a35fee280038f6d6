use async_trait::async_trait;
use std::io::Write;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::scratch::ScratchPrompt;
use crate::config::Config;
use crate::errors::AgentError;

/// Result of one agent invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentRun {
    /// Process exit code, -1 if it was killed by a signal
    pub exit_code: i32,
    /// Combined stdout/stderr in arrival order
    pub output: String,
}

impl AgentRun {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs the agent once for a prompt. A non-zero exit is a normal `Ok` result;
/// `Err` means the process could not be launched or supervised.
#[async_trait]
pub trait AgentRunner: Send + Sync {
    async fn run(&self, prompt: &str) -> Result<AgentRun, AgentError>;
}

/// Launches the configured agent CLI as a child process.
pub struct ClaudeRunner {
    program: String,
    args: Vec<String>,
    workdir: PathBuf,
    scratch_file: PathBuf,
}

impl ClaudeRunner {
    pub fn new(config: &Config) -> Self {
        Self {
            program: config.agent_cmd.clone(),
            args: config.agent_flags(),
            workdir: config.project_dir.clone(),
            scratch_file: config.scratch_file.clone(),
        }
    }

    fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[async_trait]
impl AgentRunner for ClaudeRunner {
    async fn run(&self, prompt: &str) -> Result<AgentRun, AgentError> {
        let scratch = ScratchPrompt::create(&self.scratch_file, prompt)?;
        let start = Instant::now();

        // The prompt file is the child's only input; it can never wait on a terminal.
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .current_dir(&self.workdir)
            .stdin(Stdio::from(scratch.open()?))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| AgentError::SpawnFailed {
                command: self.display(),
                source,
            })?;
        info!(pid = child.id().unwrap_or(0), command = %self.display(), "agent spawned");

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| AgentError::StreamFailed(std::io::Error::other("stdout was not piped")))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| AgentError::StreamFailed(std::io::Error::other("stderr was not piped")))?;

        let output = stream_output(stdout, stderr, |chunk| {
            print!("{}", chunk);
            let _ = std::io::stdout().flush();
        })
        .await?;

        let status = child.wait().await.map_err(AgentError::WaitFailed)?;
        drop(scratch);

        let exit_code = status.code().unwrap_or(-1);
        if exit_code == 0 {
            debug!(elapsed_secs = start.elapsed().as_secs_f64(), "agent exited cleanly");
        } else {
            warn!(exit_code, elapsed_secs = start.elapsed().as_secs_f64(), "agent exited with failure");
        }

        Ok(AgentRun { exit_code, output })
    }
}

/// Read two streams line by line as data arrives, handing every line to
/// `forward` and keeping the full text.
///
/// Invalid UTF-8 is replaced rather than treated as an error.
pub async fn stream_output<O, E, F>(stdout: O, stderr: E, mut forward: F) -> Result<String, AgentError>
where
    O: AsyncRead + Unpin,
    E: AsyncRead + Unpin,
    F: FnMut(&str),
{
    let mut stdout = BufReader::new(stdout);
    let mut stderr = BufReader::new(stderr);
    let mut out_buf = Vec::new();
    let mut err_buf = Vec::new();
    let mut out_open = true;
    let mut err_open = true;
    let mut captured = String::new();

    // read_until keeps partial data in its buffer when the other branch wins
    while out_open || err_open {
        tokio::select! {
            read = stdout.read_until(b'\n', &mut out_buf), if out_open => {
                if read.map_err(AgentError::StreamFailed)? == 0 {
                    out_open = false;
                } else {
                    let chunk = String::from_utf8_lossy(&out_buf);
                    forward(&chunk);
                    captured.push_str(&chunk);
                    out_buf.clear();
                }
            }
            read = stderr.read_until(b'\n', &mut err_buf), if err_open => {
                if read.map_err(AgentError::StreamFailed)? == 0 {
                    err_open = false;
                } else {
                    let chunk = String::from_utf8_lossy(&err_buf);
                    forward(&chunk);
                    captured.push_str(&chunk);
                    err_buf.clear();
                }
            }
        }
    }

    Ok(captured)
}
