//! Integration tests for autorun
//!
//! These drive the binary end to end, using `sh -c` as a stand-in agent.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Helper to create an autorun Command
fn autorun() -> Command {
    cargo_bin_cmd!("autorun")
}

/// Helper to create a temporary project directory
fn create_temp_project() -> TempDir {
    TempDir::new().unwrap()
}

fn write_backlog(dir: &Path, json: &str) {
    fs::write(dir.join("feature_list.json"), json).unwrap();
}

/// Point the project at a shell script as its agent, with no delay between passes
fn write_agent_script(dir: &Path, script: &str) {
    let toml = format!(
        "[agent]\ncommand = \"sh\"\nargs = [\"-c\", {:?}]\n\n[run]\niteration_delay_secs = 0\n",
        script
    );
    fs::write(dir.join(".autorun.toml"), toml).unwrap();
}

fn read_backlog(dir: &Path) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(dir.join("feature_list.json")).unwrap()).unwrap()
}

fn head_message(dir: &Path) -> Option<String> {
    let repo = git2::Repository::open(dir).ok()?;
    let head = repo.head().ok()?.peel_to_commit().ok()?;
    head.message().map(str::to_string)
}

const TWO_FEATURES: &str = r#"[
  {"id": 1, "title": "Login page", "description": "Email and password form", "priority": "high", "done": false},
  {"id": 2, "title": "Logout", "description": "Clear the session", "dependencies": [1], "done": false}
]"#;

// =============================================================================
// Basic CLI Tests
// =============================================================================

mod cli_basics {
    use super::*;

    #[test]
    fn test_autorun_help() {
        autorun()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("run"))
            .stdout(predicate::str::contains("status"));
    }

    #[test]
    fn test_autorun_version() {
        autorun().arg("--version").assert().success();
    }

    #[test]
    fn test_run_without_backlog_fails() {
        let dir = create_temp_project();

        autorun()
            .arg("run")
            .arg(dir.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("No backlog found"));

        // Nothing was set up for a run that never started
        assert!(!dir.path().join(".git").exists());
    }

    #[test]
    fn test_run_with_malformed_backlog_fails() {
        let dir = create_temp_project();
        write_backlog(dir.path(), "{ not json");

        autorun()
            .arg("run")
            .arg(dir.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("Malformed backlog"));
    }

    #[test]
    fn test_run_with_malformed_config_fails() {
        let dir = create_temp_project();
        write_backlog(dir.path(), TWO_FEATURES);
        fs::write(dir.path().join(".autorun.toml"), "[run\n").unwrap();

        autorun()
            .arg("run")
            .arg(dir.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid config file"));
    }

    #[test]
    fn test_run_missing_project_dir_fails() {
        let dir = create_temp_project();

        autorun()
            .arg("run")
            .arg(dir.path().join("nope"))
            .assert()
            .failure();
    }
}

// =============================================================================
// Status Tests
// =============================================================================

mod status {
    use super::*;

    #[test]
    fn test_status_lists_features() {
        let dir = create_temp_project();
        write_backlog(dir.path(), TWO_FEATURES);

        autorun()
            .arg("status")
            .arg(dir.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("Completed: 0/2 features"))
            .stdout(predicate::str::contains("[1] Login page"));
    }

    #[test]
    fn test_status_reads_wrapped_backlog() {
        let dir = create_temp_project();
        write_backlog(
            dir.path(),
            r#"{"project_context": {"name": "Shop"}, "features": [
                {"id": 1, "title": "Cart", "done": true}
            ]}"#,
        );

        autorun()
            .arg("status")
            .arg(dir.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("Completed: 1/1 features"));
    }

    #[test]
    fn test_status_without_backlog_fails() {
        let dir = create_temp_project();

        autorun().arg("status").arg(dir.path()).assert().failure();
    }
}

// =============================================================================
// Loop Tests (shell script as the agent)
// =============================================================================

#[cfg(unix)]
mod run_loop {
    use super::*;

    #[test]
    fn test_completes_every_feature() {
        let dir = create_temp_project();
        write_backlog(dir.path(), TWO_FEATURES);
        write_agent_script(
            dir.path(),
            "cat > /dev/null; date +%s%N >> work.txt; echo FEATURE_COMPLETE",
        );

        autorun()
            .arg("run")
            .arg(dir.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("ITERATION 1/100"))
            .stdout(predicate::str::contains("ITERATION 2/100"))
            .stdout(predicate::str::contains("All features completed!"))
            .stdout(predicate::str::contains("Completed: 2/2 features"));

        let backlog = read_backlog(dir.path());
        assert_eq!(backlog[0]["done"], true);
        assert_eq!(backlog[1]["done"], true);
        // Unknown fields survive the rewrite
        assert_eq!(backlog[0]["priority"], "high");

        assert_eq!(head_message(dir.path()).as_deref(), Some("feat: Logout"));
        assert!(!dir.path().join(".prompt.txt").exists());

        let progress = fs::read_to_string(dir.path().join("claude-progress.txt")).unwrap();
        assert!(progress.contains("# Status: 2/2 features complete"));
    }

    #[test]
    fn test_prompt_reaches_agent_stdin() {
        let dir = create_temp_project();
        write_backlog(dir.path(), TWO_FEATURES);
        write_agent_script(dir.path(), "cat; echo FEATURE_BLOCKED");

        autorun()
            .arg("run")
            .arg(dir.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("CURRENT TASK: Login page"))
            .stdout(predicate::str::contains("Email and password form"));
    }

    #[test]
    fn test_blocked_halts_after_one_iteration() {
        let dir = create_temp_project();
        write_backlog(dir.path(), TWO_FEATURES);
        write_agent_script(
            dir.path(),
            "cat > /dev/null; echo partial > work.txt; echo 'missing API key'; echo FEATURE_BLOCKED",
        );

        autorun()
            .arg("run")
            .arg(dir.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("Iteration 1 'Login page': BLOCKED"))
            .stdout(predicate::str::contains("Human intervention required"))
            .stdout(predicate::str::contains("ITERATION 2/").not());

        assert_eq!(read_backlog(dir.path())[0]["done"], false);
        assert_eq!(head_message(dir.path()), None);
    }

    #[test]
    fn test_failure_is_retried_until_cap() {
        let dir = create_temp_project();
        write_backlog(dir.path(), TWO_FEATURES);
        write_agent_script(dir.path(), "cat > /dev/null; echo FEATURE_FAILED");

        autorun()
            .args(["run", "--max-iterations", "3"])
            .arg(dir.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("ITERATION 3/3"))
            .stdout(predicate::str::contains("Iteration 3 'Login page': FAILED"))
            .stdout(predicate::str::contains("Iteration limit (3) reached"))
            .stdout(predicate::str::contains("Next: Logout").not());

        assert_eq!(read_backlog(dir.path())[0]["done"], false);
    }

    #[test]
    fn test_nonzero_exit_is_not_committed() {
        let dir = create_temp_project();
        write_backlog(dir.path(), TWO_FEATURES);
        write_agent_script(
            dir.path(),
            "cat > /dev/null; echo x > work.txt; echo FEATURE_COMPLETE; exit 2",
        );

        autorun()
            .args(["run", "--max-iterations", "1"])
            .arg(dir.path())
            .assert()
            .success()
            .stdout(predicate::str::contains(
                "Iteration 1 'Login page': agent exited with code 2",
            ));

        assert_eq!(read_backlog(dir.path())[0]["done"], false);
        assert_eq!(head_message(dir.path()), None);
    }

    #[test]
    fn test_missing_signal_assumes_success() {
        let dir = create_temp_project();
        write_backlog(dir.path(), r#"[{"id": 1, "title": "Readme"}]"#);
        write_agent_script(dir.path(), "cat > /dev/null; echo docs > README.md; echo done");

        autorun()
            .arg("run")
            .arg(dir.path())
            .assert()
            .success()
            .stdout(predicate::str::contains(
                "Iteration 1 'Readme': no completion signal detected, assuming success",
            ));

        assert_eq!(read_backlog(dir.path())[0]["done"], true);
        assert_eq!(head_message(dir.path()).as_deref(), Some("feat: Readme"));
    }

    #[test]
    fn test_attempt_limit_stops_run() {
        let dir = create_temp_project();
        write_backlog(dir.path(), r#"[{"id": 1, "title": "Flaky"}]"#);
        fs::write(
            dir.path().join(".autorun.toml"),
            "[agent]\ncommand = \"sh\"\nargs = [\"-c\", \"cat > /dev/null; echo FEATURE_FAILED\"]\n\n\
             [run]\niteration_delay_secs = 0\nmax_attempts_per_feature = 2\n",
        )
        .unwrap();

        autorun()
            .arg("run")
            .arg(dir.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("ITERATION 2/100"))
            .stdout(predicate::str::contains("ITERATION 3/100").not())
            .stdout(predicate::str::contains("exhausted its attempts"));
    }

    #[test]
    fn test_already_complete_backlog_runs_nothing() {
        let dir = create_temp_project();
        write_backlog(dir.path(), r#"[{"id": 1, "title": "Done", "done": true}]"#);
        write_agent_script(dir.path(), "echo should-not-run > ran.txt");

        autorun()
            .arg("run")
            .arg(dir.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("All features completed!"));

        assert!(!dir.path().join("ran.txt").exists());
    }
}
