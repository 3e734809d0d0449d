//! Small helpers for spawning external commands

use anyhow::{Context, Result};
use std::process::{Command, ExitStatus};

/// Run a command inheriting stdio, returning its exit status
pub fn run(cmd: &str, args: &[&str]) -> Result<ExitStatus> {
    Command::new(cmd)
        .args(args)
        .status()
        .with_context(|| format!("Failed to execute {cmd}"))
}

/// Run a query command, answering no when it cannot be spawned
///
/// Resource checkers use this so a missing query tool reads as absent
/// instead of aborting the run; the apply path installs the tooling or
/// surfaces the real error.
pub fn query_ok(cmd: &str, args: &[&str]) -> bool {
    match Command::new(cmd).args(args).output() {
        Ok(output) => output.status.success(),
        Err(e) => {
            log::debug!("query {cmd} failed to spawn: {e}");
            false
        }
    }
}

/// Check whether an executable is reachable on $PATH
pub fn command_exists(cmd: &str) -> bool {
    std::env::var_os("PATH")
        .map(|paths| std::env::split_paths(&paths).any(|dir| dir.join(cmd).is_file()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_sh_on_path() {
        assert!(command_exists("sh"));
        assert!(!command_exists("definitely-not-a-real-binary-name"));
    }

    #[test]
    fn missing_query_tool_answers_no() {
        assert!(!query_ok("definitely-not-a-real-binary-name", &["-Q"]));
        assert!(query_ok("sh", &["-c", "exit 0"]));
        assert!(!query_ok("sh", &["-c", "exit 1"]));
    }
}
