//! Core types for desired-state reconciliation

use serde::{Deserialize, Serialize};
use std::process::Output;

/// Requirement level for elevated privileges
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SudoRequirement {
    /// No elevated privileges needed
    None,
    /// Elevated privileges required with a reason
    Required { reason: String },
}

impl Default for SudoRequirement {
    fn default() -> Self {
        Self::None
    }
}

/// Current or desired state of a resource
///
/// Checkers compute this fresh on every run; nothing is cached across runs.
/// Idempotency comes from re-deriving state, not from journaling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceState {
    /// Resource exists/is configured
    Present { details: Option<String> },
    /// Resource does not exist/is not configured
    Absent,
    /// Resource exists but differs from desired
    Modified { from: String, to: String },
    /// State cannot be determined (query tool unavailable, etc.)
    Unknown,
}

impl ResourceState {
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present { .. })
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

/// Outcome of applying a single resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplyResult {
    /// Already in desired state, nothing done
    NoChange,
    /// Resource was created (installed, linked, cloned, enabled)
    Created,
    /// Resource existed but was changed to match desired state
    Modified,
    /// Resource was removed
    Removed,
    /// Apply failed; the run continues past this resource
    Failed { error: String },
    /// Apply was deliberately not attempted
    Skipped { reason: String },
}

impl ApplyResult {
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }

    pub fn is_change(&self) -> bool {
        matches!(self, Self::Created | Self::Modified | Self::Removed)
    }
}

/// Aggregated counts for a reconciliation run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub created: usize,
    pub modified: usize,
    pub removed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub no_change: usize,
}

impl RunSummary {
    /// Number of mutations actually made
    pub fn total_changes(&self) -> usize {
        self.created + self.modified + self.removed
    }

    /// A run is successful when no resource failed to apply
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Total resources accounted for
    pub fn total(&self) -> usize {
        self.created + self.modified + self.removed + self.skipped + self.failed + self.no_change
    }

    pub fn merge(&mut self, other: &RunSummary) {
        self.created += other.created;
        self.modified += other.modified;
        self.removed += other.removed;
        self.skipped += other.skipped;
        self.failed += other.failed;
        self.no_change += other.no_change;
    }

    pub fn add_result(&mut self, result: &ApplyResult) {
        match result {
            ApplyResult::NoChange => self.no_change += 1,
            ApplyResult::Created => self.created += 1,
            ApplyResult::Modified => self.modified += 1,
            ApplyResult::Removed => self.removed += 1,
            ApplyResult::Failed { .. } => self.failed += 1,
            ApplyResult::Skipped { .. } => self.skipped += 1,
        }
    }
}

/// Options for a reconciliation run
///
/// Execution is strictly sequential: every check and apply blocks until
/// completion, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct ExecuteOptions {
    /// Don't make changes, just show what would happen
    pub dry_run: bool,
    /// Verbose output
    pub verbose: bool,
}

/// Output from a command run through a privilege provider
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub success: bool,
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        Self {
            stdout: output.stdout,
            stderr: output.stderr,
            success: output.status.success(),
        }
    }
}

impl CommandOutput {
    pub fn stdout_str(&self) -> String {
        String::from_utf8_lossy(&self.stdout).to_string()
    }

    pub fn stderr_str(&self) -> String {
        String::from_utf8_lossy(&self.stderr).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_counts_results() {
        let mut summary = RunSummary::default();
        summary.add_result(&ApplyResult::Created);
        summary.add_result(&ApplyResult::NoChange);
        summary.add_result(&ApplyResult::Failed {
            error: "boom".into(),
        });
        summary.add_result(&ApplyResult::Skipped {
            reason: "declined".into(),
        });

        assert_eq!(summary.created, 1);
        assert_eq!(summary.no_change, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.total(), 4);
        assert_eq!(summary.total_changes(), 1);
        assert!(!summary.is_success());
    }

    #[test]
    fn summary_merge() {
        let mut a = RunSummary {
            created: 2,
            ..Default::default()
        };
        let b = RunSummary {
            failed: 1,
            no_change: 3,
            ..Default::default()
        };
        a.merge(&b);
        assert_eq!(a.created, 2);
        assert_eq!(a.failed, 1);
        assert_eq!(a.no_change, 3);
    }

    #[test]
    fn apply_result_classification() {
        assert!(ApplyResult::Created.is_change());
        assert!(ApplyResult::Modified.is_change());
        assert!(!ApplyResult::NoChange.is_change());
        assert!(ApplyResult::NoChange.is_success());
        assert!(
            !ApplyResult::Failed {
                error: "x".into()
            }
            .is_success()
        );
    }
}
