//! # reconcile
//!
//! Idempotent desired-state reconciliation.
//!
//! For a declared list of resources (packages, directories, symlinks,
//! services, config lines, git clones), determine current state and apply
//! the minimal mutation to reach desired state, logging an outcome per
//! resource and continuing past individual failures. Sequencing is
//! best-effort, strictly sequential and single-threaded; idempotency comes
//! from re-checking state on every run, never from recorded history.
//!
//! ## Core concepts
//!
//! - [`Resource`]: a discrete unit of system state with check and apply
//! - [`ResourceState`] / [`ApplyResult`]: check and apply outcomes
//! - [`ExecutionPlan`]: resources in declaration order, tagged by privilege
//! - [`execute`]: the sequential best-effort executor
//!
//! ## Provider traits
//!
//! Terminal, privilege and progress concerns are injected:
//!
//! - [`SudoProvider`]: elevated command execution
//! - [`SudoClassifier`]: which resources run privileged
//! - [`ProgressCallback`]: per-resource progress reporting
//! - [`ConfirmCallback`]: interactive gates, so the core never reads stdin
//!
//! ## Example
//!
//! ```no_run
//! use reconcile::{
//!     ApplyContext, ApplyResult, CommandOutput, ExecuteOptions, ExecutionPlan,
//!     Resource, ResourceState, SudoProvider, execute_simple,
//! };
//!
//! struct NoPrivileges;
//!
//! impl SudoProvider for NoPrivileges {
//!     fn run(&self, _cmd: &str, _args: &[&str]) -> anyhow::Result<CommandOutput> {
//!         anyhow::bail!("no privileged resources in this plan")
//!     }
//! }
//!
//! #[derive(Debug)]
//! struct MarkerFile(std::path::PathBuf);
//!
//! impl Resource for MarkerFile {
//!     fn id(&self) -> String { self.0.display().to_string() }
//!     fn description(&self) -> String { format!("Marker {}", self.0.display()) }
//!     fn resource_type(&self) -> &'static str { "file" }
//!
//!     fn current_state(&self) -> anyhow::Result<ResourceState> {
//!         Ok(if self.0.exists() {
//!             ResourceState::Present { details: None }
//!         } else {
//!             ResourceState::Absent
//!         })
//!     }
//!
//!     fn desired_state(&self) -> ResourceState {
//!         ResourceState::Present { details: None }
//!     }
//!
//!     fn apply(&self, ctx: &mut ApplyContext) -> anyhow::Result<ApplyResult> {
//!         if ctx.dry_run {
//!             return Ok(ApplyResult::Skipped { reason: "dry run".into() });
//!         }
//!         std::fs::write(&self.0, b"")?;
//!         Ok(ApplyResult::Created)
//!     }
//! }
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut plan = ExecutionPlan::new();
//! plan.push(Box::new(MarkerFile("/tmp/provisioned".into())), false);
//!
//! let summary = execute_simple(plan, ExecuteOptions::default(), || Ok(NoPrivileges))?;
//! assert!(summary.is_success());
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod diff;
pub mod executor;
pub mod planner;
pub mod resource;
pub mod types;

pub use context::{
    ApplyContext, AutoConfirm, AutoDecline, ConfirmCallback, NoProgress, NoSudo,
    ProgressCallback, SudoClassifier, SudoProvider,
};
pub use diff::{DiffSummary, ResourceDiff, compute_diffs, group_by_type};
pub use executor::{execute, execute_simple};
pub use planner::{ExecutionPlan, PlannedResource};
pub use resource::{BoxedResource, Resource, ResourceExt};
pub use types::{
    ApplyResult, CommandOutput, ExecuteOptions, ResourceState, RunSummary, SudoRequirement,
};
