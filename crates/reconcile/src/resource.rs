//! Resource trait for desired-state reconciliation
//!
//! A Resource is any discrete unit of system state managed by a run: a
//! package, a symlink, a directory, a service, a config line, a git clone.
//! Checkers must not mutate; appliers converge toward the desired state.

use crate::context::ApplyContext;
use crate::types::{ApplyResult, ResourceState, SudoRequirement};
use anyhow::Result;
use std::fmt;

/// Core trait implemented by every managed resource
///
/// Per-resource lifecycle within a run:
/// `unknown → checked{present|absent} → (if absent) applying → {done|failed}`.
/// No retries are attempted; a failed resource is counted and the run
/// proceeds to the next one.
///
/// # Example
///
/// ```
/// use reconcile::{ApplyContext, ApplyResult, Resource, ResourceState};
///
/// #[derive(Debug)]
/// struct Touch {
///     path: std::path::PathBuf,
/// }
///
/// impl Resource for Touch {
///     fn id(&self) -> String {
///         self.path.display().to_string()
///     }
///
///     fn description(&self) -> String {
///         format!("Ensure file {} exists", self.path.display())
///     }
///
///     fn resource_type(&self) -> &'static str {
///         "file"
///     }
///
///     fn current_state(&self) -> anyhow::Result<ResourceState> {
///         if self.path.exists() {
///             Ok(ResourceState::Present { details: None })
///         } else {
///             Ok(ResourceState::Absent)
///         }
///     }
///
///     fn desired_state(&self) -> ResourceState {
///         ResourceState::Present { details: None }
///     }
///
///     fn apply(&self, ctx: &mut ApplyContext) -> anyhow::Result<ApplyResult> {
///         if ctx.dry_run {
///             return Ok(ApplyResult::Skipped { reason: "dry run".into() });
///         }
///         std::fs::write(&self.path, b"")?;
///         Ok(ApplyResult::Created)
///     }
/// }
/// ```
pub trait Resource: Send + Sync + fmt::Debug {
    /// Stable identifier, unique within the resource type
    ///
    /// Examples: `"waybar"` for a package, `"~/.config/hypr"` for a symlink,
    /// `"NetworkManager"` for a service.
    fn id(&self) -> String;

    /// Human-readable description of what this resource does
    fn description(&self) -> String;

    /// Resource type category, used for grouping and target filtering
    ///
    /// Examples: `"pacman_package"`, `"aur_package"`, `"flatpak_app"`,
    /// `"symlink"`, `"directory"`, `"git_repo"`, `"service"`, `"config_line"`.
    fn resource_type(&self) -> &'static str;

    /// Whether this resource requires elevated privileges
    ///
    /// Typically decided by a config allowlist, not hardcoded.
    fn sudo_requirement(&self) -> SudoRequirement {
        SudoRequirement::None
    }

    /// Detect the current state by querying the system
    ///
    /// Must not mutate state. An inability to query (missing tool) should
    /// map to `Absent` or `Unknown` rather than an error where possible.
    fn current_state(&self) -> Result<ResourceState>;

    /// The declared desired state
    fn desired_state(&self) -> ResourceState;

    /// Whether applying would change anything
    fn needs_apply(&self) -> Result<bool> {
        let current = self.current_state()?;
        let desired = self.desired_state();
        Ok(current != desired)
    }

    /// Converge toward the desired state
    ///
    /// Implementations should re-check state first (return `NoChange` when
    /// already converged), honor `ctx.dry_run`, and report failure through
    /// the returned `ApplyResult` or an `Err` - the executor converts an
    /// `Err` into `ApplyResult::Failed` and keeps going.
    fn apply(&self, ctx: &mut ApplyContext) -> Result<ApplyResult>;
}

/// A boxed resource for type-erased storage
pub type BoxedResource = Box<dyn Resource>;

/// Extension helpers for resources
pub trait ResourceExt {
    fn requires_sudo(&self) -> bool;
}

impl<R: Resource + ?Sized> ResourceExt for R {
    fn requires_sudo(&self) -> bool {
        matches!(self.sudo_requirement(), SudoRequirement::Required { .. })
    }
}
