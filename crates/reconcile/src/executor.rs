//! Sequential reconciliation executor
//!
//! Applies resources strictly in declaration order, single-threaded. Every
//! operation blocks until completion; a failed resource is counted and the
//! run continues (best-effort, not a transaction). There is no
//! rollback: interrupting the process leaves partially-applied state, which
//! the next run converges from scratch by re-checking.

use crate::context::{ApplyContext, ConfirmCallback, ProgressCallback, SudoProvider};
use crate::planner::ExecutionPlan;
use crate::resource::Resource;
use crate::types::{ApplyResult, ExecuteOptions, RunSummary};
use anyhow::Result;

/// Execute a plan with the given options and callbacks
///
/// The sudo provider is constructed lazily, at the first privileged
/// resource and only when a privileged change is actually pending; it is
/// held for the rest of the run. Returns the aggregated summary; callers
/// map `!summary.is_success()` to a non-zero exit status.
pub fn execute<S, P, C>(
    plan: ExecutionPlan,
    opts: ExecuteOptions,
    sudo_provider: impl FnOnce() -> Result<S>,
    progress: &mut P,
    confirm: &mut C,
) -> Result<RunSummary>
where
    S: SudoProvider,
    P: ProgressCallback,
    C: ConfirmCallback,
{
    let pending = plan.pending();

    if pending.is_empty() {
        return Ok(RunSummary::default());
    }

    // One gate for the whole run; declining is a normal skip
    if !opts.dry_run && !confirm.confirm("Apply changes?")? {
        return Ok(RunSummary {
            skipped: pending.len(),
            ..Default::default()
        });
    }

    if opts.dry_run {
        return Ok(RunSummary::default());
    }

    let privileged_pending = pending.iter().any(|d| d.requires_sudo);

    let mut summary = RunSummary::default();
    let mut acquire = Some(sudo_provider);
    let mut sudo: Option<S> = None;

    progress.on_run_start(plan.resources.len());
    for planned in &plan.resources {
        if planned.privileged
            && privileged_pending
            && sudo.is_none()
            && let Some(provider) = acquire.take()
        {
            // Acquired once, at the first privileged resource
            sudo = Some(provider()?);
        }

        let ctx_sudo = if planned.privileged {
            sudo.as_ref().map(|s| s as &dyn SudoProvider)
        } else {
            None
        };

        let resource = planned.resource.as_ref();
        progress.on_resource_start(&resource.id(), &resource.description());
        let result = apply_resource(resource, opts.verbose, ctx_sudo);
        progress.on_resource_complete(&resource.id(), &result);
        summary.add_result(&result);
    }
    progress.on_run_complete();
    // sudo released on drop

    Ok(summary)
}

/// Apply a single resource, converting errors into a counted failure
///
/// Already-converged resources are recorded as `NoChange` without invoking
/// the applier at all.
fn apply_resource(
    resource: &dyn Resource,
    verbose: bool,
    sudo: Option<&dyn SudoProvider>,
) -> ApplyResult {
    match resource.needs_apply() {
        Ok(false) => return ApplyResult::NoChange,
        Ok(true) => {}
        // Query failure is non-fatal: treat as absent and let apply decide
        Err(e) => {
            log::debug!("state check failed for {}: {e}", resource.id());
        }
    }

    let mut ctx = match sudo {
        Some(s) => ApplyContext::with_sudo(false, verbose, s),
        None => ApplyContext::new(false, verbose),
    };

    match resource.apply(&mut ctx) {
        Ok(result) => result,
        Err(e) => ApplyResult::Failed {
            error: e.to_string(),
        },
    }
}

/// Execution without progress or confirmation callbacks
pub fn execute_simple<S: SudoProvider>(
    plan: ExecutionPlan,
    opts: ExecuteOptions,
    sudo_provider: impl FnOnce() -> Result<S>,
) -> Result<RunSummary> {
    use crate::context::{AutoConfirm, NoProgress};

    execute(plan, opts, sudo_provider, &mut NoProgress, &mut AutoConfirm)
}
