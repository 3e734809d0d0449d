//! Core declarative commands: status, diff, apply

use anyhow::Result;
use colored::Colorize;
use reconcile::ResourceState;

use crate::Context;
use crate::config::Config;
use crate::engine::differ::display_diff;
use crate::engine::executor::{self, ExecuteOptions};
use crate::engine::planner::build_plan;
use crate::ui;

/// Show current vs desired state for every resource
pub fn status(ctx: &Context, target: Option<&str>) -> Result<()> {
    ui::header("Hyprsetup Status");

    let config = Config::load()?;
    let plan = build_plan(&config, false)?.filter_by_target(target);

    if plan.is_empty() {
        ui::warn("No resources match the given target");
        return Ok(());
    }

    #[derive(Clone)]
    struct Entry {
        id: String,
        rtype: String,
        state: ResourceState,
    }

    let mut entries = Vec::new();
    for planned in &plan.resources {
        let resource = planned.resource.as_ref();
        // A failed state query reads as absent rather than aborting the
        // whole status listing
        let state = resource.current_state().unwrap_or(ResourceState::Absent);
        entries.push(Entry {
            id: resource.id(),
            rtype: resource.resource_type().to_string(),
            state,
        });
    }

    let mut by_type: std::collections::BTreeMap<String, Vec<&Entry>> = Default::default();
    for entry in &entries {
        by_type.entry(entry.rtype.clone()).or_default().push(entry);
    }

    let mut converged = 0usize;
    for (rtype, group) in by_type {
        ui::section(&rtype);
        for entry in group {
            let (icon, detail) = match &entry.state {
                ResourceState::Present { details } => {
                    converged += 1;
                    ("✓".green(), details.clone().unwrap_or_default())
                }
                ResourceState::Absent => ("✗".red(), "missing".to_string()),
                ResourceState::Modified { from, to } => {
                    ("~".yellow(), format!("{} → {}", from, to))
                }
                ResourceState::Unknown => ("?".dimmed(), String::new()),
            };

            if ctx.quiet && matches!(entry.state, ResourceState::Present { .. }) {
                continue;
            }
            println!("  {} {:<40} {}", icon, entry.id, detail.dimmed());
        }
    }

    println!();
    ui::kv(
        "Converged",
        &format!("{}/{}", converged, entries.len()),
    );

    Ok(())
}

/// Show pending changes without applying them
pub fn diff(_ctx: &Context, target: Option<&str>) -> Result<()> {
    let config = Config::load()?;
    let plan = build_plan(&config, false)?.filter_by_target(target);

    display_diff(&plan.pending());

    Ok(())
}

/// Converge the system toward the declared state
pub fn apply(ctx: &Context, target: Option<&str>, dry_run: bool, yes: bool) -> Result<()> {
    ui::header("Applying Configuration");

    let config = Config::load()?;
    let plan = build_plan(&config, false)?.filter_by_target(target);

    if plan.is_empty() {
        ui::warn("No resources match the given target");
        return Ok(());
    }

    let summary = executor::execute(
        plan,
        ExecuteOptions {
            dry_run,
            yes,
            verbose: ctx.verbose > 0,
        },
    )?;

    if !summary.is_success() {
        anyhow::bail!("{} resource(s) failed to apply", summary.failed);
    }

    Ok(())
}
