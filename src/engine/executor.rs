//! Terminal front-end for the reconciliation executor

use anyhow::Result;
use colored::Colorize;
use indicatif::ProgressBar;
use reconcile::{
    ApplyResult, ConfirmCallback, ExecuteOptions as CoreOptions, ExecutionPlan, ProgressCallback,
    RunSummary,
};

use crate::progress;
use crate::sudo::SudoContext;

use super::differ::{display_diff, display_sudo_boundary};

/// CLI execution options
#[derive(Debug, Clone, Default)]
pub struct ExecuteOptions {
    /// Don't make changes, just show what would happen
    pub dry_run: bool,
    /// Skip confirmation prompts
    pub yes: bool,
    /// Verbose output
    pub verbose: bool,
}

/// Progress bars driven by executor callbacks
struct CliProgress {
    bar: Option<ProgressBar>,
}

impl ProgressCallback for CliProgress {
    fn on_run_start(&mut self, count: usize) {
        println!();
        println!("  {} Applying {} resources...", "→".cyan(), count);
        self.bar = Some(progress::bar(count as u64, "Applying"));
    }

    fn on_resource_start(&mut self, _id: &str, description: &str) {
        if let Some(bar) = &self.bar {
            bar.set_message(description.to_string());
        }
    }

    fn on_resource_complete(&mut self, id: &str, result: &ApplyResult) {
        let symbol = match result {
            ApplyResult::NoChange => "○",
            ApplyResult::Created | ApplyResult::Modified | ApplyResult::Removed => "✓",
            ApplyResult::Failed { .. } => "✗",
            ApplyResult::Skipped { .. } => "⊘",
        };

        if let Some(bar) = &self.bar {
            bar.set_message(format!("{} {}", symbol, id));
            bar.inc(1);
        }

        if let ApplyResult::Failed { error } = result {
            log::error!("{id}: {error}");
        }
    }

    fn on_run_complete(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

/// Interactive confirmation, bypassed by --yes
struct CliConfirm {
    yes: bool,
    declined: bool,
}

impl ConfirmCallback for CliConfirm {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        if self.yes {
            return Ok(true);
        }

        let confirmed = dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(true)
            .interact()?;
        self.declined = !confirmed;
        Ok(confirmed)
    }
}

/// Execute the plan with diff display, confirmation and progress bars
pub fn execute(plan: ExecutionPlan, opts: ExecuteOptions) -> Result<RunSummary> {
    let all_diffs = plan.pending();

    display_diff(&all_diffs);

    if all_diffs.is_empty() {
        return Ok(RunSummary::default());
    }

    if opts.dry_run {
        println!();
        println!("  {} Dry run - no changes made", "ℹ".blue());
        return Ok(RunSummary::default());
    }

    let privileged_diffs: Vec<_> = all_diffs
        .iter()
        .filter(|d| d.requires_sudo)
        .cloned()
        .collect();
    display_sudo_boundary(&privileged_diffs);

    let post_actions = plan.post_actions.clone();
    let mut confirm = CliConfirm {
        yes: opts.yes,
        declined: false,
    };

    let summary = reconcile::execute(
        plan,
        CoreOptions {
            dry_run: opts.dry_run,
            verbose: opts.verbose,
        },
        || SudoContext::acquire("Apply privileged system configuration"),
        &mut CliProgress { bar: None },
        &mut confirm,
    )?;

    if confirm.declined {
        println!();
        println!("  {} Aborted", "✗".red());
        return Ok(summary);
    }

    if summary.total_changes() > 0 && !post_actions.is_empty() {
        run_post_actions(&post_actions);
    }

    print_summary(&summary);

    Ok(summary)
}

/// Run post-apply reload commands, best-effort
fn run_post_actions(actions: &[String]) {
    use std::process::Command;

    println!();
    println!("  {} Running post-apply actions...", "→".cyan());
    for action in actions {
        let status = Command::new("sh").args(["-c", action]).status();
        match status {
            Ok(s) if s.success() => println!("    {} {}", "✓".green(), action),
            Ok(_) => println!("    {} {} exited non-zero", "⚠".yellow(), action),
            Err(e) => println!("    {} {} failed to start: {}", "⚠".yellow(), action, e),
        }
    }
}

/// Print final summary
fn print_summary(summary: &RunSummary) {
    println!();
    if summary.is_success() {
        println!("  {} System converged", "✓".green().bold());
    } else {
        println!("  {} Converged with errors", "⚠".yellow().bold());
    }

    if summary.created > 0 {
        println!("    • {} resources created", summary.created);
    }
    if summary.modified > 0 {
        println!("    • {} resources modified", summary.modified);
    }
    if summary.removed > 0 {
        println!("    • {} resources removed", summary.removed);
    }
    if summary.no_change > 0 {
        println!("    • {} already converged", summary.no_change);
    }
    if summary.skipped > 0 {
        println!("    • {} resources skipped", summary.skipped);
    }
    if summary.failed > 0 {
        println!("    • {} {} failed", summary.failed, "resources".red());
    }
}
