//! Install command - bootstrap a fresh machine end to end

use anyhow::{Context as AnyhowContext, Result};
use colored::Colorize;

use crate::Context;
use crate::cli::{InstallArgs, InstallStage};
use crate::config::Config;
use crate::engine::executor::{self, ExecuteOptions};
use crate::engine::planner::build_plan;
use crate::paths;
use crate::runner;
use crate::ui;

pub fn run(ctx: &Context, args: InstallArgs) -> Result<()> {
    if args.list_stages {
        list_stages();
        return Ok(());
    }

    ui::header("Hyprsetup Install - System Bootstrap");
    println!();

    preflight()?;

    let stages = determine_stages(&args)?;
    let config = Config::load()?;

    // yay must exist before any AUR package resource is applied
    if stages.contains(&InstallStage::Aur) {
        bootstrap_yay(args.yes, args.dry_run)?;
    }

    let replace_existing = if stages.contains(&InstallStage::Symlinks) {
        confirm_replace_existing(args.yes)?
    } else {
        false
    };

    let plan = build_plan(&config, replace_existing)?
        .filter(|r| stages.iter().any(|s| stage_covers(*s, r.resource_type())));

    if plan.is_empty() {
        ui::success("Nothing to do - system is already configured!");
        return Ok(());
    }

    let privileged = plan.privileged_count();
    println!(
        "  {} resources to apply ({} unprivileged, {} privileged)",
        plan.total_resources().to_string().bold(),
        (plan.total_resources() - privileged).to_string().green(),
        privileged.to_string().yellow()
    );

    let summary = executor::execute(
        plan,
        ExecuteOptions {
            dry_run: args.dry_run,
            yes: args.yes,
            verbose: ctx.verbose > 0,
        },
    )?;

    if !summary.is_success() {
        anyhow::bail!("{} resource(s) failed to apply", summary.failed);
    }

    if !args.dry_run && summary.total_changes() > 0 {
        offer_reboot(args.yes)?;
    }

    Ok(())
}

/// Hard requirements; a missing one aborts before anything is touched
fn preflight() -> Result<()> {
    if !runner::command_exists("pacman") {
        anyhow::bail!("pacman not found - this tool targets Arch-based systems");
    }
    if !runner::command_exists("git") {
        anyhow::bail!("git not found - install git and base-devel first");
    }

    let dots = paths::dots_dir()?;
    if !dots.is_dir() {
        anyhow::bail!(
            "Dotfiles repository not found at {} - clone it first or set {}",
            dots.display(),
            paths::ENV_DOTS_DIR
        );
    }

    Ok(())
}

/// Install yay from the AUR when it is not already present
///
/// Builds in a scratch directory under the cache with makepkg -si, which
/// prompts for sudo on its own.
fn bootstrap_yay(yes: bool, dry_run: bool) -> Result<()> {
    if runner::command_exists("yay") {
        return Ok(());
    }

    ui::info("yay (AUR helper) is not installed.");

    if dry_run {
        println!("  {} Would build yay from the AUR", "→".cyan());
        return Ok(());
    }

    if !yes {
        let confirmed = dialoguer::Confirm::new()
            .with_prompt("Build and install yay now?")
            .default(true)
            .interact()
            .context("Failed to read confirmation")?;
        if !confirmed {
            anyhow::bail!("yay installation declined - cannot continue without an AUR helper");
        }
    }

    let build_dir = paths::cache_dir()?.join("build");
    let checkout = build_dir.join("yay");
    if checkout.exists() {
        std::fs::remove_dir_all(&checkout).context("Failed to clear previous yay build")?;
    }
    std::fs::create_dir_all(&build_dir).context("Failed to create build directory")?;

    ui::info("Cloning yay...");
    let status = runner::run(
        "git",
        &[
            "clone",
            "https://aur.archlinux.org/yay.git",
            &checkout.to_string_lossy(),
        ],
    )?;
    if !status.success() {
        anyhow::bail!("git clone of yay failed");
    }

    ui::info("Building yay (makepkg will ask for sudo)...");
    let status = std::process::Command::new("makepkg")
        .args(["-si", "--noconfirm"])
        .current_dir(&checkout)
        .status()
        .context("Failed to run makepkg")?;
    if !status.success() {
        anyhow::bail!("makepkg -si failed while building yay");
    }

    if !runner::command_exists("yay") {
        anyhow::bail!("yay build succeeded but the binary is still not on $PATH");
    }

    ui::success("yay installed");
    Ok(())
}

/// One upfront decision covering every symlink in the run
fn confirm_replace_existing(yes: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }

    let confirmed = dialoguer::Confirm::new()
        .with_prompt("Replace existing files with symlinks where they conflict?")
        .default(false)
        .interact()
        .context("Failed to read confirmation")?;
    Ok(confirmed)
}

fn offer_reboot(yes: bool) -> Result<()> {
    // Never reboot unattended
    if yes {
        ui::info("A reboot is recommended to pick up services and the display manager.");
        return Ok(());
    }

    let confirmed = dialoguer::Confirm::new()
        .with_prompt("Reboot now to finish setup?")
        .default(false)
        .interact()
        .context("Failed to read confirmation")?;

    if confirmed {
        runner::run("systemctl", &["reboot"])?;
    }
    Ok(())
}

fn determine_stages(args: &InstallArgs) -> Result<Vec<InstallStage>> {
    let parse_list = |list: &str| -> Result<Vec<InstallStage>> {
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|name| {
                InstallStage::from_name(name)
                    .ok_or_else(|| anyhow::anyhow!("Unknown stage: {name}"))
            })
            .collect()
    };

    if let Some(only) = &args.only {
        return parse_list(only);
    }

    let mut stages: Vec<InstallStage> = InstallStage::all().to_vec();
    if let Some(skip) = &args.skip {
        let skipped = parse_list(skip)?;
        stages.retain(|s| !skipped.contains(s));
    }
    Ok(stages)
}

/// Which resource types a stage applies
fn stage_covers(stage: InstallStage, resource_type: &str) -> bool {
    match stage {
        // The aur stage only bootstraps the helper itself
        InstallStage::Aur => false,
        InstallStage::Packages => resource_type.ends_with("_package"),
        InstallStage::Flatpak => resource_type.starts_with("flatpak"),
        InstallStage::Directories => resource_type == "directory",
        InstallStage::Repos => resource_type == "git_repo",
        InstallStage::Symlinks => resource_type == "symlink",
        InstallStage::Lines => resource_type == "config_line",
        InstallStage::Services => resource_type == "service" || resource_type == "user_service",
    }
}

fn list_stages() {
    ui::header("Install Stages");
    for stage in InstallStage::all() {
        println!("  {:<12} {}", stage.name().bold(), stage.description());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(skip: Option<&str>, only: Option<&str>) -> InstallArgs {
        InstallArgs {
            skip: skip.map(ToString::to_string),
            only: only.map(ToString::to_string),
            list_stages: false,
            dry_run: false,
            yes: false,
        }
    }

    #[test]
    fn only_overrides_skip() {
        let stages = determine_stages(&args(Some("packages"), Some("symlinks,lines"))).unwrap();
        assert_eq!(stages, vec![InstallStage::Symlinks, InstallStage::Lines]);
    }

    #[test]
    fn skip_removes_stages() {
        let stages = determine_stages(&args(Some("packages,flatpak"), None)).unwrap();
        assert!(!stages.contains(&InstallStage::Packages));
        assert!(!stages.contains(&InstallStage::Flatpak));
        assert!(stages.contains(&InstallStage::Symlinks));
    }

    #[test]
    fn unknown_stage_is_an_error() {
        assert!(determine_stages(&args(None, Some("nonsense"))).is_err());
    }

    #[test]
    fn stage_coverage_matches_resource_types() {
        assert!(stage_covers(InstallStage::Packages, "pacman_package"));
        assert!(stage_covers(InstallStage::Packages, "aur_package"));
        assert!(stage_covers(InstallStage::Flatpak, "flatpak_remote"));
        assert!(stage_covers(InstallStage::Services, "user_service"));
        assert!(!stage_covers(InstallStage::Symlinks, "directory"));
    }
}
