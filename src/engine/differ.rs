//! Diff rendering - hyprsetup-specific UI

use colored::Colorize;
use reconcile::{ResourceDiff, ResourceState, group_by_type};

/// Human-readable group header for a resource type
fn type_header(resource_type: &str) -> &str {
    match resource_type {
        "pacman_package" => "Packages (pacman)",
        "aur_package" => "Packages (AUR)",
        "flatpak_app" => "Flatpak apps",
        "flatpak_remote" => "Flatpak remotes",
        "symlink" => "Symlinks",
        "directory" => "Directories",
        "git_repo" => "Git repositories",
        "service" => "Services (system)",
        "user_service" => "Services (user)",
        "config_line" => "Config lines",
        other => other,
    }
}

/// Display a list of diffs grouped by resource type
pub fn display_diff(diffs: &[ResourceDiff]) {
    if diffs.is_empty() {
        println!();
        println!("  {} System matches the declared state", "✓".green());
        return;
    }

    println!();
    println!(
        "┌─ {} ─────────────────────────────────────────┐",
        "Pending Changes".bold()
    );
    println!("│");

    for (resource_type, type_diffs) in group_by_type(diffs) {
        println!("│ {}", type_header(&resource_type).bold());

        for diff in type_diffs {
            let symbol = match (&diff.current, &diff.desired) {
                (ResourceState::Absent, ResourceState::Present { .. }) => "+".green(),
                (ResourceState::Present { .. }, ResourceState::Absent) => "-".red(),
                (ResourceState::Modified { .. }, _) | (_, ResourceState::Modified { .. }) => {
                    "~".yellow()
                }
                _ => "?".dimmed(),
            };

            let sudo_indicator = if diff.requires_sudo {
                " [sudo]".red().to_string()
            } else {
                String::new()
            };

            let state_desc = match (&diff.current, &diff.desired) {
                (ResourceState::Absent, ResourceState::Present { details }) => {
                    format!(
                        "(missing){}",
                        details
                            .as_ref()
                            .map(|d| format!(" → {}", d))
                            .unwrap_or_default()
                    )
                }
                (ResourceState::Modified { from, to }, _) => {
                    format!("{} → {}", from, to)
                }
                (
                    ResourceState::Present { details: from },
                    ResourceState::Present { details: to },
                ) => {
                    format!(
                        "{} → {}",
                        from.as_deref().unwrap_or("current"),
                        to.as_deref().unwrap_or("desired")
                    )
                }
                (ResourceState::Present { .. }, ResourceState::Absent) => {
                    "(will remove)".to_string()
                }
                _ => String::new(),
            };

            println!(
                "│   {} {:<40} {}{}",
                symbol,
                diff.resource_id,
                state_desc.dimmed(),
                sudo_indicator
            );
        }
        println!("│");
    }

    let sudo_count = diffs.iter().filter(|d| d.requires_sudo).count();
    let regular_count = diffs.len() - sudo_count;

    println!("├─────────────────────────────────────────────────────┤");
    println!(
        "│ Summary: {} changes ({} unprivileged, {} require sudo)",
        diffs.len().to_string().bold(),
        regular_count.to_string().green(),
        sudo_count.to_string().red()
    );
    println!("└─────────────────────────────────────────────────────┘");
}

/// Display the privilege boundary before the run starts
pub fn display_sudo_boundary(privileged_diffs: &[ResourceDiff]) {
    if privileged_diffs.is_empty() {
        return;
    }

    println!();
    println!(
        "┌─ {} ─────────────────────────────────────────┐",
        "Privilege Boundary".yellow().bold()
    );
    println!("│");
    println!(
        "│  {}  The following {} operations require sudo:",
        "⚠".yellow(),
        privileged_diffs.len()
    );
    println!("│");

    for diff in privileged_diffs.iter().take(10) {
        println!("│  • {}", diff.description);
    }

    if privileged_diffs.len() > 10 {
        println!("│  • ... and {} more", privileged_diffs.len() - 10);
    }

    println!("│");
    println!("│  Sudo will be requested once and released when the run ends.");
    println!("│");
    println!("└─────────────────────────────────────────────────────────────┘");
}
