//! Doctor command - health checks for required tooling and layout

use anyhow::Result;
use colored::Colorize;

use crate::Context;
use crate::config::Config;
use crate::paths;
use crate::runner;
use crate::ui;

struct Issue {
    category: &'static str,
    summary: String,
    detail: Option<String>,
    fix_cmd: Option<String>,
    fatal: bool,
}

pub fn run(_ctx: &Context) -> Result<()> {
    ui::header("System Health Check");

    let mut issues: Vec<Issue> = Vec::new();

    check_commands(&mut issues);
    check_directories(&mut issues);
    check_config(&mut issues);

    println!();
    if issues.is_empty() {
        ui::success("All systems healthy!");
        return Ok(());
    }

    print_issue_summary(&issues);

    if issues.iter().any(|i| i.fatal) {
        anyhow::bail!("{} blocking issue(s) found", issues.iter().filter(|i| i.fatal).count());
    }
    Ok(())
}

fn check_commands(issues: &mut Vec<Issue>) {
    ui::section("Required Commands");

    // (command, description, install hint, fatal when missing)
    let commands = [
        ("pacman", "Package manager", None, true),
        ("git", "Version control", Some("pacman -S git"), true),
        ("systemctl", "Service manager", None, true),
        ("yay", "AUR helper", Some("hyprsetup install --only aur"), false),
        ("flatpak", "Sandboxed apps", Some("pacman -S flatpak"), false),
        ("checkupdates", "Update listing", Some("pacman -S pacman-contrib"), false),
        ("swww", "Wallpaper daemon", Some("pacman -S swww"), false),
    ];

    for (cmd, desc, hint, fatal) in commands {
        if runner::command_exists(cmd) {
            println!("  {} {} - {}", "✓".green(), cmd, desc.dimmed());
        } else {
            println!("  {} {} - {} {}", "✗".red(), cmd, desc, "(missing)".red());
            issues.push(Issue {
                category: "Required Commands",
                summary: format!("{cmd} is not installed"),
                detail: Some(desc.to_string()),
                fix_cmd: hint.map(ToString::to_string),
                fatal,
            });
        }
    }
}

fn check_directories(issues: &mut Vec<Issue>) {
    ui::section("Directories");

    match paths::dots_dir() {
        Ok(dots) if dots.is_dir() => {
            println!("  {} dots repository: {}", "✓".green(), dots.display());
        }
        Ok(dots) => {
            println!("  {} dots repository missing: {}", "✗".red(), dots.display());
            issues.push(Issue {
                category: "Directories",
                summary: "Dotfiles repository not found".to_string(),
                detail: Some(format!(
                    "Expected at {} (override with {})",
                    dots.display(),
                    paths::ENV_DOTS_DIR
                )),
                fix_cmd: Some(format!("git clone <your-dots-repo> {}", dots.display())),
                fatal: true,
            });
        }
        Err(e) => {
            issues.push(Issue {
                category: "Directories",
                summary: "Could not resolve dots directory".to_string(),
                detail: Some(e.to_string()),
                fix_cmd: None,
                fatal: true,
            });
        }
    }

    for (label, dir) in [
        ("state", paths::state_dir()),
        ("cache", paths::cache_dir()),
    ] {
        match dir {
            Ok(path) => println!("  {} {} dir: {}", "✓".green(), label, path.display()),
            Err(e) => issues.push(Issue {
                category: "Directories",
                summary: format!("Could not resolve {label} directory"),
                detail: Some(e.to_string()),
                fix_cmd: None,
                fatal: false,
            }),
        }
    }
}

fn check_config(issues: &mut Vec<Issue>) {
    ui::section("Configuration");

    match Config::load() {
        Ok(config) => {
            println!(
                "  {} config loads ({} packages, {} symlinks)",
                "✓".green(),
                config.packages.pacman.len() + config.packages.aur.len(),
                config.symlinks.len()
            );
        }
        Err(e) => {
            println!("  {} config failed to load", "✗".red());
            issues.push(Issue {
                category: "Configuration",
                summary: "Config file is invalid".to_string(),
                detail: Some(format!("{e:#}")),
                fix_cmd: Some("hyprsetup config show".to_string()),
                fatal: true,
            });
        }
    }
}

fn print_issue_summary(issues: &[Issue]) {
    let count = issues.len();
    let label = if count == 1 { "Issue" } else { "Issues" };
    ui::header(&format!("{count} {label} Found"));

    for (i, issue) in issues.iter().enumerate() {
        let num = i + 1;
        println!(
            "  {}  {} {}",
            format!("{num}.").bold(),
            issue.summary,
            format!("[{}]", issue.category).dimmed()
        );
        if let Some(detail) = &issue.detail {
            for line in detail.lines() {
                println!("      {}", line.dimmed());
            }
        }
        if let Some(cmd) = &issue.fix_cmd {
            println!("      {} {}", "$".dimmed(), cmd.bold());
        }
        println!();
    }
}
