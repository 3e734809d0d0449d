use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hyprsetup")]
#[command(version)]
#[command(about = "Declarative Hyprland desktop provisioning", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show current vs desired state for all resources
    Status {
        /// Restrict to a target, e.g. "packages" or "symlinks.hypr"
        target: Option<String>,
    },

    /// Show pending changes without applying them
    Diff {
        /// Restrict to a target, e.g. "packages" or "symlinks.hypr"
        target: Option<String>,
    },

    /// Converge the system toward the declared state
    Apply(ApplyArgs),

    /// Bootstrap a fresh machine end to end
    Install(InstallArgs),

    /// Count pending updates and print waybar status JSON
    Updates(UpdatesArgs),

    /// Control the wallpaper daemon
    #[command(subcommand)]
    Wallpaper(WallpaperCommand),

    /// Run health checks on required tooling
    Doctor,

    /// Manage the hyprsetup configuration file
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser)]
pub struct ApplyArgs {
    /// Restrict to a target, e.g. "packages" or "symlinks.hypr"
    pub target: Option<String>,

    /// Show what would change without applying
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Skip confirmation prompts
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Parser)]
pub struct InstallArgs {
    /// Skip specific stages (comma-separated)
    #[arg(long)]
    pub skip: Option<String>,

    /// Only run specific stages (comma-separated)
    #[arg(long)]
    pub only: Option<String>,

    /// List all available stages
    #[arg(long)]
    pub list_stages: bool,

    /// Show what would change without applying
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Skip confirmation prompts (also replaces existing files with symlinks)
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Parser)]
pub struct UpdatesArgs {
    /// Query package sources even if the cached count is fresh
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Subcommand)]
pub enum WallpaperCommand {
    /// Start the wallpaper daemon, or stop it if already running
    Toggle,

    /// Set the current wallpaper image
    Set {
        /// Path to the image file
        image: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,

    /// Write the default configuration to the config path
    Init,

    /// Show config and data file locations
    Paths,
}

/// Install stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InstallStage {
    Aur,
    Packages,
    Flatpak,
    Directories,
    Repos,
    Symlinks,
    Lines,
    Services,
}

impl InstallStage {
    pub fn all() -> &'static [InstallStage] {
        &[
            InstallStage::Aur,
            InstallStage::Packages,
            InstallStage::Flatpak,
            InstallStage::Directories,
            InstallStage::Repos,
            InstallStage::Symlinks,
            InstallStage::Lines,
            InstallStage::Services,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            InstallStage::Aur => "aur",
            InstallStage::Packages => "packages",
            InstallStage::Flatpak => "flatpak",
            InstallStage::Directories => "directories",
            InstallStage::Repos => "repos",
            InstallStage::Symlinks => "symlinks",
            InstallStage::Lines => "lines",
            InstallStage::Services => "services",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            InstallStage::Aur => "AUR helper bootstrap (yay)",
            InstallStage::Packages => "Pacman and AUR packages",
            InstallStage::Flatpak => "Flatpak remote and applications",
            InstallStage::Directories => "Base directories",
            InstallStage::Repos => "Zsh plugin repositories",
            InstallStage::Symlinks => "Dotfile symlinks",
            InstallStage::Lines => "Config file lines",
            InstallStage::Services => "Systemd services",
        }
    }

    pub fn from_name(name: &str) -> Option<InstallStage> {
        match name {
            "aur" => Some(InstallStage::Aur),
            "packages" => Some(InstallStage::Packages),
            "flatpak" => Some(InstallStage::Flatpak),
            "directories" => Some(InstallStage::Directories),
            "repos" => Some(InstallStage::Repos),
            "symlinks" => Some(InstallStage::Symlinks),
            "lines" => Some(InstallStage::Lines),
            "services" => Some(InstallStage::Services),
            _ => None,
        }
    }
}
