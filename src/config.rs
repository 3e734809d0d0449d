//! Host configuration
//!
//! One declarative TOML file describes everything a run converges toward:
//! package lists, flatpak apps, directories, dotfile symlinks, plugin
//! repositories, services, config-line directives and post-apply reload
//! commands. The embedded defaults mirror the dotfiles layout this tool
//! grew out of, so a fresh machine works without writing any config.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::paths;
use crate::sudo::SudoConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub packages: PackagesConfig,
    pub flatpak: FlatpakConfig,
    /// Directories created with mkdir -p semantics (tilde-expanded)
    pub directories: Vec<String>,
    pub symlinks: Vec<SymlinkSpec>,
    pub repos: Vec<RepoSpec>,
    pub services: Vec<ServiceSpec>,
    pub config_lines: Vec<ConfigLineSpec>,
    /// Commands run once after a successful apply
    pub post_actions: Vec<String>,
    pub updates: UpdatesConfig,
    pub wallpaper: WallpaperConfig,
    pub sudo: SudoConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PackagesConfig {
    /// Official repository packages (installed via pacman, privileged)
    pub pacman: Vec<String>,
    /// AUR packages (installed via the AUR helper, unprivileged)
    pub aur: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlatpakConfig {
    pub remote_name: String,
    pub remote_url: String,
    pub apps: Vec<String>,
}

/// A dotfile symlink: `source` is relative to the dots repository unless
/// absolute; `target` is tilde-expanded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymlinkSpec {
    pub source: String,
    pub target: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoSpec {
    pub url: String,
    /// Destination directory (tilde-expanded)
    pub dest: String,
    /// Shallow clone depth, when set
    #[serde(default)]
    pub depth: Option<u32>,
    /// Pull when already cloned
    #[serde(default)]
    pub update: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSpec {
    pub name: String,
    /// `systemctl --user` unit instead of a system unit
    #[serde(default)]
    pub user: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigLineSpec {
    pub file: String,
    pub line: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdatesConfig {
    /// Freshness window for the cached update count, in seconds
    pub cache_ttl_secs: u64,
    /// Pending-update listing commands, one line of output per update
    pub pacman_command: Vec<String>,
    pub aur_command: Vec<String>,
    pub flatpak_command: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WallpaperConfig {
    /// Background daemon toggled via the PID file
    pub daemon_command: Vec<String>,
    /// Command prefix for setting a wallpaper; the image path is appended
    pub set_command: Vec<String>,
}

impl Default for PackagesConfig {
    fn default() -> Self {
        Self {
            pacman: [
                "hypridle", "hyprlock", "hyprpicker", "waybar", "rofi-wayland",
                "kitty", "swww", "wl-clipboard", "zsh", "neovim", "fastfetch",
                "firefox", "nemo", "vlc", "pavucontrol", "flatpak", "tree",
                "qt5ct", "qt6ct", "kvantum-qt5", "nwg-look", "nwg-displays",
                "ttf-meslo-nerd", "ttf-font-awesome", "git", "base-devel",
            ]
            .iter()
            .map(ToString::to_string)
            .collect(),
            aur: [
                "python-pywal16",
                "python-pywalfox",
                "waybar-module-pacman-updates-git",
                "goverlay-git",
                "coolercontrol-bin",
            ]
            .iter()
            .map(ToString::to_string)
            .collect(),
        }
    }
}

impl Default for FlatpakConfig {
    fn default() -> Self {
        Self {
            remote_name: "flathub".to_string(),
            remote_url: "https://flathub.org/repo/flathub.flatpakrepo".to_string(),
            apps: vec![
                "org.localsend.localsend_app".to_string(),
                "com.github.tchx84.Flatseal".to_string(),
                "com.usebottles.bottles".to_string(),
            ],
        }
    }
}

impl Default for UpdatesConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 300,
            pacman_command: vec!["checkupdates".to_string()],
            aur_command: vec!["yay".to_string(), "-Qua".to_string()],
            flatpak_command: vec![
                "flatpak".to_string(),
                "remote-ls".to_string(),
                "--updates".to_string(),
            ],
        }
    }
}

impl Default for WallpaperConfig {
    fn default() -> Self {
        Self {
            daemon_command: vec!["swww-daemon".to_string()],
            set_command: vec!["swww".to_string(), "img".to_string()],
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let symlinks = [
            (".zshrc", "~/.zshrc"),
            ("fastfetch", "~/.config/fastfetch"),
            ("hypr", "~/.config/hypr"),
            ("kitty", "~/.config/kitty"),
            ("Kvantum", "~/.config/Kvantum"),
            ("nvim", "~/.config/nvim"),
            ("pywal", "~/.config/pywal"),
            ("qt5ct", "~/.config/qt5ct"),
            ("qt6ct", "~/.config/qt6ct"),
            ("rofi", "~/.config/rofi"),
            ("scripts", "~/.config/scripts"),
            ("wal", "~/.config/wal"),
            ("wallpapers", "~/.config/wallpapers"),
            ("fonts", "~/.local/share/fonts"),
            ("waybar", "~/.config/waybar"),
            ("xdg-desktop-portal", "~/.config/xdg-desktop-portal"),
            (".icons", "~/.icons"),
            (".themes", "~/.themes"),
        ]
        .iter()
        .map(|(source, target)| SymlinkSpec {
            source: (*source).to_string(),
            target: (*target).to_string(),
        })
        .collect();

        let plugin = |url: &str, name: &str, depth: Option<u32>| RepoSpec {
            url: url.to_string(),
            dest: format!("~/.oh-my-zsh/custom/plugins/{name}"),
            depth,
            update: true,
        };

        Self {
            packages: PackagesConfig::default(),
            flatpak: FlatpakConfig::default(),
            // Fonts and the zsh plugin tree are owned by the symlink and
            // repo resources below, so they are not listed here
            directories: ["~/git", "~/venv", "~/tmp"]
                .iter()
                .map(ToString::to_string)
                .collect(),
            symlinks,
            repos: vec![
                // The framework clone must precede the plugin clones into
                // its custom/plugins tree
                RepoSpec {
                    url: "https://github.com/ohmyzsh/ohmyzsh.git".to_string(),
                    dest: "~/.oh-my-zsh".to_string(),
                    depth: Some(1),
                    update: false,
                },
                plugin(
                    "https://github.com/zsh-users/zsh-autosuggestions.git",
                    "zsh-autosuggestions",
                    None,
                ),
                plugin(
                    "https://github.com/zsh-users/zsh-syntax-highlighting.git",
                    "zsh-syntax-highlighting",
                    None,
                ),
                plugin(
                    "https://github.com/zdharma-continuum/fast-syntax-highlighting.git",
                    "fast-syntax-highlighting",
                    None,
                ),
                plugin(
                    "https://github.com/marlonrichert/zsh-autocomplete.git",
                    "zsh-autocomplete",
                    Some(1),
                ),
                plugin(
                    "https://github.com/MichaelAquilina/zsh-autoswitch-virtualenv.git",
                    "autoswitch_virtualenv",
                    None,
                ),
            ],
            services: vec![ServiceSpec {
                name: "sddm".to_string(),
                user: false,
            }],
            config_lines: vec![ConfigLineSpec {
                file: "~/.config/hypr/hyprland.conf".to_string(),
                line: "source = ~/.config/hypr/monitors.conf".to_string(),
            }],
            post_actions: vec!["fc-cache -f".to_string()],
            updates: UpdatesConfig::default(),
            wallpaper: WallpaperConfig::default(),
            sudo: SudoConfig::default(),
        }
    }
}

impl Config {
    /// Path of the config file
    pub fn path() -> Result<PathBuf> {
        Ok(paths::config_dir()?.join("config.toml"))
    }

    /// Load config.toml, falling back to embedded defaults when absent
    ///
    /// A present-but-invalid file is an error; silently ignoring it would
    /// converge the host toward the wrong desired state.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Invalid TOML in {}", path.display()))
    }

    /// Write the embedded defaults to the config path (won't overwrite)
    pub fn write_default() -> Result<PathBuf> {
        let path = Self::path()?;
        if path.exists() {
            anyhow::bail!("Config already exists at {}", path.display());
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(&Self::default()).context("Failed to serialize defaults")?;
        fs::write(&path, content).with_context(|| format!("Could not write {}", path.display()))?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_populated() {
        let config = Config::default();
        assert!(config.packages.pacman.contains(&"waybar".to_string()));
        assert!(!config.symlinks.is_empty());
        assert_eq!(config.updates.cache_ttl_secs, 300);
        assert_eq!(config.flatpak.remote_name, "flathub");
    }

    #[test]
    fn defaults_round_trip_through_toml() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.packages.pacman.len(), config.packages.pacman.len());
        assert_eq!(parsed.symlinks.len(), config.symlinks.len());
        assert_eq!(parsed.repos.len(), config.repos.len());
    }

    #[test]
    fn partial_toml_overrides_one_section() {
        let parsed: Config = toml::from_str(
            r#"
            [updates]
            cache_ttl_secs = 60
            "#,
        )
        .unwrap();
        assert_eq!(parsed.updates.cache_ttl_secs, 60);
        // Untouched sections keep their defaults
        assert!(!parsed.packages.pacman.is_empty());
    }

    #[test]
    fn zsh_framework_is_cloned_before_its_plugins() {
        let config = Config::default();
        assert_eq!(config.repos[0].dest, "~/.oh-my-zsh");
        assert!(
            config.repos[1..]
                .iter()
                .all(|r| r.dest.starts_with("~/.oh-my-zsh/custom/plugins/"))
        );
    }

    #[test]
    fn fonts_come_from_the_dots_repo() {
        let config = Config::default();
        // Installed as a symlink into the dots repo, so the target must
        // not be pre-created as a plain directory
        assert!(
            config
                .symlinks
                .iter()
                .any(|s| s.source == "fonts" && s.target == "~/.local/share/fonts")
        );
        assert!(!config.directories.iter().any(|d| d == "~/.local/share/fonts"));
    }

    #[test]
    fn shallow_clone_depth_is_declared_for_autocomplete() {
        let config = Config::default();
        let autocomplete = config
            .repos
            .iter()
            .find(|r| r.url.contains("zsh-autocomplete"))
            .unwrap();
        assert_eq!(autocomplete.depth, Some(1));
    }
}
