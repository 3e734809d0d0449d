//! Updates command - pending update count for the waybar module
//!
//! Queries pacman (checkupdates), the AUR helper and flatpak, caches the
//! result for a freshness window, and prints a single status JSON object:
//! `{"text": "...", "class": "...", "tooltip": "..."}`. Waybar styles the
//! module via the class: `updates-available`, `no-updates` or `error`.

use anyhow::{Context as AnyhowContext, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::process::Command;

use crate::config::UpdatesConfig;
use crate::paths;

const CACHE_FILE: &str = "updates.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateCache {
    pub pacman: usize,
    pub aur: usize,
    pub flatpak: usize,
    /// Unix timestamp of the last successful query
    pub checked_at: i64,
}

impl UpdateCache {
    pub fn total(&self) -> usize {
        self.pacman + self.aur + self.flatpak
    }

    /// Whether the cached count is still inside the freshness window
    pub fn is_fresh(&self, now: i64, ttl_secs: u64) -> bool {
        let age = now - self.checked_at;
        // A clock jump backwards invalidates the cache
        age >= 0 && (age as u64) < ttl_secs
    }

    pub fn load(path: &Path) -> Option<Self> {
        let content = fs::read_to_string(path).ok()?;
        serde_json::from_str(&content).ok()
    }

    pub fn store(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string(self).context("Failed to serialize update cache")?;
        fs::write(path, content)
            .with_context(|| format!("Could not write {}", path.display()))?;
        Ok(())
    }
}

pub fn run(config: &UpdatesConfig, force: bool) -> Result<()> {
    let cache_file = paths::cache_dir()?.join(CACHE_FILE);
    let now = chrono::Utc::now().timestamp();

    match current_counts(config, force, &cache_file, now) {
        Ok(cache) => println!("{}", render_status(&cache)),
        Err(e) => {
            log::warn!("Update query failed: {e}");
            // Stale cache beats an error badge
            match UpdateCache::load(&cache_file) {
                Some(stale) => println!("{}", render_status(&stale)),
                None => println!("{}", render_error()),
            }
        }
    }

    Ok(())
}

/// The cached count when still fresh, otherwise a full re-query
fn current_counts(
    config: &UpdatesConfig,
    force: bool,
    cache_file: &Path,
    now: i64,
) -> Result<UpdateCache> {
    if !force
        && let Some(cache) = UpdateCache::load(cache_file)
        && cache.is_fresh(now, config.cache_ttl_secs)
    {
        log::debug!("Using cached count from {}", cache.checked_at);
        return Ok(cache);
    }

    let cache = query_all(config, now)?;
    if let Err(e) = cache.store(cache_file) {
        log::warn!("Could not write update cache: {e}");
    }
    Ok(cache)
}

/// Query all sources; an individual source failure fails the whole query
/// so the caller can decide between stale cache and error output.
fn query_all(config: &UpdatesConfig, now: i64) -> Result<UpdateCache> {
    let pacman = query_count(&config.pacman_command, Some(2))?;
    let aur = query_count(&config.aur_command, None)?;
    let flatpak = query_count(&config.flatpak_command, None)?;

    Ok(UpdateCache {
        pacman,
        aur,
        flatpak,
        checked_at: now,
    })
}

/// Run a listing command and count output lines
///
/// `no_updates_exit` maps a designated non-zero exit code to "zero
/// updates"; checkupdates exits 2 when the system is current. yay -Qua
/// exits non-zero with empty output in the same situation.
fn query_count(command: &[String], no_updates_exit: Option<i32>) -> Result<usize> {
    let (cmd, args) = command
        .split_first()
        .ok_or_else(|| anyhow::anyhow!("Empty update command"))?;

    let output = Command::new(cmd)
        .args(args)
        .output()
        .with_context(|| format!("Failed to run {cmd}"))?;

    if output.status.success() {
        return Ok(count_lines(&output.stdout));
    }

    if let Some(code) = no_updates_exit
        && output.status.code() == Some(code)
    {
        return Ok(0);
    }

    // Empty stdout on failure is the helper's way of saying "nothing"
    if output.stdout.is_empty() && output.stderr.is_empty() {
        return Ok(0);
    }

    anyhow::bail!(
        "{cmd} exited with {}: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr).trim()
    )
}

fn count_lines(stdout: &[u8]) -> usize {
    String::from_utf8_lossy(stdout)
        .lines()
        .filter(|l| !l.trim().is_empty())
        .count()
}

/// Waybar status JSON for a known update count
fn render_status(cache: &UpdateCache) -> String {
    let total = cache.total();
    let class = if total > 0 {
        "updates-available"
    } else {
        "no-updates"
    };
    let text = if total > 0 {
        total.to_string()
    } else {
        String::new()
    };
    let tooltip = format!(
        "Pacman: {}\nAUR: {}\nFlatpak: {}",
        cache.pacman, cache.aur, cache.flatpak
    );

    serde_json::json!({
        "text": text,
        "class": class,
        "tooltip": tooltip,
    })
    .to_string()
}

/// Waybar status JSON when no count is available at all
fn render_error() -> String {
    serde_json::json!({
        "text": "!",
        "class": "error",
        "tooltip": "Update check failed",
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(pacman: usize, aur: usize, flatpak: usize) -> UpdateCache {
        UpdateCache {
            pacman,
            aur,
            flatpak,
            checked_at: 0,
        }
    }

    #[test]
    fn pending_updates_render_count_and_class() {
        let json: serde_json::Value =
            serde_json::from_str(&render_status(&cache(3, 0, 0))).unwrap();
        assert_eq!(json["text"], "3");
        assert_eq!(json["class"], "updates-available");
        assert!(json["tooltip"].as_str().unwrap().contains("Pacman: 3"));
    }

    #[test]
    fn zero_updates_render_empty_text() {
        let json: serde_json::Value =
            serde_json::from_str(&render_status(&cache(0, 0, 0))).unwrap();
        assert_eq!(json["text"], "");
        assert_eq!(json["class"], "no-updates");
    }

    #[test]
    fn counts_sum_across_sources() {
        assert_eq!(cache(2, 1, 4).total(), 7);
    }

    #[test]
    fn cache_freshness_window() {
        let c = UpdateCache {
            pacman: 0,
            aur: 0,
            flatpak: 0,
            checked_at: 1000,
        };
        assert!(c.is_fresh(1000, 300));
        assert!(c.is_fresh(1299, 300));
        assert!(!c.is_fresh(1300, 300));
        // Clock moved backwards
        assert!(!c.is_fresh(900, 300));
    }

    #[test]
    fn error_badge_shape() {
        let json: serde_json::Value = serde_json::from_str(&render_error()).unwrap();
        assert_eq!(json["class"], "error");
    }

    #[test]
    fn line_counting_ignores_blanks() {
        assert_eq!(count_lines(b"pkg1 1.0 -> 1.1\npkg2 2.0 -> 2.1\n\n"), 2);
        assert_eq!(count_lines(b""), 0);
    }

    #[test]
    fn fresh_cache_skips_the_queries() {
        use std::os::unix::fs::PermissionsExt;
        use tempfile::TempDir;

        let tmp = TempDir::new().unwrap();
        let marker = tmp.path().join("queried");
        let script = tmp.path().join("list-updates");
        fs::write(
            &script,
            format!("#!/bin/sh\necho run >> {}\necho one-pending-update\n", marker.display()),
        )
        .unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        let config = UpdatesConfig {
            cache_ttl_secs: 300,
            pacman_command: vec![script.display().to_string()],
            aur_command: vec!["true".to_string()],
            flatpak_command: vec!["true".to_string()],
        };
        let cache_file = tmp.path().join("updates.json");
        let now = 1_000_000;

        let queries = || fs::read_to_string(&marker).unwrap().lines().count();

        let first = current_counts(&config, false, &cache_file, now).unwrap();
        assert_eq!(first.pacman, 1);
        assert_eq!(queries(), 1);

        // Inside the freshness window the listing command must not run
        let second = current_counts(&config, false, &cache_file, now + 10).unwrap();
        assert_eq!(second.pacman, 1);
        assert_eq!(queries(), 1);

        // After the window expires it runs again
        current_counts(&config, false, &cache_file, now + 301).unwrap();
        assert_eq!(queries(), 2);

        // Force bypasses the window entirely
        current_counts(&config, true, &cache_file, now + 302).unwrap();
        assert_eq!(queries(), 3);
    }
}
