//! Centralized path resolution
//!
//! Provides XDG-aware path resolution with environment variable overrides,
//! making it easy to symlink the hyprsetup config from the dotfiles
//! repository itself.
//!
//! # Environment Variables
//!
//! - `HYPRSETUP_CONFIG_DIR` - Override config directory
//! - `HYPRSETUP_STATE_DIR` - Override state directory (PID file, wallpaper log)
//! - `HYPRSETUP_CACHE_DIR` - Override cache directory (update-check cache)
//! - `HYPRSETUP_DOTS_DIR` - Override dotfiles repository location
//!
//! Resolution priority is env override, then the matching XDG variable,
//! then the platform default under `$HOME`.

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Environment variable for config directory override
pub const ENV_CONFIG_DIR: &str = "HYPRSETUP_CONFIG_DIR";

/// Environment variable for state directory override
pub const ENV_STATE_DIR: &str = "HYPRSETUP_STATE_DIR";

/// Environment variable for cache directory override
pub const ENV_CACHE_DIR: &str = "HYPRSETUP_CACHE_DIR";

/// Environment variable for dotfiles repository override
pub const ENV_DOTS_DIR: &str = "HYPRSETUP_DOTS_DIR";

/// Get the hyprsetup config directory
pub fn config_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = expand(&dir);
        log::debug!("Using config dir from {}: {}", ENV_CONFIG_DIR, path.display());
        return Ok(path);
    }

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        let path = PathBuf::from(xdg_config).join("hyprsetup");
        log::debug!("Using XDG_CONFIG_HOME: {}", path.display());
        return Ok(path);
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("hyprsetup"))
}

/// Get the hyprsetup state directory (wallpaper daemon PID file, operation log)
pub fn state_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_STATE_DIR) {
        let path = expand(&dir);
        log::debug!("Using state dir from {}: {}", ENV_STATE_DIR, path.display());
        return Ok(path);
    }

    if let Ok(xdg_state) = std::env::var("XDG_STATE_HOME") {
        let path = PathBuf::from(xdg_state).join("hyprsetup");
        log::debug!("Using XDG_STATE_HOME: {}", path.display());
        return Ok(path);
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".local").join("state").join("hyprsetup"))
}

/// Get the hyprsetup cache directory (update-check cache file)
pub fn cache_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_CACHE_DIR) {
        let path = expand(&dir);
        log::debug!("Using cache dir from {}: {}", ENV_CACHE_DIR, path.display());
        return Ok(path);
    }

    if let Ok(xdg_cache) = std::env::var("XDG_CACHE_HOME") {
        let path = PathBuf::from(xdg_cache).join("hyprsetup");
        log::debug!("Using XDG_CACHE_HOME: {}", path.display());
        return Ok(path);
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".cache").join("hyprsetup"))
}

/// Get the dotfiles repository location (symlink sources)
pub fn dots_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_DOTS_DIR) {
        let path = expand(&dir);
        log::debug!("Using dots dir from {}: {}", ENV_DOTS_DIR, path.display());
        return Ok(path);
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join("dots"))
}

/// Expand ~ and environment variables in a path string.
///
/// This is the canonical path expansion function; all modules use this
/// instead of calling shellexpand directly.
pub fn expand(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(std::borrow::Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    /// Run a test with a temporary env var set
    ///
    /// # Safety
    /// Uses unsafe env::set_var/remove_var; only for single-threaded test
    /// contexts.
    fn with_env_var<F, R>(key: &str, value: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let original = env::var(key).ok();
        // SAFETY: tests don't read env vars concurrently
        unsafe { env::set_var(key, value) };
        let result = f();
        match original {
            // SAFETY: tests run in isolation
            Some(v) => unsafe { env::set_var(key, v) },
            None => unsafe { env::remove_var(key) },
        }
        result
    }

    fn without_env_var<F, R>(key: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let original = env::var(key).ok();
        // SAFETY: tests don't read env vars concurrently
        unsafe { env::remove_var(key) };
        let result = f();
        if let Some(v) = original {
            // SAFETY: tests run in isolation
            unsafe { env::set_var(key, v) };
        }
        result
    }

    #[test]
    fn config_dir_env_override() {
        with_env_var(ENV_CONFIG_DIR, "/custom/config/path", || {
            assert_eq!(config_dir().unwrap(), PathBuf::from("/custom/config/path"));
        });
    }

    #[test]
    fn state_dir_env_override_with_tilde() {
        let home = dirs::home_dir().unwrap();
        let expected = home.join("dotstate");
        with_env_var(ENV_STATE_DIR, "~/dotstate", || {
            assert_eq!(state_dir().unwrap(), expected);
        });
    }

    #[test]
    fn cache_dir_xdg_fallback() {
        without_env_var(ENV_CACHE_DIR, || {
            with_env_var("XDG_CACHE_HOME", "/tmp/xdg-cache-test", || {
                assert_eq!(
                    cache_dir().unwrap(),
                    PathBuf::from("/tmp/xdg-cache-test/hyprsetup")
                );
            });
        });
    }

    #[test]
    fn dots_dir_default() {
        without_env_var(ENV_DOTS_DIR, || {
            let home = dirs::home_dir().unwrap();
            assert_eq!(dots_dir().unwrap(), home.join("dots"));
        });
    }

    #[test]
    fn expand_tilde() {
        let home = dirs::home_dir().unwrap();
        assert_eq!(expand("~/test/path"), home.join("test").join("path"));
    }

    #[test]
    fn expand_absolute_unchanged() {
        assert_eq!(expand("/absolute/path"), PathBuf::from("/absolute/path"));
    }

    #[test]
    fn expand_env_var() {
        with_env_var("HYPRSETUP_TEST_VAR", "test_value", || {
            assert_eq!(
                expand("/path/$HYPRSETUP_TEST_VAR/file"),
                PathBuf::from("/path/test_value/file")
            );
        });
    }
}
