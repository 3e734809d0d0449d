//! Wallpaper command - daemon toggle and image selection
//!
//! The daemon is tracked through a PID file under the state directory.
//! Liveness is checked against /proc, so a stale file left by a crash or
//! reboot is reaped instead of blocking a restart. Every `set` appends a
//! timestamped line to a dedicated operation log.

use anyhow::{Context as AnyhowContext, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::WallpaperConfig;
use crate::paths;
use crate::ui;

const PID_FILE: &str = "wallpaper-daemon.pid";
const LOG_FILE: &str = "wallpaper.log";

/// Start the daemon, or stop it if it is already running
pub fn toggle(config: &WallpaperConfig) -> Result<()> {
    let state = paths::state_dir()?;
    fs::create_dir_all(&state)?;
    let pid_file = state.join(PID_FILE);

    if let Some(pid) = running_daemon_pid(&pid_file) {
        stop_daemon(pid, &pid_file)?;
        ui::success(&format!("Wallpaper daemon stopped (pid {pid})"));
        return Ok(());
    }

    let pid = start_daemon(&config.daemon_command)?;
    fs::write(&pid_file, pid.to_string())
        .with_context(|| format!("Could not write {}", pid_file.display()))?;
    ui::success(&format!("Wallpaper daemon started (pid {pid})"));
    Ok(())
}

/// Set the wallpaper image and log the operation
pub fn set(config: &WallpaperConfig, image: &Path) -> Result<()> {
    if !image.is_file() {
        anyhow::bail!("Image not found: {}", image.display());
    }

    let (cmd, args) = config
        .set_command
        .split_first()
        .ok_or_else(|| anyhow::anyhow!("Empty wallpaper set command"))?;

    let output = Command::new(cmd)
        .args(args)
        .arg(image)
        .output()
        .with_context(|| format!("Failed to run {cmd}"))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("{cmd} failed: {}", stderr.trim());
    }

    log_operation(image)?;
    ui::success(&format!("Wallpaper set to {}", image.display()));
    Ok(())
}

/// PID from the file, only if that process is actually alive
///
/// A missing file, unparseable content or a dead PID all read as "not
/// running"; a stale file is removed on the spot.
fn running_daemon_pid(pid_file: &Path) -> Option<u32> {
    let content = fs::read_to_string(pid_file).ok()?;
    let pid: u32 = content.trim().parse().ok()?;

    if process_alive(pid) {
        Some(pid)
    } else {
        log::debug!("Reaping stale PID file ({pid} is gone)");
        let _ = fs::remove_file(pid_file);
        None
    }
}

fn process_alive(pid: u32) -> bool {
    PathBuf::from(format!("/proc/{pid}")).exists()
}

fn start_daemon(command: &[String]) -> Result<u32> {
    let (cmd, args) = command
        .split_first()
        .ok_or_else(|| anyhow::anyhow!("Empty wallpaper daemon command"))?;

    let child = Command::new(cmd)
        .args(args)
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
        .with_context(|| format!("Failed to start {cmd}"))?;

    Ok(child.id())
}

fn stop_daemon(pid: u32, pid_file: &Path) -> Result<()> {
    let status = Command::new("kill")
        .arg(pid.to_string())
        .status()
        .context("Failed to run kill")?;

    if !status.success() {
        anyhow::bail!("Could not stop wallpaper daemon (pid {pid})");
    }

    fs::remove_file(pid_file)
        .with_context(|| format!("Could not remove {}", pid_file.display()))?;
    Ok(())
}

/// Append a timestamped entry to the wallpaper operation log
fn log_operation(image: &Path) -> Result<()> {
    let state = paths::state_dir()?;
    fs::create_dir_all(&state)?;
    let log_path = state.join(LOG_FILE);

    let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
    let entry = format!("{timestamp} set {}\n", image.display());

    let mut content = fs::read_to_string(&log_path).unwrap_or_default();
    content.push_str(&entry);
    fs::write(&log_path, content)
        .with_context(|| format!("Could not write {}", log_path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_pid_file_means_not_running() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(running_daemon_pid(&tmp.path().join("none.pid")), None);
    }

    #[test]
    fn garbage_pid_file_means_not_running() {
        let tmp = TempDir::new().unwrap();
        let pid_file = tmp.path().join("daemon.pid");
        fs::write(&pid_file, "not-a-pid").unwrap();
        assert_eq!(running_daemon_pid(&pid_file), None);
    }

    #[test]
    fn live_pid_is_detected() {
        let tmp = TempDir::new().unwrap();
        let pid_file = tmp.path().join("daemon.pid");
        // Our own PID is certainly alive
        fs::write(&pid_file, std::process::id().to_string()).unwrap();
        assert_eq!(running_daemon_pid(&pid_file), Some(std::process::id()));
        assert!(pid_file.exists());
    }

    #[test]
    fn stale_pid_file_is_reaped() {
        let tmp = TempDir::new().unwrap();
        let pid_file = tmp.path().join("daemon.pid");
        // PID u32::MAX is far above any real pid_max
        fs::write(&pid_file, u32::MAX.to_string()).unwrap();
        assert_eq!(running_daemon_pid(&pid_file), None);
        assert!(!pid_file.exists());
    }
}
