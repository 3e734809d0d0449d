//! Scoped sudo context with deterministic allowlist
//!
//! Sudo is never requested for the entire process. Instead:
//! 1. Config defines which operations run privileged (allowlist)
//! 2. All changes are computed first (no sudo needed)
//! 3. Sudo is acquired once, at the first privileged operation
//! 4. Sudo is released when the run ends

use anyhow::{Context, Result, bail};
use reconcile::{CommandOutput, SudoClassifier, SudoProvider};
use serde::{Deserialize, Serialize};
use std::process::{Command, Output};

/// Configuration for the privileged-operation allowlist
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SudoConfig {
    /// Resource types applied through sudo (default: pacman packages,
    /// system services)
    #[serde(default = "default_sudo_types")]
    pub resource_types: Vec<String>,

    /// Individual resource ids that additionally require sudo
    #[serde(default)]
    pub resources: Vec<String>,
}

fn default_sudo_types() -> Vec<String> {
    vec!["pacman_package".to_string(), "service".to_string()]
}

impl Default for SudoConfig {
    fn default() -> Self {
        Self {
            resource_types: default_sudo_types(),
            resources: Vec::new(),
        }
    }
}

impl SudoClassifier for SudoConfig {
    fn requires_sudo(&self, resource_type: &str, resource_id: &str) -> bool {
        self.resource_types.iter().any(|t| t == resource_type)
            || self.resources.iter().any(|r| r == resource_id)
    }
}

/// Scoped sudo context - invalidates the timestamp on drop
pub struct SudoContext {
    validated: bool,
}

impl SudoContext {
    /// Acquire sudo privileges with a reason shown to the user
    pub fn acquire(reason: &str) -> Result<Self> {
        eprintln!();
        eprintln!("  Sudo required: {}", reason);
        eprintln!();

        // Validates the timestamp, prompting for a password if needed
        let status = Command::new("sudo")
            .args(["-v"])
            .status()
            .context("Failed to execute sudo")?;

        if !status.success() {
            bail!("Failed to acquire sudo privileges");
        }

        Ok(Self { validated: true })
    }

    fn run_internal(&self, cmd: &str, args: &[&str]) -> Result<Output> {
        if !self.validated {
            bail!("Sudo context not validated");
        }

        let output = Command::new("sudo")
            .arg(cmd)
            .args(args)
            .output()
            .with_context(|| format!("Failed to execute: sudo {} {:?}", cmd, args))?;

        Ok(output)
    }
}

impl SudoProvider for SudoContext {
    fn run(&self, cmd: &str, args: &[&str]) -> Result<CommandOutput> {
        let output = self.run_internal(cmd, args)?;
        Ok(output.into())
    }
}

impl Drop for SudoContext {
    fn drop(&mut self) {
        // Invalidate the sudo timestamp to release privileges
        let _ = Command::new("sudo").args(["-k"]).status();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_allowlist_covers_system_mutations() {
        let config = SudoConfig::default();
        assert!(config.requires_sudo("pacman_package", "waybar"));
        assert!(config.requires_sudo("service", "NetworkManager"));
        assert!(!config.requires_sudo("aur_package", "swww"));
        assert!(!config.requires_sudo("symlink", "~/.zshrc"));
    }

    #[test]
    fn explicit_resource_allowlist() {
        let config = SudoConfig {
            resource_types: Vec::new(),
            resources: vec!["/etc/sddm.conf".to_string()],
        };
        assert!(config.requires_sudo("symlink", "/etc/sddm.conf"));
        assert!(!config.requires_sudo("symlink", "~/.zshrc"));
    }
}
