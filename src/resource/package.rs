//! Pacman and AUR package resources

use anyhow::{Context, Result, bail};
use std::process::Command;

use super::{ApplyContext, ApplyResult, Resource, ResourceState, SudoRequirement};

/// Where a package is installed from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageSource {
    /// Official repositories, installed with pacman (privileged)
    Pacman,
    /// AUR, installed with the AUR helper (builds as the user)
    Aur,
}

/// A package that should be installed
#[derive(Debug, Clone)]
pub struct Package {
    pub name: String,
    pub source: PackageSource,
}

impl Package {
    pub fn pacman(name: &str) -> Self {
        Self {
            name: name.to_string(),
            source: PackageSource::Pacman,
        }
    }

    pub fn aur(name: &str) -> Self {
        Self {
            name: name.to_string(),
            source: PackageSource::Aur,
        }
    }

    /// Check the local package database
    ///
    /// `pacman -Q` answers for both sources; AUR packages end up in the
    /// same database once built. A host without pacman answers "not
    /// installed" rather than erroring.
    fn is_installed(&self) -> bool {
        crate::runner::query_ok("pacman", &["-Q", &self.name])
    }

    fn install(&self, ctx: &ApplyContext) -> Result<()> {
        match self.source {
            PackageSource::Pacman => {
                let output = ctx.require_sudo()?.run(
                    "pacman",
                    &["-S", "--needed", "--noconfirm", &self.name],
                )?;
                if !output.success {
                    bail!("pacman -S {} failed: {}", self.name, output.stderr_str().trim());
                }
            }
            PackageSource::Aur => {
                // yay escalates on its own for the final pacman -U
                let output = Command::new("yay")
                    .args(["-S", "--needed", "--noconfirm", &self.name])
                    .output()
                    .context("Failed to run yay")?;
                if !output.status.success() {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    bail!("yay -S {} failed: {}", self.name, stderr.trim());
                }
            }
        }
        Ok(())
    }
}

impl Resource for Package {
    fn id(&self) -> String {
        self.name.clone()
    }

    fn description(&self) -> String {
        match self.source {
            PackageSource::Pacman => format!("Install {} via pacman", self.name),
            PackageSource::Aur => format!("Install {} via AUR helper", self.name),
        }
    }

    fn resource_type(&self) -> &'static str {
        match self.source {
            PackageSource::Pacman => "pacman_package",
            PackageSource::Aur => "aur_package",
        }
    }

    fn sudo_requirement(&self) -> SudoRequirement {
        match self.source {
            PackageSource::Pacman => SudoRequirement::Required {
                reason: format!("Installing {} writes to /usr", self.name),
            },
            PackageSource::Aur => SudoRequirement::None,
        }
    }

    fn current_state(&self) -> Result<ResourceState> {
        if self.is_installed() {
            Ok(ResourceState::Present { details: None })
        } else {
            Ok(ResourceState::Absent)
        }
    }

    fn desired_state(&self) -> ResourceState {
        ResourceState::Present { details: None }
    }

    fn apply(&self, ctx: &mut ApplyContext) -> Result<ApplyResult> {
        if ctx.dry_run {
            return Ok(ApplyResult::Skipped {
                reason: "Dry run".to_string(),
            });
        }

        if self.is_installed() {
            return Ok(ApplyResult::NoChange);
        }

        self.install(ctx)?;
        Ok(ApplyResult::Created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_type_follows_source() {
        assert_eq!(Package::pacman("waybar").resource_type(), "pacman_package");
        assert_eq!(Package::aur("swww").resource_type(), "aur_package");
    }

    #[test]
    fn state_query_never_errors() {
        // With or without pacman on the host, the check must answer
        // instead of failing the whole diff
        assert!(Package::pacman("waybar").current_state().is_ok());
        assert!(Package::aur("swww").needs_apply().is_ok());
    }

    #[test]
    fn only_pacman_packages_require_sudo() {
        assert!(matches!(
            Package::pacman("waybar").sudo_requirement(),
            SudoRequirement::Required { .. }
        ));
        assert!(matches!(
            Package::aur("swww").sudo_requirement(),
            SudoRequirement::None
        ));
    }
}
