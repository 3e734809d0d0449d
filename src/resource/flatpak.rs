//! Flatpak application and remote resources

use anyhow::{Context, Result, bail};
use std::process::Command;

use super::{ApplyContext, ApplyResult, Resource, ResourceState, SudoRequirement};

/// A flatpak remote (e.g. flathub)
#[derive(Debug, Clone)]
pub struct FlatpakRemote {
    pub name: String,
    pub url: String,
}

impl FlatpakRemote {
    pub fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
        }
    }

    fn exists(&self) -> bool {
        let output = Command::new("flatpak")
            .args(["remotes", "--columns=name"])
            .output();

        // flatpak missing entirely: the remote is absent, the package
        // resource for flatpak itself will fix the tooling first
        let Ok(output) = output else {
            return false;
        };
        if !output.status.success() {
            return false;
        }

        let remotes = String::from_utf8_lossy(&output.stdout);
        remotes.lines().any(|r| r.trim() == self.name)
    }
}

impl Resource for FlatpakRemote {
    fn id(&self) -> String {
        self.name.clone()
    }

    fn description(&self) -> String {
        format!("Add flatpak remote {} ({})", self.name, self.url)
    }

    fn resource_type(&self) -> &'static str {
        "flatpak_remote"
    }

    fn sudo_requirement(&self) -> SudoRequirement {
        SudoRequirement::None
    }

    fn current_state(&self) -> Result<ResourceState> {
        if self.exists() {
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

        if self.exists() {
            return Ok(ApplyResult::NoChange);
        }

        let output = Command::new("flatpak")
            .args(["remote-add", "--if-not-exists", &self.name, &self.url])
            .output()
            .context("Failed to run flatpak remote-add")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("flatpak remote-add {} failed: {}", self.name, stderr.trim());
        }

        Ok(ApplyResult::Created)
    }
}

/// A flatpak application installed from a remote
#[derive(Debug, Clone)]
pub struct FlatpakApp {
    /// Application id, e.g. `com.github.tchx84.Flatseal`
    pub app_id: String,
    pub remote: String,
}

impl FlatpakApp {
    pub fn new(app_id: &str, remote: &str) -> Self {
        Self {
            app_id: app_id.to_string(),
            remote: remote.to_string(),
        }
    }

    fn is_installed(&self) -> bool {
        crate::runner::query_ok("flatpak", &["info", &self.app_id])
    }
}

impl Resource for FlatpakApp {
    fn id(&self) -> String {
        self.app_id.clone()
    }

    fn description(&self) -> String {
        format!("Install {} via flatpak", self.app_id)
    }

    fn resource_type(&self) -> &'static str {
        "flatpak_app"
    }

    fn sudo_requirement(&self) -> SudoRequirement {
        SudoRequirement::None
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

        let output = Command::new("flatpak")
            .args(["install", "--noninteractive", &self.remote, &self.app_id])
            .output()
            .context("Failed to run flatpak install")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("flatpak install {} failed: {}", self.app_id, stderr.trim());
        }

        Ok(ApplyResult::Created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptions_identify_the_unit() {
        let remote = FlatpakRemote::new("flathub", "https://flathub.org/repo/flathub.flatpakrepo");
        assert!(remote.description().contains("flathub"));

        let app = FlatpakApp::new("com.usebottles.bottles", "flathub");
        assert_eq!(app.id(), "com.usebottles.bottles");
        assert_eq!(app.resource_type(), "flatpak_app");
    }
}
