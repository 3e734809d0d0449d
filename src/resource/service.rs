//! Systemd service resource

use anyhow::{Context, Result, bail};
use std::process::Command;

use super::{ApplyContext, ApplyResult, Resource, ResourceState, SudoRequirement};

/// A systemd unit that should be enabled and running
#[derive(Debug, Clone)]
pub struct Service {
    pub name: String,
    /// `systemctl --user` unit
    pub user: bool,
}

impl Service {
    pub fn system(name: &str) -> Self {
        Self {
            name: name.to_string(),
            user: false,
        }
    }

    pub fn user(name: &str) -> Self {
        Self {
            name: name.to_string(),
            user: true,
        }
    }

    fn systemctl(&self, args: &[&str]) -> Result<std::process::Output> {
        let mut cmd = Command::new("systemctl");
        if self.user {
            cmd.arg("--user");
        }
        cmd.args(args)
            .output()
            .context("Failed to run systemctl")
    }

    /// Unit state queries answer "no" on a host without systemctl
    fn query(&self, verb: &str) -> bool {
        if self.user {
            crate::runner::query_ok("systemctl", &["--user", verb, &self.name])
        } else {
            crate::runner::query_ok("systemctl", &[verb, &self.name])
        }
    }

    fn is_enabled(&self) -> bool {
        self.query("is-enabled")
    }

    fn is_active(&self) -> bool {
        self.query("is-active")
    }
}

impl Resource for Service {
    fn id(&self) -> String {
        self.name.clone()
    }

    fn description(&self) -> String {
        if self.user {
            format!("Enable and start user service {}", self.name)
        } else {
            format!("Enable and start service {}", self.name)
        }
    }

    fn resource_type(&self) -> &'static str {
        if self.user { "user_service" } else { "service" }
    }

    fn sudo_requirement(&self) -> SudoRequirement {
        if self.user {
            SudoRequirement::None
        } else {
            SudoRequirement::Required {
                reason: format!("Enabling {} changes system units", self.name),
            }
        }
    }

    fn current_state(&self) -> Result<ResourceState> {
        let enabled = self.is_enabled();
        let active = self.is_active();

        if enabled && active {
            Ok(ResourceState::Present {
                details: Some("enabled, active".to_string()),
            })
        } else if enabled || active {
            Ok(ResourceState::Modified {
                from: format!(
                    "enabled={}, active={}",
                    if enabled { "yes" } else { "no" },
                    if active { "yes" } else { "no" }
                ),
                to: "enabled, active".to_string(),
            })
        } else {
            Ok(ResourceState::Absent)
        }
    }

    fn desired_state(&self) -> ResourceState {
        ResourceState::Present {
            details: Some("enabled, active".to_string()),
        }
    }

    fn apply(&self, ctx: &mut ApplyContext) -> Result<ApplyResult> {
        if ctx.dry_run {
            return Ok(ApplyResult::Skipped {
                reason: "Dry run".to_string(),
            });
        }

        let was_absent = matches!(self.current_state()?, ResourceState::Absent);
        if self.is_enabled() && self.is_active() {
            return Ok(ApplyResult::NoChange);
        }

        if self.user {
            let output = self.systemctl(&["enable", "--now", &self.name])?;
            if !output.status.success() {
                let stderr = String::from_utf8_lossy(&output.stderr);
                bail!("systemctl --user enable {} failed: {}", self.name, stderr.trim());
            }
        } else {
            let output = ctx
                .require_sudo()?
                .run("systemctl", &["enable", "--now", &self.name])?;
            if !output.success {
                bail!(
                    "systemctl enable {} failed: {}",
                    self.name,
                    output.stderr_str().trim()
                );
            }
        }

        if was_absent {
            Ok(ApplyResult::Created)
        } else {
            Ok(ApplyResult::Modified)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_services_require_sudo() {
        assert!(matches!(
            Service::system("sddm").sudo_requirement(),
            SudoRequirement::Required { .. }
        ));
        assert!(matches!(
            Service::user("hypridle").sudo_requirement(),
            SudoRequirement::None
        ));
    }

    #[test]
    fn resource_type_distinguishes_scope() {
        assert_eq!(Service::system("sddm").resource_type(), "service");
        assert_eq!(Service::user("hypridle").resource_type(), "user_service");
    }

    #[test]
    fn state_query_never_errors() {
        // Hosts without systemctl still get an answer, not a failed diff
        assert!(Service::system("sddm").current_state().is_ok());
    }
}
