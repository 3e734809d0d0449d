//! Git repository resource
//!
//! Clones a repository when absent; fast-forwards it when present and
//! updates are requested. All git invocations use `git -C`, never a
//! working-directory change.

use anyhow::{Context, Result, bail};
use std::path::PathBuf;
use std::process::Command;

use super::{ApplyContext, ApplyResult, Resource, ResourceState, SudoRequirement};

/// A git repository cloned to a fixed destination
#[derive(Debug, Clone)]
pub struct GitRepo {
    pub url: String,
    pub dest: PathBuf,
    /// Shallow clone depth
    pub depth: Option<u32>,
    /// Fast-forward pull when already cloned
    pub update: bool,
}

impl GitRepo {
    pub fn new(url: &str, dest: impl Into<PathBuf>) -> Self {
        Self {
            url: url.to_string(),
            dest: dest.into(),
            depth: None,
            update: false,
        }
    }

    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = Some(depth);
        self
    }

    pub fn with_update(mut self, update: bool) -> Self {
        self.update = update;
        self
    }

    fn expanded_dest(&self) -> PathBuf {
        crate::paths::expand(&self.dest.to_string_lossy())
    }

    fn is_cloned(&self) -> bool {
        self.expanded_dest().join(".git").exists()
    }

    fn clone_repo(&self) -> Result<()> {
        let dest = self.expanded_dest();
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create parent directory: {}", parent.display())
            })?;
        }

        let mut cmd = Command::new("git");
        cmd.arg("clone");
        let depth_arg;
        if let Some(depth) = self.depth {
            depth_arg = depth.to_string();
            cmd.args(["--depth", &depth_arg]);
        }
        cmd.arg(&self.url).arg(&dest);

        let output = cmd.output().context("Failed to run git clone")?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("git clone {} failed: {}", self.url, stderr.trim());
        }
        Ok(())
    }

    fn head_commit(&self) -> Option<String> {
        let output = Command::new("git")
            .arg("-C")
            .arg(self.expanded_dest())
            .args(["rev-parse", "HEAD"])
            .output()
            .ok()?;
        if !output.status.success() {
            return None;
        }
        Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn pull_repo(&self) -> Result<ApplyResult> {
        let dest = self.expanded_dest();
        let before = self.head_commit();

        let output = Command::new("git")
            .arg("-C")
            .arg(&dest)
            .args(["pull", "--ff-only"])
            .output()
            .context("Failed to run git pull")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("git pull in {} failed: {}", dest.display(), stderr.trim());
        }

        Ok(pull_outcome(before.as_deref(), self.head_commit().as_deref()))
    }
}

/// Pull wording varies across git versions and locales, so change
/// detection compares HEAD before and after instead of parsing output
fn pull_outcome(before: Option<&str>, after: Option<&str>) -> ApplyResult {
    match (before, after) {
        (Some(b), Some(a)) if b == a => ApplyResult::NoChange,
        _ => ApplyResult::Modified,
    }
}

impl Resource for GitRepo {
    fn id(&self) -> String {
        self.dest.to_string_lossy().to_string()
    }

    fn description(&self) -> String {
        format!("Clone {} to {}", self.url, self.dest.display())
    }

    fn resource_type(&self) -> &'static str {
        "git_repo"
    }

    fn sudo_requirement(&self) -> SudoRequirement {
        SudoRequirement::None
    }

    fn current_state(&self) -> Result<ResourceState> {
        if self.is_cloned() {
            Ok(ResourceState::Present {
                details: Some(self.url.clone()),
            })
        } else {
            Ok(ResourceState::Absent)
        }
    }

    fn desired_state(&self) -> ResourceState {
        ResourceState::Present {
            details: Some(self.url.clone()),
        }
    }

    /// A cloned repo with updates requested still gets an apply pass
    fn needs_apply(&self) -> Result<bool> {
        Ok(!self.is_cloned() || self.update)
    }

    fn apply(&self, ctx: &mut ApplyContext) -> Result<ApplyResult> {
        if ctx.dry_run {
            return Ok(ApplyResult::Skipped {
                reason: "Dry run".to_string(),
            });
        }

        if self.is_cloned() {
            if !self.update {
                return Ok(ApplyResult::NoChange);
            }
            return self.pull_repo();
        }

        self.clone_repo()?;
        Ok(ApplyResult::Created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn absent_until_git_dir_exists() {
        let tmp = TempDir::new().unwrap();
        let repo = GitRepo::new("https://example.com/repo.git", tmp.path().join("repo"));
        assert!(matches!(repo.current_state().unwrap(), ResourceState::Absent));
        assert!(repo.needs_apply().unwrap());

        std::fs::create_dir_all(tmp.path().join("repo/.git")).unwrap();
        assert!(repo.current_state().unwrap().is_present());
        assert!(!repo.needs_apply().unwrap());
    }

    #[test]
    fn cloned_repo_with_update_still_needs_apply() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("repo/.git")).unwrap();
        let repo = GitRepo::new("https://example.com/repo.git", tmp.path().join("repo"))
            .with_update(true);
        assert!(repo.needs_apply().unwrap());
    }

    #[test]
    fn pull_change_detection_compares_heads() {
        assert!(matches!(
            pull_outcome(Some("abc123"), Some("abc123")),
            ApplyResult::NoChange
        ));
        assert!(matches!(
            pull_outcome(Some("abc123"), Some("def456")),
            ApplyResult::Modified
        ));
        // An unreadable HEAD reports a change rather than hiding one
        assert!(matches!(pull_outcome(None, Some("abc123")), ApplyResult::Modified));
    }
}
