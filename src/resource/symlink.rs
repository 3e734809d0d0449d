//! Dotfile symlink resource
//!
//! Wrong-target symlinks are re-pointed. A regular file or directory at the
//! destination is never destroyed silently: it is skipped with a warning
//! unless the run was started with replacement confirmed upfront.

use anyhow::{Context, Result, bail};
use std::fs;
use std::path::{Path, PathBuf};

use super::{ApplyContext, ApplyResult, Resource, ResourceState, SudoRequirement};

/// A symlink to create
#[derive(Debug, Clone)]
pub struct Symlink {
    /// Source path (what the symlink points to)
    pub source: PathBuf,
    /// Target path (where the symlink is created)
    pub target: PathBuf,
    /// Replace a pre-existing regular file or directory at the target
    pub replace_existing: bool,
}

#[derive(Debug)]
enum SymlinkState {
    Missing,
    Correct,
    WrongTarget(PathBuf),
    /// A non-symlink (file or directory) occupies the target
    Occupied,
}

impl Symlink {
    pub fn new(source: impl AsRef<Path>, target: impl AsRef<Path>) -> Self {
        Self {
            source: source.as_ref().to_path_buf(),
            target: target.as_ref().to_path_buf(),
            replace_existing: false,
        }
    }

    pub fn with_replace_existing(mut self, replace: bool) -> Self {
        self.replace_existing = replace;
        self
    }

    fn expand_paths(&self) -> (PathBuf, PathBuf) {
        (
            crate::paths::expand(&self.source.to_string_lossy()),
            crate::paths::expand(&self.target.to_string_lossy()),
        )
    }

    fn check_current(&self) -> Result<SymlinkState> {
        let (source, target) = self.expand_paths();

        // exists() traverses links, so a dangling symlink needs the
        // is_symlink() check too
        if !target.exists() && !target.is_symlink() {
            return Ok(SymlinkState::Missing);
        }

        if target.is_symlink() {
            let link_target = fs::read_link(&target).context("Failed to read symlink")?;

            let expected = source.canonicalize().unwrap_or(source.clone());
            let actual = if link_target.is_absolute() {
                link_target.canonicalize().unwrap_or(link_target)
            } else {
                target
                    .parent()
                    .map(|p| p.join(&link_target))
                    .and_then(|p| p.canonicalize().ok())
                    .unwrap_or(link_target)
            };

            if expected == actual {
                Ok(SymlinkState::Correct)
            } else {
                Ok(SymlinkState::WrongTarget(actual))
            }
        } else {
            Ok(SymlinkState::Occupied)
        }
    }

    fn create_symlink(&self, remove_existing: bool) -> Result<()> {
        let (source, target) = self.expand_paths();

        if !source.exists() {
            bail!("Source does not exist: {}", source.display());
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create parent directory: {}", parent.display())
            })?;
        }

        if target.is_symlink() {
            fs::remove_file(&target).with_context(|| {
                format!("Failed to remove existing symlink: {}", target.display())
            })?;
        } else if remove_existing && target.exists() {
            if target.is_dir() {
                fs::remove_dir_all(&target).with_context(|| {
                    format!("Failed to remove existing directory: {}", target.display())
                })?;
            } else {
                fs::remove_file(&target).with_context(|| {
                    format!("Failed to remove existing file: {}", target.display())
                })?;
            }
        }

        std::os::unix::fs::symlink(&source, &target).with_context(|| {
            format!(
                "Failed to create symlink: {} -> {}",
                target.display(),
                source.display()
            )
        })?;

        Ok(())
    }
}

impl Resource for Symlink {
    fn id(&self) -> String {
        self.target.to_string_lossy().to_string()
    }

    fn description(&self) -> String {
        format!(
            "Symlink {} -> {}",
            self.target.display(),
            self.source.display()
        )
    }

    fn resource_type(&self) -> &'static str {
        "symlink"
    }

    fn sudo_requirement(&self) -> SudoRequirement {
        SudoRequirement::None
    }

    fn current_state(&self) -> Result<ResourceState> {
        match self.check_current()? {
            SymlinkState::Missing => Ok(ResourceState::Absent),
            SymlinkState::Correct => Ok(ResourceState::Present {
                details: Some(format!("-> {}", self.source.display())),
            }),
            SymlinkState::WrongTarget(actual) => Ok(ResourceState::Modified {
                from: actual.to_string_lossy().to_string(),
                to: self.source.to_string_lossy().to_string(),
            }),
            SymlinkState::Occupied => Ok(ResourceState::Modified {
                from: "existing file".to_string(),
                to: format!("symlink -> {}", self.source.display()),
            }),
        }
    }

    fn desired_state(&self) -> ResourceState {
        ResourceState::Present {
            details: Some(format!("-> {}", self.source.display())),
        }
    }

    fn apply(&self, ctx: &mut ApplyContext) -> Result<ApplyResult> {
        if ctx.dry_run {
            return Ok(ApplyResult::Skipped {
                reason: "Dry run".to_string(),
            });
        }

        match self.check_current()? {
            SymlinkState::Correct => Ok(ApplyResult::NoChange),
            SymlinkState::Missing => {
                self.create_symlink(false)?;
                Ok(ApplyResult::Created)
            }
            SymlinkState::WrongTarget(_) => {
                self.create_symlink(false)?;
                Ok(ApplyResult::Modified)
            }
            SymlinkState::Occupied => {
                if self.replace_existing {
                    self.create_symlink(true)?;
                    Ok(ApplyResult::Modified)
                } else {
                    log::warn!(
                        "Not replacing existing file at {}",
                        self.target.display()
                    );
                    Ok(ApplyResult::Skipped {
                        reason: format!("File exists at {}", self.target.display()),
                    })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reconcile::ApplyContext;
    use tempfile::TempDir;

    fn ctx() -> ApplyContext<'static> {
        ApplyContext::new(false, false)
    }

    #[test]
    fn creates_missing_symlink() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("src");
        fs::write(&source, "content").unwrap();
        let target = tmp.path().join("link");

        let link = Symlink::new(&source, &target);
        assert!(matches!(link.current_state().unwrap(), ResourceState::Absent));

        let result = link.apply(&mut ctx()).unwrap();
        assert!(matches!(result, ApplyResult::Created));
        assert_eq!(fs::read_link(&target).unwrap(), source);
    }

    #[test]
    fn correct_symlink_is_no_change() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("src");
        fs::write(&source, "content").unwrap();
        let target = tmp.path().join("link");
        std::os::unix::fs::symlink(&source, &target).unwrap();

        let link = Symlink::new(&source, &target);
        assert!(link.current_state().unwrap().is_present());
        assert!(matches!(link.apply(&mut ctx()).unwrap(), ApplyResult::NoChange));
    }

    #[test]
    fn repoints_wrong_target() {
        let tmp = TempDir::new().unwrap();
        let old = tmp.path().join("old");
        let new = tmp.path().join("new");
        fs::write(&old, "old").unwrap();
        fs::write(&new, "new").unwrap();
        let target = tmp.path().join("link");
        std::os::unix::fs::symlink(&old, &target).unwrap();

        let link = Symlink::new(&new, &target);
        assert!(matches!(
            link.current_state().unwrap(),
            ResourceState::Modified { .. }
        ));

        let result = link.apply(&mut ctx()).unwrap();
        assert!(matches!(result, ApplyResult::Modified));
        assert_eq!(fs::read_link(&target).unwrap(), new);
    }

    #[test]
    fn existing_file_is_left_untouched_by_default() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("src");
        fs::write(&source, "content").unwrap();
        let target = tmp.path().join("precious");
        fs::write(&target, "user data").unwrap();

        let link = Symlink::new(&source, &target);
        let result = link.apply(&mut ctx()).unwrap();

        assert!(matches!(result, ApplyResult::Skipped { .. }));
        assert!(!target.is_symlink());
        assert_eq!(fs::read_to_string(&target).unwrap(), "user data");
    }

    #[test]
    fn existing_file_is_replaced_when_confirmed() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("src");
        fs::write(&source, "content").unwrap();
        let target = tmp.path().join("old_config");
        fs::write(&target, "stale").unwrap();

        let link = Symlink::new(&source, &target).with_replace_existing(true);
        let result = link.apply(&mut ctx()).unwrap();

        assert!(matches!(result, ApplyResult::Modified));
        assert_eq!(fs::read_link(&target).unwrap(), source);
    }

    #[test]
    fn missing_source_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let link = Symlink::new(tmp.path().join("nope"), tmp.path().join("link"));
        assert!(link.apply(&mut ctx()).is_err());
    }

    #[test]
    fn dangling_symlink_is_repointed() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("src");
        fs::write(&source, "content").unwrap();
        let target = tmp.path().join("link");
        std::os::unix::fs::symlink(tmp.path().join("gone"), &target).unwrap();

        let link = Symlink::new(&source, &target);
        let result = link.apply(&mut ctx()).unwrap();
        assert!(matches!(result, ApplyResult::Modified));
        assert_eq!(fs::read_link(&target).unwrap(), source);
    }
}
