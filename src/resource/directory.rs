//! Directory resource (mkdir -p semantics)

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::{ApplyContext, ApplyResult, Resource, ResourceState, SudoRequirement};

/// A directory that should exist
#[derive(Debug, Clone)]
pub struct Directory {
    pub path: PathBuf,
}

impl Directory {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn expanded(&self) -> PathBuf {
        crate::paths::expand(&self.path.to_string_lossy())
    }
}

impl Resource for Directory {
    fn id(&self) -> String {
        self.path.to_string_lossy().to_string()
    }

    fn description(&self) -> String {
        format!("Create directory {}", self.path.display())
    }

    fn resource_type(&self) -> &'static str {
        "directory"
    }

    fn sudo_requirement(&self) -> SudoRequirement {
        SudoRequirement::None
    }

    fn current_state(&self) -> Result<ResourceState> {
        if self.expanded().is_dir() {
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

        let path = self.expanded();
        if path.is_dir() {
            return Ok(ApplyResult::NoChange);
        }

        fs::create_dir_all(&path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
        Ok(ApplyResult::Created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn creates_nested_directories() {
        let tmp = TempDir::new().unwrap();
        let dir = Directory::new(tmp.path().join("a/b/c"));

        assert!(matches!(dir.current_state().unwrap(), ResourceState::Absent));
        let result = dir.apply(&mut ApplyContext::new(false, false)).unwrap();
        assert!(matches!(result, ApplyResult::Created));
        assert!(tmp.path().join("a/b/c").is_dir());

        // Second apply converges with no change
        let result = dir.apply(&mut ApplyContext::new(false, false)).unwrap();
        assert!(matches!(result, ApplyResult::NoChange));
    }

    #[test]
    fn dry_run_creates_nothing() {
        let tmp = TempDir::new().unwrap();
        let dir = Directory::new(tmp.path().join("missing"));
        let result = dir.apply(&mut ApplyContext::new(true, false)).unwrap();
        assert!(matches!(result, ApplyResult::Skipped { .. }));
        assert!(!tmp.path().join("missing").exists());
    }
}
