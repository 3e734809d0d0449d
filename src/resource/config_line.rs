//! Config-line resource
//!
//! Ensures an exact line is present in a text file, appending it when
//! missing. Detection is whole-line comparison after trimming, so an
//! indented or trailing-whitespace variant still counts as present.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::{ApplyContext, ApplyResult, Resource, ResourceState, SudoRequirement};

/// A line that should be present in a file
#[derive(Debug, Clone)]
pub struct ConfigLine {
    pub file: PathBuf,
    pub line: String,
}

impl ConfigLine {
    pub fn new(file: impl AsRef<Path>, line: &str) -> Self {
        Self {
            file: file.as_ref().to_path_buf(),
            line: line.to_string(),
        }
    }

    fn expanded(&self) -> PathBuf {
        crate::paths::expand(&self.file.to_string_lossy())
    }

    fn contains_line(&self) -> Result<bool> {
        let path = self.expanded();
        if !path.exists() {
            return Ok(false);
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        Ok(content.lines().any(|l| l.trim() == self.line.trim()))
    }

    fn append_line(&self) -> Result<()> {
        let path = self.expanded();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create parent directory: {}", parent.display())
            })?;
        }

        let mut content = if path.exists() {
            fs::read_to_string(&path)
                .with_context(|| format!("Could not read {}", path.display()))?
        } else {
            String::new()
        };

        if !content.is_empty() && !content.ends_with('\n') {
            content.push('\n');
        }
        content.push_str(&self.line);
        content.push('\n');

        fs::write(&path, content)
            .with_context(|| format!("Could not write {}", path.display()))?;
        Ok(())
    }
}

impl Resource for ConfigLine {
    fn id(&self) -> String {
        format!("{}:{}", self.file.display(), self.line)
    }

    fn description(&self) -> String {
        format!("Ensure line in {}", self.file.display())
    }

    fn resource_type(&self) -> &'static str {
        "config_line"
    }

    fn sudo_requirement(&self) -> SudoRequirement {
        SudoRequirement::None
    }

    fn current_state(&self) -> Result<ResourceState> {
        if self.contains_line()? {
            Ok(ResourceState::Present {
                details: Some(self.line.clone()),
            })
        } else {
            Ok(ResourceState::Absent)
        }
    }

    fn desired_state(&self) -> ResourceState {
        ResourceState::Present {
            details: Some(self.line.clone()),
        }
    }

    fn apply(&self, ctx: &mut ApplyContext) -> Result<ApplyResult> {
        if ctx.dry_run {
            return Ok(ApplyResult::Skipped {
                reason: "Dry run".to_string(),
            });
        }

        if self.contains_line()? {
            return Ok(ApplyResult::NoChange);
        }

        self.append_line()?;
        Ok(ApplyResult::Created)
    }
}
