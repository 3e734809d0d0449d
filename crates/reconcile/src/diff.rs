//! Diff computation between current and desired resource state

use crate::resource::Resource;
use crate::types::{ResourceState, SudoRequirement};
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// A pending change for a single resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDiff {
    pub resource_id: String,
    pub resource_type: String,
    pub description: String,
    pub current: ResourceState,
    pub desired: ResourceState,
    pub requires_sudo: bool,
}

impl ResourceDiff {
    /// Create a diff from a resource, returning `None` when already converged
    pub fn from_resource(resource: &dyn Resource) -> Result<Option<Self>> {
        let current = resource.current_state()?;
        let desired = resource.desired_state();

        if current == desired {
            return Ok(None);
        }

        Ok(Some(Self {
            resource_id: resource.id(),
            resource_type: resource.resource_type().to_string(),
            description: resource.description(),
            current,
            desired,
            requires_sudo: matches!(
                resource.sudo_requirement(),
                SudoRequirement::Required { .. }
            ),
        }))
    }

    pub fn is_addition(&self) -> bool {
        matches!(
            (&self.current, &self.desired),
            (ResourceState::Absent, ResourceState::Present { .. })
        )
    }

    pub fn is_removal(&self) -> bool {
        matches!(
            (&self.current, &self.desired),
            (ResourceState::Present { .. }, ResourceState::Absent)
        )
    }

    pub fn is_modification(&self) -> bool {
        !self.is_addition() && !self.is_removal()
    }
}

/// Compute diffs for a list of resources
///
/// Returns only resources with differences. A checker error counts as "no
/// diff" here; the apply path surfaces it instead.
pub fn compute_diffs(resources: &[Box<dyn Resource>]) -> Vec<ResourceDiff> {
    resources
        .iter()
        .filter_map(|r| ResourceDiff::from_resource(r.as_ref()).ok().flatten())
        .collect()
}

/// Summary statistics for a set of diffs
#[derive(Debug, Clone, Default)]
pub struct DiffSummary {
    pub additions: usize,
    pub removals: usize,
    pub modifications: usize,
    pub sudo_required: usize,
}

impl DiffSummary {
    pub fn from_diffs(diffs: &[ResourceDiff]) -> Self {
        let mut summary = Self::default();
        for diff in diffs {
            if diff.is_addition() {
                summary.additions += 1;
            } else if diff.is_removal() {
                summary.removals += 1;
            } else {
                summary.modifications += 1;
            }
            if diff.requires_sudo {
                summary.sudo_required += 1;
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.additions + self.removals + self.modifications
    }

    pub fn has_changes(&self) -> bool {
        self.total() > 0
    }
}

/// Group diffs by resource type, preserving insertion order within groups
pub fn group_by_type(
    diffs: &[ResourceDiff],
) -> std::collections::BTreeMap<String, Vec<&ResourceDiff>> {
    let mut groups: std::collections::BTreeMap<String, Vec<&ResourceDiff>> =
        std::collections::BTreeMap::new();
    for diff in diffs {
        groups
            .entry(diff.resource_type.clone())
            .or_default()
            .push(diff);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ApplyContext;
    use crate::types::ApplyResult;

    #[derive(Debug)]
    struct Fixed {
        id: &'static str,
        current: ResourceState,
    }

    impl Resource for Fixed {
        fn id(&self) -> String {
            self.id.to_string()
        }

        fn description(&self) -> String {
            format!("fixed {}", self.id)
        }

        fn resource_type(&self) -> &'static str {
            "fixed"
        }

        fn current_state(&self) -> Result<ResourceState> {
            Ok(self.current.clone())
        }

        fn desired_state(&self) -> ResourceState {
            ResourceState::Present { details: None }
        }

        fn apply(&self, _ctx: &mut ApplyContext) -> Result<ApplyResult> {
            Ok(ApplyResult::Created)
        }
    }

    #[test]
    fn converged_resource_has_no_diff() {
        let r = Fixed {
            id: "a",
            current: ResourceState::Present { details: None },
        };
        assert!(ResourceDiff::from_resource(&r).unwrap().is_none());
    }

    #[test]
    fn absent_resource_diffs_as_addition() {
        let r = Fixed {
            id: "a",
            current: ResourceState::Absent,
        };
        let diff = ResourceDiff::from_resource(&r).unwrap().unwrap();
        assert!(diff.is_addition());
        assert!(!diff.is_modification());
    }

    #[test]
    fn diff_summary_counts() {
        let resources: Vec<Box<dyn Resource>> = vec![
            Box::new(Fixed {
                id: "missing",
                current: ResourceState::Absent,
            }),
            Box::new(Fixed {
                id: "drifted",
                current: ResourceState::Modified {
                    from: "x".into(),
                    to: "y".into(),
                },
            }),
            Box::new(Fixed {
                id: "ok",
                current: ResourceState::Present { details: None },
            }),
        ];

        let diffs = compute_diffs(&resources);
        let summary = DiffSummary::from_diffs(&diffs);
        assert_eq!(summary.additions, 1);
        assert_eq!(summary.modifications, 1);
        assert_eq!(summary.total(), 2);
        assert!(summary.has_changes());
    }
}
