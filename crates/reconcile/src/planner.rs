//! Execution plans - resources in declaration order, tagged by privilege

use crate::context::SudoClassifier;
use crate::diff::ResourceDiff;
use crate::resource::{BoxedResource, Resource};

/// A resource scheduled in a plan with its resolved privilege level
pub struct PlannedResource {
    pub resource: BoxedResource,
    pub privileged: bool,
}

/// An ordered reconciliation plan
///
/// Resources apply strictly in the order they were added, so producers
/// encode dependencies through declaration order: directories before the
/// symlinks into them, the package providing a tool before the resources
/// that invoke it. `post_actions` are plain commands run after a
/// successful apply (font cache rebuild, compositor reload).
pub struct ExecutionPlan {
    pub resources: Vec<PlannedResource>,
    pub post_actions: Vec<String>,
}

impl ExecutionPlan {
    pub fn new() -> Self {
        Self {
            resources: Vec::new(),
            post_actions: Vec::new(),
        }
    }

    /// Append a resource with an explicit privilege level
    pub fn push(&mut self, resource: BoxedResource, privileged: bool) {
        self.resources.push(PlannedResource {
            resource,
            privileged,
        });
    }

    /// Add a resource, classifying its privilege level via the classifier
    pub fn add_resource<C: SudoClassifier>(&mut self, resource: BoxedResource, classifier: &C) {
        let privileged = classifier.requires_sudo(resource.resource_type(), &resource.id());
        self.push(resource, privileged);
    }

    /// Add a resource that declares its own sudo requirement
    pub fn add_resource_explicit(&mut self, resource: BoxedResource) {
        use crate::types::SudoRequirement;

        let privileged = matches!(resource.sudo_requirement(), SudoRequirement::Required { .. });
        self.push(resource, privileged);
    }

    /// Add a post-apply action command (deduplicated)
    pub fn add_post_action(&mut self, action: String) {
        if !self.post_actions.contains(&action) {
            self.post_actions.push(action);
        }
    }

    /// Diffs for resources not yet converged, in plan order
    ///
    /// A checker error counts as "no diff" here; the apply path surfaces
    /// it instead. `requires_sudo` on the diffs reflects the planned
    /// privilege level, which is what the executor actually honors.
    pub fn pending(&self) -> Vec<ResourceDiff> {
        self.resources
            .iter()
            .filter_map(|planned| {
                ResourceDiff::from_resource(planned.resource.as_ref())
                    .ok()
                    .flatten()
                    .map(|mut diff| {
                        diff.requires_sudo = planned.privileged;
                        diff
                    })
            })
            .collect()
    }

    /// Keep only resources matching a predicate
    pub fn filter<F>(self, predicate: F) -> Self
    where
        F: Fn(&dyn Resource) -> bool,
    {
        Self {
            resources: self
                .resources
                .into_iter()
                .filter(|p| predicate(p.resource.as_ref()))
                .collect(),
            post_actions: self.post_actions,
        }
    }

    /// Keep only resources matching a target pattern
    ///
    /// Target format: `"type"` or `"type.name"`, e.g. `"packages"` or
    /// `"symlinks.hypr"`.
    pub fn filter_by_target(self, target: Option<&str>) -> Self {
        match target {
            None => self,
            Some(t) => {
                let (resource_type, name) = parse_target(t);
                self.filter(|r| matches_filter(r, resource_type.as_deref(), name.as_deref()))
            }
        }
    }

    pub fn total_resources(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn has_privileged(&self) -> bool {
        self.resources.iter().any(|p| p.privileged)
    }

    pub fn privileged_count(&self) -> usize {
        self.resources.iter().filter(|p| p.privileged).count()
    }
}

impl Default for ExecutionPlan {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a target string like `"type.name"` into (type, name)
fn parse_target(target: &str) -> (Option<String>, Option<String>) {
    let parts: Vec<&str> = target.split('.').collect();
    match parts.len() {
        1 => (Some(parts[0].to_string()), None),
        2 => (Some(parts[0].to_string()), Some(parts[1].to_string())),
        _ => (None, Some(target.to_string())),
    }
}

/// Check if a resource matches the filter criteria
fn matches_filter(
    resource: &dyn Resource,
    resource_type: Option<&str>,
    name: Option<&str>,
) -> bool {
    if let Some(rt) = resource_type {
        // Allow common aliases
        let matches_type = match rt {
            "packages" => resource.resource_type().ends_with("_package"),
            "flatpak" => resource.resource_type().starts_with("flatpak"),
            "symlinks" => resource.resource_type() == "symlink",
            "services" => resource.resource_type() == "service",
            "repos" => resource.resource_type() == "git_repo",
            "lines" => resource.resource_type() == "config_line",
            _ => resource.resource_type() == rt || resource.resource_type().starts_with(rt),
        };
        if !matches_type {
            return false;
        }
    }

    if let Some(n) = name
        && !resource.id().contains(n)
    {
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ApplyContext;
    use crate::types::{ApplyResult, ResourceState};
    use anyhow::Result;

    #[derive(Debug)]
    struct Named {
        id: &'static str,
        rtype: &'static str,
    }

    impl Resource for Named {
        fn id(&self) -> String {
            self.id.to_string()
        }

        fn description(&self) -> String {
            self.id.to_string()
        }

        fn resource_type(&self) -> &'static str {
            self.rtype
        }

        fn current_state(&self) -> Result<ResourceState> {
            Ok(ResourceState::Absent)
        }

        fn desired_state(&self) -> ResourceState {
            ResourceState::Present { details: None }
        }

        fn apply(&self, _ctx: &mut ApplyContext) -> Result<ApplyResult> {
            Ok(ApplyResult::Created)
        }
    }

    #[test]
    fn parse_target_forms() {
        assert_eq!(parse_target("packages"), (Some("packages".into()), None));
        assert_eq!(
            parse_target("symlinks.hypr"),
            (Some("symlinks".into()), Some("hypr".into()))
        );
        assert_eq!(parse_target("a.b.c"), (None, Some("a.b.c".into())));
    }

    #[test]
    fn filter_by_target_packages_alias() {
        let mut plan = ExecutionPlan::new();
        plan.push(
            Box::new(Named {
                id: "waybar",
                rtype: "pacman_package",
            }),
            true,
        );
        plan.push(
            Box::new(Named {
                id: "swww",
                rtype: "aur_package",
            }),
            false,
        );
        plan.push(
            Box::new(Named {
                id: "~/.config/hypr",
                rtype: "symlink",
            }),
            false,
        );

        let filtered = plan.filter_by_target(Some("packages"));
        assert_eq!(filtered.total_resources(), 2);

        let mut plan = ExecutionPlan::new();
        plan.push(
            Box::new(Named {
                id: "~/.config/hypr",
                rtype: "symlink",
            }),
            false,
        );
        let filtered = plan.filter_by_target(Some("symlinks.hypr"));
        assert_eq!(filtered.total_resources(), 1);
        let filtered = filtered.filter_by_target(Some("symlinks.kitty"));
        assert!(filtered.is_empty());
    }

    #[test]
    fn pending_preserves_order_and_privilege_tags() {
        let mut plan = ExecutionPlan::new();
        plan.push(
            Box::new(Named {
                id: "first",
                rtype: "directory",
            }),
            false,
        );
        plan.push(
            Box::new(Named {
                id: "second",
                rtype: "pacman_package",
            }),
            true,
        );

        let pending = plan.pending();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].resource_id, "first");
        assert!(!pending[0].requires_sudo);
        assert!(pending[1].requires_sudo);
        assert_eq!(plan.privileged_count(), 1);
    }

    #[test]
    fn post_actions_deduplicate() {
        let mut plan = ExecutionPlan::new();
        plan.add_post_action("fc-cache -f".into());
        plan.add_post_action("fc-cache -f".into());
        plan.add_post_action("hyprctl reload".into());
        assert_eq!(plan.post_actions.len(), 2);
    }
}
