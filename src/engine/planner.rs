//! Plan construction from the host configuration

use anyhow::Result;
use reconcile::ExecutionPlan;
use std::path::PathBuf;

use crate::config::Config;
use crate::paths;
use crate::resource::{
    ConfigLine, Directory, FlatpakApp, FlatpakRemote, GitRepo, Package, Service, Symlink,
};

/// Build the full execution plan from config
///
/// Declaration order is the apply order: directories first (symlink
/// parents), then packages (the flatpak tooling among them), the flatpak
/// remote and apps, clones, symlinks, config lines and services.
pub fn build_plan(config: &Config, replace_existing: bool) -> Result<ExecutionPlan> {
    let mut plan = ExecutionPlan::new();
    let classifier = &config.sudo;
    let dots = paths::dots_dir()?;

    for dir in &config.directories {
        plan.add_resource(Box::new(Directory::new(dir)), classifier);
    }

    for name in &config.packages.pacman {
        plan.add_resource(Box::new(Package::pacman(name)), classifier);
    }
    for name in &config.packages.aur {
        plan.add_resource(Box::new(Package::aur(name)), classifier);
    }

    plan.add_resource(
        Box::new(FlatpakRemote::new(
            &config.flatpak.remote_name,
            &config.flatpak.remote_url,
        )),
        classifier,
    );
    for app in &config.flatpak.apps {
        plan.add_resource(
            Box::new(FlatpakApp::new(app, &config.flatpak.remote_name)),
            classifier,
        );
    }

    for repo in &config.repos {
        let mut resource = GitRepo::new(&repo.url, &repo.dest).with_update(repo.update);
        if let Some(depth) = repo.depth {
            resource = resource.with_depth(depth);
        }
        plan.add_resource(Box::new(resource), classifier);
    }

    for link in &config.symlinks {
        let source = resolve_source(&dots, &link.source);
        plan.add_resource(
            Box::new(
                Symlink::new(source, &link.target).with_replace_existing(replace_existing),
            ),
            classifier,
        );
    }

    for line in &config.config_lines {
        plan.add_resource(Box::new(ConfigLine::new(&line.file, &line.line)), classifier);
    }

    for service in &config.services {
        let resource = if service.user {
            Service::user(&service.name)
        } else {
            Service::system(&service.name)
        };
        plan.add_resource(Box::new(resource), classifier);
    }

    for action in &config.post_actions {
        plan.add_post_action(action.clone());
    }

    Ok(plan)
}

/// Symlink sources are relative to the dots repository unless absolute
fn resolve_source(dots: &std::path::Path, source: &str) -> PathBuf {
    let expanded = paths::expand(source);
    if expanded.is_absolute() {
        expanded
    } else {
        dots.join(expanded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_builds_a_full_plan() {
        let config = Config::default();
        let plan = build_plan(&config, false).unwrap();

        assert!(!plan.is_empty());
        // Default allowlist runs pacman packages and system services
        // privileged
        assert!(plan.has_privileged());
        assert_eq!(
            plan.total_resources(),
            config.directories.len()
                + config.packages.pacman.len()
                + config.packages.aur.len()
                + 1 // flatpak remote
                + config.flatpak.apps.len()
                + config.repos.len()
                + config.symlinks.len()
                + config.config_lines.len()
                + config.services.len()
        );
        assert_eq!(plan.post_actions, config.post_actions);
    }

    #[test]
    fn privileged_count_matches_allowlist() {
        let config = Config::default();
        let plan = build_plan(&config, false).unwrap();

        let expected = config.packages.pacman.len()
            + config.services.iter().filter(|s| !s.user).count();
        assert_eq!(plan.privileged_count(), expected);
    }

    #[test]
    fn flatpak_tooling_installs_before_flatpak_resources() {
        let config = Config::default();
        let plan = build_plan(&config, false).unwrap();

        let types: Vec<&str> = plan
            .resources
            .iter()
            .map(|p| p.resource.resource_type())
            .collect();
        let last_package = types.iter().rposition(|t| t.ends_with("_package")).unwrap();
        let first_flatpak = types.iter().position(|t| t.starts_with("flatpak")).unwrap();
        assert!(last_package < first_flatpak);
    }

    #[test]
    fn zsh_framework_precedes_its_plugins() {
        let config = Config::default();
        let plan = build_plan(&config, false).unwrap();

        let repo_ids: Vec<String> = plan
            .resources
            .iter()
            .filter(|p| p.resource.resource_type() == "git_repo")
            .map(|p| p.resource.id())
            .collect();
        assert_eq!(repo_ids[0], "~/.oh-my-zsh");
        assert!(
            repo_ids[1..]
                .iter()
                .all(|id| id.starts_with("~/.oh-my-zsh/custom/plugins/"))
        );
    }

    #[test]
    fn relative_sources_resolve_under_dots_dir() {
        let dots = std::path::Path::new("/home/user/dots");
        assert_eq!(
            resolve_source(dots, "hypr"),
            PathBuf::from("/home/user/dots/hypr")
        );
        assert_eq!(
            resolve_source(dots, "/etc/absolute"),
            PathBuf::from("/etc/absolute")
        );
    }
}
