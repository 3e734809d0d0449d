//! Concrete resources reconciled by hyprsetup
//!
//! Each resource knows how to query its current state and how to converge
//! toward the desired one. The generic machinery lives in the `reconcile`
//! crate; these modules only speak pacman, flatpak, git, systemd and the
//! filesystem.

mod config_line;
mod directory;
mod flatpak;
mod git_repo;
mod package;
mod service;
mod symlink;

pub use config_line::ConfigLine;
pub use directory::Directory;
pub use flatpak::{FlatpakApp, FlatpakRemote};
pub use git_repo::GitRepo;
pub use package::{Package, PackageSource};
pub use service::Service;
pub use symlink::Symlink;

pub(crate) use reconcile::{ApplyContext, ApplyResult, Resource, ResourceState, SudoRequirement};
