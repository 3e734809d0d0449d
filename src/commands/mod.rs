//! CLI command implementations

pub mod config;
pub mod declarative;
pub mod doctor;
pub mod install;
pub mod updates;
pub mod wallpaper;
