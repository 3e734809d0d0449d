//! Config command - inspect and initialize the configuration file

use anyhow::{Context as AnyhowContext, Result};

use crate::Context;
use crate::cli::ConfigCommand;
use crate::config::Config;
use crate::paths;
use crate::ui;

pub fn run(_ctx: &Context, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show => show(),
        ConfigCommand::Init => init(),
        ConfigCommand::Paths => show_paths(),
    }
}

/// Print the effective configuration (file values merged over defaults)
fn show() -> Result<()> {
    let config = Config::load()?;
    let rendered =
        toml::to_string_pretty(&config).context("Failed to render configuration")?;
    print!("{rendered}");
    Ok(())
}

fn init() -> Result<()> {
    let path = Config::write_default()?;
    ui::success(&format!("Wrote default config to {}", path.display()));
    Ok(())
}

fn show_paths() -> Result<()> {
    ui::header("Hyprsetup Paths");
    ui::kv("config", &Config::path()?.display().to_string());
    ui::kv("state", &paths::state_dir()?.display().to_string());
    ui::kv("cache", &paths::cache_dir()?.display().to_string());
    ui::kv("dots", &paths::dots_dir()?.display().to_string());
    Ok(())
}
